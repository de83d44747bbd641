use crate::matches::Matches;
use stream_framework::{CharStream, StreamResult};

/// A matcher the lexer can drive over a character stream.
///
/// Matching runs in two passes. [`probe`](Pattern::probe) reads from the live
/// stream only to bound how far a match could possibly reach; it may read past
/// the eventual match end and need not decide anything. [`captures`](Pattern::captures)
/// then computes the real match against the text the probe read. The match
/// must be anchored at the start of that text.
pub trait Pattern: Send + Sync + std::fmt::Debug {
    /// Reads at least as far as any match starting here could extend.
    fn probe(&self, stream: &mut dyn CharStream) -> StreamResult<()>;

    /// Matches against buffered text, anchored at offset 0.
    fn captures(&self, text: &str) -> Option<Matches>;

    /// Human-readable form of the pattern, for diagnostics.
    fn as_str(&self) -> &str {
        "<custom pattern>"
    }
}

/// What an action hands back to the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit<Tok> {
    /// Nothing to emit; scanning continues (whitespace, comments).
    Skip,
    /// One token.
    Token(Tok),
    /// Several tokens, returned one per `next_token` call before matching resumes.
    /// An empty burst behaves like [`Emit::Skip`].
    TokenBurst(Vec<Tok>),
}

/// Return types an action may declare.
///
/// The shape of the result is fixed by the action's signature: `()` always
/// skips, `Option<Tok>` emits zero or one token, `Vec<Tok>` emits a burst.
pub trait IntoEmit<Tok> {
    fn into_emit(self) -> Emit<Tok>;
}

impl<Tok> IntoEmit<Tok> for Emit<Tok> {
    fn into_emit(self) -> Emit<Tok> {
        self
    }
}

impl<Tok> IntoEmit<Tok> for () {
    fn into_emit(self) -> Emit<Tok> {
        Emit::Skip
    }
}

impl<Tok> IntoEmit<Tok> for Option<Tok> {
    fn into_emit(self) -> Emit<Tok> {
        match self {
            Some(token) => Emit::Token(token),
            None => Emit::Skip,
        }
    }
}

impl<Tok> IntoEmit<Tok> for Vec<Tok> {
    fn into_emit(self) -> Emit<Tok> {
        if self.is_empty() {
            Emit::Skip
        } else {
            Emit::TokenBurst(self)
        }
    }
}
