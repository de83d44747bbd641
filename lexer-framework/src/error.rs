use stream_framework::{Position, StreamError};
use thiserror::Error;

/// Mistakes in how a lexer was put together.
///
/// These are never turned into a no-match: they surface from
/// [`LexerBuilder`](crate::LexerBuilder) or, at the latest, from the first
/// action invocation that trips over them.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("cannot build a streaming automaton for `{pattern}`: {source}")]
    Automaton {
        pattern: String,
        source: Box<regex_automata::hybrid::BuildError>,
    },

    #[error("action asks for `{type_name}` more than once")]
    DuplicateParam { type_name: &'static str },

    #[error("state `{type_name}` is declared more than once")]
    DuplicateState { type_name: &'static str },

    #[error("rule {rule} needs state `{type_name}`, which was never declared")]
    UnresolvedParam {
        rule: usize,
        type_name: &'static str,
    },

    /// A custom [`Pattern`](crate::Pattern) returned a match that is not a
    /// prefix of the text its probe read.
    #[error("pattern `{pattern}` matched text it never read: {matched:?}")]
    PatternContract { pattern: String, matched: String },

    #[error("state `{type_name}` is not available to this action")]
    StateUnavailable { type_name: &'static str },
}

/// Why a [`Scanner`](crate::Scanner) run stopped.
#[derive(Error, Debug)]
pub enum ScanError {
    /// No rule matches at `position`; nothing was consumed.
    #[error("no rule matches {found:?} at {position}")]
    NoMatch { position: Position, found: char },

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run already failed; scanners do not resume.
    #[error("scanner halted after an earlier error")]
    Halted,
}

pub type ScanResult<T> = Result<T, ScanError>;
