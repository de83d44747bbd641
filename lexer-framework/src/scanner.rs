use crate::error::{ConfigError, ScanError, ScanResult};
use crate::injector::{ActionContext, StateRegistry};
use crate::lexer::{Lexer, Rule};
use crate::matches::Matches;
use crate::traits::Emit;
use std::cell::Ref;
use std::collections::VecDeque;
use stream_framework::{
    CharStream, Position, PositionTrackingStream, RecallStream, StreamError, TransactionalStream,
};
use tracing::{debug, trace, warn};

/// One run of a [`Lexer`] over one source.
///
/// Owns the stream cursor, a fresh instance of every declared state type and
/// the queue of tokens still owed from a burst. Tokens are pulled with
/// [`next_token`](Self::next_token) or by iterating.
pub struct Scanner<'l, Tok, S> {
    lexer: &'l Lexer<Tok>,
    source: PositionTrackingStream<S>,
    states: StateRegistry,
    pending: VecDeque<Tok>,
    halted: bool,
}

impl<'l, Tok, S: CharStream> Scanner<'l, Tok, S> {
    pub(crate) fn new(lexer: &'l Lexer<Tok>, stream: S) -> Self {
        Self {
            lexer,
            source: PositionTrackingStream::new(stream),
            states: lexer.new_states(),
            pending: VecDeque::new(),
            halted: false,
        }
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.source.position()
    }

    /// Tokens queued from a burst and not yet returned.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Reads this run's state cell of type `T`.
    pub fn state<T: 'static>(&self) -> Option<Ref<'_, T>> {
        self.states.get::<T>()
    }

    /// Calls `hook` with the new line number whenever the stream's line count
    /// changes. Speculative reads made while trying rules trigger it too.
    pub fn set_line_hook<F>(&mut self, hook: F)
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.source.set_line_hook(hook);
    }

    /// Returns the next token, `Ok(None)` once the input is exhausted.
    ///
    /// Any error halts the run: later calls return [`ScanError::Halted`].
    #[tracing::instrument(level = "trace", skip(self), fields(position = %self.source.position()))]
    pub fn next_token(&mut self) -> ScanResult<Option<Tok>> {
        if self.halted {
            return Err(ScanError::Halted);
        }
        let result = self.advance();
        if result.is_err() {
            self.halted = true;
        }
        result
    }

    fn advance(&mut self) -> ScanResult<Option<Tok>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let Some(found) = self.peek()? else {
                return Ok(None);
            };
            let start = self.source.position();

            let Some((rule, matches)) = self.match_rule()? else {
                warn!(%start, ?found, "no rule matches");
                return Err(ScanError::NoMatch {
                    position: start,
                    found,
                });
            };

            match self.dispatch(rule, &matches, start)? {
                Emit::Skip => continue,
                Emit::Token(token) => return Ok(Some(token)),
                Emit::TokenBurst(tokens) => {
                    let mut tokens = tokens.into_iter();
                    let Some(first) = tokens.next() else {
                        continue;
                    };
                    self.pending.extend(tokens);
                    return Ok(Some(first));
                }
            }
        }
    }

    fn peek(&mut self) -> Result<Option<char>, StreamError> {
        let next = self.source.read_char()?;
        if next.is_some() {
            self.source.unread_char()?;
        }
        Ok(next)
    }

    /// Tries each rule in order at the current position. On success the
    /// stream sits exactly after the matched text.
    fn match_rule(&mut self) -> ScanResult<Option<(&'l Rule<Tok>, Matches)>> {
        let lexer = self.lexer;
        for (index, rule) in lexer.rules.iter().enumerate() {
            let mut attempt = TransactionalStream::begin(RecallStream::new(&mut self.source));
            rule.pattern.probe(&mut attempt)?;

            let matched = rule
                .pattern
                .captures(attempt.get_ref().recall())
                .filter(|matches| !matches.whole().is_empty());

            let Some(matches) = matched else {
                trace!(rule = index, pattern = rule.pattern.as_str(), "no match");
                attempt.revert()?;
                continue;
            };

            if !attempt.get_ref().recall().starts_with(matches.whole()) {
                attempt.revert()?;
                return Err(ConfigError::PatternContract {
                    pattern: rule.pattern.as_str().to_string(),
                    matched: matches.whole().to_string(),
                }
                .into());
            }

            let mut recall = attempt.commit();
            let looked_ahead = recall.len() - matches.whole().len();
            recall.truncate_to(matches.whole().len())?;
            drop(recall);
            self.source.release();

            debug!(
                rule = index,
                pattern = rule.pattern.as_str(),
                text = matches.whole(),
                looked_ahead,
                "matched"
            );
            return Ok(Some((rule, matches)));
        }
        Ok(None)
    }

    fn dispatch(
        &self,
        rule: &Rule<Tok>,
        matches: &Matches,
        start: Position,
    ) -> Result<Emit<Tok>, ConfigError> {
        let cx = ActionContext::new(&self.states, matches, start);
        rule.action.invoke(&cx)
    }
}

/// Yields tokens until the input is exhausted. A terminal error is yielded
/// once, after which the iterator is finished.
impl<Tok, S: CharStream> Iterator for Scanner<'_, Tok, S> {
    type Item = Result<Tok, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        self.next_token().transpose()
    }
}

impl<Tok, S> std::fmt::Debug for Scanner<'_, Tok, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("position", &self.source.position())
            .field("states", &self.states)
            .field("pending", &self.pending.len())
            .field("halted", &self.halted)
            .finish()
    }
}
