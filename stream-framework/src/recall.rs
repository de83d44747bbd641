use crate::error::{StreamError, StreamResult};
use crate::stream::CharStream;

/// Remembers every character read through it.
///
/// The buffer is what a buffered-text matcher re-runs against after a
/// streaming attempt, so it always mirrors the net reads: an unread drops the
/// last character again.
#[derive(Debug)]
pub struct RecallStream<S> {
    inner: S,
    buffer: String,
}

impl<S: CharStream> RecallStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: String::new(),
        }
    }

    /// Text read so far, in order.
    pub fn recall(&self) -> &str {
        &self.buffer
    }

    /// Length of the recalled text in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Unreads characters until the recalled text is `len` bytes long.
    ///
    /// `len` must fall on a character boundary of [`recall`](Self::recall).
    pub fn truncate_to(&mut self, len: usize) -> StreamResult<()> {
        while self.buffer.len() > len {
            self.unread_char()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CharStream> CharStream for RecallStream<S> {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        let next = self.inner.read_char()?;
        if let Some(ch) = next {
            self.buffer.push(ch);
        }
        Ok(next)
    }

    fn unread_char(&mut self) -> StreamResult<()> {
        if self.buffer.is_empty() {
            return Err(StreamError::NothingToUnread);
        }
        self.inner.unread_char()?;
        self.buffer.pop();
        Ok(())
    }

    fn release(&mut self) {
        self.inner.release();
    }
}
