use crate::error::{StreamError, StreamResult};
use crate::stream::CharStream;

/// A speculative read over an inner stream.
///
/// Creating the transaction marks a checkpoint. Characters read through it
/// are counted so that [`revert`](Self::revert) can push back exactly that
/// many, leaving the inner stream where it was before the attempt.
/// [`commit`](Self::commit) keeps everything that was read.
#[derive(Debug)]
pub struct TransactionalStream<S> {
    inner: S,
    read_count: usize,
}

impl<S: CharStream> TransactionalStream<S> {
    /// Starts an attempt at the inner stream's current position.
    pub fn begin(inner: S) -> Self {
        Self {
            inner,
            read_count: 0,
        }
    }

    /// Characters read since the checkpoint and not unread again.
    pub fn read_count(&self) -> usize {
        self.read_count
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Accepts every character read during the attempt.
    pub fn commit(self) -> S {
        self.inner
    }

    /// Restores the inner stream to the checkpoint.
    pub fn revert(mut self) -> StreamResult<S> {
        while self.read_count > 0 {
            self.inner.unread_char()?;
            self.read_count -= 1;
        }
        Ok(self.inner)
    }
}

impl<S: CharStream> CharStream for TransactionalStream<S> {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        let next = self.inner.read_char()?;
        if next.is_some() {
            self.read_count += 1;
        }
        Ok(next)
    }

    /// Unreading never crosses the checkpoint.
    fn unread_char(&mut self) -> StreamResult<()> {
        if self.read_count == 0 {
            return Err(StreamError::NothingToUnread);
        }
        self.inner.unread_char()?;
        self.read_count -= 1;
        Ok(())
    }

    // An open attempt may still be reverted, so history is kept until the
    // transaction is committed and the owner releases the inner stream.
    fn release(&mut self) {}
}
