use crate::error::StreamResult;

/// A forward-reading character stream that can step back over what it read.
///
/// Every layer of the stream stack implements this trait, so wrappers can be
/// nested in any order and a pattern matcher only ever sees `&mut dyn CharStream`.
pub trait CharStream {
    /// Reads the next character. Returns `Ok(None)` at end of input.
    fn read_char(&mut self) -> StreamResult<Option<char>>;

    /// Steps back over the most recently read character that has not already
    /// been unread. The next `read_char` returns that character again.
    fn unread_char(&mut self) -> StreamResult<()>;

    /// Declares that everything read so far is final and will never be unread.
    ///
    /// Implementations that keep history for `unread_char` may drop it here.
    /// Wrappers must forward the call.
    fn release(&mut self) {}
}

impl<S: CharStream + ?Sized> CharStream for &mut S {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        (**self).read_char()
    }

    fn unread_char(&mut self) -> StreamResult<()> {
        (**self).unread_char()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<S: CharStream + ?Sized> CharStream for Box<S> {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        (**self).read_char()
    }

    fn unread_char(&mut self) -> StreamResult<()> {
        (**self).unread_char()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
