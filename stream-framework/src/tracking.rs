use crate::error::{StreamError, StreamResult};
use crate::position::Position;
use crate::stream::CharStream;

/// Returns true for every code point counted as a line break.
///
/// A CR immediately followed by LF still counts once; that pairing is handled
/// by [`PositionTrackingStream`], not here.
pub fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

type LineHook = Box<dyn FnMut(usize) + Send>;

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    position: Position,
    after_cr: bool,
}

/// Tracks line, column and offset of the characters flowing through it.
///
/// Each read records the state it replaced, and each unread restores that
/// record, so counting stays symmetric across CRLF and the other breaks.
/// Records are dropped on [`CharStream::release`].
pub struct PositionTrackingStream<S> {
    inner: S,
    position: Position,
    after_cr: bool,
    undo: Vec<Snapshot>,
    on_line: Option<LineHook>,
}

impl<S> PositionTrackingStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            position: Position::new(),
            after_cr: false,
            undo: Vec::new(),
            on_line: None,
        }
    }

    /// Installs a hook called with the new line number whenever it changes,
    /// on reads and unreads alike. Replaces any previous hook.
    pub fn set_line_hook<F>(&mut self, hook: F)
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.on_line = Some(Box::new(hook));
    }

    pub fn with_line_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.set_line_hook(hook);
        self
    }

    /// Position of the next character to be read.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn advance(&mut self, ch: char) {
        self.position.offset += 1;
        if ch == '\n' && self.after_cr {
            // second half of CRLF: already counted when the CR went by
            self.after_cr = false;
            return;
        }
        self.after_cr = ch == '\r';
        if is_line_break(ch) {
            self.position.line += 1;
            self.position.column = 1;
            self.notify();
        } else {
            self.position.column += 1;
        }
    }

    fn notify(&mut self) {
        let line = self.position.line;
        if let Some(hook) = self.on_line.as_mut() {
            hook(line);
        }
    }
}

impl<S: CharStream> CharStream for PositionTrackingStream<S> {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        let next = self.inner.read_char()?;
        if let Some(ch) = next {
            self.undo.push(Snapshot {
                position: self.position,
                after_cr: self.after_cr,
            });
            self.advance(ch);
        }
        Ok(next)
    }

    fn unread_char(&mut self) -> StreamResult<()> {
        if self.undo.is_empty() {
            return Err(StreamError::NothingToUnread);
        }
        self.inner.unread_char()?;
        if let Some(snapshot) = self.undo.pop() {
            let line_changed = snapshot.position.line != self.position.line;
            self.position = snapshot.position;
            self.after_cr = snapshot.after_cr;
            if line_changed {
                self.notify();
            }
        }
        Ok(())
    }

    fn release(&mut self) {
        self.undo.clear();
        self.inner.release();
    }
}

impl<S> std::fmt::Debug for PositionTrackingStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionTrackingStream")
            .field("position", &self.position)
            .field("after_cr", &self.after_cr)
            .field("pending_undo", &self.undo.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CharReader;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    const LOREM: &str = "
        Lorem ipsum dolor sit amet, consectetur adipiscing elit. Phasellus
        quis rutrum nisl, vel congue dolor. Donec tincidunt massa id
        condimentum tristique. Vestibulum sed velit nec ligula convallis
        viverra eu vel mi. Sed aliquam ornare lorem, sit amet mattis ipsum
        porta eget. Ut urna justo, convallis nec vehicula sit amet, viverra
        quis lorem. Phasellus sit amet tempor erat. Vivamus tempus hendrerit
        leo, mattis aliquam nunc vehicula nec. Pellentesque feugiat fringilla
        gravida. Mauris condimentum elit ut consequat scelerisque. Nulla
        molestie tempor est vel consequat.
    ";
    const HTTP: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n";
    const SEPARATORS: &str = "foo\u{000B}bar\u{000C}baz\u{0085}qux\u{2028}\u{2029}";

    fn tracker(input: &str) -> PositionTrackingStream<CharReader<&[u8]>> {
        PositionTrackingStream::new(CharReader::from(input))
    }

    fn breaks_in(input: &str) -> usize {
        let mut stream = tracker(input);
        while stream.read_char().unwrap().is_some() {}
        stream.line() - 1
    }

    #[test]
    fn test_transparency() {
        let mut tracked = tracker(LOREM);
        let mut plain = CharReader::from(LOREM);
        loop {
            let a = tracked.read_char().unwrap();
            let b = plain.read_char().unwrap();
            assert_eq!(a, b);
            if a.is_none() {
                break;
            }
        }
    }

    #[test]
    fn test_line_counts() {
        assert_eq!(breaks_in(LOREM), 10);
        assert_eq!(breaks_in(HTTP), 2);
        assert_eq!(breaks_in(SEPARATORS), 5);
    }

    #[test]
    fn test_crlf_is_one_break() {
        let mut stream = tracker("X\r\nY");
        stream.read_char().unwrap();
        assert_eq!(stream.line(), 1);
        stream.read_char().unwrap();
        assert_eq!(stream.line(), 2);
        stream.read_char().unwrap();
        assert_eq!(stream.line(), 2);
        assert_eq!(stream.read_char().unwrap(), Some('Y'));
        assert_eq!(stream.position(), Position::at(2, 2, 4));
    }

    #[test]
    fn test_lf_cr_is_two_breaks() {
        assert_eq!(breaks_in("a\n\rb"), 2);
        assert_eq!(breaks_in("a\r\rb"), 2);
        assert_eq!(breaks_in("a\r\n\nb"), 2);
    }

    #[test]
    fn test_unread_across_crlf() {
        let mut stream = tracker("X\r\nY");
        for _ in 0..3 {
            stream.read_char().unwrap();
        }
        assert_eq!(stream.position(), Position::at(2, 1, 3));

        stream.unread_char().unwrap();
        assert_eq!(stream.position(), Position::at(2, 1, 2));
        stream.unread_char().unwrap();
        assert_eq!(stream.position(), Position::at(1, 2, 1));

        // reading forward again must count the pair once
        stream.read_char().unwrap();
        stream.read_char().unwrap();
        assert_eq!(stream.line(), 2);
        assert_eq!(stream.read_char().unwrap(), Some('Y'));
    }

    #[test]
    fn test_unread_without_read() {
        let mut stream = tracker("abc");
        assert!(matches!(
            stream.unread_char(),
            Err(StreamError::NothingToUnread)
        ));
    }

    #[test]
    fn test_line_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut stream = tracker("a\r\nb\nc").with_line_hook(move |line| {
            sink.lock().unwrap().push(line);
        });

        while stream.read_char().unwrap().is_some() {}
        stream.unread_char().unwrap(); // 'c'
        stream.unread_char().unwrap(); // '\n'

        assert_eq!(*seen.lock().unwrap(), vec![2, 3, 2]);
    }

    proptest! {
        #[test]
        fn prop_unread_restores_position(
            input in "[ab\r\n\u{0085}\u{2028}]{0,24}",
            back in 0usize..24,
        ) {
            let mut stream = tracker(&input);
            let mut seen = vec![stream.position()];
            while stream.read_char().unwrap().is_some() {
                seen.push(stream.position());
            }
            let back = back.min(seen.len() - 1);
            for _ in 0..back {
                stream.unread_char().unwrap();
            }
            prop_assert_eq!(stream.position(), seen[seen.len() - 1 - back]);
        }
    }
}
