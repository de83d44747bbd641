use crate::error::{StreamError, StreamResult};
use crate::stream::CharStream;
use std::io::{BufReader, Bytes, Read};

/// Decodes UTF-8 characters from any byte reader and supports unbounded
/// unreading back to the last [`CharStream::release`] point.
///
/// Characters handed out are remembered in `history`; unreading moves them to
/// `pushback`, which is drained before the byte source is touched again.
pub struct CharReader<R> {
    bytes: Bytes<BufReader<R>>,
    byte_offset: usize,
    history: Vec<char>,
    pushback: Vec<char>,
}

impl<R: Read> CharReader<R> {
    /// Wraps `source` in a buffered UTF-8 decoder.
    pub fn new(source: R) -> Self {
        Self {
            bytes: BufReader::new(source).bytes(),
            byte_offset: 0,
            history: Vec::new(),
            pushback: Vec::new(),
        }
    }

    /// Returns how many bytes have been pulled from the underlying reader.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    fn next_byte(&mut self) -> StreamResult<Option<u8>> {
        match self.bytes.next() {
            Some(Ok(byte)) => {
                self.byte_offset += 1;
                Ok(Some(byte))
            }
            Some(Err(err)) => Err(StreamError::Io(err)),
            None => Ok(None),
        }
    }

    fn decode_next(&mut self) -> StreamResult<Option<char>> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let start = self.byte_offset - 1;
        let width = utf8_width(first);
        if width == 0 {
            return Err(StreamError::InvalidUtf8 { offset: start });
        }

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None => return Err(StreamError::InvalidUtf8 { offset: start }),
            }
        }

        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(StreamError::InvalidUtf8 { offset: start })
    }
}

impl<'a> From<&'a str> for CharReader<&'a [u8]> {
    fn from(value: &'a str) -> Self {
        CharReader::new(value.as_bytes())
    }
}

impl<R: Read> CharStream for CharReader<R> {
    fn read_char(&mut self) -> StreamResult<Option<char>> {
        let next = match self.pushback.pop() {
            Some(ch) => Some(ch),
            None => self.decode_next()?,
        };
        if let Some(ch) = next {
            self.history.push(ch);
        }
        Ok(next)
    }

    fn unread_char(&mut self) -> StreamResult<()> {
        let ch = self.history.pop().ok_or(StreamError::NothingToUnread)?;
        self.pushback.push(ch);
        Ok(())
    }

    fn release(&mut self) {
        self.history.clear();
    }
}

impl<R> std::fmt::Debug for CharReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharReader")
            .field("byte_offset", &self.byte_offset)
            .field("history", &self.history.len())
            .field("pushback", &self.pushback)
            .finish()
    }
}

/// Length of the UTF-8 sequence introduced by `lead`, or 0 if `lead` cannot
/// start one.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain<S: CharStream>(stream: &mut S) -> String {
        let mut out = String::new();
        while let Some(ch) = stream.read_char().unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn test_reads_ascii_and_multibyte() {
        let mut reader = CharReader::from("aé中🦀");
        assert_eq!(drain(&mut reader), "aé中🦀");
        assert_eq!(reader.byte_offset(), 1 + 2 + 3 + 4);
    }

    #[test]
    fn test_unread_replays_in_order() {
        let mut reader = CharReader::from("xyz");
        assert_eq!(reader.read_char().unwrap(), Some('x'));
        assert_eq!(reader.read_char().unwrap(), Some('y'));
        reader.unread_char().unwrap();
        reader.unread_char().unwrap();
        assert_eq!(drain(&mut reader), "xyz");
    }

    #[test]
    fn test_unread_at_end_of_input() {
        let mut reader = CharReader::from("ab");
        drain(&mut reader);
        assert_eq!(reader.read_char().unwrap(), None);
        reader.unread_char().unwrap();
        assert_eq!(reader.read_char().unwrap(), Some('b'));
    }

    #[test]
    fn test_unread_without_history() {
        let mut reader = CharReader::from("ab");
        assert!(matches!(
            reader.unread_char(),
            Err(StreamError::NothingToUnread)
        ));

        reader.read_char().unwrap();
        reader.release();
        assert!(matches!(
            reader.unread_char(),
            Err(StreamError::NothingToUnread)
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes: &[u8] = &[b'o', b'k', 0xFF, b'!'];
        let mut reader = CharReader::new(bytes);
        assert_eq!(reader.read_char().unwrap(), Some('o'));
        assert_eq!(reader.read_char().unwrap(), Some('k'));
        assert!(matches!(
            reader.read_char(),
            Err(StreamError::InvalidUtf8 { offset: 2 })
        ));
    }

    #[test]
    fn test_truncated_sequence() {
        let bytes: &[u8] = &[0xE4, 0xB8];
        let mut reader = CharReader::new(bytes);
        assert!(matches!(
            reader.read_char(),
            Err(StreamError::InvalidUtf8 { offset: 0 })
        ));
    }

    #[test]
    fn test_io_error_is_propagated() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("socket closed"))
            }
        }

        let mut reader = CharReader::new(Broken);
        assert!(matches!(reader.read_char(), Err(StreamError::Io(_))));
    }
}
