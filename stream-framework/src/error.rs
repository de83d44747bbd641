use thiserror::Error;

/// Failures raised by a character stream.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The underlying byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source produced bytes that are not valid UTF-8.
    #[error("invalid UTF-8 sequence at byte offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// `unread_char` was called with no read character left to step back over.
    #[error("no character available to unread")]
    NothingToUnread,
}

pub type StreamResult<T> = Result<T, StreamError>;
