//! Stream Framework
//!
//! Character streams for the lexer framework: a UTF-8 reader with unread
//! support, plus wrappers that track positions, make reads reversible and
//! record what was read.

pub mod error;
pub mod position;
pub mod reader;
pub mod recall;
pub mod stream;
pub mod tracking;
pub mod transaction;

pub use error::{StreamError, StreamResult};
pub use position::Position;
pub use reader::CharReader;
pub use recall::RecallStream;
pub use stream::CharStream;
pub use tracking::{is_line_break, PositionTrackingStream};
pub use transaction::TransactionalStream;
