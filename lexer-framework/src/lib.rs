//! A rule-based tokenizer engine.
//!
//! A [`Lexer`] is an ordered table of pattern/action rules. Each
//! [`Scanner`] run pulls characters from a source, finds the first rule whose
//! pattern matches at the current position and hands the match to that rule's
//! action, which may skip, emit a token or emit a burst of tokens.
//!
//! ```
//! use lexer_framework::{Lexer, Matches, State};
//!
//! #[derive(Debug, PartialEq)]
//! enum Tok {
//!     Num(i64),
//!     Op(char),
//! }
//!
//! #[derive(Default)]
//! struct Count(usize);
//!
//! let mut builder = Lexer::<Tok>::builder();
//! builder.declare_state::<Count>();
//! builder
//!     .add_rule(r"\d+", |m: &Matches, mut count: State<Count>| {
//!         count.0 += 1;
//!         m.whole().parse().ok().map(Tok::Num)
//!     })?
//!     .add_rule(r"\s+", || {})?
//!     .add_rule(r"[+\-*/]", |m: &Matches| m.whole().chars().next().map(Tok::Op))?;
//! let lexer = builder.build()?;
//!
//! let tokens = lexer.tokenize("12 + 3".as_bytes())?;
//! assert_eq!(tokens, vec![Tok::Num(12), Tok::Op('+'), Tok::Num(3)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod injector;
pub mod lexer;
pub mod matches;
pub mod pattern;
pub mod scanner;
pub mod traits;

pub use error::{ConfigError, ScanError, ScanResult};
pub use injector::{ActionContext, IntoAction, Param, Requirement, State, StateRegistry};
pub use lexer::{Lexer, LexerBuilder, Rule};
pub use matches::Matches;
pub use pattern::{PatternOptions, RegexPattern};
pub use scanner::Scanner;
pub use stream_framework::{CharReader, CharStream, Position, StreamError, StreamResult};
pub use traits::{Emit, IntoEmit, Pattern};
