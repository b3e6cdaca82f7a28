//! iCalendar text parsing.
//!
//! - Lexer: line unfolding and content line tokenization
//! - Parser: stack-based assembly of the component tree

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentLine, parse_content_line, split_lines};
#[cfg(test)]
pub(crate) use lexer::unfold;
pub use parser::{ParseOptions, parse, parse_with};
