//! iCalendar parse error types.

use std::fmt;

/// Result type for iCalendar parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred during iCalendar parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Line number where the error occurred (1-based, physical line).
    pub line: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Creates an invalid date error from a normalization failure.
    #[must_use]
    pub fn invalid_date(line: usize, source: &crate::rfc::ical::date::DateError) -> Self {
        Self::new(ParseErrorKind::InvalidDate, line, source.to_string())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "line {}: {}", self.line, self.kind)
        } else {
            write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Content line without a `:` separating name and value.
    MissingColon,
    /// Content line starting with `;` or `:`.
    MissingPropertyName,
    /// BEGIN without a component name.
    MissingComponentName,
    /// Attribute without `=` or with an empty name.
    InvalidAttribute,
    /// Quoted attribute value without a closing quote.
    UnclosedQuote,
    /// Property or END line before any BEGIN.
    OutsideComponent,
    /// Content after the root component was closed.
    TrailingContent,
    /// END name differs from the open component (strict mode).
    MismatchedComponent,
    /// Input ended with open components (strict mode).
    MissingEnd,
    /// Event date that could not be normalized.
    InvalidDate,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColon => write!(f, "missing colon"),
            Self::MissingPropertyName => write!(f, "missing property name"),
            Self::MissingComponentName => write!(f, "missing component name"),
            Self::InvalidAttribute => write!(f, "invalid attribute"),
            Self::UnclosedQuote => write!(f, "unclosed quote"),
            Self::OutsideComponent => write!(f, "content outside of a component"),
            Self::TrailingContent => write!(f, "content after the root component"),
            Self::MismatchedComponent => write!(f, "mismatched component"),
            Self::MissingEnd => write!(f, "missing END"),
            Self::InvalidDate => write!(f, "invalid date"),
        }
    }
}
