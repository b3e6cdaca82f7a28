//! Content line lexer for iCalendar text.
//!
//! Handles line unfolding and tokenization of content lines.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::Attributes;

/// A tokenized content line: `name *(";" attr "=" value) ":" value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name as written.
    pub name: String,
    /// Attributes with quotes removed.
    pub attributes: Attributes,
    /// Everything after the first unquoted colon.
    pub value: String,
}

/// Unfolds content lines by removing line terminators followed by whitespace.
///
/// A fold is CRLF (or a bare LF) followed by a single SPACE or HTAB; both are
/// removed. Line endings that are not folds are normalized to CRLF. The
/// parser unfolds line by line through [`split_lines`]; this whole-text form
/// is the reference it is checked against.
#[cfg(test)]
#[must_use]
pub(crate) fn unfold(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let newline = match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                true
            }
            '\n' => true,
            _ => false,
        };

        if !newline {
            result.push(c);
            continue;
        }

        if matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        } else {
            result.push_str("\r\n");
        }
    }

    result
}

/// Splits input into logical content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. Each logical line carries the
/// 1-based number of the physical line it started on. Empty lines are
/// skipped.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    let mut previous_empty = false;

    for (i, raw_line) in input.lines().enumerate() {
        let mut line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if i > 0
            && let Some(continuation) = line.strip_prefix([' ', '\t'])
        {
            if !previous_empty && let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
                continue;
            }
            // Folded onto an empty line: the continuation starts a new line.
            line = continuation;
        }

        previous_empty = line.is_empty();
        if !previous_empty {
            lines.push((i + 1, line.to_string()));
        }
    }

    lines
}

/// Parses a single content line.
///
/// Format: `name *(";" attr "=" value) ":" value`
///
/// ## Errors
/// Returns an error if the name is empty, the colon is missing, or an
/// attribute is malformed.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut chars = line.char_indices().peekable();

    let mut separator = None;
    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            separator = Some((i, c));
            break;
        }
        chars.next();
    }

    let Some((name_end, first)) = separator else {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line_num, line));
    };

    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            line,
        ));
    }

    let name = line[..name_end].to_string();
    chars.next();

    let mut attributes = Attributes::new();
    if first == ';' {
        loop {
            let (attr_name, attr_value, next_is_colon) =
                parse_attribute(&mut chars, line, line_num)?;
            attributes.insert(attr_name, attr_value);
            if next_is_colon {
                break;
            }
        }
    }

    let value = chars
        .peek()
        .map_or("", |&(i, _)| &line[i..])
        .to_string();

    Ok(ContentLine {
        name,
        attributes,
        value,
    })
}

/// Parses one `name=value` attribute from the character stream.
///
/// Returns the attribute and whether the consumed separator was ':'.
fn parse_attribute(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(String, String, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut name_end = None;
    while let Some(&(i, c)) = chars.peek() {
        match c {
            '=' => {
                name_end = Some(i);
                chars.next();
                break;
            }
            ';' | ':' => break,
            _ => {
                chars.next();
            }
        }
    }

    let name = match name_end {
        Some(end) if end > start => line[start..end].to_string(),
        Some(_) => {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAttribute,
                line_num,
                "empty attribute name",
            ));
        }
        None => {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAttribute,
                line_num,
                format!("missing '=' in attribute '{}'", attribute_text(line, start)),
            ));
        }
    };

    let mut segments = Vec::new();
    loop {
        segments.push(parse_attribute_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((name, segments.join(","), false)),
            Some((_, ':')) => return Ok((name, segments.join(","), true)),
            Some((_, c)) => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidAttribute,
                    line_num,
                    format!("unexpected character '{c}' after quoted value of {name}"),
                ));
            }
            None => {
                return Err(ParseError::new(ParseErrorKind::MissingColon, line_num, line));
            }
        }
    }
}

/// Parses a single attribute value segment, removing surrounding quotes.
fn parse_attribute_value(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Ok(String::new());
    };

    if first == '"' {
        chars.next();
        for (i, c) in chars.by_ref() {
            if c == '"' {
                return Ok(line[start + 1..i].to_string());
            }
        }
        return Err(ParseError::new(
            ParseErrorKind::UnclosedQuote,
            line_num,
            attribute_text(line, start),
        ));
    }

    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c == ',' || c == ';' || c == ':' {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    Ok(line[start..end].to_string())
}

fn attribute_text(line: &str, start: usize) -> &str {
    let rest = &line[start..];
    rest.find([';', ':']).map_or(rest, |end| &rest[..end])
}
