//! iCalendar document parser.
//!
//! Builds the component tree from content lines with an explicit stack of
//! open components. Any component type can be the root.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{ContentLine, parse_content_line, split_lines};
use crate::rfc::ical::core::{Component, ComponentRegistry};

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject END lines naming a different component and input that ends
    /// with open components. Lenient parsing ignores the END argument and
    /// closes whatever is still open at end of input.
    pub strict: bool,
}

impl ParseOptions {
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }
}

/// Parses an iCalendar document with the default registry and lenient options.
///
/// Returns `Ok(None)` when the input contains no BEGIN line.
///
/// ## Errors
///
/// Returns an error if the input is malformed or an event date cannot be
/// normalized.
pub fn parse(input: &str) -> ParseResult<Option<Component>> {
    parse_with(input, &ComponentRegistry::default(), ParseOptions::default())
}

/// Parses an iCalendar document, creating components through `registry`.
///
/// ## Errors
///
/// Returns an error if the input is malformed or an event date cannot be
/// normalized.
#[tracing::instrument(skip(input, registry), fields(input_len = input.len()))]
pub fn parse_with(
    input: &str,
    registry: &ComponentRegistry,
    options: ParseOptions,
) -> ParseResult<Option<Component>> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input);
    tracing::debug!(count = lines.len(), "Split lines");

    let mut builder = TreeBuilder::new(registry, options);
    for (line_num, line) in lines {
        let content_line = parse_content_line(&line, line_num)?;
        builder.feed(content_line, line_num)?;
    }

    let root = builder.finish()?;
    match &root {
        Some(root) => tracing::debug!(
            root = %root.name,
            children = root.children.len(),
            "iCalendar document parsed successfully"
        ),
        None => tracing::debug!("No component found in input"),
    }

    Ok(root)
}

/// Stack of open components plus the closed root.
struct TreeBuilder<'r> {
    registry: &'r ComponentRegistry,
    options: ParseOptions,
    stack: Vec<Component>,
    root: Option<Component>,
    last_line: usize,
}

impl<'r> TreeBuilder<'r> {
    fn new(registry: &'r ComponentRegistry, options: ParseOptions) -> Self {
        Self {
            registry,
            options,
            stack: Vec::new(),
            root: None,
            last_line: 0,
        }
    }

    fn feed(&mut self, line: ContentLine, line_num: usize) -> ParseResult<()> {
        self.last_line = line_num;

        if line.name.eq_ignore_ascii_case("BEGIN") {
            self.begin(&line.value, line_num)
        } else if line.name.eq_ignore_ascii_case("END") {
            self.end(&line.value, line_num)
        } else {
            self.property(line, line_num)
        }
    }

    fn begin(&mut self, tag: &str, line_num: usize) -> ParseResult<()> {
        self.ensure_open_document(line_num)?;
        if tag.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::MissingComponentName,
                line_num,
                "",
            ));
        }

        tracing::trace!(tag, line = line_num, "Opening component");
        self.stack.push(self.registry.create(tag));
        Ok(())
    }

    fn end(&mut self, tag: &str, line_num: usize) -> ParseResult<()> {
        self.ensure_open_document(line_num)?;
        let Some(component) = self.stack.pop() else {
            return Err(ParseError::new(
                ParseErrorKind::OutsideComponent,
                line_num,
                format!("END:{tag} without BEGIN"),
            ));
        };

        if !component.name.eq_ignore_ascii_case(tag) {
            if self.options.strict {
                return Err(ParseError::new(
                    ParseErrorKind::MismatchedComponent,
                    line_num,
                    format!("expected END:{}, got END:{tag}", component.name),
                ));
            }
            tracing::warn!(
                open = %component.name,
                end = tag,
                line = line_num,
                "END does not match the open component"
            );
        }

        self.close(component);
        Ok(())
    }

    fn property(&mut self, line: ContentLine, line_num: usize) -> ParseResult<()> {
        self.ensure_open_document(line_num)?;
        let Some(component) = self.stack.last_mut() else {
            return Err(ParseError::new(
                ParseErrorKind::OutsideComponent,
                line_num,
                format!("property {} before BEGIN", line.name),
            ));
        };

        component
            .add_property(&line.name, &line.value, line.attributes)
            .map_err(|e| ParseError::invalid_date(line_num, &e))
    }

    /// Attaches a closed component to its parent, or makes it the root.
    fn close(&mut self, component: Component) {
        match self.stack.last_mut() {
            Some(parent) => parent.add_child(component),
            None => self.root = Some(component),
        }
    }

    fn ensure_open_document(&self, line_num: usize) -> ParseResult<()> {
        match &self.root {
            Some(root) => Err(ParseError::new(
                ParseErrorKind::TrailingContent,
                line_num,
                format!("{} already closed", root.name),
            )),
            None => Ok(()),
        }
    }

    fn finish(mut self) -> ParseResult<Option<Component>> {
        if self.options.strict
            && let Some(open) = self.stack.last()
        {
            return Err(ParseError::new(
                ParseErrorKind::MissingEnd,
                self.last_line,
                format!("missing END:{}", open.name),
            ));
        }

        if !self.stack.is_empty() {
            tracing::warn!(open = self.stack.len(), "Closing components left open at end of input");
        }
        while let Some(component) = self.stack.pop() {
            self.close(component);
        }

        Ok(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::ComponentKind;

    #[test]
    fn parse_minimal_calendar() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        let root = parse(input).unwrap().unwrap();

        assert_eq!(root.kind, ComponentKind::Calendar);
        assert_eq!(root.first_property_value("VERSION"), Some("2.0"));
        assert!(root.children.is_empty());
    }

    #[test]
    fn no_begin_yields_none() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("\r\n\r\n").unwrap(), None);
    }

    #[test]
    fn nested_components_keep_order() {
        let input = "BEGIN:VCALENDAR\n\
                     BEGIN:VEVENT\nUID:1\nEND:VEVENT\n\
                     BEGIN:VTODO\nUID:2\nEND:VTODO\n\
                     BEGIN:VEVENT\nUID:3\nBEGIN:VALARM\nACTION:DISPLAY\nEND:VALARM\nEND:VEVENT\n\
                     END:VCALENDAR\n";
        let root = parse(input).unwrap().unwrap();

        let tags: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(tags, vec!["VEVENT", "VTODO", "VEVENT"]);
        assert_eq!(root.children[1].kind, ComponentKind::Generic);
        assert_eq!(root.children[2].children[0].name, "VALARM");
        assert_eq!(
            root.children[2].children[0].first_property_value("ACTION"),
            Some("DISPLAY")
        );
    }

    #[test]
    fn begin_and_end_are_case_insensitive() {
        let input = "begin:vcalendar\r\nbegin:vevent\r\nUID:1\r\nend:vevent\r\nend:vcalendar\r\n";
        let root = parse(input).unwrap().unwrap();

        assert_eq!(root.kind, ComponentKind::Calendar);
        assert_eq!(root.name, "vcalendar");
        assert_eq!(root.children[0].kind, ComponentKind::Event);
    }

    #[test]
    fn any_component_can_be_root() {
        let root = parse("BEGIN:VEVENT\r\nUID:1\r\nEND:VEVENT\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(root.kind, ComponentKind::Event);
        assert_eq!(root.uid(), Some("1"));
    }

    #[test]
    fn folded_value_matches_unfolded() {
        let folded = parse("BEGIN:X\r\nKEY:A\r\n B\r\nEND:X\r\n").unwrap();
        let plain = parse("BEGIN:X\r\nKEY:AB\r\nEND:X\r\n").unwrap();
        assert_eq!(folded, plain);
    }

    #[test]
    fn event_dates_are_normalized() {
        let input = "BEGIN:VEVENT\r\n\
                     DTSTART;TZID=Europe/Berlin:20140903T110000\r\n\
                     DTEND:20140903T120000Z\r\n\
                     END:VEVENT\r\n";
        let event = parse(input).unwrap().unwrap();

        let start = &event.properties.get("DTSTART").unwrap()[0];
        assert_eq!(start.value, "2014-09-03T09:00:00.000Z");
        assert!(start.attributes.is_empty());
        assert_eq!(
            event.first_property_value("DTEND"),
            Some("2014-09-03T12:00:00.000Z")
        );
    }

    #[test]
    fn invalid_event_date_is_reported_with_line() {
        let input = "BEGIN:VEVENT\r\nDTSTART:not-a-date\r\nEND:VEVENT\r\n";
        let err = parse(input).unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::InvalidDate);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn property_before_begin_is_rejected() {
        let err = parse("VERSION:2.0\r\nBEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::OutsideComponent);
        assert_eq!(err.line, 1);

        let err = parse("END:VCALENDAR\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::OutsideComponent);
    }

    #[test]
    fn content_after_root_is_rejected() {
        let err = parse("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\nBEGIN:VCALENDAR\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingContent);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn lenient_mode_ignores_end_argument() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";
        let root = parse(input).unwrap().unwrap();
        assert_eq!(root.children[0].kind, ComponentKind::Event);
    }

    #[test]
    fn lenient_mode_closes_open_components() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:1\r\n";
        let root = parse(input).unwrap().unwrap();

        assert_eq!(root.kind, ComponentKind::Calendar);
        assert_eq!(root.children[0].uid(), Some("1"));
    }

    #[test]
    fn strict_mode_rejects_mismatched_end() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";
        let err = parse_with(input, &ComponentRegistry::default(), ParseOptions::strict())
            .unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::MismatchedComponent);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn strict_mode_rejects_missing_end() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\n";
        let err = parse_with(input, &ComponentRegistry::default(), ParseOptions::strict())
            .unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
    }

    #[test]
    fn empty_begin_is_rejected() {
        let err = parse("BEGIN:\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingComponentName);
    }

    #[test]
    fn custom_registry_is_used() {
        let registry = ComponentRegistry::empty();
        let root = parse_with(
            "BEGIN:VEVENT\r\nDTSTART:20140903T110000Z\r\nEND:VEVENT\r\n",
            &registry,
            ParseOptions::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(root.kind, ComponentKind::Generic);
        assert_eq!(root.first_property_value("DTSTART"), Some("20140903T110000Z"));
    }

    #[test]
    fn unknown_properties_are_preserved() {
        let input = "BEGIN:X-CUSTOM\r\nX-THING;X-A=1:value:with:colons\r\nEND:X-CUSTOM\r\n";
        let root = parse(input).unwrap().unwrap();

        let entry = &root.properties.get("X-THING").unwrap()[0];
        assert_eq!(entry.value, "value:with:colons");
        assert_eq!(entry.attributes["X-A"], "1");
    }
}
