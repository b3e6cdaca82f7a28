//! iCalendar document serializer.

use std::fmt::Write;

use super::escape::quote_attribute_value;
use super::fold::fold_line;
use crate::error::RfcResult;
use crate::rfc::ical::core::{Component, PropertyValue, is_date_property};
use crate::rfc::ical::date;

const CRLF: &str = "\r\n";

/// Serializes a component tree to iCalendar text.
///
/// Properties are written in store order, one line per entry, followed by
/// the children. Every line ends with CRLF and is folded at 75 octets.
///
/// ## Errors
/// Returns a `DateError` if a stored event date is not a valid ISO instant.
#[tracing::instrument(skip_all, fields(root = %component.name))]
pub fn serialize(component: &Component) -> RfcResult<String> {
    let mut out = String::new();
    write_component(&mut out, component)?;
    tracing::trace!(len = out.len(), "Serialized component tree");
    Ok(out)
}

/// Renders entry `index` of property `name` as a single unfolded content
/// line, without a terminator.
///
/// ## Errors
/// Returns `UnknownProperty` or `InvalidIndex` if the entry does not exist,
/// or a `DateError` for an invalid stored event date.
pub fn serialize_property(component: &Component, name: &str, index: usize) -> RfcResult<String> {
    let entry = component.properties.entry(name, index)?;
    content_line(component, name, entry)
}

fn write_component(out: &mut String, component: &Component) -> RfcResult<()> {
    push_line(out, &format!("BEGIN:{}", component.name));

    for (name, entries) in component.properties.iter() {
        for entry in entries {
            push_line(out, &content_line(component, name, entry)?);
        }
    }

    for child in &component.children {
        write_component(out, child)?;
    }

    push_line(out, &format!("END:{}", component.name));
    Ok(())
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str(CRLF);
}

fn content_line(component: &Component, name: &str, entry: &PropertyValue) -> RfcResult<String> {
    let mut line = String::from(name);
    for (attr, value) in &entry.attributes {
        let _ = write!(line, ";{attr}={}", quote_attribute_value(value));
    }
    line.push(':');

    if component.is_event() && is_date_property(name) {
        let instant = date::parse_iso(&entry.value)?;
        line.push_str(&date::to_compact(&instant));
    } else {
        line.push_str(&entry.value);
    }

    Ok(line)
}
