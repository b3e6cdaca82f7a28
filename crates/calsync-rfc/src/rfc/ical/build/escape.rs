//! Attribute value quoting.

use std::borrow::Cow;

/// Wraps an attribute value in double quotes when it contains a separator.
///
/// Values containing `;`, `:` or `,` would otherwise be split when read
/// back.
#[must_use]
pub fn quote_attribute_value(value: &str) -> Cow<'_, str> {
    if value.contains([';', ':', ',']) {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}
