//! Document tree node shared by every iCalendar component type.

use super::event::is_date_property;
use super::property::{Attributes, CompactValue, PropertyError, PropertyStore};
use crate::rfc::ical::date::{self, DateResult};

/// Behavior selected for a component when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR container.
    Calendar,
    /// VEVENT, whose date properties are normalized to UTC.
    Event,
    /// Any other component, kept as opaque data.
    Generic,
}

impl ComponentKind {
    /// Returns the canonical tag for specialized kinds.
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Calendar => Some("VCALENDAR"),
            Self::Event => Some("VEVENT"),
            Self::Generic => None,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calendar => write!(f, "calendar"),
            Self::Event => write!(f, "event"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// An iCalendar component.
///
/// Components own their properties and nested sub-components. The external
/// identifier is assigned by the caller (for example a URL) and is not part of
/// the text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Caller-assigned identifier, independent of any property.
    pub external_id: Option<String>,
    /// Behavior selected at creation time.
    pub kind: ComponentKind,
    /// Type tag as written (`VEVENT`, `X-CUSTOM`, ...).
    pub name: String,
    pub properties: PropertyStore,
    pub children: Vec<Component>,
}

impl Component {
    /// Creates an empty component of a specialized kind with its canonical tag.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            external_id: None,
            kind,
            name: kind.tag().unwrap_or_default().to_string(),
            properties: PropertyStore::new(),
            children: Vec::new(),
        }
    }

    /// Creates a generic component with the given tag.
    #[must_use]
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            external_id: None,
            kind: ComponentKind::Generic,
            name: name.into(),
            properties: PropertyStore::new(),
            children: Vec::new(),
        }
    }

    /// Creates a VCALENDAR component.
    #[must_use]
    pub fn calendar() -> Self {
        Self::new(ComponentKind::Calendar)
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Sets the external identifier.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    #[must_use]
    pub fn is_calendar(&self) -> bool {
        self.kind == ComponentKind::Calendar
    }

    #[must_use]
    pub fn is_event(&self) -> bool {
        self.kind == ComponentKind::Event
    }

    /// Adds a property value.
    ///
    /// Date properties of events are normalized to UTC on the way in; their
    /// `TZID` attribute is consumed by the conversion. A date-only value
    /// becomes midnight UTC, so `VALUE=DATE` is dropped with it.
    ///
    /// ## Errors
    /// Returns a `DateError` if an event date cannot be normalized.
    pub fn add_property(
        &mut self,
        name: &str,
        value: &str,
        mut attributes: Attributes,
    ) -> DateResult<()> {
        if self.is_event() && is_date_property(name) {
            let tzid = attributes.remove(super::names::TZID);
            if attributes
                .get(super::names::VALUE)
                .is_some_and(|kind| kind.eq_ignore_ascii_case("DATE"))
            {
                attributes.remove(super::names::VALUE);
            }
            let instant = date::from_local(value, tzid.as_deref())?;
            self.properties.add(name, date::to_iso(&instant), attributes);
        } else {
            self.properties.add(name, value, attributes);
        }
        Ok(())
    }

    /// Updates entry `index` of a property. See [`PropertyStore::update`].
    ///
    /// ## Errors
    /// Returns `InvalidIndex` if the property exists without an entry at `index`.
    pub fn update_property(
        &mut self,
        name: &str,
        value: Option<String>,
        attributes: Option<Attributes>,
        index: usize,
    ) -> Result<(), PropertyError> {
        self.properties.update(name, value, attributes, index)
    }

    /// Removes entry `index` of a property. See [`PropertyStore::remove`].
    ///
    /// ## Errors
    /// Returns `UnknownProperty` or `InvalidIndex` if the entry does not exist.
    pub fn remove_property(&mut self, name: &str, index: usize) -> Result<(), PropertyError> {
        self.properties.remove(name, index).map(|_| ())
    }

    /// Replaces every value of `name` with `values`, without attributes.
    pub fn set_values(&mut self, name: &str, values: CompactValue) {
        self.properties.remove_all(name);
        for value in values.into_vec() {
            self.properties.add(name, value, Attributes::new());
        }
    }

    #[must_use]
    pub fn property_values(&self, name: &str) -> Vec<&str> {
        self.properties.values(name)
    }

    #[must_use]
    pub fn property_values_compact(&self, name: &str) -> Option<CompactValue> {
        self.properties.values_compact(name)
    }

    #[must_use]
    pub fn first_property_value(&self, name: &str) -> Option<&str> {
        self.properties.first_value(name)
    }

    /// Adds a child component.
    pub fn add_child(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Removes the first child structurally equal to `child`.
    ///
    /// Returns the removed child, or `None` when no child matches.
    pub fn remove_child(&mut self, child: &Component) -> Option<Component> {
        let index = self.children.iter().position(|c| c == child)?;
        Some(self.children.remove(index))
    }
}
