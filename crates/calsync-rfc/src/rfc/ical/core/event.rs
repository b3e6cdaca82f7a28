//! VEVENT accessors and the structured (schema.org style) event representation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::Component;
use super::names;
use super::property::{Attributes, CompactValue};
use crate::rfc::ical::date::{self, DateResult};

/// Event properties holding date-time values.
pub const DATE_PROPERTIES: [&str; 2] = [names::DTSTART, names::DTEND];

/// Returns whether `name` is normalized as a date on events.
#[must_use]
pub fn is_date_property(name: &str) -> bool {
    DATE_PROPERTIES.contains(&name)
}

const SCHEMA_ORG_CONTEXT: &str = "http://schema.org";
const EVENT_TYPE: &str = "Event";

fn schema_org_context() -> String {
    SCHEMA_ORG_CONTEXT.to_string()
}

fn event_type() -> String {
    EVENT_TYPE.to_string()
}

/// A linked-data reference: either a bare IRI or `{"@id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Iri(String),
    Node {
        #[serde(rename = "@id")]
        id: String,
    },
}

impl Reference {
    #[must_use]
    pub fn iri(&self) -> &str {
        match self {
            Self::Iri(iri) | Self::Node { id: iri } => iri,
        }
    }
}

/// One reference or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum References {
    One(Reference),
    Many(Vec<Reference>),
}

impl References {
    fn into_compact(self) -> Option<CompactValue> {
        let iris = match self {
            Self::One(reference) => vec![reference.iri().to_string()],
            Self::Many(references) => references.iter().map(|r| r.iri().to_string()).collect(),
        };
        CompactValue::from_vec(iris)
    }
}

impl From<CompactValue> for References {
    fn from(value: CompactValue) -> Self {
        match value {
            CompactValue::Single(iri) => Self::One(Reference::Iri(iri)),
            CompactValue::Multiple(iris) => Self::Many(iris.into_iter().map(Reference::Iri).collect()),
        }
    }
}

/// Flat structured representation of an event.
///
/// Only these fields survive [`Component::simplified`]; everything else on an
/// event is dropped by the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventJson {
    #[serde(rename = "@context", default = "schema_org_context")]
    pub context: String,
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "@type", default = "event_type")]
    pub kind: String,
    /// UID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_as: Option<CompactValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<CompactValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<CompactValue>,
    /// SUMMARY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<CompactValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CompactValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee: Option<References>,
}

impl Default for EventJson {
    fn default() -> Self {
        Self {
            context: schema_org_context(),
            id: None,
            kind: event_type(),
            same_as: None,
            start_date: None,
            end_date: None,
            description: None,
            location: None,
            attendee: None,
        }
    }
}

impl Component {
    /// Returns the first UID value, the join key for synchronization.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.first_property_value(names::UID)
    }

    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.set_values(names::UID, CompactValue::Single(uid.into()));
    }

    #[must_use]
    pub fn start_date(&self) -> Option<CompactValue> {
        self.property_values_compact(names::DTSTART)
    }

    /// Sets DTSTART from ISO 8601 values with any offset; they are stored in UTC.
    ///
    /// ## Errors
    /// Returns `InvalidTimestamp` if a value cannot be parsed.
    pub fn set_start_date(&mut self, values: CompactValue) -> DateResult<()> {
        self.set_date_values(names::DTSTART, values)
    }

    #[must_use]
    pub fn end_date(&self) -> Option<CompactValue> {
        self.property_values_compact(names::DTEND)
    }

    /// Sets DTEND from ISO 8601 values with any offset; they are stored in UTC.
    ///
    /// ## Errors
    /// Returns `InvalidTimestamp` if a value cannot be parsed.
    pub fn set_end_date(&mut self, values: CompactValue) -> DateResult<()> {
        self.set_date_values(names::DTEND, values)
    }

    #[must_use]
    pub fn summary(&self) -> Option<CompactValue> {
        self.property_values_compact(names::SUMMARY)
    }

    pub fn set_summary(&mut self, values: CompactValue) {
        self.set_values(names::SUMMARY, values);
    }

    #[must_use]
    pub fn location(&self) -> Option<CompactValue> {
        self.property_values_compact(names::LOCATION)
    }

    pub fn set_location(&mut self, values: CompactValue) {
        self.set_values(names::LOCATION, values);
    }

    #[must_use]
    pub fn attendees(&self) -> Option<CompactValue> {
        self.property_values_compact(names::ATTENDEE)
    }

    pub fn set_attendees(&mut self, values: CompactValue) {
        self.set_values(names::ATTENDEE, values);
    }

    fn set_date_values(&mut self, name: &str, values: CompactValue) -> DateResult<()> {
        let normalized = values
            .into_vec()
            .iter()
            .map(|value| date::to_utc(value).map(|instant| date::to_iso(&instant)))
            .collect::<DateResult<Vec<_>>>()?;

        self.properties.remove_all(name);
        for value in normalized {
            self.properties.add(name, value, Attributes::new());
        }
        Ok(())
    }

    /// Builds the structured representation from the recognized fields.
    #[must_use]
    pub fn to_event_json(&self) -> EventJson {
        EventJson {
            id: self.external_id.clone(),
            same_as: self.property_values_compact(names::UID),
            start_date: self.start_date(),
            end_date: self.end_date(),
            description: self.summary(),
            location: self.location(),
            attendee: self.attendees().map(References::from),
            ..EventJson::default()
        }
    }

    /// ## Summary
    /// Builds an event from its structured representation.
    ///
    /// A fresh UUID is used as UID when `sameAs` is absent.
    ///
    /// ## Errors
    /// Returns `InvalidTimestamp` if a start or end date cannot be parsed.
    pub fn from_event_json(json: &EventJson) -> DateResult<Self> {
        let mut event = Self::event();
        event.external_id.clone_from(&json.id);

        match &json.same_as {
            Some(uid) => event.set_values(names::UID, uid.clone()),
            None => event.set_uid(Uuid::new_v4().to_string()),
        }
        if let Some(start) = &json.start_date {
            event.set_start_date(start.clone())?;
        }
        if let Some(end) = &json.end_date {
            event.set_end_date(end.clone())?;
        }
        if let Some(summary) = &json.description {
            event.set_summary(summary.clone());
        }
        if let Some(location) = &json.location {
            event.set_location(location.clone());
        }
        if let Some(attendees) = json.attendee.clone().and_then(References::into_compact) {
            event.set_attendees(attendees);
        }

        Ok(event)
    }

    /// ## Summary
    /// Projects an event onto its recognized fields and back, dropping every
    /// other property.
    ///
    /// ## Errors
    /// Returns `InvalidTimestamp` if a stored date is not a valid ISO 8601 value.
    pub fn simplified(&self) -> DateResult<Self> {
        Self::from_event_json(&self.to_event_json())
    }
}
