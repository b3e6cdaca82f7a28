//! VCALENDAR helpers: the event view and calendar-wide date normalization.

use super::component::Component;
use super::event::DATE_PROPERTIES;
use super::names;
use super::property::Attributes;
use crate::rfc::ical::date::{self, DateResult};

impl Component {
    /// Creates a VCALENDAR with VERSION and PRODID set.
    #[must_use]
    pub fn new_calendar(prodid: &str) -> Self {
        let mut calendar = Self::calendar();
        calendar.properties.add(names::VERSION, "2.0", Attributes::new());
        calendar.properties.add(names::PRODID, prodid, Attributes::new());
        calendar
    }

    /// Returns the event children, in order.
    pub fn events(&self) -> impl Iterator<Item = &Component> {
        self.children.iter().filter(|child| child.is_event())
    }

    /// Returns the event with the given UID.
    #[must_use]
    pub fn find_event(&self, uid: &str) -> Option<&Component> {
        self.events().find(|event| event.uid() == Some(uid))
    }

    /// ## Summary
    /// Folds every timezone-qualified event date into UTC.
    ///
    /// Each DTSTART/DTEND entry that still carries a `TZID` attribute is
    /// re-derived with [`date::from_iso_with_zone`] and the attribute is
    /// removed. Entries already holding an instant keep it.
    ///
    /// The calendar-level `X-WR-TIMEZONE` declaration is dropped without being
    /// applied: floating event times were read as UTC when they were added,
    /// and are not shifted into the declared zone afterwards.
    ///
    /// ## Errors
    /// Returns a `DateError` for an unparsable date or unknown timezone. The
    /// calendar may be partially normalized when this fails.
    #[tracing::instrument(skip_all)]
    pub fn normalize(&mut self) -> DateResult<()> {
        if let Some(default_tz) = self.properties.remove_all(names::X_WR_TIMEZONE).first() {
            tracing::debug!(tzid = %default_tz.value, "Consumed calendar default timezone");
        }

        for event in self.children.iter_mut().filter(|child| child.is_event()) {
            for (name, values) in event.properties.iter_mut() {
                if !DATE_PROPERTIES.contains(&name) {
                    continue;
                }
                for entry in values.iter_mut() {
                    if let Some(tzid) = entry.attributes.remove(names::TZID) {
                        let instant = date::from_iso_with_zone(&entry.value, Some(&tzid))?;
                        entry.value = date::to_iso(&instant);
                    }
                }
            }
        }

        Ok(())
    }
}
