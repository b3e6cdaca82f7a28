//! The canonical calendar and its merge algorithm.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use calsync_core::config::CalendarConfig;
use calsync_core::constants::DEFAULT_PRODID;
use calsync_rfc::rfc::ical::build::serialize;
use calsync_rfc::rfc::ical::core::{Component, ComponentRegistry, EventJson};
use calsync_rfc::rfc::ical::parse::{ParseOptions, parse_with};

use super::observer::{ChangeKind, EventChange, EventObserver};
use crate::error::{ServiceError, ServiceResult};

/// Owns the canonical calendar and notifies observers about event changes.
///
/// Writes take `&mut self`; callers sharing an instance serialize them (the
/// HTTP layer holds it behind a `RwLock`).
pub struct CalendarSync {
    calendar: Component,
    clean_events: bool,
    registry: ComponentRegistry,
    parse_options: ParseOptions,
    observers: Vec<Box<dyn EventObserver>>,
}

impl std::fmt::Debug for CalendarSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarSync")
            .field("events", &self.calendar.events().count())
            .field("clean_events", &self.clean_events)
            .field("parse_options", &self.parse_options)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for CalendarSync {
    fn default() -> Self {
        Self::new(Component::new_calendar(DEFAULT_PRODID))
    }
}

impl CalendarSync {
    /// Wraps `calendar` with cleaning enabled and lenient parsing.
    #[must_use]
    pub fn new(calendar: Component) -> Self {
        Self {
            calendar,
            clean_events: true,
            registry: ComponentRegistry::default(),
            parse_options: ParseOptions::default(),
            observers: Vec::new(),
        }
    }

    /// Creates an empty calendar configured from the `calendar` settings.
    #[must_use]
    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::default()
            .with_clean_events(config.clean_events)
            .with_parse_options(ParseOptions {
                strict: config.strict_parsing,
            })
    }

    /// Stores simplified events instead of parsed ones when enabled.
    #[must_use]
    pub fn with_clean_events(mut self, clean_events: bool) -> Self {
        self.clean_events = clean_events;
        self
    }

    #[must_use]
    pub fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers an observer for subsequent changes.
    pub fn subscribe(&mut self, observer: impl EventObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn calendar(&self) -> &Component {
        &self.calendar
    }

    /// Iterates the canonical events in order.
    pub fn events(&self) -> impl Iterator<Item = &Component> {
        self.calendar.events()
    }

    /// Serializes the canonical calendar.
    ///
    /// ## Errors
    /// Returns an error if a stored event date cannot be formatted.
    pub fn to_text(&self) -> ServiceResult<String> {
        Ok(serialize(&self.calendar)?)
    }

    /// ## Summary
    /// Builds an event from its structured representation and appends it.
    ///
    /// ## Errors
    /// Returns an error if a start or end date cannot be parsed.
    #[tracing::instrument(skip_all, fields(id = ?json.id))]
    pub fn add_event(&mut self, json: &EventJson) -> ServiceResult<EventChange> {
        let event = Component::from_event_json(json)?;
        self.calendar.add_child(event.clone());

        let change = EventChange::new(ChangeKind::Added, event);
        tracing::info!(uid = ?change.event.uid(), "Event added");
        self.notify(std::slice::from_ref(&change));
        Ok(change)
    }

    /// ## Summary
    /// Parses, normalizes and merges a full replacement document.
    ///
    /// ## Errors
    /// Returns `EmptyDocument` when the body has no component, a parse or
    /// date error for malformed input, or `InvalidDocument` when the root is
    /// not a calendar. The canonical calendar is unchanged on error.
    #[tracing::instrument(skip_all, fields(body_len = body.len()))]
    pub fn apply_text(&mut self, body: &str) -> ServiceResult<Vec<EventChange>> {
        let Some(mut incoming) = parse_with(body, &self.registry, self.parse_options)? else {
            tracing::warn!("Rejected document without components");
            return Err(ServiceError::EmptyDocument);
        };

        Self::ensure_calendar(&incoming)?;
        incoming.normalize()?;
        self.merge(incoming)
    }

    /// ## Summary
    /// Reconciles `incoming` into the canonical calendar.
    ///
    /// Calendar properties are replaced wholesale and the children are
    /// replaced by the incoming ones. Events are matched by UID: unmatched
    /// incoming events are added, matched ones whose simplified views differ
    /// are updated, and canonical events absent from `incoming` are removed.
    /// A matched event keeps the canonical external id.
    ///
    /// The new state is built aside and installed in one step; observers are
    /// notified afterwards, in order.
    ///
    /// ## Errors
    /// Returns `InvalidDocument` for a non-calendar root, or a date error when
    /// an event cannot be simplified. The canonical calendar is unchanged on
    /// error.
    #[tracing::instrument(skip_all, fields(children = incoming.children.len()))]
    pub fn merge(&mut self, incoming: Component) -> ServiceResult<Vec<EventChange>> {
        Self::ensure_calendar(&incoming)?;

        let Component {
            properties,
            children: incoming_children,
            ..
        } = incoming;

        let mut old_by_uid = IndexByUid::new(&self.calendar);
        let mut changes = Vec::new();
        let mut children = Vec::with_capacity(incoming_children.len());

        for mut child in incoming_children {
            if !child.is_event() {
                children.push(child);
                continue;
            }

            let uid = match child.uid() {
                Some(uid) => uid.to_string(),
                None => {
                    let uid = uuid::Uuid::new_v4().to_string();
                    tracing::warn!(%uid, "Assigned UID to incoming event");
                    child.set_uid(uid.clone());
                    uid
                }
            };

            let old = old_by_uid.take(&uid);
            if let Some(old) = old {
                child.external_id.clone_from(&old.external_id);
            }

            let simplified = child.simplified()?;
            let kind = match old {
                None => Some(ChangeKind::Added),
                Some(old) => (old.simplified()? != simplified).then_some(ChangeKind::Updated),
            };

            let stored = if self.clean_events { simplified } else { child };
            if let Some(kind) = kind {
                changes.push(EventChange::new(kind, stored.clone()));
            }
            children.push(stored);
        }

        changes.extend(
            old_by_uid
                .into_remaining()
                .map(|event| EventChange::new(ChangeKind::Removed, event.clone())),
        );

        self.calendar.properties = properties;
        self.calendar.children = children;

        tracing::info!(
            events = self.calendar.events().count(),
            changes = changes.len(),
            "Calendar merged"
        );

        self.notify(&changes);
        Ok(changes)
    }

    fn ensure_calendar(component: &Component) -> ServiceResult<()> {
        if component.is_calendar() {
            Ok(())
        } else {
            Err(ServiceError::InvalidDocument(format!(
                "expected VCALENDAR, got {}",
                component.name
            )))
        }
    }

    fn notify(&self, changes: &[EventChange]) {
        for change in changes {
            tracing::debug!(kind = %change.kind, uid = ?change.event.uid(), "Notifying observers");
            for observer in &self.observers {
                if catch_unwind(AssertUnwindSafe(|| observer.on_change(change))).is_err() {
                    tracing::error!(kind = %change.kind, "Observer panicked");
                }
            }
        }
    }
}

/// Canonical events keyed by UID, in canonical order.
///
/// A duplicate UID keeps the position of its first occurrence and the later
/// event.
struct IndexByUid<'a> {
    slots: Vec<Option<&'a Component>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> IndexByUid<'a> {
    fn new(calendar: &'a Component) -> Self {
        let mut slots = Vec::new();
        let mut positions = HashMap::new();

        for event in calendar.events() {
            let Some(uid) = event.uid() else {
                tracing::warn!("Canonical event without UID cannot be matched");
                continue;
            };
            match positions.get(uid) {
                Some(&pos) => slots[pos] = Some(event),
                None => {
                    positions.insert(uid, slots.len());
                    slots.push(Some(event));
                }
            }
        }

        Self { slots, positions }
    }

    fn take(&mut self, uid: &str) -> Option<&'a Component> {
        let pos = *self.positions.get(uid)?;
        self.slots[pos].take()
    }

    fn into_remaining(self) -> impl Iterator<Item = &'a Component> {
        self.slots.into_iter().flatten()
    }
}
