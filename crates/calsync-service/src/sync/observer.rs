//! Change notifications emitted by a merge.

use calsync_rfc::rfc::ical::core::{Component, EventJson};
use serde::Serialize;

/// What happened to an event during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "event:added"),
            Self::Updated => write!(f, "event:updated"),
            Self::Removed => write!(f, "event:removed"),
        }
    }
}

/// A single event change.
///
/// For additions and updates `event` is the event as stored in the canonical
/// calendar; for removals it is the event that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChange {
    pub kind: ChangeKind,
    pub event: Component,
}

/// JSON shape of a change, as handed to logs and external observers.
#[derive(Debug, Serialize)]
pub struct EventChangeJson {
    pub change: ChangeKind,
    pub event: EventJson,
}

impl EventChange {
    #[must_use]
    pub fn new(kind: ChangeKind, event: Component) -> Self {
        Self { kind, event }
    }

    /// Returns the change with the event in its structured representation.
    #[must_use]
    pub fn to_json(&self) -> EventChangeJson {
        EventChangeJson {
            change: self.kind,
            event: self.event.to_event_json(),
        }
    }
}

/// Receives change notifications after a merge has been installed.
///
/// Observers run synchronously on the merging thread. A panicking observer is
/// logged and skipped.
pub trait EventObserver: Send + Sync {
    fn on_change(&self, change: &EventChange);
}

impl<F> EventObserver for F
where
    F: Fn(&EventChange) + Send + Sync,
{
    fn on_change(&self, change: &EventChange) {
        self(change);
    }
}
