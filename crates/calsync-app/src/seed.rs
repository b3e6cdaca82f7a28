//! Startup events loaded from a JSON file.

use anyhow::Context;

use calsync_rfc::rfc::ical::core::EventJson;
use calsync_service::sync::CalendarSync;

use crate::error::AppResult;

/// ## Summary
/// Reads a JSON array of structured events.
///
/// ## Errors
/// Returns an error if the file cannot be read or is not a JSON array of
/// events.
#[tracing::instrument]
pub async fn load_seed_events(path: &str) -> anyhow::Result<Vec<EventJson>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {path}"))?;

    serde_json::from_str(&content).with_context(|| format!("failed to parse seed file {path}"))
}

/// ## Summary
/// Adds `events` to the calendar in order, notifying its observers.
///
/// ## Errors
/// Returns an error if an event has an unparsable date; events before it
/// remain added.
pub fn seed_calendar(sync: &mut CalendarSync, events: &[EventJson]) -> AppResult<()> {
    for event in events {
        sync.add_event(event)?;
    }
    tracing::info!(count = events.len(), "Seeded calendar");
    Ok(())
}
