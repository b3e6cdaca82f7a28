//! Observers attached to the canonical calendar by the server.

use calsync_service::sync::EventChange;

/// Logs every change with the event in its structured JSON form.
pub fn log_change(change: &EventChange) {
    match serde_json::to_string(&change.to_json()) {
        Ok(event) => tracing::info!(kind = %change.kind, %event, "Calendar event changed"),
        Err(e) => tracing::warn!(kind = %change.kind, error = %e, "Failed to render event change"),
    }
}
