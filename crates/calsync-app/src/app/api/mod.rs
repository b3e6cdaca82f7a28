mod calendar;

use salvo::Router;

use crate::config::Settings;

// Re-export route constants from core
pub use calsync_core::constants::{CALENDAR_ROUTE_COMPONENT, CALENDAR_ROUTE_PREFIX};

/// ## Summary
/// Constructs the router serving the canonical calendar under
/// `calendar.route`.
#[must_use]
pub fn routes(settings: &Settings) -> Router {
    calendar::routes(&settings.calendar.route)
}
