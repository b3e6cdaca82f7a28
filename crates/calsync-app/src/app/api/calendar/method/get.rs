//! GET handler for the canonical calendar.

use salvo::http::header::CONTENT_TYPE;
use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};

use calsync_core::constants::TEXT_CALENDAR_UTF8_CONTENT_TYPE;

use crate::middleware::calendar::get_calendar_from_depot;

/// ## Summary
/// Serves the canonical calendar as iCalendar text.
///
/// ## Side Effects
/// - Takes the calendar read lock while serializing
///
/// ## Errors
/// Returns 500 if the calendar is missing from the depot or cannot be
/// serialized.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    let store = match get_calendar_from_depot(depot) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Calendar not available");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let text = store.read().await.to_text();
    match text {
        Ok(text) => {
            tracing::debug!(len = text.len(), "Serving calendar");
            res.status_code(StatusCode::OK);
            let _ = res.add_header(
                CONTENT_TYPE,
                HeaderValue::from_static(TEXT_CALENDAR_UTF8_CONTENT_TYPE),
                true,
            );
            let _ = res.write_body(text);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize calendar");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
