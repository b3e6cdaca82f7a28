//! PUT handler replacing the canonical calendar.

use salvo::http::StatusCode;
use salvo::http::header::CONTENT_LENGTH;
use salvo::{Depot, Request, Response, handler};

use crate::config::get_config_from_depot;
use crate::middleware::calendar::get_calendar_from_depot;

/// ## Summary
/// Parses the request body as a full replacement calendar and merges it into
/// the canonical calendar.
///
/// ## Side Effects
/// - Takes the calendar write lock for the merge
/// - Notifies calendar observers of added, updated and removed events
/// - Returns 204 No Content on success
///
/// ## Errors
/// Returns 400 for malformed or non-UTF-8 bodies and documents that are not
/// a calendar, 413 for oversized bodies, 500 when request state is missing.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling PUT request for calendar");

    let (settings, store) = match (get_config_from_depot(depot), get_calendar_from_depot(depot)) {
        (Ok(settings), Ok(store)) => (settings, store),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Request state not available");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let max_body_bytes = settings.calendar.max_body_bytes;
    let declared_len = req.header::<usize>(CONTENT_LENGTH);
    if declared_len.is_some_and(|len| len > max_body_bytes) {
        tracing::warn!(?declared_len, max_body_bytes, "Request body too large");
        res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
        return;
    }

    let body = match req.payload_with_max_size(max_body_bytes).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!(error = %e, max_body_bytes, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let Ok(text) = String::from_utf8(body) else {
        tracing::warn!("Request body is not valid UTF-8");
        res.status_code(StatusCode::BAD_REQUEST);
        res.render("Request body is not valid UTF-8");
        return;
    };

    let result = store.write().await.apply_text(&text);
    match result {
        Ok(changes) => {
            tracing::info!(changes = changes.len(), "Calendar replaced");
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected calendar");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(e.to_string());
        }
    }
}
