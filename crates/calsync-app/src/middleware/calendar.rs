use std::sync::Arc;

use salvo::async_trait;
use tokio::sync::RwLock;

use calsync_core::error::CoreError;
use calsync_service::sync::CalendarSync;

use crate::error::AppResult;

/// The canonical calendar shared by all requests.
///
/// Reads (GET) take the read lock; merges (PUT) take the write lock, so at
/// most one merge runs at a time and readers never see a partial merge.
pub type SharedCalendar = Arc<RwLock<CalendarSync>>;

/// Injects the shared calendar into the depot.
pub struct CalendarHandler {
    pub store: SharedCalendar,
}

#[async_trait]
impl salvo::Handler for CalendarHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the shared calendar from the depot.
///
/// ## Errors
/// Returns an error if the calendar is not found in the depot.
pub fn get_calendar_from_depot(depot: &salvo::Depot) -> AppResult<SharedCalendar> {
    depot
        .obtain::<SharedCalendar>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Calendar not found in depot").into())
}
