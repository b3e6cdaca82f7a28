// Canonical calendar handlers.

use salvo::Router;

pub mod method;

/// GET and PUT on the calendar path; other methods fall through unrouted.
pub fn routes(route: &str) -> Router {
    Router::with_path(route)
        .get(method::get::get)
        .put(method::put::put)
}
