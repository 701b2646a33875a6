pub mod get;
pub mod messages;
pub mod post;

use axum::Router;
use axum::routing::{get, post};

use crate::axumstate::AxumState;

pub use get::get_heartbeat;
pub use post::post_invoke;

/// Routes of the HTTP front end
pub fn router(state: AxumState) -> Router {
    Router::new()
        // GET endpoints
        .route("/heartbeat", get(get_heartbeat))
        // POST endpoints
        .route("/invoke/{method}", post(post_invoke))
        // Give the routers access to the application state
        .with_state(state)
}
