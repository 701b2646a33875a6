use axum::Json;

use crate::axumstate::AxumState;
use crate::config::NAMESPACE;
use crate::http::messages::HeartbeatMessage;

/// Return a heartbeat message
#[axum::debug_handler]
pub async fn get_heartbeat(_state: axum::extract::State<AxumState>) -> Json<HeartbeatMessage> {
    Json(HeartbeatMessage::new(NAMESPACE))
}
