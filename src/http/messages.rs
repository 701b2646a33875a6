use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatMessage {
    pub status: String,
    pub namespace: String,
    pub timestamp: DateTime<Utc>,
}

impl HeartbeatMessage {
    pub fn new(namespace: &str) -> Self {
        Self {
            status: "alive".to_string(),
            namespace: namespace.to_string(),
            timestamp: Utc::now(),
        }
    }
}
