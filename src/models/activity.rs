use serde::{Deserialize, Serialize};

/// One human-readable entry in the clinic activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: i64,
    pub timestamp: String,
    pub actor_id: String,
    pub actor_name: String,
    pub action: String,
    pub appointment_id: Option<String>,
    pub message: String,
}
