use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub phase_id: Uuid,
    pub leader_id: Uuid,
    pub group_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub phase_id: Uuid,
    pub leader_id: Uuid,
    pub group_id: Uuid,
    pub file_name: String,
    pub file_url: String,
}
