use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub group_id: Uuid,
    pub phase_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_by: Option<Uuid>,
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub group_id: Uuid,
    pub phase_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub submitted_by: Uuid,
}
