use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::RequestStatus;

/// Account role. Stored as the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Pending,
    Student,
    Leader,
    Coordinator,
    Superadmin,
    Inactive,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Pending => "pending",
            UserRole::Student => "student",
            UserRole::Leader => "leader",
            UserRole::Coordinator => "coordinator",
            UserRole::Superadmin => "superadmin",
            UserRole::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(UserRole::Pending),
            "student" => Ok(UserRole::Student),
            "leader" => Ok(UserRole::Leader),
            "coordinator" => Ok(UserRole::Coordinator),
            "superadmin" => Ok(UserRole::Superadmin),
            "inactive" => Ok(UserRole::Inactive),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub group_id: Option<Uuid>,
    pub course_id: Option<String>,
    pub period_semester: Option<String>,
    pub leader_request_status: Option<RequestStatus>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub course_id: Option<String>,
    pub period_semester: Option<String>,
}
