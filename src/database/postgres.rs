use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Document, Group, GroupRanking, JoinRequest, JoinRequestDetails, LeaderRequest,
    LeaderRequestDetails, NewDocument, NewGroup, NewPhase, NewSubmission, NewUser, Phase,
    PhaseUpdate, RequestStatus, Submission, User, UserRole,
};
use super::store::Store;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, group_id, course_id, \
     period_semester, leader_request_status, approved_by, created_at";

const GROUP_COLUMNS: &str = "id, name, description, leader_id, course_id, period_semester, \
     created_at, approved_at, approved_by";

const PHASE_COLUMNS: &str =
    "id, name, description, start_date, end_date, order_num, is_active";

const SUBMISSION_COLUMNS: &str = "id, group_id, phase_id, file_url, file_name, submitted_by, \
     submitted_at, grade, feedback, graded_by, graded_at";

/// `Store` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, course_id, period_semester) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.course_id)
            .bind(&user.period_semester)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::conflict_on_unique(e, "Email already registered"))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY created_at",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_user_role(
        &self,
        id: Uuid,
        expected: Option<UserRole>,
        role: UserRole,
        approved_by: Option<Uuid>,
    ) -> Result<Option<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(UserRole,)> =
            sqlx::query_as("SELECT role FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current,)) = current else {
            return Ok(None);
        };

        if let Some(expected) = expected {
            if current != expected {
                return Err(DatabaseError::Conflict(format!(
                    "User is {}, expected {}",
                    current, expected
                )));
            }
        }

        let sql = format!(
            "UPDATE users SET role = $2, approved_by = COALESCE($3, approved_by) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .bind(approved_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    async fn list_group_members(&self, group_id: Uuid) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE group_id = $1 ORDER BY created_at",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn leave_group(&self, user_id: Uuid, group_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET group_id = NULL WHERE id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_leader_request(&self, user_id: Uuid) -> Result<LeaderRequest, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, LeaderRequest>(
            "INSERT INTO leader_requests (id, user_id) VALUES ($1, $2) \
             RETURNING id, user_id, status, requested_at, reviewed_at, reviewed_by",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::conflict_on_unique(e, "A leader request is already pending"))?;

        sqlx::query("UPDATE users SET leader_request_status = $2 WHERE id = $1")
            .bind(user_id)
            .bind(RequestStatus::Pending)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn list_leader_requests(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<LeaderRequestDetails>, DatabaseError> {
        Ok(sqlx::query_as::<_, LeaderRequestDetails>(
            "SELECT lr.id, lr.user_id, lr.status, lr.requested_at, lr.reviewed_at, lr.reviewed_by, \
                    u.name AS user_name, u.email AS user_email \
             FROM leader_requests lr JOIN users u ON u.id = lr.user_id \
             WHERE lr.status = $1 ORDER BY lr.requested_at",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn resolve_leader_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
    ) -> Result<Option<LeaderRequest>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, LeaderRequest>(
            "SELECT id, user_id, status, requested_at, reviewed_at, reviewed_by \
             FROM leader_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        if current.status != RequestStatus::Pending {
            if current.status == status {
                return Ok(Some(current));
            }
            return Err(DatabaseError::Conflict(format!(
                "Leader request already {}",
                current.status.as_str()
            )));
        }
        let user_id = current.user_id;

        let (role,): (UserRole,) = sqlx::query_as("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        if status == RequestStatus::Approved
            && !matches!(role, UserRole::Student | UserRole::Leader)
        {
            return Err(DatabaseError::Conflict(format!(
                "Only students can be promoted to leader (user is {})",
                role
            )));
        }

        let updated = sqlx::query_as::<_, LeaderRequest>(
            "UPDATE leader_requests SET status = $2, reviewed_at = now(), reviewed_by = $3 \
             WHERE id = $1 \
             RETURNING id, user_id, status, requested_at, reviewed_at, reviewed_by",
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .fetch_one(&mut *tx)
        .await?;

        let promoted = if status == RequestStatus::Approved {
            UserRole::Leader
        } else {
            role
        };
        sqlx::query("UPDATE users SET leader_request_status = $2, role = $3 WHERE id = $1")
            .bind(user_id)
            .bind(status)
            .bind(promoted)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let leader: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT group_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(group.leader_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current_group,)) = leader else {
            return Err(DatabaseError::NotFound("Leader not found".to_string()));
        };

        let owned: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM groups WHERE leader_id = $1")
            .bind(group.leader_id)
            .fetch_optional(&mut *tx)
            .await?;

        if owned.is_some() {
            return Err(DatabaseError::Conflict("Leader already owns a group".to_string()));
        }
        if current_group.is_some() {
            return Err(DatabaseError::Conflict("Leader already belongs to a group".to_string()));
        }

        let sql = format!(
            "INSERT INTO groups (id, name, description, leader_id, course_id, period_semester) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            GROUP_COLUMNS
        );
        let created = sqlx::query_as::<_, Group>(&sql)
            .bind(Uuid::new_v4())
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.leader_id)
            .bind(&group.course_id)
            .bind(&group.period_semester)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::conflict_on_unique(e, "Leader already owns a group"))?;

        sqlx::query("UPDATE users SET group_id = $1 WHERE id = $2")
            .bind(created.id)
            .bind(group.leader_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError> {
        let sql = format!("SELECT {} FROM groups WHERE id = $1", GROUP_COLUMNS);
        Ok(sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let sql = format!("SELECT {} FROM groups ORDER BY created_at", GROUP_COLUMNS);
        Ok(sqlx::query_as::<_, Group>(&sql).fetch_all(&self.pool).await?)
    }

    async fn approve_group(
        &self,
        id: Uuid,
        approved_by: Uuid,
    ) -> Result<Option<Group>, DatabaseError> {
        let sql = format!(
            "UPDATE groups SET approved_at = now(), approved_by = $2 WHERE id = $1 RETURNING {}",
            GROUP_COLUMNS
        );
        Ok(sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .bind(approved_by)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_join_request(
        &self,
        student_id: Uuid,
        group_id: Uuid,
    ) -> Result<JoinRequest, DatabaseError> {
        sqlx::query_as::<_, JoinRequest>(
            "INSERT INTO join_requests (id, student_id, group_id) VALUES ($1, $2, $3) \
             RETURNING id, student_id, group_id, status, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::conflict_on_unique(e, "A join request for this group is already pending")
        })
    }

    async fn list_join_requests(
        &self,
        group_id: Uuid,
        status: RequestStatus,
    ) -> Result<Vec<JoinRequestDetails>, DatabaseError> {
        Ok(sqlx::query_as::<_, JoinRequestDetails>(
            "SELECT jr.id, jr.student_id, jr.group_id, jr.status, jr.created_at, jr.updated_at, \
                    u.name AS student_name, u.email AS student_email \
             FROM join_requests jr JOIN users u ON u.id = jr.student_id \
             WHERE jr.group_id = $1 AND jr.status = $2 \
             ORDER BY jr.created_at DESC",
        )
        .bind(group_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn respond_join_request(
        &self,
        group_id: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<JoinRequest>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let request: Option<(Uuid,)> = sqlx::query_as(
            "SELECT student_id FROM join_requests WHERE id = $1 AND group_id = $2 FOR UPDATE",
        )
        .bind(request_id)
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((student_id,)) = request else {
            return Ok(None);
        };

        if status == RequestStatus::Approved {
            let (current, role): (Option<Uuid>, UserRole) =
                sqlx::query_as("SELECT group_id, role FROM users WHERE id = $1 FOR UPDATE")
                    .bind(student_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if role != UserRole::Student {
                return Err(DatabaseError::Conflict(format!(
                    "Only students can join a group (user is {})",
                    role
                )));
            }
            if matches!(current, Some(other) if other != group_id) {
                return Err(DatabaseError::Conflict(
                    "Student already belongs to another group".to_string(),
                ));
            }
        }

        let updated = sqlx::query_as::<_, JoinRequest>(
            "UPDATE join_requests SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, student_id, group_id, status, created_at, updated_at",
        )
        .bind(request_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        if status == RequestStatus::Approved {
            sqlx::query("UPDATE users SET group_id = $1 WHERE id = $2")
                .bind(group_id)
                .bind(student_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn list_phases(&self) -> Result<Vec<Phase>, DatabaseError> {
        let sql = format!("SELECT {} FROM phases ORDER BY order_num", PHASE_COLUMNS);
        Ok(sqlx::query_as::<_, Phase>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_phase(&self, id: Uuid) -> Result<Option<Phase>, DatabaseError> {
        let sql = format!("SELECT {} FROM phases WHERE id = $1", PHASE_COLUMNS);
        Ok(sqlx::query_as::<_, Phase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, DatabaseError> {
        let sql = format!(
            "INSERT INTO phases (id, name, description, start_date, end_date, order_num) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PHASE_COLUMNS
        );
        sqlx::query_as::<_, Phase>(&sql)
            .bind(Uuid::new_v4())
            .bind(&phase.name)
            .bind(&phase.description)
            .bind(phase.start_date)
            .bind(phase.end_date)
            .bind(phase.order_num)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::conflict_on_unique(
                    e,
                    format!("A phase with order {} already exists", phase.order_num),
                )
            })
    }

    async fn update_phase_state(
        &self,
        id: Uuid,
        update: PhaseUpdate,
    ) -> Result<Option<Phase>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent activations; readers are not blocked.
        sqlx::query("LOCK TABLE phases IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM phases WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        if update.is_active {
            sqlx::query("UPDATE phases SET is_active = false WHERE is_active AND id <> $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            "UPDATE phases SET is_active = $2, \
                 start_date = COALESCE($3, start_date), \
                 end_date = COALESCE($4, end_date) \
             WHERE id = $1 RETURNING {}",
            PHASE_COLUMNS
        );
        let phase = sqlx::query_as::<_, Phase>(&sql)
            .bind(id)
            .bind(update.is_active)
            .bind(update.start_date)
            .bind(update.end_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(phase))
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, DatabaseError> {
        let sql = format!(
            "INSERT INTO submissions (id, group_id, phase_id, file_url, file_name, submitted_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(Uuid::new_v4())
            .bind(submission.group_id)
            .bind(submission.phase_id)
            .bind(&submission.file_url)
            .bind(&submission.file_name)
            .bind(submission.submitted_by)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_submissions(
        &self,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Submission>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM submissions WHERE ($1::uuid IS NULL OR group_id = $1) \
             ORDER BY submitted_at DESC",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn grade_submission(
        &self,
        id: Uuid,
        grade: f64,
        feedback: &str,
        graded_by: Uuid,
    ) -> Result<Option<Submission>, DatabaseError> {
        let sql = format!(
            "UPDATE submissions SET grade = $2, feedback = $3, graded_by = $4, graded_at = now() \
             WHERE id = $1 RETURNING {}",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(grade)
            .bind(feedback)
            .bind(graded_by)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn group_rankings(&self) -> Result<Vec<GroupRanking>, DatabaseError> {
        Ok(sqlx::query_as::<_, GroupRanking>(
            "SELECT g.id AS group_id, g.name AS group_name, \
                    AVG(s.grade) AS average_grade, COUNT(s.grade) AS graded_submissions \
             FROM groups g JOIN submissions s ON s.group_id = g.id \
             WHERE s.grade IS NOT NULL \
             GROUP BY g.id, g.name \
             ORDER BY average_grade DESC, g.name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError> {
        Ok(sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, phase_id, leader_id, group_id, file_name, file_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, phase_id, leader_id, group_id, file_name, file_url, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(document.phase_id)
        .bind(document.leader_id)
        .bind(document.group_id)
        .bind(&document.file_name)
        .bind(&document.file_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_documents(&self, phase_id: Option<Uuid>) -> Result<Vec<Document>, DatabaseError> {
        Ok(sqlx::query_as::<_, Document>(
            "SELECT id, phase_id, leader_id, group_id, file_name, file_url, created_at \
             FROM documents WHERE ($1::uuid IS NULL OR phase_id = $1) \
             ORDER BY created_at DESC",
        )
        .bind(phase_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
