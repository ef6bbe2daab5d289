use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Document, Group, GroupRanking, JoinRequest, JoinRequestDetails, LeaderRequest,
    LeaderRequestDetails, NewDocument, NewGroup, NewPhase, NewSubmission, NewUser, Phase,
    PhaseUpdate, RequestStatus, Submission, User, UserRole,
};

/// Credential store seam. Every multi-row transition is a single method so an
/// implementation can apply it atomically.
///
/// Lookups return `Ok(None)` for a missing row; transitions that hit a
/// precondition return `DatabaseError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users

    /// Fails with `Conflict` when the email is taken (case-insensitive).
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// All users, or only those with `role`, oldest first.
    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, DatabaseError>;

    /// Sets the role. When `expected` is given the user must currently hold it,
    /// otherwise `Conflict`.
    async fn update_user_role(
        &self,
        id: Uuid,
        expected: Option<UserRole>,
        role: UserRole,
        approved_by: Option<Uuid>,
    ) -> Result<Option<User>, DatabaseError>;

    async fn list_group_members(&self, group_id: Uuid) -> Result<Vec<User>, DatabaseError>;

    /// Clears `group_id` if the user is currently in `group_id`. Returns whether a row changed.
    async fn leave_group(&self, user_id: Uuid, group_id: Uuid) -> Result<bool, DatabaseError>;

    // Leader requests

    /// Inserts a pending request and flags the user. `Conflict` if one is already pending.
    async fn create_leader_request(&self, user_id: Uuid) -> Result<LeaderRequest, DatabaseError>;

    async fn list_leader_requests(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<LeaderRequestDetails>, DatabaseError>;

    /// Records the review. Approval promotes the user to leader and requires a
    /// student (or an already promoted leader).
    async fn resolve_leader_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
    ) -> Result<Option<LeaderRequest>, DatabaseError>;

    // Groups

    /// Inserts the group and assigns the leader to it. `Conflict` if the leader
    /// already owns or belongs to a group; `NotFound` if the leader is missing.
    async fn create_group(&self, group: NewGroup) -> Result<Group, DatabaseError>;

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError>;

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError>;

    async fn approve_group(&self, id: Uuid, approved_by: Uuid)
        -> Result<Option<Group>, DatabaseError>;

    // Join requests

    /// `Conflict` on a duplicate pending request for the same group.
    async fn create_join_request(
        &self,
        student_id: Uuid,
        group_id: Uuid,
    ) -> Result<JoinRequest, DatabaseError>;

    /// Requests for a group with the given status, newest first.
    async fn list_join_requests(
        &self,
        group_id: Uuid,
        status: RequestStatus,
    ) -> Result<Vec<JoinRequestDetails>, DatabaseError>;

    /// Sets the status of a request belonging to `group_id`; approval also
    /// assigns the student to the group. `Ok(None)` if the request is not in
    /// that group, `Conflict` if the student already belongs to another group.
    async fn respond_join_request(
        &self,
        group_id: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<JoinRequest>, DatabaseError>;

    // Phases

    /// Ordered by `order_num`.
    async fn list_phases(&self) -> Result<Vec<Phase>, DatabaseError>;

    async fn find_phase(&self, id: Uuid) -> Result<Option<Phase>, DatabaseError>;

    /// `Conflict` on a duplicate `order_num`.
    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, DatabaseError>;

    /// Activating deactivates every other phase in the same transaction.
    async fn update_phase_state(
        &self,
        id: Uuid,
        update: PhaseUpdate,
    ) -> Result<Option<Phase>, DatabaseError>;

    // Submissions

    async fn insert_submission(&self, submission: NewSubmission)
        -> Result<Submission, DatabaseError>;

    /// Every submission, or one group's, newest first.
    async fn list_submissions(
        &self,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Submission>, DatabaseError>;

    async fn grade_submission(
        &self,
        id: Uuid,
        grade: f64,
        feedback: &str,
        graded_by: Uuid,
    ) -> Result<Option<Submission>, DatabaseError>;

    /// Groups with at least one graded submission, best average first.
    async fn group_rankings(&self) -> Result<Vec<GroupRanking>, DatabaseError>;

    // Documents

    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError>;

    async fn list_documents(&self, phase_id: Option<Uuid>) -> Result<Vec<Document>, DatabaseError>;
}
