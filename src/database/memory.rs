use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Document, Group, GroupRanking, JoinRequest, JoinRequestDetails, LeaderRequest,
    LeaderRequestDetails, NewDocument, NewGroup, NewPhase, NewSubmission, NewUser, Phase,
    PhaseUpdate, RequestStatus, Submission, User, UserRole,
};
use super::store::Store;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    join_requests: HashMap<Uuid, JoinRequest>,
    leader_requests: HashMap<Uuid, LeaderRequest>,
    phases: HashMap<Uuid, Phase>,
    submissions: HashMap<Uuid, Submission>,
    documents: HashMap<Uuid, Document>,
}

/// Process-local `Store`. Every call runs under one write (or read) guard, so
/// multi-row transitions are atomic just like their Postgres counterparts.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut t = self.tables.write().await;

        let email = user.email.trim().to_string();
        if t.users.values().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(DatabaseError::Conflict("Email already registered".to_string()));
        }

        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email,
            password_hash: user.password_hash,
            role: user.role,
            group_id: None,
            course_id: user.course_id,
            period_semester: user.period_semester,
            leader_request_status: None,
            approved_by: None,
            created_at: Utc::now(),
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let email = email.trim();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, DatabaseError> {
        let t = self.tables.read().await;
        let rows = t
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |u: &User| u.created_at))
    }

    async fn update_user_role(
        &self,
        id: Uuid,
        expected: Option<UserRole>,
        role: UserRole,
        approved_by: Option<Uuid>,
    ) -> Result<Option<User>, DatabaseError> {
        let mut t = self.tables.write().await;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(expected) = expected {
            if user.role != expected {
                return Err(DatabaseError::Conflict(format!(
                    "User is {}, expected {}",
                    user.role, expected
                )));
            }
        }

        user.role = role;
        if approved_by.is_some() {
            user.approved_by = approved_by;
        }
        Ok(Some(user.clone()))
    }

    async fn list_group_members(&self, group_id: Uuid) -> Result<Vec<User>, DatabaseError> {
        let t = self.tables.read().await;
        let rows = t
            .users
            .values()
            .filter(|u| u.group_id == Some(group_id))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |u: &User| u.created_at))
    }

    async fn leave_group(&self, user_id: Uuid, group_id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        match t.users.get_mut(&user_id) {
            Some(user) if user.group_id == Some(group_id) => {
                user.group_id = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_leader_request(&self, user_id: Uuid) -> Result<LeaderRequest, DatabaseError> {
        let mut t = self.tables.write().await;

        if !t.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        if t
            .leader_requests
            .values()
            .any(|r| r.user_id == user_id && r.status == RequestStatus::Pending)
        {
            return Err(DatabaseError::Conflict(
                "A leader request is already pending".to_string(),
            ));
        }

        let request = LeaderRequest {
            id: Uuid::new_v4(),
            user_id,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };
        t.leader_requests.insert(request.id, request.clone());
        if let Some(user) = t.users.get_mut(&user_id) {
            user.leader_request_status = Some(RequestStatus::Pending);
        }
        Ok(request)
    }

    async fn list_leader_requests(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<LeaderRequestDetails>, DatabaseError> {
        let t = self.tables.read().await;
        let rows = t
            .leader_requests
            .values()
            .filter(|r| r.status == status)
            .filter_map(|r| {
                let user = t.users.get(&r.user_id)?;
                Some(LeaderRequestDetails {
                    id: r.id,
                    user_id: r.user_id,
                    status: r.status,
                    requested_at: r.requested_at,
                    reviewed_at: r.reviewed_at,
                    reviewed_by: r.reviewed_by,
                    user_name: user.name.clone(),
                    user_email: user.email.clone(),
                })
            })
            .collect();
        Ok(sorted_by(rows, |r: &LeaderRequestDetails| r.requested_at))
    }

    async fn resolve_leader_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
    ) -> Result<Option<LeaderRequest>, DatabaseError> {
        let mut t = self.tables.write().await;

        let Some(current) = t.leader_requests.get(&id).cloned() else {
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
        let role = t
            .users
            .get(&user_id)
            .map(|u| u.role)
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;

        if status == RequestStatus::Approved
            && !matches!(role, UserRole::Student | UserRole::Leader)
        {
            return Err(DatabaseError::Conflict(format!(
                "Only students can be promoted to leader (user is {})",
                role
            )));
        }

        let request = t
            .leader_requests
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("Leader request not found".to_string()))?;
        request.status = status;
        request.reviewed_at = Some(Utc::now());
        request.reviewed_by = Some(reviewer);
        let updated = request.clone();

        if let Some(user) = t.users.get_mut(&user_id) {
            user.leader_request_status = Some(status);
            if status == RequestStatus::Approved {
                user.role = UserRole::Leader;
            }
        }
        Ok(Some(updated))
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, DatabaseError> {
        let mut t = self.tables.write().await;

        let leader = t
            .users
            .get(&group.leader_id)
            .ok_or_else(|| DatabaseError::NotFound("Leader not found".to_string()))?;

        if t.groups.values().any(|g| g.leader_id == group.leader_id) {
            return Err(DatabaseError::Conflict("Leader already owns a group".to_string()));
        }
        if leader.group_id.is_some() {
            return Err(DatabaseError::Conflict("Leader already belongs to a group".to_string()));
        }

        let row = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            leader_id: group.leader_id,
            course_id: group.course_id,
            period_semester: group.period_semester,
            created_at: Utc::now(),
            approved_at: None,
            approved_by: None,
        };
        t.groups.insert(row.id, row.clone());
        if let Some(leader) = t.users.get_mut(&group.leader_id) {
            leader.group_id = Some(row.id);
        }
        Ok(row)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, DatabaseError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let rows = self.tables.read().await.groups.values().cloned().collect();
        Ok(sorted_by(rows, |g: &Group| g.created_at))
    }

    async fn approve_group(
        &self,
        id: Uuid,
        approved_by: Uuid,
    ) -> Result<Option<Group>, DatabaseError> {
        let mut t = self.tables.write().await;
        Ok(t.groups.get_mut(&id).map(|g| {
            g.approved_at = Some(Utc::now());
            g.approved_by = Some(approved_by);
            g.clone()
        }))
    }

    async fn create_join_request(
        &self,
        student_id: Uuid,
        group_id: Uuid,
    ) -> Result<JoinRequest, DatabaseError> {
        let mut t = self.tables.write().await;

        if t.join_requests.values().any(|r| {
            r.student_id == student_id
                && r.group_id == group_id
                && r.status == RequestStatus::Pending
        }) {
            return Err(DatabaseError::Conflict(
                "A join request for this group is already pending".to_string(),
            ));
        }

        let now = Utc::now();
        let request = JoinRequest {
            id: Uuid::new_v4(),
            student_id,
            group_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.join_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_join_requests(
        &self,
        group_id: Uuid,
        status: RequestStatus,
    ) -> Result<Vec<JoinRequestDetails>, DatabaseError> {
        let t = self.tables.read().await;
        let mut rows: Vec<JoinRequestDetails> = t
            .join_requests
            .values()
            .filter(|r| r.group_id == group_id && r.status == status)
            .filter_map(|r| {
                let student = t.users.get(&r.student_id)?;
                Some(JoinRequestDetails {
                    id: r.id,
                    student_id: r.student_id,
                    group_id: r.group_id,
                    status: r.status,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                    student_name: student.name.clone(),
                    student_email: student.email.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn respond_join_request(
        &self,
        group_id: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<JoinRequest>, DatabaseError> {
        let mut t = self.tables.write().await;

        let student_id = match t.join_requests.get(&request_id) {
            Some(r) if r.group_id == group_id => r.student_id,
            _ => return Ok(None),
        };

        if status == RequestStatus::Approved {
            let student = t
                .users
                .get(&student_id)
                .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;
            if student.role != UserRole::Student {
                return Err(DatabaseError::Conflict(format!(
                    "Only students can join a group (user is {})",
                    student.role
                )));
            }
            if matches!(student.group_id, Some(other) if other != group_id) {
                return Err(DatabaseError::Conflict(
                    "Student already belongs to another group".to_string(),
                ));
            }
        }

        let request = t
            .join_requests
            .get_mut(&request_id)
            .ok_or_else(|| DatabaseError::NotFound("Join request not found".to_string()))?;
        request.status = status;
        request.updated_at = Utc::now();
        let updated = request.clone();

        if status == RequestStatus::Approved {
            if let Some(student) = t.users.get_mut(&student_id) {
                student.group_id = Some(group_id);
            }
        }
        Ok(Some(updated))
    }

    async fn list_phases(&self) -> Result<Vec<Phase>, DatabaseError> {
        let rows = self.tables.read().await.phases.values().cloned().collect();
        Ok(sorted_by(rows, |p: &Phase| p.order_num))
    }

    async fn find_phase(&self, id: Uuid) -> Result<Option<Phase>, DatabaseError> {
        Ok(self.tables.read().await.phases.get(&id).cloned())
    }

    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, DatabaseError> {
        let mut t = self.tables.write().await;

        if t.phases.values().any(|p| p.order_num == phase.order_num) {
            return Err(DatabaseError::Conflict(format!(
                "A phase with order {} already exists",
                phase.order_num
            )));
        }

        let row = Phase {
            id: Uuid::new_v4(),
            name: phase.name,
            description: phase.description,
            start_date: phase.start_date,
            end_date: phase.end_date,
            order_num: phase.order_num,
            is_active: false,
        };
        t.phases.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_phase_state(
        &self,
        id: Uuid,
        update: PhaseUpdate,
    ) -> Result<Option<Phase>, DatabaseError> {
        let mut t = self.tables.write().await;

        if !t.phases.contains_key(&id) {
            return Ok(None);
        }

        if update.is_active {
            for phase in t.phases.values_mut().filter(|p| p.id != id) {
                phase.is_active = false;
            }
        }

        let phase = t
            .phases
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("Phase not found".to_string()))?;
        phase.is_active = update.is_active;
        if update.start_date.is_some() {
            phase.start_date = update.start_date;
        }
        if update.end_date.is_some() {
            phase.end_date = update.end_date;
        }
        Ok(Some(phase.clone()))
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, DatabaseError> {
        let row = Submission {
            id: Uuid::new_v4(),
            group_id: submission.group_id,
            phase_id: submission.phase_id,
            file_url: submission.file_url,
            file_name: submission.file_name,
            submitted_by: submission.submitted_by,
            submitted_at: Utc::now(),
            grade: None,
            feedback: None,
            graded_by: None,
            graded_at: None,
        };
        self.tables
            .write()
            .await
            .submissions
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_submissions(
        &self,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Submission>, DatabaseError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Submission> = t
            .submissions
            .values()
            .filter(|s| group_id.map_or(true, |g| s.group_id == g))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }

    async fn grade_submission(
        &self,
        id: Uuid,
        grade: f64,
        feedback: &str,
        graded_by: Uuid,
    ) -> Result<Option<Submission>, DatabaseError> {
        let mut t = self.tables.write().await;
        Ok(t.submissions.get_mut(&id).map(|s| {
            s.grade = Some(grade);
            s.feedback = Some(feedback.to_string());
            s.graded_by = Some(graded_by);
            s.graded_at = Some(Utc::now());
            s.clone()
        }))
    }

    async fn group_rankings(&self) -> Result<Vec<GroupRanking>, DatabaseError> {
        let t = self.tables.read().await;

        let mut totals: HashMap<Uuid, (f64, i64)> = HashMap::new();
        for s in t.submissions.values() {
            if let Some(grade) = s.grade {
                let entry = totals.entry(s.group_id).or_insert((0.0, 0));
                entry.0 += grade;
                entry.1 += 1;
            }
        }

        let mut rows: Vec<GroupRanking> = totals
            .into_iter()
            .filter_map(|(group_id, (sum, count))| {
                let group = t.groups.get(&group_id)?;
                Some(GroupRanking {
                    group_id,
                    group_name: group.name.clone(),
                    average_grade: sum / count as f64,
                    graded_submissions: count,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.average_grade
                .total_cmp(&a.average_grade)
                .then_with(|| a.group_name.cmp(&b.group_name))
        });
        Ok(rows)
    }

    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError> {
        let row = Document {
            id: Uuid::new_v4(),
            phase_id: document.phase_id,
            leader_id: document.leader_id,
            group_id: document.group_id,
            file_name: document.file_name,
            file_url: document.file_url,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .documents
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_documents(&self, phase_id: Option<Uuid>) -> Result<Vec<Document>, DatabaseError> {
        let t = self.tables.read().await;
        let mut rows: Vec<Document> = t
            .documents
            .values()
            .filter(|d| phase_id.map_or(true, |p| d.phase_id == p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role,
            course_id: Some("ADS".into()),
            period_semester: Some("2024.1".into()),
        }
    }

    #[tokio::test]
    async fn email_uniqueness_ignores_case() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@x.com", UserRole::Pending)).await.unwrap();

        let err = store
            .insert_user(new_user("A@X.COM", UserRole::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(store.list_users(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activating_a_phase_deactivates_the_rest() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for order in 1..=3 {
            let phase = store
                .create_phase(NewPhase {
                    name: format!("Phase {}", order),
                    description: None,
                    start_date: None,
                    end_date: None,
                    order_num: order,
                })
                .await
                .unwrap();
            ids.push(phase.id);
        }

        let activate = PhaseUpdate { is_active: true, start_date: None, end_date: None };
        store.update_phase_state(ids[0], activate).await.unwrap();
        store.update_phase_state(ids[2], activate).await.unwrap();

        let active: Vec<_> = store
            .list_phases()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, ids[2]);
    }

    #[tokio::test]
    async fn approving_for_a_student_in_another_group_conflicts() {
        let store = MemoryStore::new();
        let leader_a = store.insert_user(new_user("la@x.com", UserRole::Leader)).await.unwrap();
        let leader_b = store.insert_user(new_user("lb@x.com", UserRole::Leader)).await.unwrap();
        let student = store.insert_user(new_user("s@x.com", UserRole::Student)).await.unwrap();

        let group = |leader: Uuid, name: &str| NewGroup {
            name: name.into(),
            description: None,
            leader_id: leader,
            course_id: None,
            period_semester: None,
        };
        let a = store.create_group(group(leader_a.id, "A")).await.unwrap();
        let b = store.create_group(group(leader_b.id, "B")).await.unwrap();

        let ra = store.create_join_request(student.id, a.id).await.unwrap();
        let rb = store.create_join_request(student.id, b.id).await.unwrap();

        store
            .respond_join_request(a.id, ra.id, RequestStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        let err = store
            .respond_join_request(b.id, rb.id, RequestStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));

        let student = store.find_user(student.id).await.unwrap().unwrap();
        assert_eq!(student.group_id, Some(a.id));
    }

    #[tokio::test]
    async fn request_from_another_group_is_not_found() {
        let store = MemoryStore::new();
        let leader = store.insert_user(new_user("l@x.com", UserRole::Leader)).await.unwrap();
        let student = store.insert_user(new_user("s@x.com", UserRole::Student)).await.unwrap();
        let group = store
            .create_group(NewGroup {
                name: "G".into(),
                description: None,
                leader_id: leader.id,
                course_id: None,
                period_semester: None,
            })
            .await
            .unwrap();
        let request = store.create_join_request(student.id, group.id).await.unwrap();

        let result = store
            .respond_join_request(Uuid::new_v4(), request.id, RequestStatus::Approved)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
