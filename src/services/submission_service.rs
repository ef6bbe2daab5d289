use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{owned_group, store_upload, UploadForm};
use crate::database::models::{GroupRanking, NewSubmission, Submission, UserRole};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GradeRequest {
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

/// Stores the file, then records the submission for the caller's group.
pub async fn submit(
    state: &AppState,
    caller: &AuthUser,
    form: UploadForm,
) -> Result<Submission, ApiError> {
    let group_id = owned_group(state, caller).await?;
    let folder = &state.config.storage.submissions_folder;
    let (phase_id, file_name, stored) = store_upload(state, folder, form).await?;

    let submission = state
        .store
        .insert_submission(NewSubmission {
            group_id,
            phase_id,
            file_url: stored.url,
            file_name,
            submitted_by: caller.id,
        })
        .await?;

    info!(
        "Submission {} for phase {} stored at {}",
        submission.id, phase_id, stored.key
    );
    Ok(submission)
}

/// Overwrites any earlier grade.
pub async fn grade(
    state: &AppState,
    caller: &AuthUser,
    submission_id: Uuid,
    request: GradeRequest,
) -> Result<Submission, ApiError> {
    let grade = match request.grade {
        Some(g) if g.is_finite() && (0.0..=100.0).contains(&g) => g,
        Some(_) => return Err(ApiError::field("grade", "Grade must be between 0 and 100")),
        None => return Err(ApiError::field("grade", "Grade is required")),
    };
    let feedback = match request.feedback.as_deref().map(str::trim) {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => return Err(ApiError::field("feedback", "Feedback is required")),
    };

    let submission = state
        .store
        .grade_submission(submission_id, grade, &feedback, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Submission not found"))?;

    info!("Submission {} graded {} by {}", submission.id, grade, caller.id);
    Ok(submission)
}

/// Staff see everything; everyone else sees their own group's submissions.
pub async fn list(state: &AppState, caller: &AuthUser) -> Result<Vec<Submission>, ApiError> {
    match caller.role {
        UserRole::Coordinator | UserRole::Superadmin => Ok(state.store.list_submissions(None).await?),
        _ => match caller.group_id {
            Some(group_id) => Ok(state.store.list_submissions(Some(group_id)).await?),
            None => Ok(Vec::new()),
        },
    }
}

pub async fn results(state: &AppState) -> Result<Vec<GroupRanking>, ApiError> {
    Ok(state.store.group_rankings().await?)
}
