//! Lifecycle rules. Handlers authorize the caller's role, then call in here;
//! every state transition goes through the `Store` on `AppState`.

pub mod auth_service;
pub mod document_service;
pub mod group_service;
pub mod leader_request_service;
pub mod phase_service;
pub mod submission_service;
pub mod user_service;
pub mod validation;

use axum::body::Bytes;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::storage::{self, StoredObject};

/// File received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Parsed multipart form shared by submissions and documents.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub phase_id: Option<Uuid>,
    pub file: Option<Upload>,
}

/// The group the caller leads. Uploads are only accepted for it.
pub(crate) async fn owned_group(state: &AppState, caller: &AuthUser) -> Result<Uuid, ApiError> {
    let group_id = caller
        .group_id
        .ok_or_else(|| ApiError::validation_error("You must create a group before uploading", None))?;

    match state.store.find_group(group_id).await? {
        Some(group) if group.leader_id == caller.id => Ok(group.id),
        _ => Err(ApiError::validation_error(
            "Only the leader of a group can upload for it",
            None,
        )),
    }
}

/// Checks the form, confirms the phase exists, and writes the file under
/// `<folder>/<phaseId>/`.
pub(crate) async fn store_upload(
    state: &AppState,
    folder: &str,
    form: UploadForm,
) -> Result<(Uuid, String, StoredObject), ApiError> {
    let phase_id = form
        .phase_id
        .ok_or_else(|| ApiError::field("phaseId", "phaseId is required"))?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::field("file", "A file is required"))?;
    if upload.bytes.is_empty() {
        return Err(ApiError::field("file", "The uploaded file is empty"));
    }

    if state.store.find_phase(phase_id).await?.is_none() {
        return Err(ApiError::not_found("Phase not found"));
    }

    let file_name = storage::sanitize_file_name(&upload.file_name)?;
    let key = storage::object_key(folder, phase_id, &file_name)?;
    let stored = state.objects.put(&key, upload.bytes).await?;

    Ok((phase_id, file_name, stored))
}
