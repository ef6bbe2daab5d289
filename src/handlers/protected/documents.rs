// handlers/protected/documents.rs - /documents

use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use super::upload::read_upload_form;
use crate::auth::Action;
use crate::database::models::Document;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::document_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub phase_id: Option<Uuid>,
}

/// GET /documents?phaseId=
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    query: Result<Query<DocumentQuery>, QueryRejection>,
) -> ApiResult<Vec<Document>> {
    caller.require(Action::ViewDocuments)?;
    let Query(query) = query.map_err(|_| ApiError::field("phaseId", "phaseId must be a UUID"))?;
    Ok(ApiResponse::success(document_service::list(&state, query.phase_id).await?))
}

/// POST /documents - multipart `file` + `phaseId`, leader only
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Document> {
    caller.require(Action::UploadDocument)?;
    let form = read_upload_form(multipart?).await?;
    let document = document_service::upload(&state, &caller, form).await?;
    Ok(ApiResponse::created(document))
}
