// handlers/protected/upload.rs - multipart form shared by uploads

use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{Upload, UploadForm};

/// Reads a `file` part and a `phaseId` text part. Unknown parts are skipped.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some(Upload { file_name, bytes });
            }
            Some("phaseId") | Some("phase_id") => {
                let raw = field.text().await?;
                let phase_id = Uuid::parse_str(raw.trim())
                    .map_err(|_| ApiError::field("phaseId", "phaseId must be a UUID"))?;
                form.phase_id = Some(phase_id);
            }
            _ => {}
        }
    }

    Ok(form)
}
