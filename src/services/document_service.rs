use tracing::info;
use uuid::Uuid;

use super::{owned_group, store_upload, UploadForm};
use crate::database::models::{Document, NewDocument};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn upload(
    state: &AppState,
    caller: &AuthUser,
    form: UploadForm,
) -> Result<Document, ApiError> {
    let group_id = owned_group(state, caller).await?;
    let folder = &state.config.storage.documents_folder;
    let (phase_id, file_name, stored) = store_upload(state, folder, form).await?;

    let document = state
        .store
        .insert_document(NewDocument {
            phase_id,
            leader_id: caller.id,
            group_id,
            file_name,
            file_url: stored.url,
        })
        .await?;

    info!("Document {} uploaded by {} at {}", document.id, caller.id, stored.key);
    Ok(document)
}

pub async fn list(state: &AppState, phase_id: Option<Uuid>) -> Result<Vec<Document>, ApiError> {
    Ok(state.store.list_documents(phase_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::{NewGroup, NewPhase, NewUser, UserRole};
    use crate::services::Upload;
    use axum::body::Bytes;

    #[tokio::test]
    async fn upload_and_filter_by_phase() {
        let state = AppState::in_memory(AppConfig::for_tests());
        let leader = state
            .store
            .insert_user(NewUser {
                name: "L".into(),
                email: "l@x.com".into(),
                password_hash: "x".into(),
                role: UserRole::Leader,
                course_id: None,
                period_semester: None,
            })
            .await
            .unwrap();
        state
            .store
            .create_group(NewGroup {
                name: "Alpha".into(),
                description: None,
                leader_id: leader.id,
                course_id: None,
                period_semester: None,
            })
            .await
            .unwrap();
        let leader: AuthUser = state.store.find_user(leader.id).await.unwrap().unwrap().into();

        let mut phases = Vec::new();
        for order in 1..=2 {
            phases.push(
                state
                    .store
                    .create_phase(NewPhase {
                        name: format!("P{}", order),
                        description: None,
                        start_date: None,
                        end_date: None,
                        order_num: order,
                    })
                    .await
                    .unwrap(),
            );
        }

        let form = |phase_id| UploadForm {
            phase_id: Some(phase_id),
            file: Some(Upload { file_name: "plan.docx".into(), bytes: Bytes::from_static(b"doc") }),
        };
        let document = upload(&state, &leader, form(phases[0].id)).await.unwrap();
        upload(&state, &leader, form(phases[1].id)).await.unwrap();

        assert!(document.file_url.contains(&format!("/documents/{}/", phases[0].id)));
        assert_eq!(list(&state, None).await.unwrap().len(), 2);
        let first = list(&state, Some(phases[0].id)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, document.id);
    }
}
