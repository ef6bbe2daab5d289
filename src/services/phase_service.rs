use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::validation::{deserialize_optional_date, validate_date_range, validate_name, FieldErrors};
use crate::database::models::{NewPhase, Phase, PhaseUpdate};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::realtime::RealtimeEvent;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePhaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
    pub order_num: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePhaseRequest {
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

pub async fn list(state: &AppState) -> Result<Vec<Phase>, ApiError> {
    Ok(state.store.list_phases().await?)
}

/// New phases start inactive.
pub async fn create(
    state: &AppState,
    caller: &AuthUser,
    request: CreatePhaseRequest,
) -> Result<Phase, ApiError> {
    let mut errors = FieldErrors::new();
    let name = errors.check("name", validate_name(request.name.as_deref()));
    let order_num = errors.check(
        "orderNum",
        match request.order_num {
            Some(n) if n > 0 => Ok(n),
            Some(_) => Err("Order must be a positive number".to_string()),
            None => Err("Order is required".to_string()),
        },
    );
    errors.check("endDate", validate_date_range(request.start_date, request.end_date));
    errors.finish()?;

    let (Some(name), Some(order_num)) = (name, order_num) else {
        return Err(ApiError::validation_error("Validation failed", None));
    };

    let phase = state
        .store
        .create_phase(NewPhase {
            name,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            start_date: request.start_date,
            end_date: request.end_date,
            order_num,
        })
        .await?;

    info!("Phase {} ({}) created by {}", phase.id, phase.order_num, caller.id);
    Ok(phase)
}

/// Activating a phase deactivates every other one atomically. The committed
/// phase is then pushed to every realtime client.
pub async fn set_state(
    state: &AppState,
    caller: &AuthUser,
    phase_id: Uuid,
    request: UpdatePhaseRequest,
) -> Result<Phase, ApiError> {
    let is_active = request
        .is_active
        .ok_or_else(|| ApiError::field("isActive", "isActive is required"))?;

    let current = state
        .store
        .find_phase(phase_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Phase not found"))?;

    let start = request.start_date.or(current.start_date);
    let end = request.end_date.or(current.end_date);
    validate_date_range(start, end).map_err(|msg| ApiError::field("endDate", msg))?;

    let phase = state
        .store
        .update_phase_state(
            phase_id,
            PhaseUpdate {
                is_active,
                start_date: request.start_date,
                end_date: request.end_date,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Phase not found"))?;

    let delivered = state
        .realtime
        .broadcast(RealtimeEvent::PhaseUpdated(phase.clone()));
    info!(
        "Phase {} set active={} by {} (notified {} clients)",
        phase.id, phase.is_active, caller.id, delivered
    );

    Ok(phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::{NewUser, UserRole};

    async fn superadmin(state: &AppState) -> AuthUser {
        state
            .store
            .insert_user(NewUser {
                name: "Root".into(),
                email: "root@x.com".into(),
                password_hash: "x".into(),
                role: UserRole::Superadmin,
                course_id: None,
                period_semester: None,
            })
            .await
            .unwrap()
            .into()
    }

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    fn phase_request(name: &str, order: i32) -> CreatePhaseRequest {
        CreatePhaseRequest {
            name: Some(name.into()),
            order_num: Some(order),
            ..Default::default()
        }
    }

    fn activate() -> UpdatePhaseRequest {
        UpdatePhaseRequest { is_active: Some(true), ..Default::default() }
    }

    #[tokio::test]
    async fn create_validates_dates_and_order() {
        let state = AppState::in_memory(AppConfig::for_tests());
        let root = superadmin(&state).await;

        let err = create(
            &state,
            &root,
            CreatePhaseRequest {
                start_date: date("2024-05-01"),
                end_date: date("2024-04-01"),
                ..phase_request("Kickoff", 1)
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let phase = create(&state, &root, phase_request("Kickoff", 1)).await.unwrap();
        assert!(!phase.is_active);

        let err = create(&state, &root, phase_request("Again", 1)).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn activation_is_exclusive_and_broadcast() {
        let state = AppState::in_memory(AppConfig::for_tests());
        let root = superadmin(&state).await;
        let first = create(&state, &root, phase_request("One", 1)).await.unwrap();
        let second = create(&state, &root, phase_request("Two", 2)).await.unwrap();

        let mut sub = state.realtime.register(root.id).await;

        set_state(&state, &root, first.id, activate()).await.unwrap();
        let updated = set_state(
            &state,
            &root,
            second.id,
            UpdatePhaseRequest {
                start_date: date("2024-03-01"),
                end_date: date("2024-03-31"),
                ..activate()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.start_date, date("2024-03-01"));

        let active: Vec<Phase> = list(&state).await.unwrap().into_iter().filter(|p| p.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let RealtimeEvent::PhaseUpdated(seen) = sub.recv().await.unwrap();
        assert_eq!(seen.id, first.id);
        let RealtimeEvent::PhaseUpdated(seen) = sub.recv().await.unwrap();
        assert_eq!(seen, updated);
    }

    #[tokio::test]
    async fn deactivation_touches_only_the_target() {
        let state = AppState::in_memory(AppConfig::for_tests());
        let root = superadmin(&state).await;
        let first = create(&state, &root, phase_request("One", 1)).await.unwrap();
        create(&state, &root, phase_request("Two", 2)).await.unwrap();

        set_state(&state, &root, first.id, activate()).await.unwrap();
        let off = set_state(
            &state,
            &root,
            first.id,
            UpdatePhaseRequest { is_active: Some(false), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(!off.is_active);
        assert!(list(&state).await.unwrap().iter().all(|p| !p.is_active));
    }

    #[tokio::test]
    async fn missing_phase_and_flag() {
        let state = AppState::in_memory(AppConfig::for_tests());
        let root = superadmin(&state).await;

        let err = set_state(&state, &root, Uuid::new_v4(), activate()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let phase = create(&state, &root, phase_request("One", 1)).await.unwrap();
        let err = set_state(&state, &root, phase.id, UpdatePhaseRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
