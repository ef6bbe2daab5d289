mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use jornada_api::config::AppConfig;
use jornada_api::database::models::UserRole;

#[tokio::test]
async fn leader_submits_a_file_for_a_phase() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (leader, token, group_id) = app.leader_with_group("Equipe Alfa").await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    let reply = app
        .upload("/submissions", &token, Some(phase), Some(("relatorio final.pdf", "%PDF-1.4")))
        .await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.data()["groupId"], group_id.to_string());
    assert_eq!(reply.data()["phaseId"], phase.to_string());
    assert_eq!(reply.data()["submittedBy"], leader.id.to_string());
    assert!(reply.data()["grade"].is_null());

    let keys = app.objects.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with(&format!("submissions/{}/", phase)), "{}", keys[0]);

    let url = reply.data()["fileUrl"].as_str().unwrap_or_default();
    assert!(url.ends_with(&keys[0]), "{}", url);
    assert_eq!(app.objects.get(&keys[0]).await.as_deref(), Some(&b"%PDF-1.4"[..]));
    Ok(())
}

#[tokio::test]
async fn submission_form_is_validated() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, token, _) = app.leader_with_group("Equipe Alfa").await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    let no_file = app.upload("/submissions", &token, Some(phase), None).await?;
    assert_eq!(no_file.status, StatusCode::BAD_REQUEST);
    assert!(no_file.body["fieldErrors"].get("file").is_some());

    let no_phase = app
        .upload("/submissions", &token, None, Some(("a.pdf", "data")))
        .await?;
    assert_eq!(no_phase.status, StatusCode::BAD_REQUEST);
    assert!(no_phase.body["fieldErrors"].get("phaseId").is_some());

    let unknown_phase = app
        .upload("/submissions", &token, Some(Uuid::new_v4()), Some(("a.pdf", "data")))
        .await?;
    assert_eq!(unknown_phase.status, StatusCode::NOT_FOUND);

    assert!(app.objects.keys().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn only_leaders_with_a_group_submit() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, student) = app.user_with_token(UserRole::Student).await?;
    let (_, lonely_leader) = app.user_with_token(UserRole::Leader).await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    let denied = app
        .upload("/submissions", &student, Some(phase), Some(("a.pdf", "data")))
        .await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let groupless = app
        .upload("/submissions", &lonely_leader, Some(phase), Some(("a.pdf", "data")))
        .await?;
    assert_eq!(groupless.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn coordinator_grades_and_results_rank_groups() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (coordinator, staff) = app.user_with_token(UserRole::Coordinator).await?;
    let (_, alpha, _) = app.leader_with_group("Equipe Alfa").await?;
    let (_, beta, _) = app.leader_with_group("Equipe Beta").await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    let mut ids = Vec::new();
    for token in [&alpha, &alpha, &beta] {
        let reply = app
            .upload("/submissions", token, Some(phase), Some(("entrega.zip", "zip")))
            .await?;
        assert_eq!(reply.status, StatusCode::CREATED);
        ids.push(reply.data()["id"].as_str().unwrap_or_default().to_string());
    }

    for (id, grade) in ids.iter().zip([70.0, 90.0, 75.5]) {
        let reply = app
            .put(
                &format!("/submissions/{}/grade", id),
                &staff,
                json!({ "grade": grade, "feedback": "Bom trabalho" }),
            )
            .await?;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.data()["gradedBy"], coordinator.id.to_string());
    }

    let results = app.get("/results", &alpha).await?;
    assert_eq!(results.status, StatusCode::OK);
    let ranking = results.data().as_array().cloned().unwrap_or_default();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["groupName"], "Equipe Alfa");
    assert_eq!(ranking[0]["averageGrade"], 80.0);
    assert_eq!(ranking[0]["gradedSubmissions"], 2);
    assert_eq!(ranking[1]["groupName"], "Equipe Beta");
    assert_eq!(ranking[1]["averageGrade"], 75.5);
    Ok(())
}

#[tokio::test]
async fn grading_is_validated() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, staff) = app.user_with_token(UserRole::Coordinator).await?;
    let (_, token, _) = app.leader_with_group("Equipe Alfa").await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    let submitted = app
        .upload("/submissions", &token, Some(phase), Some(("a.pdf", "data")))
        .await?;
    let uri = format!("/submissions/{}/grade", submitted.data()["id"].as_str().unwrap_or_default());

    let too_high = app.put(&uri, &staff, json!({ "grade": 101, "feedback": "ok" })).await?;
    assert_eq!(too_high.status, StatusCode::BAD_REQUEST);
    assert!(too_high.body["fieldErrors"].get("grade").is_some());

    let negative = app.put(&uri, &staff, json!({ "grade": -1, "feedback": "ok" })).await?;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let no_feedback = app.put(&uri, &staff, json!({ "grade": 50, "feedback": " " })).await?;
    assert_eq!(no_feedback.status, StatusCode::BAD_REQUEST);
    assert!(no_feedback.body["fieldErrors"].get("feedback").is_some());

    // only coordinators grade
    let superadmin = app.put(&uri, &root, json!({ "grade": 50, "feedback": "ok" })).await?;
    assert_eq!(superadmin.status, StatusCode::FORBIDDEN);

    let unknown = app
        .put(
            &format!("/submissions/{}/grade", Uuid::new_v4()),
            &staff,
            json!({ "grade": 50, "feedback": "ok" }),
        )
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    // boundaries are inclusive and a regrade overwrites
    let zero = app.put(&uri, &staff, json!({ "grade": 0, "feedback": "refazer" })).await?;
    assert_eq!(zero.status, StatusCode::OK);
    let full = app.put(&uri, &staff, json!({ "grade": 100, "feedback": "perfeito" })).await?;
    assert_eq!(full.data()["grade"], 100.0);
    assert_eq!(full.data()["feedback"], "perfeito");
    Ok(())
}

#[tokio::test]
async fn submissions_are_scoped_to_the_callers_group() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, staff) = app.user_with_token(UserRole::Coordinator).await?;
    let (_, alpha, _) = app.leader_with_group("Equipe Alfa").await?;
    let (_, beta, _) = app.leader_with_group("Equipe Beta").await?;
    let (_, outsider) = app.user_with_token(UserRole::Student).await?;
    let phase = app.create_phase(&root, "Kickoff", 1).await?;

    app.upload("/submissions", &alpha, Some(phase), Some(("a.pdf", "a"))).await?;
    app.upload("/submissions", &beta, Some(phase), Some(("b.pdf", "b"))).await?;

    let count = |reply: &common::Reply| reply.data().as_array().map(Vec::len);
    assert_eq!(count(&app.get("/submissions", &staff).await?), Some(2));
    assert_eq!(count(&app.get("/submissions", &alpha).await?), Some(1));
    assert_eq!(count(&app.get("/submissions", &outsider).await?), Some(0));
    Ok(())
}

#[tokio::test]
async fn documents_upload_and_filter_by_phase() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, token, group_id) = app.leader_with_group("Equipe Alfa").await?;
    let (_, student) = app.user_with_token(UserRole::Student).await?;
    let kickoff = app.create_phase(&root, "Kickoff", 1).await?;
    let delivery = app.create_phase(&root, "Delivery", 2).await?;

    let uploaded = app
        .upload("/documents", &token, Some(kickoff), Some(("plano.docx", "doc")))
        .await?;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    assert_eq!(uploaded.data()["groupId"], group_id.to_string());
    app.upload("/documents", &token, Some(delivery), Some(("final.docx", "doc")))
        .await?;

    let denied = app
        .upload("/documents", &student, Some(kickoff), Some(("x.docx", "doc")))
        .await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let all = app.get("/documents", &student).await?;
    assert_eq!(all.data().as_array().map(Vec::len), Some(2));

    let filtered = app
        .get(&format!("/documents?phaseId={}", kickoff), &student)
        .await?;
    assert_eq!(filtered.data().as_array().map(Vec::len), Some(1));
    assert_eq!(filtered.data()[0]["fileName"], "plano.docx");

    let malformed = app.get("/documents?phaseId=nope", &student).await?;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    assert!(app
        .objects
        .keys()
        .await
        .iter()
        .all(|key| key.starts_with("documents/")));
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_are_refused() -> Result<()> {
    let mut config = AppConfig::for_tests();
    config.api.max_request_size_bytes = 64;
    let app = TestApp::with_config(config);
    let (_, token) = app.user_with_token(UserRole::Leader).await?;

    let reply = app
        .post("/groups", &token, json!({ "name": "x".repeat(256) }))
        .await?;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(reply.code(), "PAYLOAD_TOO_LARGE");
    Ok(())
}
