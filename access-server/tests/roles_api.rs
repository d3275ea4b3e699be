mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

const ADMIN: i64 = 1;

#[tokio::test]
async fn list_roles_starts_with_seeded_admin() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/roles", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    let roles = body.as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["id"], 1);
    assert_eq!(roles[0]["name"], "Administrator");
}

#[tokio::test]
async fn create_get_update_delete_role() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post("/roles", ADMIN, json!({"name": "Viewer", "description": "Read only"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert!(id > 1);
    assert_eq!(created["description"], "Read only");

    let (status, fetched) = app.get(&format!("/roles/{id}"), ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Viewer");

    let (status, updated) = app
        .send(
            "PUT",
            &format!("/roles/{id}"),
            Some(ADMIN),
            Some(json!({"name": "Reader"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Reader");
    assert!(updated["description"].is_null());

    let (status, body) = app
        .send("DELETE", &format!("/roles/{id}"), Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.get(&format!("/roles/{id}"), ADMIN).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);
}

#[tokio::test]
async fn role_name_rules_are_validation_errors() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/roles", ADMIN, json!({"name": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3003);

    let (status, _) = app.post("/roles", ADMIN, json!({"name": "Sales"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/roles", ADMIN, json!({"name": "Sales"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);

    let (status, body) = app
        .send(
            "PUT",
            "/roles/1",
            Some(ADMIN),
            Some(json!({"name": "Sales"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);
}

#[tokio::test]
async fn update_and_delete_unknown_role_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send("PUT", "/roles/999", Some(ADMIN), Some(json!({"name": "Ghost"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);

    let (status, _) = app.send("DELETE", "/roles/999", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_role_cannot_be_deleted_but_can_be_renamed() {
    let app = TestApp::new().await;

    let (status, body) = app.send("DELETE", "/roles/1", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2005);

    let (status, body) = app
        .send(
            "PUT",
            "/roles/1",
            Some(ADMIN),
            Some(json!({"name": "Owner", "description": "Everything"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Owner");

    // access is bound to the id, not the name
    let (status, _) = app.get("/roles", ADMIN).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_or_invalid_caller_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/roles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = app.send("GET", "/roles", Some(0), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn role_routes_follow_granted_actions() {
    let app = TestApp::new().await;
    app.insert_role(20, "Role Reader").await;
    app.grant(20, "roles", "read").await;

    let (status, _) = app.get("/roles", 20).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/modules", 20).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/roles", 20, json!({"name": "Nope"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);
    assert_eq!(body["details"]["action"], "create");

    let (status, _) = app.send("DELETE", "/roles/20", Some(20), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // a role id with no row at all holds no grants
    let (status, _) = app.get("/roles", 555).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "ok");
}

#[tokio::test]
async fn store_failure_during_permission_check_is_forbidden() {
    let app = TestApp::new().await;
    app.insert_role(5, "Reader").await;
    app.grant(5, "roles", "read").await;
    app.pool.close().await;

    let (status, body) = app.get("/roles", 5).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2006);
}
