#![allow(dead_code)]

use std::collections::BTreeSet;

use access_server::db::DbService;
use access_server::{Config, Server, ServerState};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use shared::access::ModuleCatalog;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const LEAD_GEN_ROLE: i64 = 4;
pub const FRONT_SALES_ROLE: i64 = 5;
pub const UPSELL_ROLE: i64 = 6;
/// Role id that is both front-sales and upsell
pub const OVERLAP_ROLE: i64 = 9;

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.expect("in-memory db");
        let mut config = Config::with_overrides("/tmp/access-test", ":memory:");
        config.home_module = "dashboard".into();
        config.lead_gen_role_ids = BTreeSet::from([LEAD_GEN_ROLE]);
        config.front_sales_role_ids = BTreeSet::from([FRONT_SALES_ROLE, OVERLAP_ROLE]);
        config.upsell_role_ids = BTreeSet::from([UPSELL_ROLE, OVERLAP_ROLE]);
        config.destinations = Default::default();
        config.request_timeout_ms = 30_000;

        let pool = db.pool.clone();
        let state = ServerState::new(config, db.pool, ModuleCatalog::builtin());
        Self {
            router: Server::app(state),
            pool,
        }
    }

    /// Insert a role with a fixed id, bypassing the API
    pub async fn insert_role(&self, id: i64, name: &str) {
        sqlx::query(
            "INSERT INTO role (id, name, description, created_at, updated_at) VALUES (?, ?, NULL, 0, 0)",
        )
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await
        .expect("insert role");
    }

    pub async fn grant(&self, role_id: i64, module: &str, action: &str) {
        sqlx::query("INSERT INTO role_permission (role_id, module, action) VALUES (?, ?, ?)")
            .bind(role_id)
            .bind(module)
            .bind(action)
            .execute(&self.pool)
            .await
            .expect("insert permission");
    }

    pub async fn permission_count(&self, role_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM role_permission WHERE role_id = ?")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await
            .expect("count")
    }

    /// Send a request as `role_id` (no identity header when `None`)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        role_id: Option<i64>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role_id) = role_id {
            builder = builder
                .header("x-role-id", role_id.to_string())
                .header("x-user-id", "test-user");
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, role_id: i64) -> (StatusCode, serde_json::Value) {
        self.send("GET", uri, Some(role_id), None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        role_id: i64,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send("POST", uri, Some(role_id), Some(body)).await
    }
}

/// Sorted `module:action` strings of a permission list response
pub fn pairs(body: &serde_json::Value) -> Vec<String> {
    let mut out: Vec<String> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|p| format!("{}:{}", p["module"].as_str().unwrap(), p["action"].as_str().unwrap()))
        .collect();
    out.sort();
    out
}
