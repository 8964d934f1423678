use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use logisync_api::{self as api, config::AppConfig, AppState};

/// Test harness backed by a file-based SQLite database in a temp directory.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub user_id: Uuid,
    pub token: String,
    _db_dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_webhook_secret(None).await
    }

    pub async fn with_webhook_secret(webhook_secret: Option<&str>) -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = db_dir.path().join("logisync_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only".to_string(),
            "127.0.0.1".to_string(),
            0,
        );
        cfg.webhook_secret = webhook_secret.map(str::to_string);
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = api::db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        api::db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);

        let router = Router::new()
            .route("/health", get(api::handlers::health::health))
            .nest("/api/v1", api::api_v1_routes())
            .with_state(state.clone());

        let user_id = Uuid::new_v4();
        let token = state
            .auth
            .issue_token(user_id, Duration::from_secs(3600))
            .expect("failed to issue test token");

        Self {
            state,
            router,
            user_id,
            token,
            _db_dir: db_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request build"))
            .await
            .expect("request dispatch")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request build"))
            .await
            .expect("request dispatch")
    }

    /// Raw-body POST for webhook tests, where the exact bytes matter.
    pub async fn post_raw(
        &self,
        uri: &str,
        body: Vec<u8>,
        extra_headers: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        self.router
            .clone()
            .oneshot(builder.body(Body::from(body)).expect("request build"))
            .await
            .expect("request dispatch")
    }
}

#[allow(dead_code)]
pub async fn response_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response body")
    };
    (status, json)
}
