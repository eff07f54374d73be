//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use helpdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use helpdesk_api::config::ServerConfig;
use helpdesk_api::notifications::{NotificationFanout, NotificationRouter};
use helpdesk_api::router::build_app_router;
use helpdesk_api::state::AppState;
use helpdesk_api::ws::WsManager;
use helpdesk_db::models::department::CreateDepartment;
use helpdesk_db::models::user::{CreateUser, User};
use helpdesk_db::repositories::{DepartmentRepo, UserRepo};
use helpdesk_events::{DomainEvent, EventBus};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// A fully wired app plus handles the tests inspect.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Subscribed before any request so no event is missed.
    pub events: broadcast::Receiver<DomainEvent>,
    pub notifications: NotificationRouter,
}

impl TestApp {
    /// Route every event published so far, the way the background router
    /// would, then return them.
    pub async fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.notifications
                .route_event(&event)
                .await
                .expect("event routing should succeed");
            seen.push(event);
        }
        seen
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, user.is_admin, &self.state.config.jwt)
            .expect("token generation should succeed")
    }

    pub async fn get(&self, uri: &str, user: &User) -> Response<Body> {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &User, body: serde_json::Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &User, body: serde_json::Value) -> Response<Body> {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &User) -> Response<Body> {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&User>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", self.token_for(user)));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Build the full application router over `pool`, with the same middleware
/// stack production uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let ws_manager = Arc::new(WsManager::new());
    let event_bus = Arc::new(EventBus::default());
    let events = event_bus.subscribe();

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus,
    };

    let fanout = NotificationFanout::new(pool, Arc::clone(&ws_manager));
    TestApp {
        router: build_app_router(state.clone(), &config),
        notifications: NotificationRouter::new(fanout, ws_manager),
        state,
        events,
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn department(pool: &PgPool, name: &str) -> i64 {
    DepartmentRepo::create(pool, &CreateDepartment { name: name.into() })
        .await
        .expect("department creation should succeed")
        .id
}

pub async fn user(pool: &PgPool, name: &str, department_id: Option<i64>, is_admin: bool) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            is_admin,
            department_id,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Departments 1..3 and the cast used across scenarios.
///
/// - `u1`: requester in `dept1`
/// - `u2`, `u3`: agents in `dept2`
/// - `admin2`: admin in `dept2`
/// - `u4`: agent in `dept3`
/// - `outsider`: member of an unrelated department
/// - `nomad`: no department at all
pub struct Cast {
    pub dept1: i64,
    pub dept2: i64,
    pub dept3: i64,
    pub u1: User,
    pub u2: User,
    pub u3: User,
    pub admin2: User,
    pub u4: User,
    pub outsider: User,
    pub nomad: User,
}

pub async fn cast(pool: &PgPool) -> Cast {
    let dept1 = department(pool, "Sales").await;
    let dept2 = department(pool, "IT").await;
    let dept3 = department(pool, "Facilities").await;
    let unrelated = department(pool, "Legal").await;

    Cast {
        u1: user(pool, "Uma", Some(dept1), false).await,
        u2: user(pool, "Victor", Some(dept2), false).await,
        u3: user(pool, "Wendy", Some(dept2), false).await,
        admin2: user(pool, "Ada", Some(dept2), true).await,
        u4: user(pool, "Xavier", Some(dept3), false).await,
        outsider: user(pool, "Yara", Some(unrelated), false).await,
        nomad: user(pool, "Zed", None, false).await,
        dept1,
        dept2,
        dept3,
    }
}

/// Open a ticket from `creator` to `destination` and return its id.
pub async fn open_ticket(app: &TestApp, creator: &User, destination: i64) -> i64 {
    let response = app
        .post(
            "/api/v1/tickets",
            creator,
            serde_json::json!({
                "title": "Laptop will not boot",
                "description": "Black screen after the update",
                "priority": "high",
                "destination_department_id": destination,
            }),
        )
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
