use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use jsonwebtoken::Algorithm;
use notestack::auth::TokenService;
use notestack::AppState;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const PASSWORD: &str = "securepassword123";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let tokens = TokenService::new(b"test-secret", Algorithm::HS256, Duration::minutes(30));
        let router = notestack::build_app(AppState::new(pool.clone(), tokens));

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Register a user through the API and return the bearer token.
    pub async fn register(&self, email: &str) -> String {
        let resp = self
            .post_json(
                "/api/v1/auth/register",
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": "John",
                    "last_name": "Doe",
                    "username": "johndoe",
                }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["access_token"]
            .as_str()
            .expect("register should return an access token")
            .to_string()
    }

    /// Look up the id of the user behind `token`.
    pub async fn user_id(&self, token: &str) -> String {
        let resp = self.get("/api/v1/auth/users/me", Some(token)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["id"].as_str().unwrap().to_string()
    }

    /// Create a note and return its JSON body.
    pub async fn create_note(&self, token: &str, title: &str, tags: &[&str]) -> Value {
        let resp = self
            .post_json(
                "/api/v1/notes",
                json!({ "title": title, "text": format!("{title} body"), "tags": tags }),
                Some(token),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    pub async fn tag_count(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }

    fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder
    }

    /// Send a GET request with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let req = Self::builder("GET", uri, token).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a DELETE request with an optional bearer token.
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let req = Self::builder("DELETE", uri, token).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.send_json("POST", uri, body, token).await
    }

    pub async fn put_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.send_json("PUT", uri, body, token).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.send_json("PATCH", uri, body, token).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> Response {
        let req = Self::builder(method, uri, token)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Send a POST form request.
    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp).await).expect("response body should be JSON")
}

/// Tag names of a note body, in response order.
pub fn tag_names(note: &Value) -> Vec<String> {
    note["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}
