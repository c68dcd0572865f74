#![allow(dead_code)]

use actix_web::test;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use taskhub::config::{AuthSettings, Config};

/// Connects to the test database named by `DATABASE_URL` and applies the
/// migrations. Returns `None` (so the caller can skip) when the variable is
/// not set, keeping the suite green on machines without Postgres.
pub async fn test_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to apply migrations to test DB");
    Some(pool)
}

/// Configuration for in-process test apps; nothing is read from the
/// environment so the tests cannot interfere with each other.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        auth: AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
        },
    }
}

/// Unique email per run so concurrent test binaries sharing one database
/// never collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Registers an account through the API and returns its id and token.
pub async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> TestUser {
    let mut payload = json!({
        "name": name,
        "email": email,
        "password": password
    });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );

    let response: serde_json::Value =
        serde_json::from_slice(&body).expect("Failed to parse registration response");
    TestUser {
        id: serde_json::from_value(response["user"]["id"].clone())
            .expect("registration response carries the user id"),
        token: response["token"]
            .as_str()
            .expect("registration response carries a token")
            .to_string(),
    }
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}
