use std::env;

/// Fallback signing secret used when `JWT_SECRET` is absent. Deployments must
/// override it; startup logs a warning when the fallback is in effect.
const DEFAULT_JWT_SECRET: &str = "insecure-dev-secret-change-in-production";

const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Token service settings, read once at startup and passed by reference to
/// `auth::token`.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

/// Process-wide configuration, constructed once in `main` and shared through
/// `web::Data`. No component reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                log::warn!("JWT_SECRET not set; falling back to the insecure default secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthSettings {
                jwt_secret,
                token_ttl_days: env::var("JWT_TTL_DAYS")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_DAYS.to_string())
                    .parse()
                    .expect("JWT_TTL_DAYS must be a number"),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
