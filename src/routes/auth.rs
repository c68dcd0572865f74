use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, AuthenticatedUser,
        LoginRequest, RegisterRequest,
    },
    config::Config,
    error::AppError,
    models::user::{UserRole, UserView},
    repo,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns a token plus the public identity. The
/// role defaults to Developer when the payload carries none.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if repo::users::email_taken(&pool, &register_data.email).await? {
        return Err(AppError::BadRequest(
            "User already exists with this email".into(),
        ));
    }

    let password_hash = hash_password(&register_data.password)?;
    let role = register_data.role.unwrap_or(UserRole::Developer);

    let user = repo::users::create(
        &pool,
        &register_data.name,
        &register_data.email,
        &password_hash,
        role,
    )
    .await?;

    let token = generate_token(&user, &config.auth)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "User registered successfully".into(),
        token,
        user,
    }))
}

/// Login user
///
/// Verifies credentials and returns a token plus the public identity. The
/// same `Invalid credentials` answer covers an unknown email and a wrong
/// password.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = repo::users::find_by_email_with_secret(&pool, &login_data.email).await?;

    match user {
        Some(user) => {
            if verify_password(&login_data.password, &user.password_hash)? {
                let view = UserView {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    role: user.role,
                };
                let token = generate_token(&view, &config.auth)?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    success: true,
                    message: "Login successful".into(),
                    token,
                    user: view,
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Return the caller's identity as resolved by the access-control middleware.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user.0,
    })))
}
