use crate::{error::AppError, models::UserUpdate, repo};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists all users as public projections. Readable by any authenticated
/// user; the password hash is never part of the projection.
#[get("")]
pub async fn get_users(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let users = repo::users::list_views(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "users": users,
    })))
}

#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = repo::users::find_view_by_id(&pool, user_id.into_inner()).await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "user": user,
        }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Partial update of name, email, or role. Admin and ProjectManager only;
/// the password cannot be changed through this route.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    user_data: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = repo::users::update(&pool, user_id.into_inner(), &user_data).await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "User updated successfully",
            "user": user,
        }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Deletes a user. Admin only. Tokens already issued to the account stop
/// working on their next request, since the middleware re-loads the user.
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let deleted = repo::users::delete(&pool, user_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
