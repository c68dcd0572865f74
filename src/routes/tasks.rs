use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskStatusUpdate, TaskUpdate},
    repo,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists tasks newest-first with references populated, optionally filtered
/// by exact project reference and status.
///
/// ## Query Parameters:
/// - `projectId` (optional): only tasks belonging to this project.
/// - `status` (optional): only tasks with this status (`ToDo`, `InProgress`,
///   `Completed`).
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = repo::tasks::list(&pool, &query_params).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tasks": tasks,
    })))
}

#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = repo::tasks::get(&pool, task_id.into_inner()).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Creates a task. Admin and ProjectManager only; the owning project must
/// exist and the creator is stamped from the authenticated identity.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = repo::tasks::create(&pool, &task_data, user.0.id).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Task created successfully",
        "task": task,
    })))
}

/// Full partial update of a task (everything but the owning project). Admin
/// and ProjectManager only.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = repo::tasks::update(&pool, task_id.into_inner(), &task_data).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Task updated successfully",
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Status-only transition, permitted to any authenticated user.
#[patch("/{id}/status")]
pub async fn update_task_status(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    status_data: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let task = repo::tasks::update_status(&pool, task_id.into_inner(), status_data.status).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Task status updated successfully",
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let deleted = repo::tasks::delete(&pool, task_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}
