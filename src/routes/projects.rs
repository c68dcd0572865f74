use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ProjectInput, ProjectUpdate},
    repo,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists all projects with creator and team member references populated.
/// Readable by any authenticated user.
#[get("")]
pub async fn get_projects(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let projects = repo::projects::list(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "projects": projects,
    })))
}

#[get("/{id}")]
pub async fn get_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = repo::projects::get(&pool, project_id.into_inner()).await?;

    match project {
        Some(project) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "project": project,
        }))),
        None => Err(AppError::NotFound("Project not found".into())),
    }
}

/// Creates a project. The policy table restricts this route to Admin and
/// ProjectManager; the creator is stamped from the authenticated identity.
#[post("")]
pub async fn create_project(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    project_data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = repo::projects::create(&pool, &project_data, user.0.id).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Project created successfully",
        "project": project,
    })))
}

/// Partial update of name, description, status, or team members. Admin and
/// ProjectManager only; no ownership check beyond the role.
#[put("/{id}")]
pub async fn update_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<Uuid>,
    project_data: web::Json<ProjectUpdate>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = repo::projects::update(&pool, project_id.into_inner(), &project_data).await?;

    match project {
        Some(project) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Project updated successfully",
            "project": project,
        }))),
        None => Err(AppError::NotFound("Project not found".into())),
    }
}

/// Deletes a project. Tasks referencing it are not cascaded; they remain
/// retrievable with their project reference resolving to nothing.
#[delete("/{id}")]
pub async fn delete_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let deleted = repo::projects::delete(&pool, project_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Project deleted successfully",
    })))
}
