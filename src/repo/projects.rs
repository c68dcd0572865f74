//! Project persistence and reference population.
//!
//! Reads return [`ProjectView`] records with the creator and team member
//! references resolved through an explicit batch lookup. A dangling creator
//! reference resolves to `None`; dangling team members are dropped.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::project::{Project, ProjectInput, ProjectRef, ProjectStatus, ProjectUpdate, ProjectView};
use crate::repo::users;

const COLUMNS: &str = "id, name, description, status, created_by, team_members, created_at, updated_at";

pub async fn list(pool: &PgPool) -> Result<Vec<ProjectView>, AppError> {
    let rows = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects ORDER BY created_at DESC",
        COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    populate(pool, rows).await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<ProjectView>, AppError> {
    let row = sqlx::query_as::<_, Project>(&format!("SELECT {} FROM projects WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(populate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Creates a project, stamping the creator from the authenticated identity.
pub async fn create(
    pool: &PgPool,
    input: &ProjectInput,
    creator_id: Uuid,
) -> Result<ProjectView, AppError> {
    let row = sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (id, name, description, status, created_by, team_members)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.status.unwrap_or(ProjectStatus::Active))
    .bind(creator_id)
    .bind(input.team_members.clone().unwrap_or_default())
    .fetch_one(pool)
    .await?;

    Ok(populate(pool, vec![row])
        .await?
        .pop()
        .expect("populated row for freshly inserted project"))
}

/// Partial update. Absent fields are left unchanged; the creator reference
/// is immutable.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &ProjectUpdate,
) -> Result<Option<ProjectView>, AppError> {
    let row = sqlx::query_as::<_, Project>(&format!(
        "UPDATE projects
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             status = COALESCE($4, status),
             team_members = COALESCE($5, team_members),
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.status)
    .bind(changes.team_members.clone())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(populate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Deletes a project. Tasks referencing it are left in place; their views
/// resolve the project reference to nothing afterwards.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Batch lookup of minimal project projections, used when populating task
/// views.
pub async fn refs_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, ProjectRef>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let refs = sqlx::query_as::<_, ProjectRef>("SELECT id, name FROM projects WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(refs.into_iter().map(|r| (r.id, r)).collect())
}

async fn populate(pool: &PgPool, rows: Vec<Project>) -> Result<Vec<ProjectView>, AppError> {
    let mut user_ids: Vec<Uuid> = Vec::new();
    for row in &rows {
        user_ids.push(row.created_by);
        user_ids.extend(&row.team_members);
    }
    user_ids.sort_unstable();
    user_ids.dedup();

    let user_views = users::views_by_ids(pool, &user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| ProjectView {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            created_by: user_views.get(&row.created_by).cloned(),
            team_members: row
                .team_members
                .iter()
                .filter_map(|id| user_views.get(id).cloned())
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}
