//! Task persistence, filtering, and reference population.
//!
//! Reads return [`TaskView`] records: the owning project resolved to a
//! minimal projection (`None` once the project has been deleted, since
//! project deletion does not cascade here), assignees and creator resolved
//! to public-safe user projections.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::task::{
    Task, TaskInput, TaskPriority, TaskQuery, TaskStatus, TaskUpdate, TaskView,
};
use crate::repo::{projects, users};

const COLUMNS: &str = "id, title, description, project_id, assigned_to, status, priority, \
                       due_date, created_by, created_at, updated_at";

/// Lists tasks newest-first, optionally filtered by exact project reference
/// and status.
pub async fn list(pool: &PgPool, query: &TaskQuery) -> Result<Vec<TaskView>, AppError> {
    let mut sql = format!("SELECT {} FROM tasks", COLUMNS);
    let mut conditions: Vec<String> = Vec::new();
    let mut param_count = 1;

    if query.project_id.is_some() {
        conditions.push(format!("project_id = ${}", param_count));
        param_count += 1;
    }
    if query.status.is_some() {
        conditions.push(format!("status = ${}", param_count));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql);
    if let Some(project_id) = query.project_id {
        query_builder = query_builder.bind(project_id);
    }
    if let Some(status) = query.status {
        query_builder = query_builder.bind(status);
    }

    let rows = query_builder.fetch_all(pool).await?;
    populate(pool, rows).await
}

/// The `limit` most recently created tasks, populated. Used by the dashboard
/// snapshot.
pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<TaskView>, AppError> {
    let rows = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks ORDER BY created_at DESC LIMIT $1",
        COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    populate(pool, rows).await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<TaskView>, AppError> {
    let row = sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(populate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Creates a task, stamping the creator from the authenticated identity.
///
/// The owning project reference must resolve to an existing project; this is
/// the only point where the reference is checked, so later project deletion
/// leaves the task behind with a dangling reference.
pub async fn create(
    pool: &PgPool,
    input: &TaskInput,
    creator_id: Uuid,
) -> Result<TaskView, AppError> {
    if !projects::exists(pool, input.project_id).await? {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let row = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, project_id, assigned_to, status, priority, due_date, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.project_id)
    .bind(input.assigned_to.clone().unwrap_or_default())
    .bind(input.status.unwrap_or(TaskStatus::ToDo))
    .bind(input.priority.unwrap_or(TaskPriority::Medium))
    .bind(input.due_date)
    .bind(creator_id)
    .fetch_one(pool)
    .await?;

    Ok(populate(pool, vec![row])
        .await?
        .pop()
        .expect("populated row for freshly inserted task"))
}

/// Partial update. Absent fields are left unchanged; the owning project and
/// the creator are immutable.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &TaskUpdate,
) -> Result<Option<TaskView>, AppError> {
    let row = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($2, title),
             description = COALESCE($3, description),
             assigned_to = COALESCE($4, assigned_to),
             status = COALESCE($5, status),
             priority = COALESCE($6, priority),
             due_date = COALESCE($7, due_date),
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.assigned_to.clone())
    .bind(changes.status)
    .bind(changes.priority)
    .bind(changes.due_date)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(populate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Status-only transition, open to any authenticated user.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: TaskStatus,
) -> Result<Option<TaskView>, AppError> {
    let row = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(populate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn populate(pool: &PgPool, rows: Vec<Task>) -> Result<Vec<TaskView>, AppError> {
    let mut project_ids: Vec<Uuid> = rows.iter().map(|row| row.project_id).collect();
    project_ids.sort_unstable();
    project_ids.dedup();

    let mut user_ids: Vec<Uuid> = Vec::new();
    for row in &rows {
        user_ids.push(row.created_by);
        user_ids.extend(&row.assigned_to);
    }
    user_ids.sort_unstable();
    user_ids.dedup();

    let project_refs = projects::refs_by_ids(pool, &project_ids).await?;
    let user_views = users::views_by_ids(pool, &user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| TaskView {
            id: row.id,
            title: row.title,
            description: row.description,
            project: project_refs.get(&row.project_id).cloned(),
            assigned_to: row
                .assigned_to
                .iter()
                .filter_map(|id| user_views.get(id).cloned())
                .collect(),
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            created_by: user_views.get(&row.created_by).cloned(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}
