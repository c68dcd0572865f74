//! Credential store and user lookups.
//!
//! `find_by_email_with_secret` is the only read path that includes the
//! password hash; it exists solely for login. Every other query projects to
//! [`UserView`], and `update`/`delete` never touch the password column.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{User, UserRole, UserUpdate, UserView};

pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<UserView, AppError> {
    let user = sqlx::query_as::<_, UserView>(
        "INSERT INTO users (id, name, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, email, role",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email_with_secret(
    pool: &PgPool,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_view_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserView>, AppError> {
    let user =
        sqlx::query_as::<_, UserView>("SELECT id, name, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

pub async fn list_views(pool: &PgPool) -> Result<Vec<UserView>, AppError> {
    let users = sqlx::query_as::<_, UserView>(
        "SELECT id, name, email, role FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Batch lookup used when populating user references on projects and tasks.
/// Unknown ids are simply absent from the result.
pub async fn views_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserView>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = sqlx::query_as::<_, UserView>(
        "SELECT id, name, email, role FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

/// Partial update of name/email/role. Absent fields are left unchanged.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UserUpdate,
) -> Result<Option<UserView>, AppError> {
    let user = sqlx::query_as::<_, UserView>(
        "UPDATE users
         SET name = COALESCE($2, name),
             email = COALESCE($3, email),
             role = COALESCE($4, role),
             updated_at = now()
         WHERE id = $1
         RETURNING id, name, email, role",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.role)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
