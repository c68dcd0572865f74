//! Dashboard aggregation service.
//!
//! Computes a read-only snapshot: project and task counts plus the most
//! recently created tasks, fully populated. Every call recomputes from the
//! store; there is no caching or incremental maintenance, trading staleness
//! for correctness at the expected read volume.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::project::ProjectStatus;
use crate::models::task::{TaskStatus, TaskView};
use crate::repo::tasks;

/// How many of the newest tasks the snapshot carries.
pub const RECENT_TASKS_LIMIT: i64 = 5;

/// Per-status task counts. `total` echoes the overall task count.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Point-in-time dashboard snapshot. Not persisted anywhere.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: i64,
    pub active_projects: i64,
    pub total_tasks: i64,
    pub tasks_by_status: TaskStats,
    pub recent_tasks: Vec<TaskView>,
}

/// Computes the snapshot with independent count queries per figure.
pub async fn compute_stats(pool: &PgPool) -> Result<DashboardStats, AppError> {
    let total_projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?;
    let active_projects: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE status = $1")
            .bind(ProjectStatus::Active)
            .fetch_one(pool)
            .await?;

    let total_tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    let todo_tasks = count_tasks_with_status(pool, TaskStatus::ToDo).await?;
    let in_progress_tasks = count_tasks_with_status(pool, TaskStatus::InProgress).await?;
    let completed_tasks = count_tasks_with_status(pool, TaskStatus::Completed).await?;

    let recent_tasks = tasks::recent(pool, RECENT_TASKS_LIMIT).await?;

    Ok(DashboardStats {
        total_projects,
        active_projects,
        total_tasks,
        tasks_by_status: TaskStats {
            total: total_tasks,
            todo: todo_tasks,
            in_progress: in_progress_tasks,
            completed: completed_tasks,
        },
        recent_tasks,
    })
}

async fn count_tasks_with_status(pool: &PgPool, status: TaskStatus) -> Result<i64, AppError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = $1")
        .bind(status)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
