use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserView;

/// Lifecycle status of a project. Corresponds to the `project_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_status")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

/// A project row as stored. References are raw ids; responses go through
/// [`ProjectView`] with references populated.
#[derive(Debug, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_by: Uuid,
    pub team_members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a project. The creator is stamped from the
/// authenticated identity, never taken from the payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub status: Option<ProjectStatus>,
    pub team_members: Option<Vec<Uuid>>,
}

/// Partial update payload for a project. Absent fields are left unchanged;
/// the creator reference is immutable.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub team_members: Option<Vec<Uuid>>,
}

/// Minimal projection of a project used when populating a task's project
/// reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

/// A project with its user references resolved into public-safe projections.
///
/// A dangling creator reference resolves to `None`; dangling team member
/// references are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_by: Option<UserView>,
    pub team_members: Vec<UserView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
