pub mod project;
pub mod task;
pub mod user;

pub use project::{Project, ProjectInput, ProjectRef, ProjectStatus, ProjectUpdate, ProjectView};
pub use task::{
    Task, TaskInput, TaskPriority, TaskQuery, TaskStatus, TaskStatusUpdate, TaskUpdate, TaskView,
};
pub use user::{User, UserRole, UserUpdate, UserView};
