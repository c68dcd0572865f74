//! Declarative role policy for mutating routes.
//!
//! A single table maps (method, path pattern) to the set of roles allowed to
//! call it, evaluated uniformly by the access-control middleware after the
//! identity has been resolved. Routes without an entry require authentication
//! only. Role checks are pure set membership: no hierarchy, no delegation,
//! and no per-resource ownership checks.

use actix_web::http::Method;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::user::UserRole;

struct RoutePolicy {
    method: Method,
    pattern: Regex,
    allowed: &'static [UserRole],
}

const ADMIN_OR_PM: &[UserRole] = &[UserRole::Admin, UserRole::ProjectManager];
const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

lazy_static! {
    static ref POLICIES: Vec<RoutePolicy> = {
        let entry = |method: Method, pattern: &str, allowed: &'static [UserRole]| RoutePolicy {
            method,
            pattern: Regex::new(pattern).expect("route policy pattern must compile"),
            allowed,
        };
        vec![
            entry(Method::POST, r"^/api/projects/?$", ADMIN_OR_PM),
            entry(Method::PUT, r"^/api/projects/[^/]+$", ADMIN_OR_PM),
            entry(Method::DELETE, r"^/api/projects/[^/]+$", ADMIN_OR_PM),
            entry(Method::POST, r"^/api/tasks/?$", ADMIN_OR_PM),
            entry(Method::PUT, r"^/api/tasks/[^/]+$", ADMIN_OR_PM),
            entry(Method::DELETE, r"^/api/tasks/[^/]+$", ADMIN_OR_PM),
            // PATCH /api/tasks/{id}/status has no entry: any authenticated
            // user may transition a task's status.
            entry(Method::PUT, r"^/api/users/[^/]+$", ADMIN_OR_PM),
            entry(Method::DELETE, r"^/api/users/[^/]+$", ADMIN_ONLY),
        ]
    };
}

/// Returns the allowed role set for a route, or `None` when the route is open
/// to any authenticated user.
pub fn allowed_roles(method: &Method, path: &str) -> Option<&'static [UserRole]> {
    POLICIES
        .iter()
        .find(|policy| policy.method == *method && policy.pattern.is_match(path))
        .map(|policy| policy.allowed)
}

/// Whether `role` may call `method path`.
pub fn is_allowed(method: &Method, path: &str, role: UserRole) -> bool {
    match allowed_roles(method, path) {
        Some(allowed) => allowed.contains(&role),
        None => true,
    }
}
