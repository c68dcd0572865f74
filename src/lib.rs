#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Task and project management REST API: domain models, authentication and"]
#![doc = "access control, repositories with explicit reference population, the"]
#![doc = "dashboard aggregation service, routing, configuration, and error"]
#![doc = "handling. The binary (`main.rs`) assembles these into the running server."]

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod repo;
pub mod routes;
