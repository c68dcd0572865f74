//! Repository layer: persistence plus explicit reference population.
//!
//! Mutating operations stamp creator references from the authenticated
//! identity and report a missing id as `None`/`false` for the handler to map
//! to `NotFound`. All operations are independent, non-transactional store
//! calls.

pub mod projects;
pub mod tasks;
pub mod users;
