//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and the external collaborators:
//! the session coordinator, its deadline timer and the finalize step.

pub mod config;
pub mod coordinator;
pub mod deadline_timer;
pub mod finalize;
