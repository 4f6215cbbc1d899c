//! Infrastructure Layer
//!
//! HTTP adapters for the evaluation service and the chat transport.

pub mod http_evaluation;
pub mod telegram;
