//! Presentation Layer
//!
//! HTTP handlers and DTOs for the chat transport.

pub mod dto;
pub mod handlers;
pub mod router;
