//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified [`error::app_error::AppError`] type and its result alias
//! - Error classification ([`error::kind::ErrorKind`]) mapped to HTTP status codes
//! - Typed identifiers ([`id::Id`])
//!
//! Only things with a stable meaning across the whole backend belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
