//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Wallet address format validation
//! - Outbound HTTP client construction and JSON calls

pub mod http;
pub mod wallet;
