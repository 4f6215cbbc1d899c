//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Participant, Session)
//! - Domain value objects (ParticipantId, WalletAddress, ArtifactRef)
//! - The participant store
//! - Domain services (winner resolution)
//! - Collaborator traits (evaluation, broadcast)

pub mod entities;
pub mod gateway;
pub mod participant_store;
pub mod services;
pub mod value_objects;
