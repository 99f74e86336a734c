//! Domain types shared across Cheatplace services and clients.
//!
//! This crate contains only pure types with no framework dependencies.
//! Shared by the verification service and the client library.

pub mod email;
pub mod id;
pub mod user;
pub mod verification;
