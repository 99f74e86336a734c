//! Cross-cutting plumbing shared by Cheatplace services: configuration,
//! tracing, health probes and HTTP middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
