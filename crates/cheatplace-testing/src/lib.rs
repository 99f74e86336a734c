//! Test utilities for Cheatplace services.
//!
//! Provides `MockAuth` for minting platform access tokens and the contract
//! fixture loader. Import from `[dev-dependencies]` only. Never use it in production code.

pub mod auth;
pub mod fixture;
