//! Auth types shared across Cheatplace services.
//!
//! Provides validation of hosted-platform access tokens and the `BearerToken`
//! extractor.

pub mod bearer;
pub mod token;
