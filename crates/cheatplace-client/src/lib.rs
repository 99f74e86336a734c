//! Client-side sequencing of the email verification step.
//!
//! A sign-in or sign-up only reaches the identity platform after the user has
//! proven control of the address with a code issued by the verification
//! service. [`flow::AuthFlow`] drives that sequence; [`api::VerificationApi`]
//! and [`identity::PlatformIdentityProvider`] are the HTTP collaborators.

pub mod api;
pub mod error;
pub mod flow;
pub mod form;
pub mod identity;

pub use error::ClientError;
