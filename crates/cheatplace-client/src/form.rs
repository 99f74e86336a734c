//! Credential forms, validated before any network call.

use cheatplace_domain::verification::CodePurpose;
use validator::{Validate, ValidationErrors};

use crate::error::ClientError;

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Le nom d'utilisateur doit contenir entre 3 et 50 caractères"
    ))]
    pub username: String,
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Les mots de passe ne correspondent pas"))]
    pub confirm_password: String,
}

/// What the user submitted, kept intact across resends and retries.
#[derive(Debug, Clone)]
pub enum Credentials {
    Login(LoginForm),
    Signup(SignupForm),
}

impl Credentials {
    pub fn email(&self) -> &str {
        match self {
            Self::Login(f) => &f.email,
            Self::Signup(f) => &f.email,
        }
    }

    pub fn purpose(&self) -> CodePurpose {
        match self {
            Self::Login(_) => CodePurpose::Login,
            Self::Signup(_) => CodePurpose::Signup,
        }
    }

    /// Validates the form, reporting the first failing field in display order.
    pub fn validate(&self) -> Result<(), ClientError> {
        let (result, order) = match self {
            Self::Login(f) => (f.validate(), &["email", "password"][..]),
            Self::Signup(f) => (
                f.validate(),
                &["username", "email", "password", "confirm_password"][..],
            ),
        };
        result.map_err(|errors| ClientError::Validation(first_message(&errors, order)))
    }
}

fn first_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let fields = errors.field_errors();
    order
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}
