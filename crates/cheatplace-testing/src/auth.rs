//! Mock auth helpers for integration tests.
//!
//! Admin endpoints expect an access token signed by the identity platform.
//! `MockAuth` signs tokens with a test secret so no platform is needed.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use cheatplace_auth_types::token::PlatformClaims;

/// Secret shared by `MockAuth` and test service state.
pub const TEST_PLATFORM_SECRET: &str = "test-platform-secret-for-unit-tests-only";

/// Configurable identity turned into a signed access token.
pub struct MockAuth {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub secret: String,
}

impl MockAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            secret: TEST_PLATFORM_SECRET.to_owned(),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    /// Sign a token valid for one hour.
    pub fn token(&self) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        self.token_with_exp(exp)
    }

    pub fn token_with_exp(&self, exp: u64) -> String {
        let claims = PlatformClaims {
            sub: self.user_id.to_string(),
            email: self.email.clone(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .unwrap()
    }

    /// Return headers as the web client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap(),
        );
        map
    }
}
