use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use cheatplace_auth_types::bearer::BearerToken;

use crate::error::VerificationServiceError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::ban::{BanUserInput, BanUserUseCase};
use crate::usecase::notify::{NotifyNewOfferInput, NotifyNewOfferUseCase};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub ban: bool,
}

#[derive(Serialize)]
pub struct BanUserResponse {
    pub success: bool,
    pub message: &'static str,
    pub email: String,
}

pub async fn ban_user(
    State(state): State<AppState>,
    bearer: BearerToken,
    body: Result<Json<BanUserRequest>, JsonRejection>,
) -> Result<Json<BanUserResponse>, VerificationServiceError> {
    let caller = authenticate(&state, &bearer)?;
    let Json(body) =
        body.map_err(|_| VerificationServiceError::InvalidRequest("invalid JSON body"))?;

    let usecase = BanUserUseCase {
        accounts: state.account_repo(),
        bans: state.ban_repo(),
        logs: state.activity_log_repo(),
    };
    let out = usecase
        .execute(BanUserInput {
            caller,
            user_id: body.user_id,
            ban: body.ban,
        })
        .await?;
    Ok(Json(BanUserResponse {
        success: true,
        message: out.message,
        email: out.email,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyNewOfferRequest {
    pub offer_title: Option<String>,
    pub offer_description: Option<String>,
}

#[derive(Serialize)]
pub struct NotifyNewOfferResponse {
    pub success: bool,
    pub message: String,
    pub recipients: usize,
}

pub async fn notify_new_offer(
    State(state): State<AppState>,
    bearer: BearerToken,
    body: Result<Json<NotifyNewOfferRequest>, JsonRejection>,
) -> Result<Json<NotifyNewOfferResponse>, VerificationServiceError> {
    let caller = authenticate(&state, &bearer)?;
    let Json(body) =
        body.map_err(|_| VerificationServiceError::InvalidRequest("invalid JSON body"))?;

    let usecase = NotifyNewOfferUseCase {
        accounts: state.account_repo(),
        mailer: state.mailer(),
    };
    let out = usecase
        .execute(NotifyNewOfferInput {
            caller,
            title: body.offer_title,
            description: body.offer_description,
        })
        .await?;
    Ok(Json(NotifyNewOfferResponse {
        success: true,
        message: out.message,
        recipients: out.recipients,
    }))
}
