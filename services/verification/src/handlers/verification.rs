use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{VerificationServiceError, VerifyRejection};
use crate::handlers::{client_ip, present};
use crate::state::AppState;
use crate::usecase::issue::{IssueCodeInput, IssueCodeUseCase};
use crate::usecase::verify::{VerifyCodeInput, VerifyCodeUseCase};

#[derive(Deserialize)]
pub struct IssueCodeRequest {
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub purpose: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct IssueCodeResponse {
    pub success: bool,
    pub message: &'static str,
}

pub async fn issue_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<IssueCodeRequest>, JsonRejection>,
) -> Result<Json<IssueCodeResponse>, VerificationServiceError> {
    let Json(body) =
        body.map_err(|_| VerificationServiceError::InvalidRequest("invalid JSON body"))?;
    let (Some(email), Some(purpose)) = (present(body.email), present(body.purpose)) else {
        return Err(VerificationServiceError::InvalidRequest(
            "email and type are required",
        ));
    };

    let usecase = IssueCodeUseCase {
        codes: state.code_repo(),
        bans: state.ban_repo(),
        mailer: state.mailer(),
        clock: state.clock(),
    };
    usecase
        .execute(IssueCodeInput {
            email,
            purpose,
            user_id: body.user_id,
            client_ip: client_ip(&headers),
        })
        .await?;
    Ok(Json(IssueCodeResponse {
        success: true,
        message: "Verification code sent",
    }))
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub purpose: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
    pub message: &'static str,
}

pub async fn verify_code(
    State(state): State<AppState>,
    body: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, VerifyRejection> {
    let Json(body) =
        body.map_err(|_| VerificationServiceError::InvalidRequest("invalid JSON body"))?;
    let (Some(email), Some(code), Some(purpose)) =
        (present(body.email), present(body.code), present(body.purpose))
    else {
        return Err(VerificationServiceError::InvalidRequest(
            "email, code and type are required",
        )
        .into());
    };

    let usecase = VerifyCodeUseCase {
        codes: state.code_repo(),
        clock: state.clock(),
    };
    usecase
        .execute(VerifyCodeInput {
            email,
            code,
            purpose,
        })
        .await?;
    Ok(Json(VerifyCodeResponse {
        valid: true,
        message: "Code verified successfully",
    }))
}
