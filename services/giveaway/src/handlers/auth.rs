use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use giveaway_auth_types::cookie::{clear_session_cookie, set_session_cookie};

use crate::domain::types::AdminIdentity;
use crate::error::ApiError;
use crate::handlers::extract::{ClientMeta, session_token};
use crate::handlers::users::AdminResponse;
use crate::state::AppState;
use crate::usecase::admin_user::GetMeUseCase;
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ── POST /auth/request-otp ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn request_otp(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(body): Json<RequestOtpRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = RequestOtpUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RequestOtpInput {
            email: body.email,
            ip_hash: meta.ip_hash,
        })
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

// ── POST /auth/verify-otp ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    meta: ClientMeta,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<OkResponse>), ApiError> {
    let usecase = VerifyOtpUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        sessions: state.session_manager(),
    };
    let output = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            otp: body.otp,
            ip_hash: meta.ip_hash,
            user_agent: meta.user_agent,
        })
        .await?;
    let jar = set_session_cookie(jar, output.token, &state.cookie);
    Ok((jar, Json(OkResponse { ok: true })))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<OkResponse>), ApiError> {
    if let Some(token) = session_token(&headers) {
        state.session_manager().revoke(&token).await?;
    }
    let jar = clear_session_cookie(jar, &state.cookie);
    Ok((jar, Json(OkResponse { ok: true })))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

pub async fn current_session(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<AdminResponse>, ApiError> {
    let usecase = GetMeUseCase {
        admins: state.admin_repo(),
    };
    let admin = usecase.execute(identity).await?;
    Ok(Json(admin.into()))
}
