use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Address, Applicant};
use crate::error::ApiError;
use crate::handlers::extract::ClientMeta;
use crate::state::AppState;
use crate::usecase::claim::{
    GetPublicCampaignUseCase, PublicCampaign, SubmitClaimInput, SubmitClaimUseCase,
    VerifyEmailUseCase,
};
use crate::usecase::claim_token::{
    ClaimTokenView, CompleteClaimTokenInput, CompleteClaimTokenUseCase, GetClaimTokenUseCase,
};

/// Applicant and address as the public form posts them.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub invite_code: Option<String>,
}

impl ClaimForm {
    fn split(self) -> (Applicant, Address, Option<String>) {
        let applicant = Applicant {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            company: self.company,
            title: self.title,
            phone: self.phone,
        };
        let address = Address {
            address1: self.address1,
            address2: self.address2,
            city: self.city,
            region: self.region,
            postal_code: self.postal_code,
            country: self.country,
        };
        (applicant, address, self.invite_code)
    }
}

// ── GET /campaigns/{slug} ────────────────────────────────────────────────────

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicCampaign>, ApiError> {
    let usecase = GetPublicCampaignUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(&slug).await?))
}

// ── POST /campaigns/{slug}/claim ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimResponse {
    pub ok: bool,
    pub requires_verification: bool,
    pub claim_id: Uuid,
}

pub async fn submit_claim(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    meta: ClientMeta,
    Json(form): Json<ClaimForm>,
) -> Result<Json<SubmitClaimResponse>, ApiError> {
    let (applicant, address, invite_code) = form.split();
    let usecase = SubmitClaimUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
        invite_codes: state.invite_code_repo(),
        verifications: state.verification_repo(),
        mailer: state.mailer.clone(),
        public_base_url: state.public_base_url.clone(),
    };
    let output = usecase
        .execute(SubmitClaimInput {
            slug,
            applicant,
            address,
            invite_code,
            ip_hash: meta.ip_hash,
            user_agent: meta.user_agent,
        })
        .await?;
    Ok(Json(SubmitClaimResponse {
        ok: true,
        requires_verification: output.requires_verification,
        claim_id: output.claim_id,
    }))
}

// ── GET /verify?token= ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub token: String,
}

fn page(title: &str, message: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><main><h1>{title}</h1><p>{message}</p></main></body></html>"
    ))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let usecase = VerifyEmailUseCase {
        verifications: state.verification_repo(),
    };
    verification_page(usecase.execute(&query.token).await)
}

/// The link is opened in a browser, so every outcome renders a page.
fn verification_page(result: Result<Uuid, ApiError>) -> Response {
    match result {
        Ok(_) => (
            StatusCode::OK,
            page("Request confirmed", "Thanks! Your request has been confirmed."),
        )
            .into_response(),
        Err(ApiError::InvalidVerificationToken) => (
            StatusCode::BAD_REQUEST,
            page("Link not valid", "This link is invalid or already used."),
        )
            .into_response(),
        Err(e) => {
            if let ApiError::Internal(ref inner) = e {
                tracing::error!(error = format!("{inner:#}"), kind = "INTERNAL", "internal error");
            }
            (
                e.status(),
                page(
                    "Something went wrong",
                    "We could not confirm your request. Please try the link again later.",
                ),
            )
                .into_response()
        }
    }
}

// ── GET /claim-token/{token} ─────────────────────────────────────────────────

pub async fn get_claim_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ClaimTokenView>, ApiError> {
    let usecase = GetClaimTokenUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(&token).await?))
}

// ── POST /claim-token/{token} ────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteClaimResponse {
    pub ok: bool,
    pub claim_id: Uuid,
}

pub async fn complete_claim_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(form): Json<ClaimForm>,
) -> Result<Json<CompleteClaimResponse>, ApiError> {
    let (applicant, address, _) = form.split();
    let usecase = CompleteClaimTokenUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    let claim_id = usecase
        .execute(CompleteClaimTokenInput {
            token,
            applicant,
            address,
        })
        .await?;
    Ok(Json(CompleteClaimResponse { ok: true, claim_id }))
}
