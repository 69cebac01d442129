use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use giveaway_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Address, AdminIdentity, Applicant, BulkAction, Claim, ClaimFilter, ClaimStatus,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::admin_claim::{
    BulkClaimsUseCase, ClaimPatch, DeleteClaimUseCase, GenerateGiftCodesUseCase, GetClaimUseCase,
    ListClaimsUseCase, PrecreateClaimUseCase, PrecreatedClaim, RegisterClaimInput,
    RegisterClaimUseCase, UpdateClaimUseCase,
};
use crate::usecase::claim_csv::{ExportClaimsUseCase, ImportClaimsUseCase, ImportReport};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub status: ClaimStatus,
    #[serde(flatten)]
    pub applicant: Applicant,
    #[serde(flatten)]
    pub address: Address,
    pub invite_code: Option<String>,
    pub is_test_claim: bool,
    /// A pre-created claim whose holder has not filed an address yet.
    pub awaiting_address: bool,
    #[serde(serialize_with = "giveaway_core::serde::option_to_rfc3339_ms")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "giveaway_core::serde::option_to_rfc3339_ms")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(c: Claim) -> Self {
        Self {
            awaiting_address: c.claim_token.is_some() && c.awaiting_address(),
            id: c.id,
            campaign_id: c.campaign_id,
            status: c.status,
            applicant: c.applicant,
            address: c.address,
            invite_code: c.invite_code,
            is_test_claim: c.is_test_claim,
            confirmed_at: c.confirmed_at,
            shipped_at: c.shipped_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct PrecreatedResponse {
    pub claim_id: Uuid,
    pub token: String,
    pub link: String,
}

impl From<PrecreatedClaim> for PrecreatedResponse {
    fn from(p: PrecreatedClaim) -> Self {
        Self {
            claim_id: p.claim_id,
            token: p.token,
            link: p.link,
        }
    }
}

/// Applicant and address fields as admin forms post them.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ClaimFieldsRequest {
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
}

impl ClaimFieldsRequest {
    fn into_parts(self) -> (Applicant, Address) {
        (
            Applicant {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                company: self.company,
                title: self.title,
                phone: self.phone,
            },
            Address {
                address1: self.address1,
                address2: self.address2,
                city: self.city,
                region: self.region,
                postal_code: self.postal_code,
                country: self.country,
            },
        )
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClaimListQuery {
    pub status: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /admin/campaigns/{id}/claims ─────────────────────────────────────────

pub async fn list_claims(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<Page<ClaimResponse>>, ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            ClaimStatus::parse(s)
                .ok_or_else(|| ApiError::InvalidInput(format!("unknown status: {s}")))?,
        ),
        None => None,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };

    let usecase = ListClaimsUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    let claims = usecase
        .execute(identity, campaign_id, ClaimFilter { status }, page)
        .await?;
    Ok(Json(claims.map(Into::into)))
}

// ── POST /admin/campaigns/{id}/claims ────────────────────────────────────────

pub async fn register_claim(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(body): Json<ClaimFieldsRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let (applicant, address) = body.into_parts();
    let usecase = RegisterClaimUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    let claim = usecase
        .execute(
            identity,
            campaign_id,
            RegisterClaimInput { applicant, address },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

// ── POST /admin/campaigns/{id}/claims/bulk ───────────────────────────────────

#[derive(Deserialize)]
pub struct BulkRequest {
    pub action: BulkAction,
    #[serde(default)]
    pub claim_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct BulkResponse {
    pub affected: u64,
}

pub async fn bulk_claims(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(body): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    let usecase = BulkClaimsUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    let affected = usecase
        .execute(identity, campaign_id, body.action, body.claim_ids)
        .await?;
    Ok(Json(BulkResponse { affected }))
}

// ── GET /admin/campaigns/{id}/claims.csv ─────────────────────────────────────

pub async fn export_claims(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = ExportClaimsUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    let csv = usecase.execute(identity, campaign_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.filename),
            ),
        ],
        csv.body,
    ))
}

// ── POST /admin/campaigns/{id}/claims/import ─────────────────────────────────

pub async fn import_claims(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    let usecase = ImportClaimsUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(identity, campaign_id, &body).await?))
}

// ── POST /admin/campaigns/{id}/precreated ────────────────────────────────────

pub async fn precreate_claim(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(body): Json<ClaimFieldsRequest>,
) -> Result<(StatusCode, Json<PrecreatedResponse>), ApiError> {
    let (applicant, _) = body.into_parts();
    let usecase = PrecreateClaimUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
        public_base_url: state.public_base_url.clone(),
    };
    let created = usecase.execute(identity, campaign_id, applicant).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

// ── POST /admin/campaigns/{id}/gift-codes ────────────────────────────────────

#[derive(Deserialize)]
pub struct GiftCodesRequest {
    pub count: u32,
}

pub async fn generate_gift_codes(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(body): Json<GiftCodesRequest>,
) -> Result<(StatusCode, Json<Vec<PrecreatedResponse>>), ApiError> {
    let usecase = GenerateGiftCodesUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
        public_base_url: state.public_base_url.clone(),
    };
    let codes = usecase.execute(identity, campaign_id, body.count).await?;
    Ok((
        StatusCode::CREATED,
        Json(codes.into_iter().map(Into::into).collect()),
    ))
}

// ── GET /admin/claims/{id} ───────────────────────────────────────────────────

pub async fn get_claim(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let usecase = GetClaimUseCase {
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(identity, id).await?.into()))
}

// ── PATCH /admin/claims/{id} ─────────────────────────────────────────────────

pub async fn update_claim(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ClaimPatch>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let usecase = UpdateClaimUseCase {
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(identity, id, patch).await?.into()))
}

// ── DELETE /admin/claims/{id} ────────────────────────────────────────────────

pub async fn delete_claim(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteClaimUseCase {
        claims: state.claim_repo(),
    };
    usecase.execute(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
