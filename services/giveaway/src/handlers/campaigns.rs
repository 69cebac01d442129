use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::types::{Campaign, CampaignSettings, CampaignVersion, VersionStatus};
use crate::domain::types::AdminIdentity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::campaign::{
    CampaignDetail, CreateCampaignInput, CreateCampaignUseCase, DeleteCampaignUseCase,
    GetCampaignUseCase, ListCampaignsUseCase, UpdateCampaignUseCase,
};
use crate::usecase::version::{
    ListVersionsUseCase, PublishDraftUseCase, RevertVersionUseCase, SaveDraftUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub slug: String,
    #[serde(flatten)]
    pub settings: CampaignSettings,
    pub created_by: Option<Uuid>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            settings: c.settings,
            created_by: c.created_by,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CampaignDetailResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub claim_count: u64,
    pub confirmed_count: u64,
}

impl From<CampaignDetail> for CampaignDetailResponse {
    fn from(d: CampaignDetail) -> Self {
        Self {
            campaign: d.campaign.into(),
            claim_count: d.claim_count,
            confirmed_count: d.confirmed_count,
        }
    }
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub id: Uuid,
    pub version_number: Option<i32>,
    pub status: VersionStatus,
    pub settings: CampaignSettings,
    pub created_by: Option<Uuid>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "giveaway_core::serde::option_to_rfc3339_ms")]
    pub published_at: Option<DateTime<Utc>>,
}

impl From<CampaignVersion> for VersionResponse {
    fn from(v: CampaignVersion) -> Self {
        Self {
            id: v.id,
            version_number: v.version_number,
            status: v.status,
            settings: v.settings,
            created_by: v.created_by,
            created_at: v.created_at,
            published_at: v.published_at,
        }
    }
}

// ── POST /admin/campaigns ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub slug: String,
    #[serde(flatten)]
    pub settings: CampaignSettings,
}

pub async fn create_campaign(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), ApiError> {
    let usecase = CreateCampaignUseCase {
        campaigns: state.campaign_repo(),
    };
    let campaign = usecase
        .execute(
            identity,
            CreateCampaignInput {
                slug: body.slug,
                settings: body.settings,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(campaign.into())))
}

// ── GET /admin/campaigns ─────────────────────────────────────────────────────

pub async fn list_campaigns(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<CampaignResponse>>, ApiError> {
    let usecase = ListCampaignsUseCase {
        campaigns: state.campaign_repo(),
    };
    let campaigns = usecase.execute(identity).await?;
    Ok(Json(campaigns.into_iter().map(Into::into).collect()))
}

// ── GET /admin/campaigns/{id} ────────────────────────────────────────────────

pub async fn get_campaign(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignDetailResponse>, ApiError> {
    let usecase = GetCampaignUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    Ok(Json(usecase.execute(identity, id).await?.into()))
}

// ── PATCH /admin/campaigns/{id} ──────────────────────────────────────────────

pub async fn update_campaign(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let usecase = UpdateCampaignUseCase {
        campaigns: state.campaign_repo(),
    };
    Ok(Json(usecase.execute(identity, id, patch).await?.into()))
}

// ── DELETE /admin/campaigns/{id} ─────────────────────────────────────────────

pub async fn delete_campaign(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteCampaignUseCase {
        campaigns: state.campaign_repo(),
        claims: state.claim_repo(),
    };
    usecase.execute(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /admin/campaigns/{id}/draft ──────────────────────────────────────────

pub async fn save_draft(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<VersionResponse>, ApiError> {
    let usecase = SaveDraftUseCase {
        campaigns: state.campaign_repo(),
        versions: state.version_repo(),
    };
    Ok(Json(usecase.execute(identity, id, patch).await?.into()))
}

// ── POST /admin/campaigns/{id}/publish ───────────────────────────────────────

pub async fn publish_draft(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VersionResponse>, ApiError> {
    let usecase = PublishDraftUseCase {
        campaigns: state.campaign_repo(),
        versions: state.version_repo(),
    };
    Ok(Json(usecase.execute(identity, id).await?.into()))
}

// ── POST /admin/campaigns/{id}/revert ────────────────────────────────────────

#[derive(Deserialize)]
pub struct RevertRequest {
    pub version: i32,
}

pub async fn revert_version(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RevertRequest>,
) -> Result<Json<VersionResponse>, ApiError> {
    let usecase = RevertVersionUseCase {
        campaigns: state.campaign_repo(),
        versions: state.version_repo(),
    };
    Ok(Json(usecase.execute(identity, id, body.version).await?.into()))
}

// ── GET /admin/campaigns/{id}/versions ───────────────────────────────────────

pub async fn list_versions(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VersionResponse>>, ApiError> {
    let usecase = ListVersionsUseCase {
        campaigns: state.campaign_repo(),
        versions: state.version_repo(),
    };
    let versions = usecase.execute(identity, id).await?;
    Ok(Json(versions.into_iter().map(Into::into).collect()))
}
