use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::types::{AdminIdentity, InviteCode};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::invite_code::{
    CreateInviteCodeInput, CreateInviteCodeUseCase, DeleteInviteCodeUseCase,
    ListInviteCodesUseCase, UpdateInviteCodeInput, UpdateInviteCodeUseCase,
};

#[derive(Serialize)]
pub struct InviteCodeResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub code: String,
    pub uses: i32,
    pub max_uses: Option<i32>,
    pub is_active: bool,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<InviteCode> for InviteCodeResponse {
    fn from(c: InviteCode) -> Self {
        Self {
            id: c.id,
            campaign_id: c.campaign_id,
            code: c.code,
            uses: c.uses,
            max_uses: c.max_uses,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

// ── POST /admin/campaigns/{id}/invite-codes ──────────────────────────────────

#[derive(Deserialize)]
pub struct CreateInviteCodeRequest {
    #[serde(default)]
    pub code: String,
    pub max_uses: Option<i32>,
}

pub async fn create_invite_code(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(body): Json<CreateInviteCodeRequest>,
) -> Result<(StatusCode, Json<InviteCodeResponse>), ApiError> {
    let usecase = CreateInviteCodeUseCase {
        campaigns: state.campaign_repo(),
        invite_codes: state.invite_code_repo(),
    };
    let invite = usecase
        .execute(
            identity,
            campaign_id,
            CreateInviteCodeInput {
                code: body.code,
                max_uses: body.max_uses,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}

// ── GET /admin/campaigns/{id}/invite-codes ───────────────────────────────────

pub async fn list_invite_codes(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<InviteCodeResponse>>, ApiError> {
    let usecase = ListInviteCodesUseCase {
        campaigns: state.campaign_repo(),
        invite_codes: state.invite_code_repo(),
    };
    let codes = usecase.execute(identity, campaign_id).await?;
    Ok(Json(codes.into_iter().map(Into::into).collect()))
}

// ── PATCH /admin/invite-codes/{id} ───────────────────────────────────────────

/// Absent leaves the field alone; explicit `null` becomes `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct UpdateInviteCodeRequest {
    #[serde(default, deserialize_with = "present")]
    pub max_uses: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

pub async fn update_invite_code(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInviteCodeRequest>,
) -> Result<Json<InviteCodeResponse>, ApiError> {
    let usecase = UpdateInviteCodeUseCase {
        invite_codes: state.invite_code_repo(),
    };
    let invite = usecase
        .execute(
            identity,
            id,
            UpdateInviteCodeInput {
                max_uses: body.max_uses,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(invite.into()))
}

// ── DELETE /admin/invite-codes/{id} ──────────────────────────────────────────

pub async fn delete_invite_code(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteInviteCodeUseCase {
        invite_codes: state.invite_code_repo(),
    };
    usecase.execute(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
