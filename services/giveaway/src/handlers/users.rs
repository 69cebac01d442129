use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use giveaway_auth_types::role::AdminRole;

use crate::domain::types::{AdminIdentity, AdminProfile, AdminUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::admin_user::{
    CreateAdminInput, CreateAdminUseCase, DeleteAdminUseCase, GetMeUseCase, ListAdminsUseCase,
    ProfilePatch, UpdateAdminInput, UpdateAdminUseCase, UpdateMeUseCase,
};

#[derive(Serialize)]
pub struct AdminResponse {
    pub id: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub is_active: bool,
    #[serde(flatten)]
    pub profile: AdminProfile,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "giveaway_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUser> for AdminResponse {
    fn from(a: AdminUser) -> Self {
        Self {
            id: a.id,
            email: a.email,
            role: a.role,
            is_active: a.is_active,
            profile: a.profile,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

pub async fn list_admins(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminResponse>>, ApiError> {
    let usecase = ListAdminsUseCase {
        admins: state.admin_repo(),
    };
    let admins = usecase.execute(identity).await?;
    Ok(Json(admins.into_iter().map(Into::into).collect()))
}

// ── POST /admin/users ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub email: String,
    pub role: AdminRole,
    #[serde(flatten)]
    pub profile: AdminProfile,
}

pub async fn create_admin(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), ApiError> {
    let usecase = CreateAdminUseCase {
        admins: state.admin_repo(),
    };
    let admin = usecase
        .execute(
            identity,
            CreateAdminInput {
                email: body.email,
                role: body.role,
                profile: body.profile,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}

// ── PATCH /admin/users/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAdminRequest {
    pub role: Option<AdminRole>,
    pub is_active: Option<bool>,
}

pub async fn update_admin(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAdminRequest>,
) -> Result<Json<AdminResponse>, ApiError> {
    let usecase = UpdateAdminUseCase {
        admins: state.admin_repo(),
        sessions: state.session_repo(),
    };
    let admin = usecase
        .execute(
            identity,
            id,
            UpdateAdminInput {
                role: body.role,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(admin.into()))
}

// ── DELETE /admin/users/{id} ─────────────────────────────────────────────────

pub async fn delete_admin(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteAdminUseCase {
        admins: state.admin_repo(),
        sessions: state.session_repo(),
    };
    usecase.execute(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<AdminResponse>, ApiError> {
    let usecase = GetMeUseCase {
        admins: state.admin_repo(),
    };
    Ok(Json(usecase.execute(identity).await?.into()))
}

// ── PATCH /admin/me ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub display_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

pub async fn update_me(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<AdminResponse>, ApiError> {
    let usecase = UpdateMeUseCase {
        admins: state.admin_repo(),
    };
    let admin = usecase
        .execute(
            identity,
            ProfilePatch {
                display_name: body.display_name,
                linkedin_url: body.linkedin_url,
                bio: body.bio,
                phone: body.phone,
            },
        )
        .await?;
    Ok(Json(admin.into()))
}
