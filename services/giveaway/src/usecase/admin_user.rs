use chrono::Utc;
use uuid::Uuid;

use giveaway_auth_types::role::{AdminRole, Permission};
use giveaway_domain::email::{is_valid_email, normalize_email};

use crate::domain::repository::{AdminUserRepository, SessionRepository};
use crate::domain::types::{AdminIdentity, AdminProfile, AdminUser, non_blank};
use crate::error::ApiError;

async fn load_admin<U: AdminUserRepository>(admins: &U, id: Uuid) -> Result<AdminUser, ApiError> {
    admins.find_by_id(id).await?.ok_or(ApiError::UserNotFound)
}

fn checked_profile(profile: AdminProfile) -> Result<AdminProfile, ApiError> {
    let profile = AdminProfile {
        display_name: non_blank(profile.display_name),
        linkedin_url: non_blank(profile.linkedin_url),
        bio: non_blank(profile.bio),
        phone: non_blank(profile.phone),
    };
    if let Some(url) = profile.linkedin_url.as_deref() {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ApiError::InvalidInput("linkedin_url must be an http(s) URL".into()));
        }
    }
    Ok(profile)
}

// ── User management ──────────────────────────────────────────────────────────

pub struct ListAdminsUseCase<U: AdminUserRepository> {
    pub admins: U,
}

impl<U: AdminUserRepository> ListAdminsUseCase<U> {
    pub async fn execute(&self, identity: AdminIdentity) -> Result<Vec<AdminUser>, ApiError> {
        identity.require(Permission::ManageUsers)?;
        self.admins.list().await
    }
}

pub struct CreateAdminInput {
    pub email: String,
    pub role: AdminRole,
    pub profile: AdminProfile,
}

pub struct CreateAdminUseCase<U: AdminUserRepository> {
    pub admins: U,
}

impl<U: AdminUserRepository> CreateAdminUseCase<U> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        input: CreateAdminInput,
    ) -> Result<AdminUser, ApiError> {
        identity.require(Permission::ManageUsers)?;
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(ApiError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(ApiError::InvalidEmail);
        }

        let now = Utc::now();
        let admin = AdminUser {
            id: Uuid::new_v4(),
            email,
            role: input.role,
            is_active: true,
            profile: checked_profile(input.profile)?,
            created_at: now,
            updated_at: now,
        };
        self.admins.create(&admin).await?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, by = %identity.admin_id, "admin created");
        Ok(admin)
    }
}

#[derive(Debug, Default)]
pub struct UpdateAdminInput {
    pub role: Option<AdminRole>,
    pub is_active: Option<bool>,
}

pub struct UpdateAdminUseCase<U: AdminUserRepository, S: SessionRepository> {
    pub admins: U,
    pub sessions: S,
}

impl<U: AdminUserRepository, S: SessionRepository> UpdateAdminUseCase<U, S> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        id: Uuid,
        input: UpdateAdminInput,
    ) -> Result<AdminUser, ApiError> {
        identity.require(Permission::ManageUsers)?;
        let mut admin = load_admin(&self.admins, id).await?;

        if id == identity.admin_id {
            let demoting = input.role.is_some_and(|r| r != admin.role);
            let deactivating = input.is_active == Some(false);
            if demoting || deactivating {
                return Err(ApiError::Forbidden);
            }
        }

        let was_active = admin.is_active;
        if let Some(role) = input.role {
            admin.role = role;
        }
        if let Some(is_active) = input.is_active {
            admin.is_active = is_active;
        }
        admin.updated_at = Utc::now();
        self.admins.update(&admin).await?;

        if was_active && !admin.is_active {
            let revoked = self
                .sessions
                .revoke_all_for_admin(admin.id, admin.updated_at)
                .await?;
            tracing::info!(admin_id = %admin.id, revoked, "admin deactivated");
        }
        Ok(admin)
    }
}

pub struct DeleteAdminUseCase<U: AdminUserRepository, S: SessionRepository> {
    pub admins: U,
    pub sessions: S,
}

impl<U: AdminUserRepository, S: SessionRepository> DeleteAdminUseCase<U, S> {
    pub async fn execute(&self, identity: AdminIdentity, id: Uuid) -> Result<(), ApiError> {
        identity.require(Permission::ManageUsers)?;
        if id == identity.admin_id {
            return Err(ApiError::Forbidden);
        }
        load_admin(&self.admins, id).await?;
        self.sessions.revoke_all_for_admin(id, Utc::now()).await?;
        if !self.admins.delete(id).await? {
            return Err(ApiError::UserNotFound);
        }
        tracing::info!(admin_id = %id, by = %identity.admin_id, "admin deleted");
        Ok(())
    }
}

// ── Own profile ──────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: AdminUserRepository> {
    pub admins: U,
}

impl<U: AdminUserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, identity: AdminIdentity) -> Result<AdminUser, ApiError> {
        load_admin(&self.admins, identity.admin_id).await
    }
}

/// Each `Some` replaces the field; a blank string clears it.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

pub struct UpdateMeUseCase<U: AdminUserRepository> {
    pub admins: U,
}

impl<U: AdminUserRepository> UpdateMeUseCase<U> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        patch: ProfilePatch,
    ) -> Result<AdminUser, ApiError> {
        let mut admin = load_admin(&self.admins, identity.admin_id).await?;
        let mut profile = admin.profile.clone();
        if patch.display_name.is_some() {
            profile.display_name = patch.display_name;
        }
        if patch.linkedin_url.is_some() {
            profile.linkedin_url = patch.linkedin_url;
        }
        if patch.bio.is_some() {
            profile.bio = patch.bio;
        }
        if patch.phone.is_some() {
            profile.phone = patch.phone;
        }
        admin.profile = checked_profile(profile)?;
        admin.updated_at = Utc::now();
        self.admins.update(&admin).await?;
        Ok(admin)
    }
}
