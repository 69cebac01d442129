use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use giveaway_auth_types::role::AdminRole;
use giveaway_schema::{admin_sessions, admin_users};

use super::conflict_or_internal;
use crate::domain::repository::{AdminUserRepository, SessionRepository};
use crate::domain::types::{AdminProfile, AdminUser, Session};
use crate::error::ApiError;

// ── Admin user repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAdminUserRepository {
    pub db: DatabaseConnection,
}

impl AdminUserRepository for DbAdminUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminUser>, ApiError> {
        let model = admin_users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find admin by id")?;
        model.map(admin_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, ApiError> {
        let model = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find admin by email")?;
        model.map(admin_from_model).transpose()
    }

    async fn list(&self) -> Result<Vec<AdminUser>, ApiError> {
        let models = admin_users::Entity::find()
            .order_by_asc(admin_users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list admins")?;
        models.into_iter().map(admin_from_model).collect()
    }

    async fn create(&self, user: &AdminUser) -> Result<(), ApiError> {
        admin_users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            role: Set(user.role.as_str().to_owned()),
            is_active: Set(user.is_active),
            display_name: Set(user.profile.display_name.clone()),
            linkedin_url: Set(user.profile.linkedin_url.clone()),
            bio: Set(user.profile.bio.clone()),
            phone: Set(user.profile.phone.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, ApiError::EmailTaken, "create admin"))?;
        Ok(())
    }

    async fn update(&self, user: &AdminUser) -> Result<(), ApiError> {
        admin_users::ActiveModel {
            id: Set(user.id),
            role: Set(user.role.as_str().to_owned()),
            is_active: Set(user.is_active),
            display_name: Set(user.profile.display_name.clone()),
            linkedin_url: Set(user.profile.linkedin_url.clone()),
            bio: Set(user.profile.bio.clone()),
            phone: Set(user.profile.phone.clone()),
            updated_at: Set(user.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update admin")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = admin_users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete admin")?;
        Ok(result.rows_affected > 0)
    }
}

fn admin_from_model(model: admin_users::Model) -> Result<AdminUser, ApiError> {
    let role: AdminRole = model
        .role
        .parse()
        .with_context(|| format!("admin {} has unknown role", model.id))?;
    Ok(AdminUser {
        id: model.id,
        email: model.email,
        role,
        is_active: model.is_active,
        profile: AdminProfile {
            display_name: model.display_name,
            linkedin_url: model.linkedin_url,
            bio: model.bio,
            phone: model.phone,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), ApiError> {
        admin_sessions::ActiveModel {
            id: Set(session.id),
            admin_id: Set(session.admin_id),
            token_hash: Set(session.token_hash.clone()),
            created_at: Set(session.created_at),
            expires_at: Set(session.expires_at),
            revoked_at: Set(None),
            ip_hash: Set(session.ip_hash.clone()),
            user_agent_hash: Set(session.user_agent_hash.clone()),
        }
        .insert(&self.db)
        .await
        .context("create session")?;
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, ApiError> {
        let model = admin_sessions::Entity::find()
            .filter(admin_sessions::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .context("find session by token hash")?;
        Ok(model.map(session_from_model))
    }

    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> Result<(), ApiError> {
        admin_sessions::Entity::update_many()
            .col_expr(admin_sessions::Column::RevokedAt, Expr::value(at))
            .filter(admin_sessions::Column::TokenHash.eq(token_hash))
            .filter(admin_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .context("revoke session")?;
        Ok(())
    }

    async fn revoke_all_for_admin(
        &self,
        admin_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let result = admin_sessions::Entity::update_many()
            .col_expr(admin_sessions::Column::RevokedAt, Expr::value(at))
            .filter(admin_sessions::Column::AdminId.eq(admin_id))
            .filter(admin_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .context("revoke admin sessions")?;
        Ok(result.rows_affected)
    }
}

fn session_from_model(model: admin_sessions::Model) -> Session {
    Session {
        id: model.id,
        admin_id: model.admin_id,
        token_hash: model.token_hash,
        created_at: model.created_at,
        expires_at: model.expires_at,
        revoked_at: model.revoked_at,
        ip_hash: model.ip_hash,
        user_agent_hash: model.user_agent_hash,
    }
}
