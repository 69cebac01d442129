use chrono::{Duration, Utc};
use uuid::Uuid;

use giveaway_domain::hash::{generate_session_token, hash};

use crate::domain::repository::{AdminUserRepository, SessionRepository};
use crate::domain::types::{AdminIdentity, Session};
use crate::error::ApiError;

/// Issues, verifies and revokes admin sessions. Only token hashes touch storage.
pub struct SessionManager<S: SessionRepository> {
    pub sessions: S,
    pub ttl: Duration,
}

impl<S: SessionRepository> SessionManager<S> {
    /// Mint a session for the admin and return the raw token. The token is not kept.
    pub async fn create(
        &self,
        admin_id: Uuid,
        ip_hash: Option<String>,
        user_agent: Option<&str>,
    ) -> Result<String, ApiError> {
        let token = generate_session_token();
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            admin_id,
            token_hash: hash(&token),
            created_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
            ip_hash,
            user_agent_hash: user_agent.map(hash),
        };
        self.sessions.create(&session).await?;
        tracing::info!(admin_id = %admin_id, session_id = %session.id, "session created");
        Ok(token)
    }

    /// Active session for the token, or `None`. Never fails: storage errors
    /// are logged and treated as unauthenticated.
    pub async fn verify(&self, token: &str) -> Option<Session> {
        if token.is_empty() {
            return None;
        }
        match self.sessions.find_by_token_hash(&hash(token)).await {
            Ok(Some(session)) if session.is_active_at(Utc::now()) => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                None
            }
        }
    }

    /// Idempotent.
    pub async fn revoke(&self, token: &str) -> Result<(), ApiError> {
        if token.is_empty() {
            return Ok(());
        }
        self.sessions.revoke(&hash(token), Utc::now()).await?;
        tracing::info!("session revoked");
        Ok(())
    }
}

// ── Authenticate ─────────────────────────────────────────────────────────────

/// Resolve a presented session token into the identity of an active admin.
pub struct AuthenticateUseCase<S: SessionRepository, U: AdminUserRepository> {
    pub sessions: SessionManager<S>,
    pub admins: U,
}

impl<S: SessionRepository, U: AdminUserRepository> AuthenticateUseCase<S, U> {
    pub async fn execute(&self, token: &str) -> Result<AdminIdentity, ApiError> {
        let session = self
            .sessions
            .verify(token)
            .await
            .ok_or(ApiError::Unauthorized)?;
        let admin = self
            .admins
            .find_by_id(session.admin_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ApiError::Unauthorized)?;
        Ok(admin.identity())
    }
}
