use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use giveaway_auth_types::cookie::CookieSettings;

use crate::infra::db::{
    DbAdminUserRepository, DbCampaignRepository, DbCampaignVersionRepository, DbClaimRepository,
    DbEmailVerificationRepository, DbInviteCodeRepository, DbOtpRepository, DbSessionRepository,
};
use crate::infra::mail::HttpMailer;
use crate::usecase::session::SessionManager;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: HttpMailer,
    /// Origin for links in outbound mail, without a trailing slash.
    pub public_base_url: String,
    pub cookie: CookieSettings,
    pub session_ttl: chrono::Duration,
    /// Take the client address from `X-Forwarded-For`/`X-Real-IP`.
    pub trust_proxy_headers: bool,
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl AppState {
    pub fn admin_repo(&self) -> DbAdminUserRepository {
        DbAdminUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn campaign_repo(&self) -> DbCampaignRepository {
        DbCampaignRepository {
            db: self.db.clone(),
        }
    }

    pub fn version_repo(&self) -> DbCampaignVersionRepository {
        DbCampaignVersionRepository {
            db: self.db.clone(),
        }
    }

    pub fn claim_repo(&self) -> DbClaimRepository {
        DbClaimRepository {
            db: self.db.clone(),
        }
    }

    pub fn invite_code_repo(&self) -> DbInviteCodeRepository {
        DbInviteCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbEmailVerificationRepository {
        DbEmailVerificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_manager(&self) -> SessionManager<DbSessionRepository> {
        SessionManager {
            sessions: self.session_repo(),
            ttl: self.session_ttl,
        }
    }
}
