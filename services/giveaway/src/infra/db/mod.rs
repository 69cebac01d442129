//! sea-orm implementations of the repository traits.

mod admin;
mod campaign;
mod claim;
mod invite_code;
mod otp;
mod verification;

pub use admin::{DbAdminUserRepository, DbSessionRepository};
pub use campaign::{DbCampaignRepository, DbCampaignVersionRepository};
pub use claim::DbClaimRepository;
pub use invite_code::DbInviteCodeRepository;
pub use otp::DbOtpRepository;
pub use verification::DbEmailVerificationRepository;

use sea_orm::{DbErr, SqlErr};

use crate::error::ApiError;

/// Map a unique-constraint violation to `conflict`; wrap anything else as internal.
fn conflict_or_internal(err: DbErr, conflict: ApiError, context: &'static str) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
        _ => anyhow::Error::new(err).context(context).into(),
    }
}
