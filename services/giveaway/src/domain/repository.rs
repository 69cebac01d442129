#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use giveaway_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    AdminUser, BulkAction, Campaign, CampaignVersion, Claim, ClaimFilter, EmailVerification,
    InviteCode, OtpRequest, Session,
};
use crate::error::ApiError;

/// Administrator accounts.
pub trait AdminUserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminUser>, ApiError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, ApiError>;

    async fn list(&self) -> Result<Vec<AdminUser>, ApiError>;

    /// Fails with `EmailTaken` when the email is already registered.
    async fn create(&self, user: &AdminUser) -> Result<(), ApiError>;

    async fn update(&self, user: &AdminUser) -> Result<(), ApiError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Admin sessions, keyed by the hash of their token.
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), ApiError>;

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, ApiError>;

    /// Stamp `revoked_at` unless already revoked.
    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> Result<(), ApiError>;

    /// Revoke every live session of one admin. Returns the number revoked.
    async fn revoke_all_for_admin(&self, admin_id: Uuid, at: DateTime<Utc>)
    -> Result<u64, ApiError>;
}

/// One-time passcode requests.
pub trait OtpRepository: Send + Sync {
    async fn count_by_email_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError>;

    async fn count_by_ip_since(&self, ip_hash: &str, since: DateTime<Utc>)
    -> Result<u64, ApiError>;

    async fn create(&self, otp: &OtpRequest) -> Result<(), ApiError>;

    /// Most recently created request for the email that has not been used.
    async fn find_latest_unused(&self, email: &str) -> Result<Option<OtpRequest>, ApiError>;

    /// Spend one attempt if the request is unused and under its limit.
    /// Returns `false` when no attempt is left.
    async fn try_take_attempt(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Set `used_at` if still unset. Returns `false` when another request won.
    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, ApiError>;
}

pub trait CampaignRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, ApiError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Campaign>, ApiError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Campaign>, ApiError>;

    /// Fails with `SlugTaken` on a slug collision.
    async fn create(&self, campaign: &Campaign) -> Result<(), ApiError>;

    /// Fails with `SlugTaken` on a slug collision.
    async fn update(&self, campaign: &Campaign) -> Result<(), ApiError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Settings snapshots. At most one draft per campaign.
pub trait CampaignVersionRepository: Send + Sync {
    async fn find_draft(&self, campaign_id: Uuid) -> Result<Option<CampaignVersion>, ApiError>;

    /// Insert the draft, replacing any existing draft for the campaign.
    async fn save_draft(&self, draft: &CampaignVersion) -> Result<(), ApiError>;

    async fn find_published(
        &self,
        campaign_id: Uuid,
        version_number: i32,
    ) -> Result<Option<CampaignVersion>, ApiError>;

    /// Newest first; the draft, if any, leads.
    async fn list(&self, campaign_id: Uuid) -> Result<Vec<CampaignVersion>, ApiError>;

    /// Highest published version number, or 0.
    async fn latest_version_number(&self, campaign_id: Uuid) -> Result<i32, ApiError>;

    /// Write the campaign row and the published version in one transaction.
    /// A row with the same id as `version` (the draft) is replaced.
    async fn publish(&self, campaign: &Campaign, version: &CampaignVersion)
    -> Result<(), ApiError>;
}

pub trait ClaimRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, ApiError>;

    async fn find_by_claim_token(&self, token: &str) -> Result<Option<Claim>, ApiError>;

    async fn count_for_campaign(&self, campaign_id: Uuid) -> Result<u64, ApiError>;

    async fn count_confirmed(&self, campaign_id: Uuid) -> Result<u64, ApiError>;

    async fn count_by_ip_since(
        &self,
        campaign_id: Uuid,
        ip_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError>;

    async fn count_by_email(&self, campaign_id: Uuid, email_normalized: &str)
    -> Result<u64, ApiError>;

    async fn count_by_location(
        &self,
        campaign_id: Uuid,
        location_fingerprint: &str,
    ) -> Result<u64, ApiError>;

    /// Whether another claim in the campaign carries the fingerprint.
    async fn fingerprint_exists(
        &self,
        campaign_id: Uuid,
        fingerprint: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, ApiError>;

    /// Whether any claim in any campaign carries the fingerprint.
    async fn fingerprint_exists_anywhere(&self, fingerprint: &str) -> Result<bool, ApiError>;

    /// Fails with `DuplicateAddress` when the storage constraint rejects the fingerprint.
    async fn create(&self, claim: &Claim) -> Result<(), ApiError>;

    /// Insert all claims in one transaction.
    async fn create_many(&self, claims: &[Claim]) -> Result<(), ApiError>;

    /// Fails with `DuplicateAddress` when the storage constraint rejects the fingerprint.
    async fn update(&self, claim: &Claim) -> Result<(), ApiError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    async fn list(
        &self,
        campaign_id: Uuid,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<Page<Claim>, ApiError>;

    /// Every claim of the campaign, oldest first.
    async fn list_all(&self, campaign_id: Uuid) -> Result<Vec<Claim>, ApiError>;

    /// Apply a bulk action to the listed claims of one campaign. Returns rows affected.
    async fn bulk_apply(
        &self,
        campaign_id: Uuid,
        ids: &[Uuid],
        action: BulkAction,
        at: DateTime<Utc>,
    ) -> Result<u64, ApiError>;
}

pub trait InviteCodeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteCode>, ApiError>;

    /// `code` must already be normalized.
    async fn find_by_code(&self, campaign_id: Uuid, code: &str)
    -> Result<Option<InviteCode>, ApiError>;

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<InviteCode>, ApiError>;

    /// Fails with `InviteCodeTaken` when the campaign already has the code.
    async fn create(&self, code: &InviteCode) -> Result<(), ApiError>;

    async fn update(&self, code: &InviteCode) -> Result<(), ApiError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Increment `uses` if the code is active and under its cap, as one statement.
    /// Returns `false` when nothing was incremented.
    async fn try_consume(&self, id: Uuid) -> Result<bool, ApiError>;
}

pub trait EmailVerificationRepository: Send + Sync {
    async fn create(&self, verification: &EmailVerification) -> Result<(), ApiError>;

    /// Mark an unused, unexpired token used and confirm its claim in one
    /// transaction. Returns the confirmed claim id, or `None` if the token is
    /// unknown, expired or already used.
    async fn consume(&self, token_hash: &str, now: DateTime<Utc>)
    -> Result<Option<Uuid>, ApiError>;
}

/// Outbound transactional mail.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), ApiError>;
}
