use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use giveaway_auth_types::role::{AdminRole, Permission};
use giveaway_domain::fingerprint::AddressParts;

use crate::error::ApiError;

/// OTP lifetime in minutes.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Wrong guesses allowed per OTP before it is dead.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// Rolling window for OTP request limits, in minutes.
pub const OTP_RATE_WINDOW_MINUTES: i64 = 60;

/// OTP requests allowed per email inside the window.
pub const OTP_MAX_REQUESTS_PER_EMAIL: u64 = 3;

/// OTP requests allowed per client IP inside the window.
pub const OTP_MAX_REQUESTS_PER_IP: u64 = 10;

/// Email verification link lifetime in hours.
pub const VERIFICATION_TTL_HOURS: i64 = 24;

/// Window for the per-IP claim limit, in hours.
pub const CLAIM_IP_WINDOW_HOURS: i64 = 24;

/// Upper bound on gift codes minted by one request.
pub const MAX_GIFT_CODES_PER_BATCH: u32 = 500;

// ── Admins and sessions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub display_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub profile: AdminProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            admin_id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Proof of an authenticated, active admin. Handed by value to every admin operation.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

impl AdminIdentity {
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub ip_hash: Option<String>,
    pub user_agent_hash: Option<String>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct OtpRequest {
    pub id: Uuid,
    pub email: String,
    pub otp_hash: String,
    pub ip_hash: Option<String>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OtpRequest {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

// ── Campaigns ────────────────────────────────────────────────────────────────

/// Every mutable campaign setting. Also the JSON body of a version snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSettings {
    pub title: String,
    /// `None` or `Some(0)` means unlimited.
    #[serde(default)]
    pub capacity_total: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub require_email: bool,
    #[serde(default)]
    pub require_email_verification: bool,
    #[serde(default)]
    pub require_invite_code: bool,
    #[serde(default)]
    pub show_scarcity: bool,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub kiosk_mode: bool,
    #[serde(default)]
    pub show_banner: bool,
    #[serde(default)]
    pub show_logo: bool,
    #[serde(default)]
    pub enable_questions: bool,
    /// 0 disables the limit.
    #[serde(default)]
    pub max_claims_per_email: i32,
    /// 0 disables the limit.
    #[serde(default)]
    pub max_claims_per_ip_per_day: i32,
    /// 0 disables the limit.
    #[serde(default)]
    pub max_claims_per_address: i32,
}

fn default_true() -> bool {
    true
}

impl CampaignSettings {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::MissingFields);
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end <= start {
                return Err(ApiError::InvalidInput("ends_at must be after starts_at".into()));
            }
        }
        let negative = [
            self.capacity_total.unwrap_or(0),
            self.max_claims_per_email,
            self.max_claims_per_ip_per_day,
            self.max_claims_per_address,
        ]
        .iter()
        .any(|n| *n < 0);
        if negative {
            return Err(ApiError::InvalidInput("limits must not be negative".into()));
        }
        Ok(())
    }

    /// Overlay the top-level keys of `patch` and re-validate.
    pub fn patched(&self, patch: &serde_json::Map<String, serde_json::Value>) -> Result<Self, ApiError> {
        let mut value = serde_json::to_value(self).context("encode campaign settings")?;
        if let Some(fields) = value.as_object_mut() {
            for (key, v) in patch {
                fields.insert(key.clone(), v.clone());
            }
        }
        let settings: Self =
            serde_json::from_value(value).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Capacity limit, or `None` when unlimited.
    pub fn capacity_limit(&self) -> Option<u64> {
        match self.capacity_total {
            Some(n) if n > 0 => Some(n as u64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: Uuid,
    pub slug: String,
    pub settings: CampaignSettings,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Fails unless `now` is inside the optional `[starts_at, ends_at)` window.
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), ApiError> {
        if let Some(start) = self.settings.starts_at {
            if now < start {
                return Err(ApiError::CampaignNotStarted);
            }
        }
        if let Some(end) = self.settings.ends_at {
            if now >= end {
                return Err(ApiError::CampaignEnded);
            }
        }
        Ok(())
    }
}

/// Slugs are lower-case ASCII letters, digits and hyphens, 1–64 chars.
pub fn is_valid_slug(slug: &str) -> bool {
    (1..=64).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft,
    Published,
}

impl VersionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampaignVersion {
    pub id: Uuid,
    pub campaign_id: Uuid,
    /// `None` while a draft.
    pub version_number: Option<i32>,
    pub status: VersionStatus,
    pub settings: CampaignSettings,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct InviteCode {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub code: String,
    pub uses: i32,
    pub max_uses: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn has_remaining_uses(&self) -> bool {
        self.max_uses.is_none_or(|max| self.uses < max)
    }
}

// ── Claims ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Confirmed,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Applicant {
    /// Trim every field; blank optionals become `None`.
    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: non_blank(self.email),
            company: non_blank(self.company),
            title: non_blank(self.title),
            phone: non_blank(self.phone),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn trimmed(self) -> Self {
        Self {
            address1: self.address1.trim().to_owned(),
            address2: non_blank(self.address2),
            city: self.city.trim().to_owned(),
            region: self.region.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_uppercase(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [
            &self.address1,
            &self.city,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|f| !f.is_empty())
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct Claim {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub status: ClaimStatus,
    pub applicant: Applicant,
    pub email_normalized: Option<String>,
    pub address: Address,
    pub address_fingerprint: String,
    pub location_fingerprint: Option<String>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub invite_code: Option<String>,
    pub is_test_claim: bool,
    pub claim_token: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Pre-created claims wait for their holder to supply an address.
    pub fn awaiting_address(&self) -> bool {
        self.address.address1.is_empty()
    }
}

/// Borrow the fingerprint inputs out of an applicant and address.
pub fn address_parts<'a>(applicant: &'a Applicant, address: &'a Address) -> AddressParts<'a> {
    AddressParts {
        first_name: &applicant.first_name,
        last_name: &applicant.last_name,
        address1: &address.address1,
        city: &address.city,
        region: &address.region,
        postal_code: &address.postal_code,
        country: &address.country,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Confirm,
    MarkShipped,
    Delete,
}

#[derive(Debug, Clone)]
pub struct EmailVerification {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
