use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use giveaway_domain::email::{is_valid_email, normalize_email};
use giveaway_domain::fingerprint::{address_fingerprint, location_fingerprint};
use giveaway_domain::hash::{generate_session_token, hash};

use crate::domain::repository::{
    CampaignRepository, ClaimRepository, EmailVerificationRepository, InviteCodeRepository, Mailer,
};
use crate::domain::types::{
    Address, Applicant, CLAIM_IP_WINDOW_HOURS, Campaign, Claim, ClaimStatus, EmailVerification,
    InviteCode, VERIFICATION_TTL_HOURS, address_parts,
};
use crate::error::ApiError;

// ── Submit ───────────────────────────────────────────────────────────────────

pub struct SubmitClaimInput {
    pub slug: String,
    pub applicant: Applicant,
    pub address: Address,
    pub invite_code: Option<String>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct SubmitClaimOutput {
    pub claim_id: Uuid,
    pub requires_verification: bool,
}

pub struct SubmitClaimUseCase<Ca, Cl, I, V, M>
where
    Ca: CampaignRepository,
    Cl: ClaimRepository,
    I: InviteCodeRepository,
    V: EmailVerificationRepository,
    M: Mailer,
{
    pub campaigns: Ca,
    pub claims: Cl,
    pub invite_codes: I,
    pub verifications: V,
    pub mailer: M,
    pub public_base_url: String,
}

impl<Ca, Cl, I, V, M> SubmitClaimUseCase<Ca, Cl, I, V, M>
where
    Ca: CampaignRepository,
    Cl: ClaimRepository,
    I: InviteCodeRepository,
    V: EmailVerificationRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: SubmitClaimInput) -> Result<SubmitClaimOutput, ApiError> {
        let now = Utc::now();

        // 1. Campaign exists and is active
        let campaign = self
            .campaigns
            .find_by_slug(&input.slug)
            .await?
            .ok_or(ApiError::CampaignNotFound)?;
        if !campaign.settings.is_active {
            return Err(ApiError::CampaignClosed);
        }

        // 2. Inside the window
        campaign.check_window(now)?;

        // 3. Name and full postal address
        let applicant = input.applicant.trimmed();
        let address = input.address.trimmed();
        if !applicant.has_name() || !address.is_complete() {
            return Err(ApiError::MissingFields);
        }

        // 4. Email, when required (verification implies it)
        let settings = &campaign.settings;
        let email_normalized = applicant.email.as_deref().map(normalize_email);
        match email_normalized.as_deref() {
            None if settings.require_email || settings.require_email_verification => {
                return Err(ApiError::EmailRequired);
            }
            Some(email) if !is_valid_email(email) => return Err(ApiError::InvalidEmail),
            _ => {}
        }

        // 5. Invite code, consumed on success
        let invite_code = input
            .invite_code
            .as_deref()
            .map(InviteCode::normalize)
            .filter(|c| !c.is_empty());
        if settings.require_invite_code {
            self.consume_invite_code(campaign.id, invite_code.as_deref())
                .await?;
        }

        // 6. Capacity
        if let Some(limit) = settings.capacity_limit() {
            if self.claims.count_confirmed(campaign.id).await? >= limit {
                return Err(ApiError::CapacityReached);
            }
        }

        // 7. Per-IP daily limit
        if let (Ok(limit @ 1..), Some(ip_hash)) = (
            u64::try_from(settings.max_claims_per_ip_per_day),
            input.ip_hash.as_deref(),
        ) {
            let since = now - Duration::hours(CLAIM_IP_WINDOW_HOURS);
            if self.claims.count_by_ip_since(campaign.id, ip_hash, since).await? >= limit {
                return Err(ApiError::RateLimited);
            }
        }

        // 8. Duplicate address within the campaign
        let parts = address_parts(&applicant, &address);
        let fingerprint = address_fingerprint(&parts);
        let location = location_fingerprint(&parts);
        if self
            .claims
            .fingerprint_exists(campaign.id, &fingerprint, None)
            .await?
        {
            return Err(ApiError::DuplicateAddress);
        }

        // 8b. Claimants per location
        if let Ok(limit @ 1..) = u64::try_from(settings.max_claims_per_address) {
            if self.claims.count_by_location(campaign.id, &location).await? >= limit {
                return Err(ApiError::TooManyClaimsAtAddress);
            }
        }

        // 9. Claims per email
        if let (Ok(limit @ 1..), Some(email)) = (
            u64::try_from(settings.max_claims_per_email),
            email_normalized.as_deref(),
        ) {
            if self.claims.count_by_email(campaign.id, email).await? >= limit {
                return Err(ApiError::TooManyClaimsForEmail);
            }
        }

        let requires_verification = settings.require_email_verification;
        let (status, confirmed_at) = if requires_verification {
            (ClaimStatus::Pending, None)
        } else {
            (ClaimStatus::Confirmed, Some(now))
        };
        let claim = Claim {
            id: Uuid::new_v4(),
            campaign_id: campaign.id,
            status,
            applicant,
            email_normalized,
            address,
            address_fingerprint: fingerprint,
            location_fingerprint: Some(location),
            ip_hash: input.ip_hash,
            user_agent: input.user_agent,
            invite_code,
            is_test_claim: settings.test_mode,
            claim_token: None,
            confirmed_at,
            shipped_at: None,
            created_at: now,
            updated_at: now,
        };
        self.claims.create(&claim).await?;
        tracing::info!(
            claim_id = %claim.id,
            campaign_id = %campaign.id,
            status = claim.status.as_str(),
            "claim submitted"
        );

        if requires_verification {
            self.send_verification(&campaign, &claim, now).await;
        }

        Ok(SubmitClaimOutput {
            claim_id: claim.id,
            requires_verification,
        })
    }

    async fn consume_invite_code(&self, campaign_id: Uuid, code: Option<&str>) -> Result<(), ApiError> {
        let code = code.ok_or(ApiError::InvalidInviteCode)?;
        let invite = self
            .invite_codes
            .find_by_code(campaign_id, code)
            .await?
            .filter(|c| c.is_active && c.has_remaining_uses())
            .ok_or(ApiError::InvalidInviteCode)?;
        if !self.invite_codes.try_consume(invite.id).await? {
            return Err(ApiError::InvalidInviteCode);
        }
        Ok(())
    }

    /// Best effort: the claim stays pending if this fails.
    async fn send_verification(&self, campaign: &Campaign, claim: &Claim, now: DateTime<Utc>) {
        let Some(email) = claim.applicant.email.as_deref() else {
            return;
        };
        let token = generate_session_token();
        let verification = EmailVerification {
            id: Uuid::new_v4(),
            claim_id: claim.id,
            token_hash: hash(&token),
            expires_at: now + Duration::hours(VERIFICATION_TTL_HOURS),
            used_at: None,
            created_at: now,
        };
        if let Err(e) = self.verifications.create(&verification).await {
            tracing::warn!(claim_id = %claim.id, error = %e, "could not store email verification");
            return;
        }
        let link = format!("{}/verify?token={token}", self.public_base_url);
        let text = format!(
            "Please confirm your request for {}.\n\n{link}\n\nThis link expires in {VERIFICATION_TTL_HOURS} hours.",
            campaign.settings.title
        );
        if let Err(e) = self.mailer.send(email, "Confirm your request", &text).await {
            tracing::warn!(claim_id = %claim.id, error = %e, "verification email not sent");
        }
    }
}

// ── Verify email ─────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<V: EmailVerificationRepository> {
    pub verifications: V,
}

impl<V: EmailVerificationRepository> VerifyEmailUseCase<V> {
    /// Confirm the claim bound to the token. Returns the claim id.
    pub async fn execute(&self, token: &str) -> Result<Uuid, ApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::InvalidVerificationToken);
        }
        let claim_id = self
            .verifications
            .consume(&hash(token), Utc::now())
            .await?
            .ok_or(ApiError::InvalidVerificationToken)?;
        tracing::info!(claim_id = %claim_id, "claim confirmed by email");
        Ok(claim_id)
    }
}

// ── Public campaign view ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCampaign {
    pub slug: String,
    pub title: String,
    #[serde(serialize_with = "giveaway_core::serde::option_to_rfc3339_ms")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "giveaway_core::serde::option_to_rfc3339_ms")]
    pub ends_at: Option<DateTime<Utc>>,
    pub require_email: bool,
    pub require_invite_code: bool,
    pub kiosk_mode: bool,
    pub show_banner: bool,
    pub show_logo: bool,
    pub enable_questions: bool,
    /// Present only when the campaign shows scarcity and has a capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
}

pub struct GetPublicCampaignUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> GetPublicCampaignUseCase<Ca, Cl> {
    pub async fn execute(&self, slug: &str) -> Result<PublicCampaign, ApiError> {
        let campaign = self
            .campaigns
            .find_by_slug(slug)
            .await?
            .filter(|c| c.settings.is_active)
            .ok_or(ApiError::CampaignNotFound)?;
        let s = &campaign.settings;

        let remaining = match s.capacity_limit() {
            Some(limit) if s.show_scarcity => {
                let confirmed = self.claims.count_confirmed(campaign.id).await?;
                Some(limit.saturating_sub(confirmed))
            }
            _ => None,
        };

        Ok(PublicCampaign {
            slug: campaign.slug.clone(),
            title: s.title.clone(),
            starts_at: s.starts_at,
            ends_at: s.ends_at,
            require_email: s.require_email || s.require_email_verification,
            require_invite_code: s.require_invite_code,
            kiosk_mode: s.kiosk_mode,
            show_banner: s.show_banner,
            show_logo: s.show_logo,
            enable_questions: s.enable_questions,
            remaining,
        })
    }
}
