use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::repository::{CampaignRepository, ClaimRepository};
use crate::domain::types::{Address, Applicant, Claim, ClaimStatus};
use crate::error::ApiError;
use crate::usecase::admin_claim::{checked_email, refingerprint};

async fn load_by_token<Cl: ClaimRepository>(claims: &Cl, token: &str) -> Result<Claim, ApiError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::ClaimNotFound);
    }
    claims
        .find_by_claim_token(token)
        .await?
        .ok_or(ApiError::ClaimNotFound)
}

// ── Lookup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTokenView {
    pub campaign_slug: String,
    pub campaign_title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub completed: bool,
}

pub struct GetClaimTokenUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> GetClaimTokenUseCase<Ca, Cl> {
    pub async fn execute(&self, token: &str) -> Result<ClaimTokenView, ApiError> {
        let claim = load_by_token(&self.claims, token).await?;
        let campaign = self
            .campaigns
            .find_by_id(claim.campaign_id)
            .await?
            .ok_or(ApiError::CampaignNotFound)?;
        Ok(ClaimTokenView {
            campaign_slug: campaign.slug,
            campaign_title: campaign.settings.title,
            completed: !claim.awaiting_address(),
            first_name: claim.applicant.first_name,
            last_name: claim.applicant.last_name,
            email: claim.applicant.email,
        })
    }
}

// ── Completion ───────────────────────────────────────────────────────────────

pub struct CompleteClaimTokenInput {
    pub token: String,
    /// Blank name fields keep what the admin entered.
    pub applicant: Applicant,
    pub address: Address,
}

pub struct CompleteClaimTokenUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> CompleteClaimTokenUseCase<Ca, Cl> {
    /// Fill in the address, swap the placeholder fingerprint for the real one
    /// and confirm the claim.
    pub async fn execute(&self, input: CompleteClaimTokenInput) -> Result<Uuid, ApiError> {
        let mut claim = load_by_token(&self.claims, &input.token).await?;
        if !claim.awaiting_address() {
            return Err(ApiError::ClaimAlreadyCompleted);
        }
        let campaign = self
            .campaigns
            .find_by_id(claim.campaign_id)
            .await?
            .ok_or(ApiError::CampaignNotFound)?;
        if !campaign.settings.is_active {
            return Err(ApiError::CampaignClosed);
        }

        let given = input.applicant.trimmed();
        let holder = &mut claim.applicant;
        if !given.first_name.is_empty() {
            holder.first_name = given.first_name;
        }
        if !given.last_name.is_empty() {
            holder.last_name = given.last_name;
        }
        if given.email.is_some() {
            holder.email = given.email;
        }
        if given.phone.is_some() {
            holder.phone = given.phone;
        }
        if given.company.is_some() {
            holder.company = given.company;
        }
        if given.title.is_some() {
            holder.title = given.title;
        }
        claim.address = input.address.trimmed();
        if !claim.applicant.has_name() || !claim.address.is_complete() {
            return Err(ApiError::MissingFields);
        }
        claim.email_normalized = checked_email(&claim.applicant)?;

        refingerprint(&mut claim);
        if self
            .claims
            .fingerprint_exists(claim.campaign_id, &claim.address_fingerprint, Some(claim.id))
            .await?
        {
            return Err(ApiError::DuplicateAddress);
        }

        let now = Utc::now();
        claim.status = ClaimStatus::Confirmed;
        claim.confirmed_at = Some(now);
        claim.updated_at = now;
        self.claims.update(&claim).await?;
        tracing::info!(claim_id = %claim.id, "pre-created claim completed");
        Ok(claim.id)
    }
}
