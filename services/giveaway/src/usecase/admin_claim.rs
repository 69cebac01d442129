use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use giveaway_auth_types::role::Permission;
use giveaway_domain::email::{is_valid_email, normalize_email};
use giveaway_domain::fingerprint::{address_fingerprint, location_fingerprint, placeholder_fingerprint};
use giveaway_domain::hash::generate_claim_token;
use giveaway_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CampaignRepository, ClaimRepository};
use crate::domain::types::{
    AdminIdentity, Address, Applicant, BulkAction, Campaign, Claim, ClaimFilter, ClaimStatus,
    MAX_GIFT_CODES_PER_BATCH, address_parts, non_blank,
};
use crate::error::ApiError;
use crate::usecase::campaign::load_campaign;

/// Validate the email, if any, and return its normalized form.
pub(crate) fn checked_email(applicant: &Applicant) -> Result<Option<String>, ApiError> {
    match applicant.email.as_deref().map(normalize_email) {
        Some(email) if !is_valid_email(&email) => Err(ApiError::InvalidEmail),
        other => Ok(other),
    }
}

/// Fill in both fingerprints from the claim's own name and address.
pub(crate) fn refingerprint(claim: &mut Claim) {
    let parts = address_parts(&claim.applicant, &claim.address);
    claim.address_fingerprint = address_fingerprint(&parts);
    claim.location_fingerprint = Some(location_fingerprint(&parts));
}

async fn load_claim<Cl: ClaimRepository>(claims: &Cl, id: Uuid) -> Result<Claim, ApiError> {
    claims.find_by_id(id).await?.ok_or(ApiError::ClaimNotFound)
}

/// A claim awaiting its holder: placeholder fingerprint, empty address.
fn precreated_claim(campaign: &Campaign, applicant: Applicant, now: DateTime<Utc>) -> Claim {
    let token = generate_claim_token();
    let email_normalized = applicant.email.as_deref().map(normalize_email);
    Claim {
        id: Uuid::new_v4(),
        campaign_id: campaign.id,
        status: ClaimStatus::Pending,
        applicant,
        email_normalized,
        address: Address::default(),
        address_fingerprint: placeholder_fingerprint(&token),
        location_fingerprint: None,
        ip_hash: None,
        user_agent: None,
        invite_code: None,
        is_test_claim: campaign.settings.test_mode,
        claim_token: Some(token),
        confirmed_at: None,
        shipped_at: None,
        created_at: now,
        updated_at: now,
    }
}

// ── List / get ───────────────────────────────────────────────────────────────

pub struct ListClaimsUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> ListClaimsUseCase<Ca, Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        filter: ClaimFilter,
        page: PageRequest,
    ) -> Result<Page<Claim>, ApiError> {
        identity.require(Permission::ViewClaims)?;
        load_campaign(&self.campaigns, campaign_id).await?;
        self.claims.list(campaign_id, &filter, page).await
    }
}

pub struct GetClaimUseCase<Cl: ClaimRepository> {
    pub claims: Cl,
}

impl<Cl: ClaimRepository> GetClaimUseCase<Cl> {
    pub async fn execute(&self, identity: AdminIdentity, id: Uuid) -> Result<Claim, ApiError> {
        identity.require(Permission::ViewClaims)?;
        load_claim(&self.claims, id).await
    }
}

// ── Update ───────────────────────────────────────────────────────────────────

/// Fields an admin may change. Blank optional strings clear the field.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub status: Option<ClaimStatus>,
    pub shipped: Option<bool>,
}

impl ClaimPatch {
    fn apply(self, claim: &mut Claim, now: DateTime<Utc>) {
        let a = &mut claim.applicant;
        if let Some(v) = self.first_name {
            a.first_name = v;
        }
        if let Some(v) = self.last_name {
            a.last_name = v;
        }
        if self.email.is_some() {
            a.email = non_blank(self.email);
        }
        if self.company.is_some() {
            a.company = non_blank(self.company);
        }
        if self.title.is_some() {
            a.title = non_blank(self.title);
        }
        if self.phone.is_some() {
            a.phone = non_blank(self.phone);
        }

        let addr = &mut claim.address;
        if let Some(v) = self.address1 {
            addr.address1 = v;
        }
        if self.address2.is_some() {
            addr.address2 = non_blank(self.address2);
        }
        if let Some(v) = self.city {
            addr.city = v;
        }
        if let Some(v) = self.region {
            addr.region = v;
        }
        if let Some(v) = self.postal_code {
            addr.postal_code = v;
        }
        if let Some(v) = self.country {
            addr.country = v;
        }

        match self.status {
            Some(ClaimStatus::Confirmed) if claim.status != ClaimStatus::Confirmed => {
                claim.status = ClaimStatus::Confirmed;
                claim.confirmed_at = Some(now);
            }
            Some(ClaimStatus::Pending) => {
                claim.status = ClaimStatus::Pending;
                claim.confirmed_at = None;
            }
            _ => {}
        }
        match self.shipped {
            Some(true) if claim.shipped_at.is_none() => claim.shipped_at = Some(now),
            Some(false) => claim.shipped_at = None,
            _ => {}
        }
    }
}

pub struct UpdateClaimUseCase<Cl: ClaimRepository> {
    pub claims: Cl,
}

impl<Cl: ClaimRepository> UpdateClaimUseCase<Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        id: Uuid,
        patch: ClaimPatch,
    ) -> Result<Claim, ApiError> {
        identity.require(Permission::ManageClaims)?;
        let mut claim = load_claim(&self.claims, id).await?;
        let now = Utc::now();

        patch.apply(&mut claim, now);
        claim.applicant = claim.applicant.clone().trimmed();
        claim.address = claim.address.clone().trimmed();
        if !claim.applicant.has_name() && claim.claim_token.is_none() {
            return Err(ApiError::MissingFields);
        }
        claim.email_normalized = checked_email(&claim.applicant)?;

        // A pre-created claim keeps its placeholder until it has an address.
        if !(claim.awaiting_address() && claim.claim_token.is_some()) {
            if !claim.applicant.has_name() || !claim.address.is_complete() {
                return Err(ApiError::MissingFields);
            }
            refingerprint(&mut claim);
            if self
                .claims
                .fingerprint_exists(claim.campaign_id, &claim.address_fingerprint, Some(claim.id))
                .await?
            {
                return Err(ApiError::DuplicateAddress);
            }
        }

        claim.updated_at = now;
        self.claims.update(&claim).await?;
        tracing::info!(claim_id = %claim.id, admin_id = %identity.admin_id, "claim updated");
        Ok(claim)
    }
}

// ── Delete / bulk ────────────────────────────────────────────────────────────

pub struct DeleteClaimUseCase<Cl: ClaimRepository> {
    pub claims: Cl,
}

impl<Cl: ClaimRepository> DeleteClaimUseCase<Cl> {
    pub async fn execute(&self, identity: AdminIdentity, id: Uuid) -> Result<(), ApiError> {
        identity.require(Permission::ManageClaims)?;
        if !self.claims.delete(id).await? {
            return Err(ApiError::ClaimNotFound);
        }
        tracing::info!(claim_id = %id, admin_id = %identity.admin_id, "claim deleted");
        Ok(())
    }
}

pub struct BulkClaimsUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> BulkClaimsUseCase<Ca, Cl> {
    /// Returns the number of claims changed.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        action: BulkAction,
        claim_ids: Vec<Uuid>,
    ) -> Result<u64, ApiError> {
        identity.require(Permission::ManageClaims)?;
        if claim_ids.is_empty() {
            return Err(ApiError::MissingFields);
        }
        load_campaign(&self.campaigns, campaign_id).await?;
        let affected = self
            .claims
            .bulk_apply(campaign_id, &claim_ids, action, Utc::now())
            .await?;
        tracing::info!(
            campaign_id = %campaign_id,
            action = ?action,
            affected,
            "bulk claim action"
        );
        Ok(affected)
    }
}

// ── Admin registration ───────────────────────────────────────────────────────

pub struct RegisterClaimInput {
    pub applicant: Applicant,
    pub address: Address,
}

pub struct RegisterClaimUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> RegisterClaimUseCase<Ca, Cl> {
    /// Confirmed on creation. Only the duplicate-address gate applies.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        input: RegisterClaimInput,
    ) -> Result<Claim, ApiError> {
        identity.require(Permission::ManageClaims)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;

        let applicant = input.applicant.trimmed();
        let address = input.address.trimmed();
        if !applicant.has_name() || !address.is_complete() {
            return Err(ApiError::MissingFields);
        }
        let email_normalized = checked_email(&applicant)?;

        let now = Utc::now();
        let mut claim = Claim {
            id: Uuid::new_v4(),
            campaign_id,
            status: ClaimStatus::Confirmed,
            applicant,
            email_normalized,
            address,
            address_fingerprint: String::new(),
            location_fingerprint: None,
            ip_hash: None,
            user_agent: None,
            invite_code: None,
            is_test_claim: campaign.settings.test_mode,
            claim_token: None,
            confirmed_at: Some(now),
            shipped_at: None,
            created_at: now,
            updated_at: now,
        };
        refingerprint(&mut claim);
        if self
            .claims
            .fingerprint_exists(campaign_id, &claim.address_fingerprint, None)
            .await?
        {
            return Err(ApiError::DuplicateAddress);
        }
        self.claims.create(&claim).await?;
        tracing::info!(claim_id = %claim.id, admin_id = %identity.admin_id, "claim registered");
        Ok(claim)
    }
}

// ── Pre-created claims and gift codes ────────────────────────────────────────

#[derive(Debug)]
pub struct PrecreatedClaim {
    pub claim_id: Uuid,
    pub token: String,
    pub link: String,
}

fn precreated_output(claim: &Claim, public_base_url: &str) -> PrecreatedClaim {
    let token = claim.claim_token.clone().unwrap_or_default();
    PrecreatedClaim {
        claim_id: claim.id,
        link: format!("{public_base_url}/claim/{token}"),
        token,
    }
}

pub struct PrecreateClaimUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
    pub public_base_url: String,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> PrecreateClaimUseCase<Ca, Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        applicant: Applicant,
    ) -> Result<PrecreatedClaim, ApiError> {
        identity.require(Permission::ManageClaims)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;
        let applicant = applicant.trimmed();
        if !applicant.has_name() {
            return Err(ApiError::MissingFields);
        }
        checked_email(&applicant)?;

        let claim = precreated_claim(&campaign, applicant, Utc::now());
        self.claims.create(&claim).await?;
        tracing::info!(claim_id = %claim.id, campaign_id = %campaign_id, "claim pre-created");
        Ok(precreated_output(&claim, &self.public_base_url))
    }
}

pub struct GenerateGiftCodesUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
    pub public_base_url: String,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> GenerateGiftCodesUseCase<Ca, Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        count: u32,
    ) -> Result<Vec<PrecreatedClaim>, ApiError> {
        identity.require(Permission::ManageClaims)?;
        if !(1..=MAX_GIFT_CODES_PER_BATCH).contains(&count) {
            return Err(ApiError::InvalidInput(format!(
                "count must be between 1 and {MAX_GIFT_CODES_PER_BATCH}"
            )));
        }
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;

        let now = Utc::now();
        let claims: Vec<Claim> = (0..count)
            .map(|_| precreated_claim(&campaign, Applicant::default(), now))
            .collect();
        self.claims.create_many(&claims).await?;
        tracing::info!(campaign_id = %campaign_id, count, "gift codes generated");
        Ok(claims
            .iter()
            .map(|c| precreated_output(c, &self.public_base_url))
            .collect())
    }
}
