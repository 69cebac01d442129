use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use giveaway_auth_types::role::Permission;

use crate::domain::repository::{CampaignRepository, ClaimRepository};
use crate::domain::types::{AdminIdentity, Campaign, CampaignSettings, is_valid_slug};
use crate::error::ApiError;

fn checked_slug(slug: &str) -> Result<String, ApiError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(ApiError::MissingFields);
    }
    if !is_valid_slug(slug) {
        return Err(ApiError::InvalidSlug);
    }
    Ok(slug.to_owned())
}

/// Campaign looked up by id, or `CampaignNotFound`.
pub(crate) async fn load_campaign<Ca: CampaignRepository>(
    campaigns: &Ca,
    id: Uuid,
) -> Result<Campaign, ApiError> {
    campaigns
        .find_by_id(id)
        .await?
        .ok_or(ApiError::CampaignNotFound)
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateCampaignInput {
    pub slug: String,
    pub settings: CampaignSettings,
}

pub struct CreateCampaignUseCase<Ca: CampaignRepository> {
    pub campaigns: Ca,
}

impl<Ca: CampaignRepository> CreateCampaignUseCase<Ca> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        input: CreateCampaignInput,
    ) -> Result<Campaign, ApiError> {
        identity.require(Permission::CreateCampaign)?;
        let slug = checked_slug(&input.slug)?;
        input.settings.validate()?;

        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            slug,
            settings: input.settings,
            created_by: Some(identity.admin_id),
            created_at: now,
            updated_at: now,
        };
        self.campaigns.create(&campaign).await?;
        tracing::info!(campaign_id = %campaign.id, slug = %campaign.slug, "campaign created");
        Ok(campaign)
    }
}

// ── Read ─────────────────────────────────────────────────────────────────────

pub struct ListCampaignsUseCase<Ca: CampaignRepository> {
    pub campaigns: Ca,
}

impl<Ca: CampaignRepository> ListCampaignsUseCase<Ca> {
    pub async fn execute(&self, identity: AdminIdentity) -> Result<Vec<Campaign>, ApiError> {
        identity.require(Permission::ViewCampaigns)?;
        self.campaigns.list().await
    }
}

pub struct CampaignDetail {
    pub campaign: Campaign,
    pub claim_count: u64,
    pub confirmed_count: u64,
}

pub struct GetCampaignUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> GetCampaignUseCase<Ca, Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        id: Uuid,
    ) -> Result<CampaignDetail, ApiError> {
        identity.require(Permission::ViewCampaigns)?;
        let campaign = load_campaign(&self.campaigns, id).await?;
        let claim_count = self.claims.count_for_campaign(id).await?;
        let confirmed_count = self.claims.count_confirmed(id).await?;
        Ok(CampaignDetail {
            campaign,
            claim_count,
            confirmed_count,
        })
    }
}

// ── Update ───────────────────────────────────────────────────────────────────

pub struct UpdateCampaignUseCase<Ca: CampaignRepository> {
    pub campaigns: Ca,
}

impl<Ca: CampaignRepository> UpdateCampaignUseCase<Ca> {
    /// `patch` holds any subset of the settings plus an optional `slug`.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        id: Uuid,
        mut patch: Map<String, Value>,
    ) -> Result<Campaign, ApiError> {
        identity.require(Permission::EditCampaign)?;
        let mut campaign = load_campaign(&self.campaigns, id).await?;

        if let Some(slug) = patch.remove("slug") {
            let slug = slug.as_str().ok_or(ApiError::InvalidSlug)?;
            campaign.slug = checked_slug(slug)?;
        }
        campaign.settings = campaign.settings.patched(&patch)?;
        campaign.updated_at = Utc::now();

        self.campaigns.update(&campaign).await?;
        tracing::info!(campaign_id = %campaign.id, "campaign updated");
        Ok(campaign)
    }
}

// ── Delete ───────────────────────────────────────────────────────────────────

pub struct DeleteCampaignUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> DeleteCampaignUseCase<Ca, Cl> {
    pub async fn execute(&self, identity: AdminIdentity, id: Uuid) -> Result<(), ApiError> {
        identity.require(Permission::DeleteCampaign)?;
        load_campaign(&self.campaigns, id).await?;
        if self.claims.count_for_campaign(id).await? > 0 {
            return Err(ApiError::CampaignHasClaims);
        }
        if !self.campaigns.delete(id).await? {
            return Err(ApiError::CampaignNotFound);
        }
        tracing::info!(campaign_id = %id, admin_id = %identity.admin_id, "campaign deleted");
        Ok(())
    }
}
