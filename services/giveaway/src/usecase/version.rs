use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use giveaway_auth_types::role::Permission;

use crate::domain::repository::{CampaignRepository, CampaignVersionRepository};
use crate::domain::types::{AdminIdentity, Campaign, CampaignVersion, VersionStatus};
use crate::error::ApiError;
use crate::usecase::campaign::load_campaign;

// ── Draft ────────────────────────────────────────────────────────────────────

pub struct SaveDraftUseCase<Ca: CampaignRepository, Ve: CampaignVersionRepository> {
    pub campaigns: Ca,
    pub versions: Ve,
}

impl<Ca: CampaignRepository, Ve: CampaignVersionRepository> SaveDraftUseCase<Ca, Ve> {
    /// Layer `patch` over the current draft, or over the live settings when
    /// there is no draft yet.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<CampaignVersion, ApiError> {
        identity.require(Permission::EditCampaign)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;

        let existing = self.versions.find_draft(campaign_id).await?;
        let base = existing
            .as_ref()
            .map_or(&campaign.settings, |d| &d.settings);
        let draft = CampaignVersion {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |d| d.id),
            campaign_id,
            version_number: None,
            status: VersionStatus::Draft,
            settings: base.patched(&patch)?,
            created_by: Some(identity.admin_id),
            created_at: Utc::now(),
            published_at: None,
        };
        self.versions.save_draft(&draft).await?;
        Ok(draft)
    }
}

// ── Publish / revert ─────────────────────────────────────────────────────────

async fn publish_snapshot<Ve: CampaignVersionRepository>(
    versions: &Ve,
    mut campaign: Campaign,
    mut version: CampaignVersion,
) -> Result<CampaignVersion, ApiError> {
    let now = Utc::now();
    let next = versions.latest_version_number(campaign.id).await? + 1;
    version.version_number = Some(next);
    version.status = VersionStatus::Published;
    version.published_at = Some(now);

    campaign.settings = version.settings.clone();
    campaign.updated_at = now;
    versions.publish(&campaign, &version).await?;
    tracing::info!(campaign_id = %campaign.id, version = next, "campaign version published");
    Ok(version)
}

pub struct PublishDraftUseCase<Ca: CampaignRepository, Ve: CampaignVersionRepository> {
    pub campaigns: Ca,
    pub versions: Ve,
}

impl<Ca: CampaignRepository, Ve: CampaignVersionRepository> PublishDraftUseCase<Ca, Ve> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
    ) -> Result<CampaignVersion, ApiError> {
        identity.require(Permission::EditCampaign)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;
        let draft = self
            .versions
            .find_draft(campaign_id)
            .await?
            .ok_or(ApiError::DraftNotFound)?;
        publish_snapshot(&self.versions, campaign, draft).await
    }
}

pub struct RevertVersionUseCase<Ca: CampaignRepository, Ve: CampaignVersionRepository> {
    pub campaigns: Ca,
    pub versions: Ve,
}

impl<Ca: CampaignRepository, Ve: CampaignVersionRepository> RevertVersionUseCase<Ca, Ve> {
    /// Re-publish an earlier snapshot as a new version. Any draft is kept.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        version_number: i32,
    ) -> Result<CampaignVersion, ApiError> {
        identity.require(Permission::EditCampaign)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;
        let target = self
            .versions
            .find_published(campaign_id, version_number)
            .await?
            .ok_or(ApiError::VersionNotFound)?;
        let snapshot = CampaignVersion {
            id: Uuid::new_v4(),
            campaign_id,
            version_number: None,
            status: VersionStatus::Draft,
            settings: target.settings,
            created_by: Some(identity.admin_id),
            created_at: Utc::now(),
            published_at: None,
        };
        publish_snapshot(&self.versions, campaign, snapshot).await
    }
}

// ── List ─────────────────────────────────────────────────────────────────────

pub struct ListVersionsUseCase<Ca: CampaignRepository, Ve: CampaignVersionRepository> {
    pub campaigns: Ca,
    pub versions: Ve,
}

impl<Ca: CampaignRepository, Ve: CampaignVersionRepository> ListVersionsUseCase<Ca, Ve> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
    ) -> Result<Vec<CampaignVersion>, ApiError> {
        identity.require(Permission::ViewCampaigns)?;
        load_campaign(&self.campaigns, campaign_id).await?;
        self.versions.list(campaign_id).await
    }
}
