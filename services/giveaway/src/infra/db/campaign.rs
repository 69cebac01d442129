use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use giveaway_schema::{campaign_versions, campaigns};

use super::conflict_or_internal;
use crate::domain::repository::{CampaignRepository, CampaignVersionRepository};
use crate::domain::types::{Campaign, CampaignSettings, CampaignVersion, VersionStatus};
use crate::error::ApiError;

// ── Campaign repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCampaignRepository {
    pub db: DatabaseConnection,
}

impl CampaignRepository for DbCampaignRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, ApiError> {
        let model = campaigns::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find campaign by id")?;
        Ok(model.map(campaign_from_model))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Campaign>, ApiError> {
        let model = campaigns::Entity::find()
            .filter(campaigns::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find campaign by slug")?;
        Ok(model.map(campaign_from_model))
    }

    async fn list(&self) -> Result<Vec<Campaign>, ApiError> {
        let models = campaigns::Entity::find()
            .order_by_desc(campaigns::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list campaigns")?;
        Ok(models.into_iter().map(campaign_from_model).collect())
    }

    async fn create(&self, campaign: &Campaign) -> Result<(), ApiError> {
        campaign_active_model(campaign)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::SlugTaken, "create campaign"))?;
        Ok(())
    }

    async fn update(&self, campaign: &Campaign) -> Result<(), ApiError> {
        update_campaign(&self.db, campaign)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::SlugTaken, "update campaign"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = campaigns::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete campaign")?;
        Ok(result.rows_affected > 0)
    }
}

async fn update_campaign<C: ConnectionTrait>(
    conn: &C,
    campaign: &Campaign,
) -> Result<(), sea_orm::DbErr> {
    let mut model = campaign_active_model(campaign);
    // creation metadata is immutable
    model.created_by = sea_orm::ActiveValue::NotSet;
    model.created_at = sea_orm::ActiveValue::NotSet;
    model.update(conn).await?;
    Ok(())
}

fn campaign_active_model(campaign: &Campaign) -> campaigns::ActiveModel {
    let s = &campaign.settings;
    campaigns::ActiveModel {
        id: Set(campaign.id),
        slug: Set(campaign.slug.clone()),
        title: Set(s.title.clone()),
        capacity_total: Set(s.capacity_total),
        is_active: Set(s.is_active),
        starts_at: Set(s.starts_at),
        ends_at: Set(s.ends_at),
        require_email: Set(s.require_email),
        require_email_verification: Set(s.require_email_verification),
        require_invite_code: Set(s.require_invite_code),
        show_scarcity: Set(s.show_scarcity),
        test_mode: Set(s.test_mode),
        kiosk_mode: Set(s.kiosk_mode),
        show_banner: Set(s.show_banner),
        show_logo: Set(s.show_logo),
        enable_questions: Set(s.enable_questions),
        max_claims_per_email: Set(s.max_claims_per_email),
        max_claims_per_ip_per_day: Set(s.max_claims_per_ip_per_day),
        max_claims_per_address: Set(s.max_claims_per_address),
        created_by: Set(campaign.created_by),
        created_at: Set(campaign.created_at),
        updated_at: Set(campaign.updated_at),
    }
}

fn campaign_from_model(model: campaigns::Model) -> Campaign {
    Campaign {
        id: model.id,
        slug: model.slug,
        settings: CampaignSettings {
            title: model.title,
            capacity_total: model.capacity_total,
            is_active: model.is_active,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            require_email: model.require_email,
            require_email_verification: model.require_email_verification,
            require_invite_code: model.require_invite_code,
            show_scarcity: model.show_scarcity,
            test_mode: model.test_mode,
            kiosk_mode: model.kiosk_mode,
            show_banner: model.show_banner,
            show_logo: model.show_logo,
            enable_questions: model.enable_questions,
            max_claims_per_email: model.max_claims_per_email,
            max_claims_per_ip_per_day: model.max_claims_per_ip_per_day,
            max_claims_per_address: model.max_claims_per_address,
        },
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Campaign version repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCampaignVersionRepository {
    pub db: DatabaseConnection,
}

impl CampaignVersionRepository for DbCampaignVersionRepository {
    async fn find_draft(&self, campaign_id: Uuid) -> Result<Option<CampaignVersion>, ApiError> {
        let model = campaign_versions::Entity::find()
            .filter(campaign_versions::Column::CampaignId.eq(campaign_id))
            .filter(campaign_versions::Column::Status.eq(VersionStatus::Draft.as_str()))
            .one(&self.db)
            .await
            .context("find campaign draft")?;
        model.map(version_from_model).transpose()
    }

    async fn save_draft(&self, draft: &CampaignVersion) -> Result<(), ApiError> {
        let campaign_id = draft.campaign_id;
        let draft = version_active_model(draft)?;
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    campaign_versions::Entity::delete_many()
                        .filter(campaign_versions::Column::CampaignId.eq(campaign_id))
                        .filter(campaign_versions::Column::Status.eq(VersionStatus::Draft.as_str()))
                        .exec(txn)
                        .await?;
                    draft.insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("save campaign draft")?;
        Ok(())
    }

    async fn find_published(
        &self,
        campaign_id: Uuid,
        version_number: i32,
    ) -> Result<Option<CampaignVersion>, ApiError> {
        let model = campaign_versions::Entity::find()
            .filter(campaign_versions::Column::CampaignId.eq(campaign_id))
            .filter(campaign_versions::Column::VersionNumber.eq(version_number))
            .filter(campaign_versions::Column::Status.eq(VersionStatus::Published.as_str()))
            .one(&self.db)
            .await
            .context("find published version")?;
        model.map(version_from_model).transpose()
    }

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<CampaignVersion>, ApiError> {
        let models = campaign_versions::Entity::find()
            .filter(campaign_versions::Column::CampaignId.eq(campaign_id))
            .order_by_desc(campaign_versions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list campaign versions")?;
        let mut versions = models
            .into_iter()
            .map(version_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        // draft first, then published by number descending
        versions.sort_by_key(|v| std::cmp::Reverse(v.version_number.unwrap_or(i32::MAX)));
        Ok(versions)
    }

    async fn latest_version_number(&self, campaign_id: Uuid) -> Result<i32, ApiError> {
        let latest = campaign_versions::Entity::find()
            .filter(campaign_versions::Column::CampaignId.eq(campaign_id))
            .filter(campaign_versions::Column::VersionNumber.is_not_null())
            .order_by_desc(campaign_versions::Column::VersionNumber)
            .one(&self.db)
            .await
            .context("find latest version number")?;
        Ok(latest.and_then(|m| m.version_number).unwrap_or(0))
    }

    async fn publish(&self, campaign: &Campaign, version: &CampaignVersion) -> Result<(), ApiError> {
        let campaign = campaign.clone();
        let version_id = version.id;
        let version = version_active_model(version)?;
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    update_campaign(txn, &campaign).await?;
                    campaign_versions::Entity::delete_by_id(version_id)
                        .exec(txn)
                        .await?;
                    version.insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("publish campaign version")?;
        Ok(())
    }
}

fn version_active_model(version: &CampaignVersion) -> Result<campaign_versions::ActiveModel, ApiError> {
    let settings =
        serde_json::to_value(&version.settings).context("serialize campaign settings")?;
    Ok(campaign_versions::ActiveModel {
        id: Set(version.id),
        campaign_id: Set(version.campaign_id),
        version_number: Set(version.version_number),
        status: Set(version.status.as_str().to_owned()),
        settings: Set(settings),
        created_by: Set(version.created_by),
        created_at: Set(version.created_at),
        published_at: Set(version.published_at),
    })
}

fn version_from_model(model: campaign_versions::Model) -> Result<CampaignVersion, ApiError> {
    let status = VersionStatus::parse(&model.status)
        .with_context(|| format!("version {} has unknown status {}", model.id, model.status))?;
    let settings: CampaignSettings = serde_json::from_value(model.settings)
        .with_context(|| format!("decode settings of version {}", model.id))?;
    Ok(CampaignVersion {
        id: model.id,
        campaign_id: model.campaign_id,
        version_number: model.version_number,
        status,
        settings,
        created_by: model.created_by,
        created_at: model.created_at,
        published_at: model.published_at,
    })
}
