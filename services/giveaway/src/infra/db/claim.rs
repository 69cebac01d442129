use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use uuid::Uuid;

use giveaway_domain::pagination::{Page, PageRequest};
use giveaway_schema::claims;

use super::conflict_or_internal;
use crate::domain::repository::ClaimRepository;
use crate::domain::types::{Address, Applicant, BulkAction, Claim, ClaimFilter, ClaimStatus};
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbClaimRepository {
    pub db: DatabaseConnection,
}

impl ClaimRepository for DbClaimRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, ApiError> {
        let model = claims::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find claim by id")?;
        model.map(claim_from_model).transpose()
    }

    async fn find_by_claim_token(&self, token: &str) -> Result<Option<Claim>, ApiError> {
        let model = claims::Entity::find()
            .filter(claims::Column::ClaimToken.eq(token))
            .one(&self.db)
            .await
            .context("find claim by token")?;
        model.map(claim_from_model).transpose()
    }

    async fn count_for_campaign(&self, campaign_id: Uuid) -> Result<u64, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .count(&self.db)
            .await
            .context("count campaign claims")?;
        Ok(count)
    }

    async fn count_confirmed(&self, campaign_id: Uuid) -> Result<u64, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .filter(claims::Column::Status.eq(ClaimStatus::Confirmed.as_str()))
            .count(&self.db)
            .await
            .context("count confirmed claims")?;
        Ok(count)
    }

    async fn count_by_ip_since(
        &self,
        campaign_id: Uuid,
        ip_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .filter(claims::Column::IpHash.eq(ip_hash))
            .filter(claims::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count claims by ip")?;
        Ok(count)
    }

    async fn count_by_email(
        &self,
        campaign_id: Uuid,
        email_normalized: &str,
    ) -> Result<u64, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .filter(claims::Column::EmailNormalized.eq(email_normalized))
            .count(&self.db)
            .await
            .context("count claims by email")?;
        Ok(count)
    }

    async fn count_by_location(
        &self,
        campaign_id: Uuid,
        location_fingerprint: &str,
    ) -> Result<u64, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .filter(claims::Column::LocationFingerprint.eq(location_fingerprint))
            .count(&self.db)
            .await
            .context("count claims by location")?;
        Ok(count)
    }

    async fn fingerprint_exists(
        &self,
        campaign_id: Uuid,
        fingerprint: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let mut query = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .filter(claims::Column::AddressFingerprint.eq(fingerprint));
        if let Some(id) = excluding {
            query = query.filter(claims::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("check address fingerprint")?;
        Ok(count > 0)
    }

    async fn fingerprint_exists_anywhere(&self, fingerprint: &str) -> Result<bool, ApiError> {
        let count = claims::Entity::find()
            .filter(claims::Column::AddressFingerprint.eq(fingerprint))
            .count(&self.db)
            .await
            .context("check address fingerprint globally")?;
        Ok(count > 0)
    }

    async fn create(&self, claim: &Claim) -> Result<(), ApiError> {
        claim_active_model(claim)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::DuplicateAddress, "create claim"))?;
        Ok(())
    }

    async fn create_many(&self, claims: &[Claim]) -> Result<(), ApiError> {
        if claims.is_empty() {
            return Ok(());
        }
        claims::Entity::insert_many(claims.iter().map(claim_active_model))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::DuplicateAddress, "create claims"))?;
        Ok(())
    }

    async fn update(&self, claim: &Claim) -> Result<(), ApiError> {
        let mut model = claim_active_model(claim);
        model.created_at = sea_orm::ActiveValue::NotSet;
        model
            .update(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::DuplicateAddress, "update claim"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = claims::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete claim")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        campaign_id: Uuid,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<Page<Claim>, ApiError> {
        let page = page.clamped();
        let mut query = claims::Entity::find().filter(claims::Column::CampaignId.eq(campaign_id));
        if let Some(status) = filter.status {
            query = query.filter(claims::Column::Status.eq(status.as_str()));
        }
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count filtered claims")?;
        let models = query
            .order_by_desc(claims::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list claims")?;
        let items = models
            .into_iter()
            .map(claim_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn list_all(&self, campaign_id: Uuid) -> Result<Vec<Claim>, ApiError> {
        let models = claims::Entity::find()
            .filter(claims::Column::CampaignId.eq(campaign_id))
            .order_by_asc(claims::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list all claims")?;
        models.into_iter().map(claim_from_model).collect()
    }

    async fn bulk_apply(
        &self,
        campaign_id: Uuid,
        ids: &[Uuid],
        action: BulkAction,
        at: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let ids = ids.to_vec();
        let rows = match action {
            BulkAction::Confirm => claims::Entity::update_many()
                .col_expr(claims::Column::Status, Expr::value(ClaimStatus::Confirmed.as_str()))
                .col_expr(claims::Column::ConfirmedAt, Expr::value(at))
                .col_expr(claims::Column::UpdatedAt, Expr::value(at))
                .filter(claims::Column::CampaignId.eq(campaign_id))
                .filter(claims::Column::Id.is_in(ids))
                .filter(claims::Column::Status.eq(ClaimStatus::Pending.as_str()))
                .exec(&self.db)
                .await
                .context("bulk confirm claims")?
                .rows_affected,
            BulkAction::MarkShipped => claims::Entity::update_many()
                .col_expr(claims::Column::ShippedAt, Expr::value(at))
                .col_expr(claims::Column::UpdatedAt, Expr::value(at))
                .filter(claims::Column::CampaignId.eq(campaign_id))
                .filter(claims::Column::Id.is_in(ids))
                .filter(claims::Column::ShippedAt.is_null())
                .exec(&self.db)
                .await
                .context("bulk mark claims shipped")?
                .rows_affected,
            BulkAction::Delete => claims::Entity::delete_many()
                .filter(claims::Column::CampaignId.eq(campaign_id))
                .filter(claims::Column::Id.is_in(ids))
                .exec(&self.db)
                .await
                .context("bulk delete claims")?
                .rows_affected,
        };
        Ok(rows)
    }
}

fn claim_active_model(claim: &Claim) -> claims::ActiveModel {
    claims::ActiveModel {
        id: Set(claim.id),
        campaign_id: Set(claim.campaign_id),
        status: Set(claim.status.as_str().to_owned()),
        first_name: Set(claim.applicant.first_name.clone()),
        last_name: Set(claim.applicant.last_name.clone()),
        email: Set(claim.applicant.email.clone()),
        email_normalized: Set(claim.email_normalized.clone()),
        company: Set(claim.applicant.company.clone()),
        title: Set(claim.applicant.title.clone()),
        phone: Set(claim.applicant.phone.clone()),
        address1: Set(claim.address.address1.clone()),
        address2: Set(claim.address.address2.clone()),
        city: Set(claim.address.city.clone()),
        region: Set(claim.address.region.clone()),
        postal_code: Set(claim.address.postal_code.clone()),
        country: Set(claim.address.country.clone()),
        address_fingerprint: Set(claim.address_fingerprint.clone()),
        location_fingerprint: Set(claim.location_fingerprint.clone()),
        ip_hash: Set(claim.ip_hash.clone()),
        user_agent: Set(claim.user_agent.clone()),
        invite_code: Set(claim.invite_code.clone()),
        is_test_claim: Set(claim.is_test_claim),
        claim_token: Set(claim.claim_token.clone()),
        confirmed_at: Set(claim.confirmed_at),
        shipped_at: Set(claim.shipped_at),
        created_at: Set(claim.created_at),
        updated_at: Set(claim.updated_at),
    }
}

fn claim_from_model(model: claims::Model) -> Result<Claim, ApiError> {
    let status = ClaimStatus::parse(&model.status)
        .with_context(|| format!("claim {} has unknown status {}", model.id, model.status))?;
    Ok(Claim {
        id: model.id,
        campaign_id: model.campaign_id,
        status,
        applicant: Applicant {
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            company: model.company,
            title: model.title,
            phone: model.phone,
        },
        email_normalized: model.email_normalized,
        address: Address {
            address1: model.address1,
            address2: model.address2,
            city: model.city,
            region: model.region,
            postal_code: model.postal_code,
            country: model.country,
        },
        address_fingerprint: model.address_fingerprint,
        location_fingerprint: model.location_fingerprint,
        ip_hash: model.ip_hash,
        user_agent: model.user_agent,
        invite_code: model.invite_code,
        is_test_claim: model.is_test_claim,
        claim_token: model.claim_token,
        confirmed_at: model.confirmed_at,
        shipped_at: model.shipped_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
