use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use giveaway_schema::invite_codes;

use super::conflict_or_internal;
use crate::domain::repository::InviteCodeRepository;
use crate::domain::types::InviteCode;
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbInviteCodeRepository {
    pub db: DatabaseConnection,
}

impl InviteCodeRepository for DbInviteCodeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteCode>, ApiError> {
        let model = invite_codes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find invite code by id")?;
        Ok(model.map(invite_code_from_model))
    }

    async fn find_by_code(
        &self,
        campaign_id: Uuid,
        code: &str,
    ) -> Result<Option<InviteCode>, ApiError> {
        let model = invite_codes::Entity::find()
            .filter(invite_codes::Column::CampaignId.eq(campaign_id))
            .filter(invite_codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find invite code")?;
        Ok(model.map(invite_code_from_model))
    }

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<InviteCode>, ApiError> {
        let models = invite_codes::Entity::find()
            .filter(invite_codes::Column::CampaignId.eq(campaign_id))
            .order_by_asc(invite_codes::Column::Code)
            .all(&self.db)
            .await
            .context("list invite codes")?;
        Ok(models.into_iter().map(invite_code_from_model).collect())
    }

    async fn create(&self, code: &InviteCode) -> Result<(), ApiError> {
        invite_codes::ActiveModel {
            id: Set(code.id),
            campaign_id: Set(code.campaign_id),
            code: Set(code.code.clone()),
            uses: Set(code.uses),
            max_uses: Set(code.max_uses),
            is_active: Set(code.is_active),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, ApiError::InviteCodeTaken, "create invite code"))?;
        Ok(())
    }

    async fn update(&self, code: &InviteCode) -> Result<(), ApiError> {
        invite_codes::ActiveModel {
            id: Set(code.id),
            max_uses: Set(code.max_uses),
            is_active: Set(code.is_active),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update invite code")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = invite_codes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete invite code")?;
        Ok(result.rows_affected > 0)
    }

    async fn try_consume(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = invite_codes::Entity::update_many()
            .col_expr(
                invite_codes::Column::Uses,
                Expr::col(invite_codes::Column::Uses).add(1),
            )
            .filter(invite_codes::Column::Id.eq(id))
            .filter(invite_codes::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(invite_codes::Column::MaxUses.is_null())
                    .add(
                        Expr::col(invite_codes::Column::Uses)
                            .lt(Expr::col(invite_codes::Column::MaxUses)),
                    ),
            )
            .exec(&self.db)
            .await
            .context("consume invite code")?;
        Ok(result.rows_affected == 1)
    }
}

fn invite_code_from_model(model: invite_codes::Model) -> InviteCode {
    InviteCode {
        id: model.id,
        campaign_id: model.campaign_id,
        code: model.code,
        uses: model.uses,
        max_uses: model.max_uses,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}
