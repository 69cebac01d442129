use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use giveaway_schema::otp_requests;

use crate::domain::repository::OtpRepository;
use crate::domain::types::OtpRequest;
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn count_by_email_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let count = otp_requests::Entity::find()
            .filter(otp_requests::Column::Email.eq(email))
            .filter(otp_requests::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count otp requests by email")?;
        Ok(count)
    }

    async fn count_by_ip_since(
        &self,
        ip_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let count = otp_requests::Entity::find()
            .filter(otp_requests::Column::IpHash.eq(ip_hash))
            .filter(otp_requests::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count otp requests by ip")?;
        Ok(count)
    }

    async fn create(&self, otp: &OtpRequest) -> Result<(), ApiError> {
        otp_requests::ActiveModel {
            id: Set(otp.id),
            email: Set(otp.email.clone()),
            otp_hash: Set(otp.otp_hash.clone()),
            ip_hash: Set(otp.ip_hash.clone()),
            attempts: Set(otp.attempts),
            max_attempts: Set(otp.max_attempts),
            expires_at: Set(otp.expires_at),
            used_at: Set(None),
            created_at: Set(otp.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp request")?;
        Ok(())
    }

    async fn find_latest_unused(&self, email: &str) -> Result<Option<OtpRequest>, ApiError> {
        let model = otp_requests::Entity::find()
            .filter(otp_requests::Column::Email.eq(email))
            .filter(otp_requests::Column::UsedAt.is_null())
            .order_by_desc(otp_requests::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp request")?;
        Ok(model.map(otp_from_model))
    }

    async fn try_take_attempt(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = otp_requests::Entity::update_many()
            .col_expr(
                otp_requests::Column::Attempts,
                Expr::col(otp_requests::Column::Attempts).add(1),
            )
            .filter(otp_requests::Column::Id.eq(id))
            .filter(otp_requests::Column::UsedAt.is_null())
            .filter(
                Expr::col(otp_requests::Column::Attempts)
                    .lt(Expr::col(otp_requests::Column::MaxAttempts)),
            )
            .exec(&self.db)
            .await
            .context("take otp attempt")?;
        Ok(result.rows_affected == 1)
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, ApiError> {
        let result = otp_requests::Entity::update_many()
            .col_expr(otp_requests::Column::UsedAt, Expr::value(at))
            .filter(otp_requests::Column::Id.eq(id))
            .filter(otp_requests::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark otp used")?;
        Ok(result.rows_affected == 1)
    }
}

fn otp_from_model(model: otp_requests::Model) -> OtpRequest {
    OtpRequest {
        id: model.id,
        email: model.email,
        otp_hash: model.otp_hash,
        ip_hash: model.ip_hash,
        attempts: model.attempts,
        max_attempts: model.max_attempts,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}
