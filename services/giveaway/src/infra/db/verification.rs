use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QuerySelect, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use giveaway_schema::{claims, email_verifications};

use crate::domain::repository::EmailVerificationRepository;
use crate::domain::types::{ClaimStatus, EmailVerification};
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbEmailVerificationRepository {
    pub db: DatabaseConnection,
}

impl EmailVerificationRepository for DbEmailVerificationRepository {
    async fn create(&self, verification: &EmailVerification) -> Result<(), ApiError> {
        email_verifications::ActiveModel {
            id: Set(verification.id),
            claim_id: Set(verification.claim_id),
            token_hash: Set(verification.token_hash.clone()),
            expires_at: Set(verification.expires_at),
            used_at: Set(None),
            created_at: Set(verification.created_at),
        }
        .insert(&self.db)
        .await
        .context("create email verification")?;
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, ApiError> {
        let token_hash = token_hash.to_owned();
        let claim_id = self
            .db
            .transaction::<_, Option<Uuid>, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let Some(row) = email_verifications::Entity::find()
                        .filter(email_verifications::Column::TokenHash.eq(token_hash))
                        .filter(email_verifications::Column::UsedAt.is_null())
                        .filter(email_verifications::Column::ExpiresAt.gt(now))
                        .lock_exclusive()
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };

                    let used = email_verifications::Entity::update_many()
                        .col_expr(email_verifications::Column::UsedAt, Expr::value(now))
                        .filter(email_verifications::Column::Id.eq(row.id))
                        .filter(email_verifications::Column::UsedAt.is_null())
                        .exec(txn)
                        .await?;
                    if used.rows_affected == 0 {
                        return Ok(None);
                    }

                    claims::Entity::update_many()
                        .col_expr(
                            claims::Column::Status,
                            Expr::value(ClaimStatus::Confirmed.as_str()),
                        )
                        .col_expr(claims::Column::ConfirmedAt, Expr::value(now))
                        .col_expr(claims::Column::UpdatedAt, Expr::value(now))
                        .filter(claims::Column::Id.eq(row.claim_id))
                        .filter(claims::Column::Status.eq(ClaimStatus::Pending.as_str()))
                        .exec(txn)
                        .await?;
                    Ok(Some(row.claim_id))
                })
            })
            .await
            .context("consume email verification")?;
        Ok(claim_id)
    }
}
