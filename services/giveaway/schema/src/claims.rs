use sea_orm::entity::prelude::*;

/// One applicant's claim under a campaign.
///
/// `(campaign_id, address_fingerprint)` is unique. A pre-created claim has an
/// empty `address1` and a fingerprint derived from its `claim_token` until the
/// holder submits their address.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub campaign_id: Uuid,
    /// `pending` | `confirmed`.
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub email_normalized: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub address_fingerprint: String,
    pub location_fingerprint: Option<String>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub invite_code: Option<String>,
    pub is_test_claim: bool,
    #[sea_orm(unique)]
    pub claim_token: Option<String>,
    pub confirmed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub shipped_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::campaigns::Column::Id"
    )]
    Campaign,
    #[sea_orm(has_many = "super::email_verifications::Entity")]
    EmailVerifications,
}

impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::email_verifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailVerifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
