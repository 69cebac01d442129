use sea_orm::entity::prelude::*;

/// A giveaway. `capacity_total` of NULL or 0 means unlimited.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub capacity_total: Option<i32>,
    pub is_active: bool,
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub require_email: bool,
    pub require_email_verification: bool,
    pub require_invite_code: bool,
    pub show_scarcity: bool,
    pub test_mode: bool,
    pub kiosk_mode: bool,
    pub show_banner: bool,
    pub show_logo: bool,
    pub enable_questions: bool,
    pub max_claims_per_email: i32,
    pub max_claims_per_ip_per_day: i32,
    pub max_claims_per_address: i32,
    pub created_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::claims::Entity")]
    Claims,
    #[sea_orm(has_many = "super::invite_codes::Entity")]
    InviteCodes,
    #[sea_orm(has_many = "super::campaign_versions::Entity")]
    CampaignVersions,
}

impl Related<super::claims::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claims.def()
    }
}

impl Related<super::invite_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InviteCodes.def()
    }
}

impl Related<super::campaign_versions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CampaignVersions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
