use sea_orm::entity::prelude::*;

/// Administrator account. Signs in by email OTP only; there is no password.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stored normalized (trimmed, lower-case).
    #[sea_orm(unique)]
    pub email: String,
    /// `super_admin` | `admin` | `viewer`.
    pub role: String,
    pub is_active: bool,
    pub display_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::admin_sessions::Entity")]
    AdminSessions,
}

impl Related<super::admin_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
