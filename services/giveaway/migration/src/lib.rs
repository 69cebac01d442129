pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_admin_users;
mod m20261001_000002_create_admin_sessions;
mod m20261001_000003_create_otp_requests;
mod m20261001_000004_create_campaigns;
mod m20261001_000005_create_claims;
mod m20261001_000006_create_email_verifications;
mod m20261001_000007_create_invite_codes;
mod m20261001_000008_create_campaign_versions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_admin_users::Migration),
            Box::new(m20261001_000002_create_admin_sessions::Migration),
            Box::new(m20261001_000003_create_otp_requests::Migration),
            Box::new(m20261001_000004_create_campaigns::Migration),
            Box::new(m20261001_000005_create_claims::Migration),
            Box::new(m20261001_000006_create_email_verifications::Migration),
            Box::new(m20261001_000007_create_invite_codes::Migration),
            Box::new(m20261001_000008_create_campaign_versions::Migration),
        ]
    }
}
