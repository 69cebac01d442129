use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Claims::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Claims::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(Claims::Status).string().not_null())
                    .col(ColumnDef::new(Claims::FirstName).string().not_null())
                    .col(ColumnDef::new(Claims::LastName).string().not_null())
                    .col(ColumnDef::new(Claims::Email).string())
                    .col(ColumnDef::new(Claims::EmailNormalized).string())
                    .col(ColumnDef::new(Claims::Company).string())
                    .col(ColumnDef::new(Claims::Title).string())
                    .col(ColumnDef::new(Claims::Phone).string())
                    .col(ColumnDef::new(Claims::Address1).string().not_null())
                    .col(ColumnDef::new(Claims::Address2).string())
                    .col(ColumnDef::new(Claims::City).string().not_null())
                    .col(ColumnDef::new(Claims::Region).string().not_null())
                    .col(ColumnDef::new(Claims::PostalCode).string().not_null())
                    .col(ColumnDef::new(Claims::Country).string().not_null())
                    .col(
                        ColumnDef::new(Claims::AddressFingerprint)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Claims::LocationFingerprint).string())
                    .col(ColumnDef::new(Claims::IpHash).string())
                    .col(ColumnDef::new(Claims::UserAgent).string())
                    .col(ColumnDef::new(Claims::InviteCode).string())
                    .col(
                        ColumnDef::new(Claims::IsTestClaim)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Claims::ClaimToken).string().unique_key())
                    .col(ColumnDef::new(Claims::ConfirmedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Claims::ShippedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Claims::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Claims::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Claims::Table, Claims::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Correctness backstop for the check-then-insert duplicate test.
        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::CampaignId)
                    .col(Claims::AddressFingerprint)
                    .unique()
                    .name("uq_claims_campaign_address_fingerprint")
                    .to_owned(),
            )
            .await?;

        // Global lookup used by the CSV importer.
        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::AddressFingerprint)
                    .name("idx_claims_address_fingerprint")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::CampaignId)
                    .col(Claims::LocationFingerprint)
                    .name("idx_claims_campaign_location_fingerprint")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::CampaignId)
                    .col(Claims::EmailNormalized)
                    .name("idx_claims_campaign_email_normalized")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::CampaignId)
                    .col(Claims::IpHash)
                    .col(Claims::CreatedAt)
                    .name("idx_claims_campaign_ip_hash_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Claims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Claims {
    Table,
    Id,
    CampaignId,
    Status,
    FirstName,
    LastName,
    Email,
    EmailNormalized,
    Company,
    Title,
    Phone,
    Address1,
    Address2,
    City,
    Region,
    PostalCode,
    Country,
    AddressFingerprint,
    LocationFingerprint,
    IpHash,
    UserAgent,
    InviteCode,
    IsTestClaim,
    ClaimToken,
    ConfirmedAt,
    ShippedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Campaigns {
    Table,
    Id,
}
