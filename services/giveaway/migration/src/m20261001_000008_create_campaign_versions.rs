use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CampaignVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CampaignVersions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CampaignVersions::CampaignId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CampaignVersions::VersionNumber).integer())
                    .col(ColumnDef::new(CampaignVersions::Status).string().not_null())
                    .col(
                        ColumnDef::new(CampaignVersions::Settings)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CampaignVersions::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(CampaignVersions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CampaignVersions::PublishedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(CampaignVersions::Table, CampaignVersions::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL version numbers (drafts) do not collide under a unique index.
        manager
            .create_index(
                Index::create()
                    .table(CampaignVersions::Table)
                    .col(CampaignVersions::CampaignId)
                    .col(CampaignVersions::VersionNumber)
                    .unique()
                    .name("uq_campaign_versions_campaign_version")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CampaignVersions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CampaignVersions {
    Table,
    Id,
    CampaignId,
    VersionNumber,
    Status,
    Settings,
    CreatedBy,
    CreatedAt,
    PublishedAt,
}

#[derive(Iden)]
enum Campaigns {
    Table,
    Id,
}
