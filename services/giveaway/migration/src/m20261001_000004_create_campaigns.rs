use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let flag = |col: Campaigns| {
            ColumnDef::new(col)
                .boolean()
                .not_null()
                .default(false)
                .to_owned()
        };
        let limit = |col: Campaigns| {
            ColumnDef::new(col)
                .integer()
                .not_null()
                .default(0)
                .to_owned()
        };

        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Campaigns::Title).string().not_null())
                    .col(ColumnDef::new(Campaigns::CapacityTotal).integer())
                    .col(
                        ColumnDef::new(Campaigns::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Campaigns::StartsAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Campaigns::EndsAt).timestamp_with_time_zone())
                    .col(flag(Campaigns::RequireEmail))
                    .col(flag(Campaigns::RequireEmailVerification))
                    .col(flag(Campaigns::RequireInviteCode))
                    .col(flag(Campaigns::ShowScarcity))
                    .col(flag(Campaigns::TestMode))
                    .col(flag(Campaigns::KioskMode))
                    .col(flag(Campaigns::ShowBanner))
                    .col(flag(Campaigns::ShowLogo))
                    .col(flag(Campaigns::EnableQuestions))
                    .col(limit(Campaigns::MaxClaimsPerEmail))
                    .col(limit(Campaigns::MaxClaimsPerIpPerDay))
                    .col(limit(Campaigns::MaxClaimsPerAddress))
                    .col(ColumnDef::new(Campaigns::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Campaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Campaigns::Table, Campaigns::CreatedBy)
                            .to(AdminUsers::Table, AdminUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Campaigns {
    Table,
    Id,
    Slug,
    Title,
    CapacityTotal,
    IsActive,
    StartsAt,
    EndsAt,
    RequireEmail,
    RequireEmailVerification,
    RequireInviteCode,
    ShowScarcity,
    TestMode,
    KioskMode,
    ShowBanner,
    ShowLogo,
    EnableQuestions,
    MaxClaimsPerEmail,
    MaxClaimsPerIpPerDay,
    MaxClaimsPerAddress,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AdminUsers {
    Table,
    Id,
}
