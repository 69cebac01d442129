use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpRequests::Email).string().not_null())
                    .col(ColumnDef::new(OtpRequests::OtpHash).string().not_null())
                    .col(ColumnDef::new(OtpRequests::IpHash).string())
                    .col(
                        ColumnDef::new(OtpRequests::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpRequests::MaxAttempts)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(OtpRequests::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpRequests::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Rate-limit windows and "latest unused" lookups both filter on these.
        manager
            .create_index(
                Index::create()
                    .table(OtpRequests::Table)
                    .col(OtpRequests::Email)
                    .col(OtpRequests::CreatedAt)
                    .name("idx_otp_requests_email_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpRequests::Table)
                    .col(OtpRequests::IpHash)
                    .col(OtpRequests::CreatedAt)
                    .name("idx_otp_requests_ip_hash_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpRequests {
    Table,
    Id,
    Email,
    OtpHash,
    IpHash,
    Attempts,
    MaxAttempts,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}
