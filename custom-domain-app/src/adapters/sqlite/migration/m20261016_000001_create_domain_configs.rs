use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DomainConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DomainConfigs::TenantId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DomainConfigs::Domain)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DomainConfigs::Status).string().not_null())
                    .col(ColumnDef::new(DomainConfigs::Document).text().not_null())
                    .col(ColumnDef::new(DomainConfigs::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 定期检查按状态扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domain_configs_status")
                    .table(DomainConfigs::Table)
                    .col(DomainConfigs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DomainConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DomainConfigs {
    Table,
    TenantId,
    Domain,
    Status,
    Document,
    UpdatedAt,
}
