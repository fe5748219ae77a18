//! Initial schema: the `incomes` and `expenses` collections.
//!
//! Both tables share the same columns. Indexes cover the owner filter
//! combined with the two sort keys (`created_at` for listings, `date` for the
//! merged feed).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Incomes {
    Table,
}

#[derive(Iden)]
enum Expenses {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum Records {
    Id,
    Source,
    Amount,
    Date,
    Icon,
    UserEmail,
    CreatedAt,
}

fn records_table(table: impl IntoIden + 'static) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Records::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Records::Source).string().not_null())
        .col(ColumnDef::new(Records::Amount).double().not_null())
        .col(ColumnDef::new(Records::Date).string().not_null())
        .col(ColumnDef::new(Records::Icon).string().not_null())
        .col(ColumnDef::new(Records::UserEmail).string())
        .col(ColumnDef::new(Records::CreatedAt).timestamp_with_time_zone().not_null())
        .to_owned()
}

fn owner_index(
    name: &str,
    table: impl IntoIden + 'static,
    sort_key: Records,
) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(table)
        .col(Records::UserEmail)
        .col(sort_key)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(records_table(Incomes::Table)).await?;
        manager.create_table(records_table(Expenses::Table)).await?;

        manager
            .create_index(owner_index(
                "idx-incomes-user_email-created_at",
                Incomes::Table,
                Records::CreatedAt,
            ))
            .await?;
        manager
            .create_index(owner_index(
                "idx-incomes-user_email-date",
                Incomes::Table,
                Records::Date,
            ))
            .await?;
        manager
            .create_index(owner_index(
                "idx-expenses-user_email-created_at",
                Expenses::Table,
                Records::CreatedAt,
            ))
            .await?;
        manager
            .create_index(owner_index(
                "idx-expenses-user_email-date",
                Expenses::Table,
                Records::Date,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        Ok(())
    }
}
