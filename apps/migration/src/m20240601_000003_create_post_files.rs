use sea_orm_migration::prelude::*;

use crate::m20240601_000002_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostFiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostFiles::PostId).integer().not_null())
                    .col(ColumnDef::new(PostFiles::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(PostFiles::FileType).string_len(255).not_null())
                    .col(ColumnDef::new(PostFiles::FileContent).binary().not_null())
                    .col(
                        ColumnDef::new(PostFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_files_post_id")
                            .from(PostFiles::Table, PostFiles::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_files_post_id")
                    .table(PostFiles::Table)
                    .col(PostFiles::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PostFiles {
    Table,
    Id,
    PostId,
    FileName,
    FileType,
    FileContent,
    CreatedAt,
}
