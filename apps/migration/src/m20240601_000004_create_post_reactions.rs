use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_users::Users;
use crate::m20240601_000002_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostReactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostReactions::UserId).integer().not_null())
                    .col(ColumnDef::new(PostReactions::PostId).integer().not_null())
                    .col(ColumnDef::new(PostReactions::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(PostReactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // One reaction per (user, post)
                    .primary_key(
                        Index::create()
                            .col(PostReactions::UserId)
                            .col(PostReactions::PostId),
                    )
                    .check(Expr::col(PostReactions::Kind).is_in(["like", "dislike"]))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reactions_user_id")
                            .from(PostReactions::Table, PostReactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reactions_post_id")
                            .from(PostReactions::Table, PostReactions::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_reactions_post_kind")
                    .table(PostReactions::Table)
                    .col(PostReactions::PostId)
                    .col(PostReactions::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostReactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PostReactions {
    Table,
    UserId,
    PostId,
    Kind,
    CreatedAt,
}
