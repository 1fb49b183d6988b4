//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DbConn, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect};

use postboard_core::domain::{
    Post, PostFile, PostFileInfo, Reaction, ReactionKind, ReactionTally, User,
};
use postboard_core::error::RepoError;
use postboard_core::ports::{
    PostFileRepository, PostRepository, ReactionRepository, UserRepository,
};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_file::{self, Entity as PostFileEntity};
use super::entity::post_reaction::{self, Entity as ReactionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL post attachment repository.
pub type PostgresPostFileRepository = PostgresBaseRepository<PostFileEntity>;

/// Mask the local part of an email so it can be logged.
fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let masked_local = match local.chars().next() {
            Some(first) if local.len() > 1 => format!("{}***", first),
            _ => "***".to_string(),
        };
        format!("{}{}", masked_local, domain)
    } else {
        "***".to_string()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostFileRepository for PostgresPostFileRepository {
    async fn find_in_post(
        &self,
        post_id: i32,
        file_id: i32,
    ) -> Result<Option<PostFile>, RepoError> {
        let result = PostFileEntity::find()
            .filter(post_file::Column::Id.eq(file_id))
            .filter(post_file::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_info(&self, post_ids: &[i32]) -> Result<Vec<PostFileInfo>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Content stays in the database, only its length is read.
        let rows = PostFileEntity::find()
            .select_only()
            .columns([
                post_file::Column::Id,
                post_file::Column::PostId,
                post_file::Column::FileName,
                post_file::Column::FileType,
            ])
            .column_as(Expr::cust("octet_length(file_content)::bigint"), "size")
            .filter(post_file::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_asc(post_file::Column::Id)
            .into_model::<post_file::InfoRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError> {
        let result = PostFileEntity::delete_many()
            .filter(post_file::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[derive(Debug, FromQueryResult)]
struct TallyRow {
    post_id: i32,
    kind: String,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct RankRow {
    post_id: i32,
    likes: i64,
}

/// PostgreSQL like/dislike repository.
pub struct PostgresReactionRepository {
    db: DbConn,
}

impl PostgresReactionRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReactionRepository for PostgresReactionRepository {
    async fn upsert(&self, reaction: Reaction) -> Result<Reaction, RepoError> {
        let active: post_reaction::ActiveModel = reaction.clone().into();

        ReactionEntity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    post_reaction::Column::UserId,
                    post_reaction::Column::PostId,
                ])
                .update_columns([post_reaction::Column::Kind, post_reaction::Column::CreatedAt])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(reaction)
    }

    async fn find(&self, user_id: i32, post_id: i32) -> Result<Option<Reaction>, RepoError> {
        ReactionEntity::find_by_id((user_id, post_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Reaction::try_from)
            .transpose()
    }

    async fn tally(&self, post_ids: &[i32]) -> Result<HashMap<i32, ReactionTally>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ReactionEntity::find()
            .select_only()
            .column(post_reaction::Column::PostId)
            .column(post_reaction::Column::Kind)
            .column_as(Expr::col(post_reaction::Column::UserId).count(), "total")
            .filter(post_reaction::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(post_reaction::Column::PostId)
            .group_by(post_reaction::Column::Kind)
            .into_model::<TallyRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut tallies: HashMap<i32, ReactionTally> = HashMap::new();
        for row in rows {
            let entry = tallies.entry(row.post_id).or_default();
            let total = row.total.max(0) as u64;
            match ReactionKind::parse(&row.kind) {
                Some(ReactionKind::Like) => entry.likes += total,
                Some(ReactionKind::Dislike) => entry.dislikes += total,
                None => tracing::warn!(kind = %row.kind, "Skipping unknown reaction kind"),
            }
        }

        Ok(tallies)
    }

    async fn post_ids_by_user(
        &self,
        user_id: i32,
        kind: ReactionKind,
    ) -> Result<Vec<i32>, RepoError> {
        let result = ReactionEntity::find()
            .filter(post_reaction::Column::UserId.eq(user_id))
            .filter(post_reaction::Column::Kind.eq(kind.as_str()))
            .order_by_desc(post_reaction::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(|r| r.post_id).collect())
    }

    async fn most_liked(&self, limit: u64) -> Result<Vec<(i32, u64)>, RepoError> {
        let rows = ReactionEntity::find()
            .select_only()
            .column(post_reaction::Column::PostId)
            .column_as(Expr::col(post_reaction::Column::UserId).count(), "likes")
            .filter(post_reaction::Column::Kind.eq(ReactionKind::Like.as_str()))
            .group_by(post_reaction::Column::PostId)
            .order_by_desc(Expr::col(post_reaction::Column::UserId).count())
            .order_by_asc(post_reaction::Column::PostId)
            .limit(limit)
            .into_model::<RankRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| (r.post_id, r.likes.max(0) as u64))
            .collect())
    }

    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError> {
        let result = ReactionEntity::delete_many()
            .filter(post_reaction::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
