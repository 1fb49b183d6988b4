use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Post, PostFile, PostFileInfo, Reaction, ReactionKind, ReactionTally, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Load several users at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// All posts, newest first.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts written by a user, newest first.
    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError>;

    /// Load several posts at once. Unknown ids are skipped; order is unspecified.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Post>, RepoError>;
}

/// Post attachment repository.
#[async_trait]
pub trait PostFileRepository: BaseRepository<PostFile, i32> {
    /// A file, only if it belongs to the given post.
    async fn find_in_post(&self, post_id: i32, file_id: i32)
    -> Result<Option<PostFile>, RepoError>;

    /// Attachment metadata for a set of posts, without file content.
    async fn list_info(&self, post_ids: &[i32]) -> Result<Vec<PostFileInfo>, RepoError>;

    /// Remove every attachment of a post.
    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError>;
}

/// Like/dislike storage. Holds at most one reaction per (user, post).
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Insert the reaction or replace the kind of an existing one.
    async fn upsert(&self, reaction: Reaction) -> Result<Reaction, RepoError>;

    /// The reaction a user left on a post, if any.
    async fn find(&self, user_id: i32, post_id: i32) -> Result<Option<Reaction>, RepoError>;

    /// Like and dislike counts for each of the given posts.
    /// Posts without reactions may be missing from the map.
    async fn tally(&self, post_ids: &[i32]) -> Result<HashMap<i32, ReactionTally>, RepoError>;

    /// Ids of the posts a user reacted to with `kind`, most recent first.
    async fn post_ids_by_user(
        &self,
        user_id: i32,
        kind: ReactionKind,
    ) -> Result<Vec<i32>, RepoError>;

    /// Post ids ranked by like count (descending, ties by ascending id).
    async fn most_liked(&self, limit: u64) -> Result<Vec<(i32, u64)>, RepoError>;

    /// Remove every reaction on a post.
    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError>;
}
