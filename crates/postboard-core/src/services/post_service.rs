//! Post service - posts, attachments and reactions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ANONYMOUS_USER_ID, AuthorSummary, MAX_FILE_BYTES, NewPost, NewPostFile, Post, PostChanges,
    PostDetails, PostFile, PostFileInfo, PostFilter, Reaction, ReactionKind, ReactionRequest,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    BaseRepository, PostFileRepository, PostRepository, ReactionRepository, UserRepository,
};

/// Number of posts returned by the top-liked ranking unless configured.
pub const DEFAULT_TOP_LIKED_LIMIT: u64 = 10;

/// Longest accepted post title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Operations behind the post HTTP endpoints.
///
/// Mutating operations take the acting user's id and refuse to run for
/// [`ANONYMOUS_USER_ID`]; read operations are open to everyone.
#[async_trait]
pub trait PostService: Send + Sync {
    async fn create(&self, post: NewPost, user_id: i32) -> Result<Post, DomainError>;

    /// Every post with its author, newest first.
    async fn get_all_with_user(&self) -> Result<Vec<PostDetails>, DomainError>;

    async fn get_by_id(&self, id: i32) -> Result<PostDetails, DomainError>;

    async fn get_posts_by_user(&self, user_id: i32) -> Result<Vec<PostDetails>, DomainError>;

    /// Posts the user currently likes, most recently liked first.
    async fn get_liked_posts_by_user(&self, user_id: i32)
    -> Result<Vec<PostDetails>, DomainError>;

    async fn update(&self, id: i32, changes: PostChanges, user_id: i32)
    -> Result<Post, DomainError>;

    async fn delete(&self, id: i32, user_id: i32) -> Result<(), DomainError>;

    async fn add_file_to_post(
        &self,
        post_id: i32,
        file: NewPostFile,
        user_id: i32,
    ) -> Result<PostFileInfo, DomainError>;

    async fn remove_file_from_post(
        &self,
        post_id: i32,
        file_id: i32,
        user_id: i32,
    ) -> Result<(), DomainError>;

    async fn get_file(&self, post_id: i32, file_id: i32) -> Result<PostFile, DomainError>;

    async fn get_filtered_posts(&self, filter: PostFilter)
    -> Result<Vec<PostDetails>, DomainError>;

    async fn like_post(&self, request: ReactionRequest) -> Result<(), DomainError>;

    async fn dislike_post(&self, request: ReactionRequest) -> Result<(), DomainError>;

    /// Posts ranked by like count, highest first.
    async fn get_top_liked_posts(&self) -> Result<Vec<PostDetails>, DomainError>;
}

/// [`PostService`] implementation over the repository ports.
pub struct PostManager {
    posts: Arc<dyn PostRepository>,
    files: Arc<dyn PostFileRepository>,
    reactions: Arc<dyn ReactionRepository>,
    users: Arc<dyn UserRepository>,
    top_liked_limit: u64,
}

impl PostManager {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        files: Arc<dyn PostFileRepository>,
        reactions: Arc<dyn ReactionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            files,
            reactions,
            users,
            top_liked_limit: DEFAULT_TOP_LIKED_LIMIT,
        }
    }

    pub fn with_top_liked_limit(mut self, limit: u64) -> Self {
        self.top_liked_limit = limit;
        self
    }

    fn require_actor(user_id: i32) -> Result<(), DomainError> {
        if user_id <= ANONYMOUS_USER_ID {
            tracing::warn!(user_id, "Refusing mutation without a resolved user");
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    fn validate_title(title: &str) -> Result<String, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        Ok(title.to_string())
    }

    fn validate_content(content: String) -> Result<String, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation("Content is required".to_string()));
        }
        Ok(content)
    }

    fn validate_file(file: &NewPostFile) -> Result<(), DomainError> {
        if file.file_name.trim().is_empty() {
            return Err(DomainError::Validation("File name is required".to_string()));
        }
        if file.file_name.chars().any(char::is_control) {
            return Err(DomainError::Validation(
                "File name must not contain control characters".to_string(),
            ));
        }
        if file.file_type.trim().is_empty() {
            return Err(DomainError::Validation("File type is required".to_string()));
        }
        if file.file_type.chars().any(char::is_control)
            || file.file_type.parse::<mime::Mime>().is_err()
        {
            return Err(DomainError::Validation(format!(
                "File type {:?} is not a valid MIME type",
                file.file_type
            )));
        }
        if file.file_content.is_empty() {
            return Err(DomainError::Validation("File content is empty".to_string()));
        }
        if file.file_content.len() > MAX_FILE_BYTES {
            return Err(DomainError::Validation(format!(
                "File exceeds the {} byte limit",
                MAX_FILE_BYTES
            )));
        }
        Ok(())
    }

    /// A delete that finds nothing means a concurrent request got there first.
    fn lost(err: RepoError, entity_type: &'static str, id: i32) -> DomainError {
        match err {
            RepoError::NotFound => DomainError::not_found(entity_type, id),
            other => other.into(),
        }
    }

    async fn existing_post(&self, id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn owned_post(&self, id: i32, user_id: i32) -> Result<Post, DomainError> {
        Self::require_actor(user_id)?;
        let post = self.existing_post(id).await?;
        if !post.is_owned_by(user_id) {
            tracing::warn!(post_id = id, user_id, "User does not own post");
            return Err(DomainError::Forbidden(format!(
                "post {} belongs to another user",
                id
            )));
        }
        Ok(post)
    }

    /// Load posts in the order of `ids`, skipping ids that no longer exist.
    async fn posts_in_order(&self, ids: &[i32]) -> Result<Vec<Post>, DomainError> {
        let mut by_id: HashMap<i32, Post> = self
            .posts
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Attach authors, file metadata and reaction counts.
    async fn details(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let mut author_ids: Vec<i32> = posts.iter().map(|p| p.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i32, AuthorSummary> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorSummary {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect();

        let mut files: HashMap<i32, Vec<PostFileInfo>> = HashMap::new();
        for info in self.files.list_info(&post_ids).await? {
            files.entry(info.post_id).or_default().push(info);
        }

        let tallies = self.reactions.tally(&post_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let tally = tallies.get(&post.id).copied().unwrap_or_default();
                PostDetails {
                    author: authors.get(&post.user_id).cloned(),
                    files: files.remove(&post.id).unwrap_or_default(),
                    likes: tally.likes,
                    dislikes: tally.dislikes,
                    id: post.id,
                    user_id: post.user_id,
                    title: post.title,
                    content: post.content,
                    created_at: post.created_at,
                    updated_at: post.updated_at,
                }
            })
            .collect())
    }

    async fn react(&self, request: ReactionRequest, kind: ReactionKind) -> Result<(), DomainError> {
        Self::require_actor(request.user_id)?;
        self.existing_post(request.post_id).await?;

        let previous = self
            .reactions
            .find(request.user_id, request.post_id)
            .await?
            .map(|r| r.kind);

        self.reactions
            .upsert(Reaction::new(request.user_id, request.post_id, kind))
            .await?;

        tracing::info!(
            post_id = request.post_id,
            user_id = request.user_id,
            reaction = kind.as_str(),
            previous = previous.map(|k| k.as_str()),
            "Reaction recorded"
        );
        Ok(())
    }
}

#[async_trait]
impl PostService for PostManager {
    async fn create(&self, post: NewPost, user_id: i32) -> Result<Post, DomainError> {
        Self::require_actor(user_id)?;
        let title = Self::validate_title(&post.title)?;
        let content = Self::validate_content(post.content)?;

        let saved = self.posts.save(Post::new(user_id, title, content)).await?;
        tracing::info!(post_id = saved.id, user_id, "Post created");
        Ok(saved)
    }

    async fn get_all_with_user(&self) -> Result<Vec<PostDetails>, DomainError> {
        let posts = self.posts.find_all().await?;
        self.details(posts).await
    }

    async fn get_by_id(&self, id: i32) -> Result<PostDetails, DomainError> {
        let post = self.existing_post(id).await?;
        self.details(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn get_posts_by_user(&self, user_id: i32) -> Result<Vec<PostDetails>, DomainError> {
        let posts = self.posts.find_by_user_id(user_id).await?;
        self.details(posts).await
    }

    async fn get_liked_posts_by_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<PostDetails>, DomainError> {
        let ids = self
            .reactions
            .post_ids_by_user(user_id, ReactionKind::Like)
            .await?;
        let posts = self.posts_in_order(&ids).await?;
        self.details(posts).await
    }

    async fn update(
        &self,
        id: i32,
        changes: PostChanges,
        user_id: i32,
    ) -> Result<Post, DomainError> {
        let mut post = self.owned_post(id, user_id).await?;

        let changes = PostChanges {
            title: changes
                .title
                .as_deref()
                .map(Self::validate_title)
                .transpose()?,
            content: changes.content.map(Self::validate_content).transpose()?,
        };
        post.apply(changes);

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = id, user_id, "Post updated");
        Ok(saved)
    }

    async fn delete(&self, id: i32, user_id: i32) -> Result<(), DomainError> {
        self.owned_post(id, user_id).await?;

        // The post goes first: if this fails, its files and reactions are intact.
        self.posts
            .delete(id)
            .await
            .map_err(|e| Self::lost(e, "post", id))?;

        // Postgres cascades these; the in-memory stores need the sweep.
        match (
            self.files.delete_by_post_id(id).await,
            self.reactions.delete_by_post_id(id).await,
        ) {
            (Ok(files), Ok(reactions)) => {
                tracing::info!(post_id = id, user_id, files, reactions, "Post deleted");
            }
            (files, reactions) => {
                tracing::warn!(
                    post_id = id,
                    user_id,
                    files_error = ?files.err(),
                    reactions_error = ?reactions.err(),
                    "Post deleted but attachment or reaction cleanup failed"
                );
            }
        }
        Ok(())
    }

    async fn add_file_to_post(
        &self,
        post_id: i32,
        file: NewPostFile,
        user_id: i32,
    ) -> Result<PostFileInfo, DomainError> {
        self.owned_post(post_id, user_id).await?;
        Self::validate_file(&file)?;

        let saved = self.files.save(PostFile::new(post_id, file)).await?;
        tracing::info!(
            post_id,
            file_id = saved.id,
            file_type = %saved.file_type,
            size = saved.file_content.len(),
            "File attached to post"
        );
        Ok(saved.info())
    }

    async fn remove_file_from_post(
        &self,
        post_id: i32,
        file_id: i32,
        user_id: i32,
    ) -> Result<(), DomainError> {
        self.owned_post(post_id, user_id).await?;

        let file = self
            .files
            .find_in_post(post_id, file_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post file", file_id))?;
        self.files
            .delete(file.id)
            .await
            .map_err(|e| Self::lost(e, "post file", file_id))?;

        tracing::info!(post_id, file_id, "File removed from post");
        Ok(())
    }

    async fn get_file(&self, post_id: i32, file_id: i32) -> Result<PostFile, DomainError> {
        self.files
            .find_in_post(post_id, file_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post file", file_id))
    }

    async fn get_filtered_posts(
        &self,
        filter: PostFilter,
    ) -> Result<Vec<PostDetails>, DomainError> {
        let candidates: Vec<Post> = self
            .posts
            .find_all()
            .await?
            .into_iter()
            .filter(|p| filter.matches_text(p))
            .collect();

        let matching: Vec<PostDetails> = self
            .details(candidates)
            .await?
            .into_iter()
            .filter(|d| filter.matches_files(&d.files))
            .collect();

        tracing::debug!(?filter, matches = matching.len(), "Filtered posts");
        Ok(matching)
    }

    async fn like_post(&self, request: ReactionRequest) -> Result<(), DomainError> {
        self.react(request, ReactionKind::Like).await
    }

    async fn dislike_post(&self, request: ReactionRequest) -> Result<(), DomainError> {
        self.react(request, ReactionKind::Dislike).await
    }

    async fn get_top_liked_posts(&self) -> Result<Vec<PostDetails>, DomainError> {
        let ranked = self.reactions.most_liked(self.top_liked_limit).await?;
        let ids: Vec<i32> = ranked.into_iter().map(|(id, _)| id).collect();
        let posts = self.posts_in_order(&ids).await?;
        self.details(posts).await
    }
}
