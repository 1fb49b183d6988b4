//! Post service behavior over the in-memory repositories.

use std::sync::Arc;

use async_trait::async_trait;

use postboard_core::domain::{
    ANONYMOUS_USER_ID, MAX_FILE_BYTES, NewPost, NewPostFile, Post, PostChanges, PostFilter,
    ReactionRequest, User,
};
use postboard_core::error::RepoError;
use postboard_core::ports::{BaseRepository, PostRepository};
use postboard_core::services::MAX_TITLE_LEN;
use postboard_core::{DomainError, PostManager, PostService};
use postboard_infra::{
    InMemoryPostFileRepository, InMemoryPostRepository, InMemoryReactionRepository,
    InMemoryUserRepository,
};

struct Fixture {
    service: PostManager,
    alice: i32,
    bob: i32,
}

async fn fixture() -> Fixture {
    fixture_with(Arc::new(InMemoryPostRepository::new())).await
}

async fn fixture_with(posts: Arc<dyn PostRepository>) -> Fixture {
    let users = Arc::new(InMemoryUserRepository::new());
    let alice = users
        .save(User::new("alice".into(), "alice@example.com".into(), "x".into()))
        .await
        .unwrap()
        .id;
    let bob = users
        .save(User::new("bob".into(), "bob@example.com".into(), "x".into()))
        .await
        .unwrap()
        .id;

    let service = PostManager::new(
        posts,
        Arc::new(InMemoryPostFileRepository::new()),
        Arc::new(InMemoryReactionRepository::new()),
        users,
    );

    Fixture {
        service,
        alice,
        bob,
    }
}

/// Post store whose deletes always fail with the given error.
struct BrokenDeletes {
    inner: InMemoryPostRepository,
    error: fn() -> RepoError,
}

impl BrokenDeletes {
    fn new(error: fn() -> RepoError) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryPostRepository::new(),
            error,
        })
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for BrokenDeletes {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.inner.save(entity).await
    }

    async fn delete(&self, _id: i32) -> Result<(), RepoError> {
        Err((self.error)())
    }
}

#[async_trait]
impl PostRepository for BrokenDeletes {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        self.inner.find_all().await
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        self.inner.find_by_user_id(user_id).await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Post>, RepoError> {
        self.inner.find_by_ids(ids).await
    }
}

fn new_post(title: &str, content: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: content.to_string(),
    }
}

fn pdf(name: &str) -> NewPostFile {
    NewPostFile {
        file_name: name.to_string(),
        file_type: "application/pdf".to_string(),
        file_content: b"%PDF-1.7".to_vec(),
    }
}

#[tokio::test]
async fn test_create_and_read_back_with_author() {
    let f = fixture().await;

    let post = f
        .service
        .create(new_post("  Hello  ", "First post"), f.alice)
        .await
        .unwrap();

    let details = f.service.get_by_id(post.id).await.unwrap();
    assert_eq!(details.title, "Hello");
    assert_eq!(details.author.unwrap().username, "alice");
    assert_eq!(details.likes, 0);

    let all = f.service.get_all_with_user().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_anonymous_user_cannot_mutate() {
    let f = fixture().await;

    let result = f
        .service
        .create(new_post("title", "content"), ANONYMOUS_USER_ID)
        .await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));

    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();
    let result = f
        .service
        .like_post(ReactionRequest {
            user_id: ANONYMOUS_USER_ID,
            post_id: post.id,
        })
        .await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let f = fixture().await;

    let result = f.service.create(new_post("   ", "content"), f.alice).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_only_the_author_can_update_or_delete() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();

    let changes = PostChanges {
        title: Some("hijacked".to_string()),
        content: None,
    };
    let result = f.service.update(post.id, changes.clone(), f.bob).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    let result = f.service.delete(post.id, f.bob).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    let updated = f.service.update(post.id, changes, f.alice).await.unwrap();
    assert_eq!(updated.title, "hijacked");
    assert_eq!(updated.content, "content");

    f.service.delete(post.id, f.alice).await.unwrap();
    assert!(matches!(
        f.service.get_by_id(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let f = fixture().await;

    assert!(matches!(
        f.service.get_by_id(404).await,
        Err(DomainError::NotFound { id: 404, .. })
    ));
    assert!(matches!(
        f.service.delete(404, f.alice).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_files_are_scoped_to_their_post() {
    let f = fixture().await;
    let first = f
        .service
        .create(new_post("one", "content"), f.alice)
        .await
        .unwrap();
    let second = f
        .service
        .create(new_post("two", "content"), f.alice)
        .await
        .unwrap();

    let info = f
        .service
        .add_file_to_post(first.id, pdf("report.pdf"), f.alice)
        .await
        .unwrap();

    let file = f.service.get_file(first.id, info.id).await.unwrap();
    assert_eq!(file.file_name, "report.pdf");
    assert_eq!(file.file_content, b"%PDF-1.7".to_vec());

    assert!(matches!(
        f.service.get_file(second.id, info.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        f.service
            .remove_file_from_post(first.id, info.id, f.bob)
            .await,
        Err(DomainError::Forbidden(_))
    ));

    let details = f.service.get_by_id(first.id).await.unwrap();
    assert_eq!(details.files.len(), 1);
    assert_eq!(details.files[0].size, 8);

    f.service
        .remove_file_from_post(first.id, info.id, f.alice)
        .await
        .unwrap();
    assert!(f.service.get_by_id(first.id).await.unwrap().files.is_empty());
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();

    let mut file = pdf("empty.pdf");
    file.file_content.clear();

    assert!(matches!(
        f.service.add_file_to_post(post.id, file, f.alice).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_like_and_dislike_are_exclusive() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();
    let request = ReactionRequest {
        user_id: f.bob,
        post_id: post.id,
    };

    f.service.like_post(request).await.unwrap();
    f.service.like_post(request).await.unwrap();
    let details = f.service.get_by_id(post.id).await.unwrap();
    assert_eq!((details.likes, details.dislikes), (1, 0));

    f.service.dislike_post(request).await.unwrap();
    let details = f.service.get_by_id(post.id).await.unwrap();
    assert_eq!((details.likes, details.dislikes), (0, 1));

    assert!(
        f.service
            .get_liked_posts_by_user(f.bob)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_liking_a_missing_post_is_not_found() {
    let f = fixture().await;

    let result = f
        .service
        .like_post(ReactionRequest {
            user_id: f.bob,
            post_id: 99,
        })
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { id: 99, .. })));
}

#[tokio::test]
async fn test_liked_posts_and_top_liked_ranking() {
    let f = fixture().await;
    let quiet = f
        .service
        .create(new_post("quiet", "content"), f.alice)
        .await
        .unwrap();
    let popular = f
        .service
        .create(new_post("popular", "content"), f.alice)
        .await
        .unwrap();

    for user_id in [f.alice, f.bob] {
        f.service
            .like_post(ReactionRequest {
                user_id,
                post_id: popular.id,
            })
            .await
            .unwrap();
    }
    f.service
        .like_post(ReactionRequest {
            user_id: f.bob,
            post_id: quiet.id,
        })
        .await
        .unwrap();

    let top: Vec<i32> = f
        .service
        .get_top_liked_posts()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(top, vec![popular.id, quiet.id]);

    let liked: Vec<i32> = f
        .service
        .get_liked_posts_by_user(f.bob)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(liked, vec![quiet.id, popular.id]);
}

#[tokio::test]
async fn test_top_liked_respects_limit() {
    let f = fixture().await;
    let service = f.service.with_top_liked_limit(1);

    for title in ["a", "b"] {
        let post = service
            .create(new_post(title, "content"), f.alice)
            .await
            .unwrap();
        service
            .like_post(ReactionRequest {
                user_id: f.bob,
                post_id: post.id,
            })
            .await
            .unwrap();
    }

    assert_eq!(service.get_top_liked_posts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_filter_by_file_type_and_search_term() {
    let f = fixture().await;
    let report = f
        .service
        .create(new_post("Annual report", "numbers"), f.alice)
        .await
        .unwrap();
    f.service
        .add_file_to_post(report.id, pdf("annual.pdf"), f.alice)
        .await
        .unwrap();
    f.service
        .create(new_post("Report draft", "no attachment"), f.alice)
        .await
        .unwrap();

    let matches = f
        .service
        .get_filtered_posts(PostFilter {
            file_type: Some("pdf".to_string()),
            search_term: Some("report".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, report.id);

    let by_text = f
        .service
        .get_filtered_posts(PostFilter {
            file_type: None,
            search_term: Some("REPORT".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(by_text.len(), 2);

    let none = f
        .service
        .get_filtered_posts(PostFilter {
            file_type: Some("docx".to_string()),
            search_term: None,
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_posts_by_user() {
    let f = fixture().await;
    f.service
        .create(new_post("by alice", "content"), f.alice)
        .await
        .unwrap();
    f.service
        .create(new_post("by bob", "content"), f.bob)
        .await
        .unwrap();

    let posts = f.service.get_posts_by_user(f.bob).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "by bob");
    assert!(f.service.get_posts_by_user(999).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_title_length_limit() {
    let f = fixture().await;

    let longest = "t".repeat(MAX_TITLE_LEN);
    let post = f
        .service
        .create(new_post(&longest, "content"), f.alice)
        .await
        .unwrap();
    assert_eq!(post.title.chars().count(), MAX_TITLE_LEN);

    let too_long = "t".repeat(MAX_TITLE_LEN + 1);
    assert!(matches!(
        f.service.create(new_post(&too_long, "content"), f.alice).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        f.service
            .update(
                post.id,
                PostChanges {
                    title: Some(too_long),
                    content: None,
                },
                f.alice,
            )
            .await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_file_size_limit() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();

    let mut largest = pdf("largest.pdf");
    largest.file_content = vec![0u8; MAX_FILE_BYTES];
    let info = f
        .service
        .add_file_to_post(post.id, largest, f.alice)
        .await
        .unwrap();
    assert_eq!(info.size, MAX_FILE_BYTES as u64);

    let mut oversized = pdf("oversized.pdf");
    oversized.file_content = vec![0u8; MAX_FILE_BYTES + 1];
    assert!(matches!(
        f.service.add_file_to_post(post.id, oversized, f.alice).await,
        Err(DomainError::Validation(_))
    ));
    assert_eq!(f.service.get_by_id(post.id).await.unwrap().files.len(), 1);
}

#[tokio::test]
async fn test_file_metadata_must_be_servable() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();

    let split_name = pdf("a\nb.pdf");
    let mut injected_type = pdf("report.pdf");
    injected_type.file_type = "text/plain\r\nX-Evil: 1".to_string();
    let mut not_a_mime = pdf("report.pdf");
    not_a_mime.file_type = "pdf".to_string();

    for file in [split_name, injected_type, not_a_mime] {
        assert!(matches!(
            f.service.add_file_to_post(post.id, file, f.alice).await,
            Err(DomainError::Validation(_))
        ));
    }

    let mut with_params = pdf("notes.txt");
    with_params.file_type = "text/plain; charset=utf-8".to_string();
    f.service
        .add_file_to_post(post.id, with_params, f.alice)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_delete_keeps_attachments_and_reactions() {
    let f = fixture_with(BrokenDeletes::new(|| {
        RepoError::Connection("connection reset".to_string())
    }))
    .await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();
    f.service
        .add_file_to_post(post.id, pdf("keep.pdf"), f.alice)
        .await
        .unwrap();
    f.service
        .like_post(ReactionRequest {
            user_id: f.bob,
            post_id: post.id,
        })
        .await
        .unwrap();

    assert!(matches!(
        f.service.delete(post.id, f.alice).await,
        Err(DomainError::Internal(_))
    ));

    let details = f.service.get_by_id(post.id).await.unwrap();
    assert_eq!(details.files.len(), 1);
    assert_eq!(details.likes, 1);
}

#[tokio::test]
async fn test_delete_lost_to_concurrent_request_is_not_found() {
    let f = fixture_with(BrokenDeletes::new(|| RepoError::NotFound)).await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();

    let result = f.service.delete(post.id, f.alice).await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "post", id }) if id == post.id
    ));
}

#[tokio::test]
async fn test_delete_removes_attachments_and_reactions() {
    let f = fixture().await;
    let post = f
        .service
        .create(new_post("title", "content"), f.alice)
        .await
        .unwrap();
    let info = f
        .service
        .add_file_to_post(post.id, pdf("gone.pdf"), f.alice)
        .await
        .unwrap();
    f.service
        .like_post(ReactionRequest {
            user_id: f.bob,
            post_id: post.id,
        })
        .await
        .unwrap();

    f.service.delete(post.id, f.alice).await.unwrap();

    assert!(matches!(
        f.service.get_file(post.id, info.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(f.service.get_liked_posts_by_user(f.bob).await.unwrap().is_empty());
    assert!(f.service.get_top_liked_posts().await.unwrap().is_empty());
}
