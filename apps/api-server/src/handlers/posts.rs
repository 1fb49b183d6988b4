//! Post endpoints under `/api/posts`.
//!
//! Each handler makes exactly one call to the [`PostService`] held in
//! [`AppState`]. Mutations require an [`Identity`]; reads are anonymous,
//! and some of them record the caller via [`OptionalIdentity`].
//!
//! [`PostService`]: postboard_core::PostService

use actix_web::http::header::{
    self, ContentDisposition, DispositionParam, DispositionType, HeaderValue,
};
use actix_web::{HttpResponse, Scope, web};
use base64::{Engine, engine::general_purpose::STANDARD};

use postboard_core::domain::{NewPost, NewPostFile, PostChanges, PostFilter, ReactionRequest};
use postboard_shared::MessageResponse;
use postboard_shared::dto::{
    CreatePostRequest, PostFileRequest, PostFilterQuery, PostLikeDislikeRequest,
    UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Routes of the post resource. Literal segments come before `/{id}`.
pub fn scope() -> Scope {
    web::scope("/posts")
        .service(
            web::resource("")
                .route(web::post().to(create_post))
                .route(web::get().to(get_all_posts)),
        )
        .route("/filter", web::get().to(get_filtered_posts))
        .route("/top-liked", web::get().to(get_top_liked_posts))
        .route("/like", web::post().to(like_post))
        .route("/dislike", web::post().to(dislike_post))
        .route("/user/{user_id}", web::get().to(get_posts_by_user))
        .route("/liked/{user_id}", web::get().to(get_liked_posts_by_user))
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_post))
                .route(web::put().to(update_post))
                .route(web::delete().to(delete_post)),
        )
        .route("/{post_id}/files", web::post().to(add_file_to_post))
        .service(
            web::resource("/{post_id}/files/{file_id}")
                .route(web::get().to(get_file))
                .route(web::delete().to(remove_file_from_post)),
        )
}

fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new(text))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state
        .posts
        .create(
            NewPost {
                title: req.title,
                content: req.content,
            },
            identity.user_id,
        )
        .await?;
    Ok(message("Post created successfully"))
}

/// GET /api/posts
pub async fn get_all_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.get_all_with_user().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post = state.posts.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts/user/{user_id}
pub async fn get_posts_by_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.get_posts_by_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/liked/{user_id}
pub async fn get_liked_posts_by_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.get_liked_posts_by_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    state
        .posts
        .update(
            id,
            PostChanges {
                title: req.title,
                content: req.content,
            },
            identity.user_id,
        )
        .await?;
    Ok(message("Post updated successfully"))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner(), identity.user_id).await?;
    Ok(message("Post deleted successfully"))
}

/// POST /api/posts/{post_id}/files
pub async fn add_file_to_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<PostFileRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();
    let file_content = STANDARD
        .decode(req.file_content.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("fileContent is not valid base64: {}", e)))?;

    state
        .posts
        .add_file_to_post(
            post_id,
            NewPostFile {
                file_name: req.file_name,
                file_type: req.file_type,
                file_content,
            },
            identity.user_id,
        )
        .await?;
    Ok(message("File added successfully"))
}

/// DELETE /api/posts/{post_id}/files/{file_id}
pub async fn remove_file_from_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, file_id) = path.into_inner();
    state
        .posts
        .remove_file_from_post(post_id, file_id, identity.user_id)
        .await?;
    Ok(message("File removed successfully"))
}

/// GET /api/posts/{post_id}/files/{file_id}
///
/// Raw file bytes, served as an attachment.
pub async fn get_file(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, file_id) = path.into_inner();
    let file = state.posts.get_file(post_id, file_id).await?;

    let content_type = HeaderValue::from_str(&file.file_type).map_err(|_| {
        AppError::Internal(format!("stored file {} has an unusable content type", file.id))
    })?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file.file_name)],
    };

    tracing::debug!(
        post_id,
        file_id,
        viewer = viewer.user_id_or_anonymous(),
        "Serving attachment"
    );

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header(disposition)
        .body(file.file_content))
}

/// GET /api/posts/filter?fileType=..&searchTerm=..
pub async fn get_filtered_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PostFilterQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    tracing::debug!(
        viewer = viewer.user_id_or_anonymous(),
        file_type = ?query.file_type,
        search_term = ?query.search_term,
        "Filtering posts"
    );
    let posts = state
        .posts
        .get_filtered_posts(PostFilter {
            file_type: query.file_type,
            search_term: query.search_term,
        })
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

fn reaction_request(identity: &Identity, body: PostLikeDislikeRequest) -> ReactionRequest {
    if let Some(sent) = body.user_id.filter(|id| *id != identity.user_id) {
        tracing::debug!(
            sent_user_id = sent,
            user_id = identity.user_id,
            "Ignoring userId from request body"
        );
    }

    ReactionRequest {
        user_id: identity.user_id,
        post_id: body.post_id,
    }
}

/// POST /api/posts/like
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostLikeDislikeRequest>,
) -> AppResult<HttpResponse> {
    let request = reaction_request(&identity, body.into_inner());
    state.posts.like_post(request).await?;
    Ok(message("Post liked successfully"))
}

/// POST /api/posts/dislike
pub async fn dislike_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostLikeDislikeRequest>,
) -> AppResult<HttpResponse> {
    let request = reaction_request(&identity, body.into_inner());
    state.posts.dislike_post(request).await?;
    Ok(message("Post disliked successfully"))
}

/// GET /api/posts/top-liked
pub async fn get_top_liked_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.get_top_liked_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}
