//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::{HttpRequest, ResponseError, error, web};

use crate::middleware::error::AppError;

/// Largest JSON body accepted. Attachments travel base64-encoded, so this
/// sits comfortably above the raw file cap.
pub const JSON_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// JSON extractor settings: body limit and RFC 7807 errors for bad payloads.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            let response = AppError::BadRequest(err.to_string()).error_response();
            error::InternalError::from_response(err, response).into()
        })
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(posts::scope()),
    );
}
