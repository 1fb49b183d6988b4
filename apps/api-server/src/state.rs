//! Application state - shared across all handlers.

use std::sync::Arc;

use postboard_core::ports::UserRepository;
use postboard_core::{PostManager, PostService};
use postboard_infra::{
    InMemoryPostFileRepository, InMemoryPostRepository, InMemoryReactionRepository,
    InMemoryUserRepository,
};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use postboard_infra::{
    PostgresPostFileRepository, PostgresPostRepository, PostgresReactionRepository,
    PostgresUserRepository, database,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostService>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(posts: Arc<dyn PostService>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(top_liked_limit: u64) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let posts = PostManager::new(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryPostFileRepository::new()),
            Arc::new(InMemoryReactionRepository::new()),
            users.clone(),
        )
        .with_top_liked_limit(top_liked_limit);

        Self::new(Arc::new(posts), users)
    }

    /// Build the state from configuration, falling back to memory when the
    /// database is not configured or unreachable.
    #[cfg(feature = "postgres")]
    pub async fn from_config(config: &AppConfig) -> Self {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory(config.top_liked_limit);
        };

        match database::connect(db_config).await {
            Ok(conn) => {
                let users: Arc<dyn UserRepository> =
                    Arc::new(PostgresUserRepository::new(conn.clone()));
                let posts = PostManager::new(
                    Arc::new(PostgresPostRepository::new(conn.clone())),
                    Arc::new(PostgresPostFileRepository::new(conn.clone())),
                    Arc::new(PostgresReactionRepository::new(conn)),
                    users.clone(),
                )
                .with_top_liked_limit(config.top_liked_limit);

                tracing::info!("Application state initialized (postgres)");
                Self::new(Arc::new(posts), users)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory(config.top_liked_limit)
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    pub async fn from_config(config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory(config.top_liked_limit)
    }
}
