//! # Postboard Infrastructure
//!
//! Concrete implementations of the ports defined in `postboard-core`:
//! SeaORM repositories, in-memory repositories, JWT tokens and Argon2
//! password hashing.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM. The
//!   in-memory repositories are available with or without it.

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::{
    InMemoryPostFileRepository, InMemoryPostRepository, InMemoryReactionRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresPostFileRepository, PostgresPostRepository, PostgresReactionRepository,
    PostgresUserRepository,
};
