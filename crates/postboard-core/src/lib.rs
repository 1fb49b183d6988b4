//! # Postboard Core
//!
//! The domain layer of the Postboard backend.
//! Posts, their file attachments and reactions, the repository and auth
//! ports infrastructure must implement, and the post service built on them.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{PostManager, PostService};
