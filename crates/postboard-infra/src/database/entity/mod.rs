//! SeaORM entities.

pub mod post;
pub mod post_file;
pub mod post_reaction;
pub mod user;
