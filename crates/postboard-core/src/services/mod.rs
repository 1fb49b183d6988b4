//! Application services built on the ports.

mod post_service;

pub use post_service::{DEFAULT_TOP_LIKED_LIMIT, MAX_TITLE_LEN, PostManager, PostService};
