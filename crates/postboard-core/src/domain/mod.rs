//! Domain entities - the core business objects.

mod post;
mod post_file;
mod reaction;
mod user;

pub use post::{AuthorSummary, NewPost, Post, PostChanges, PostDetails, PostFilter};
pub use post_file::{MAX_FILE_BYTES, NewPostFile, PostFile, PostFileInfo};
pub use reaction::{Reaction, ReactionKind, ReactionRequest, ReactionTally};
pub use user::{ANONYMOUS_USER_ID, User};
