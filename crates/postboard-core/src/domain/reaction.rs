use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of reaction a user left on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(ReactionKind::Like),
            "dislike" => Some(ReactionKind::Dislike),
            _ => None,
        }
    }
}

/// A user's reaction to a post. At most one exists per (user, post).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: i32,
    pub post_id: i32,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: i32, post_id: i32, kind: ReactionKind) -> Self {
        Self {
            user_id,
            post_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Like/dislike request as handed to the post service.
///
/// `user_id` always comes from the resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionRequest {
    pub user_id: i32,
    pub post_id: i32,
}

/// Like and dislike counts for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionTally {
    pub likes: u64,
    pub dislikes: u64,
}
