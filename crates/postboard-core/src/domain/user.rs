use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel user id for a request that carries no identity.
///
/// Real users are numbered from 1, so the services treat this (and any
/// other non-positive id) as "nobody".
pub const ANONYMOUS_USER_ID: i32 = 0;

/// User entity - represents a user in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet persisted user. The store assigns the id.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id > ANONYMOUS_USER_ID
    }
}
