use async_trait::async_trait;
use tokio::sync::RwLock;

use postboard_core::domain::User;
use postboard_core::error::RepoError;
use postboard_core::ports::{BaseRepository, UserRepository};

use super::Table;

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, RepoError> {
        let mut table = self.table.write().await;

        let taken = table.rows.values().any(|u| {
            u.id != user.id && (u.email == user.email || u.username == user.username)
        });
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        user.id = table.assign_id(user.id);
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        match self.table.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id))
            .cloned()
            .collect())
    }
}
