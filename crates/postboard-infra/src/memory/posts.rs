use async_trait::async_trait;
use tokio::sync::RwLock;

use postboard_core::domain::{Post, PostFile, PostFileInfo};
use postboard_core::error::RepoError;
use postboard_core::ports::{BaseRepository, PostFileRepository, PostRepository};

use super::Table;

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        post.id = table.assign_id(post.id);
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        match self.table.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.table.read().await.rows.values().cloned().collect();
        Ok(Self::newest_first(posts))
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        let posts = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(posts))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id))
            .cloned()
            .collect())
    }
}

/// In-memory post attachment repository.
#[derive(Default)]
pub struct InMemoryPostFileRepository {
    table: RwLock<Table<PostFile>>,
}

impl InMemoryPostFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<PostFile, i32> for InMemoryPostFileRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<PostFile>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut file: PostFile) -> Result<PostFile, RepoError> {
        let mut table = self.table.write().await;
        file.id = table.assign_id(file.id);
        table.rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        match self.table.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostFileRepository for InMemoryPostFileRepository {
    async fn find_in_post(
        &self,
        post_id: i32,
        file_id: i32,
    ) -> Result<Option<PostFile>, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&file_id)
            .filter(|f| f.post_id == post_id)
            .cloned())
    }

    async fn list_info(&self, post_ids: &[i32]) -> Result<Vec<PostFileInfo>, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|f| post_ids.contains(&f.post_id))
            .map(PostFile::info)
            .collect())
    }

    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, f| f.post_id != post_id);
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_core::domain::NewPostFile;

    fn attachment(post_id: i32, name: &str) -> PostFile {
        PostFile::new(
            post_id,
            NewPostFile {
                file_name: name.to_string(),
                file_type: "text/plain".to_string(),
                file_content: b"hello".to_vec(),
            },
        )
    }

    #[tokio::test]
    async fn test_find_all_is_newest_first() {
        let repo = InMemoryPostRepository::new();
        let first = repo
            .save(Post::new(1, "first".into(), "a".into()))
            .await
            .unwrap();
        let second = repo
            .save(Post::new(1, "second".into(), "b".into()))
            .await
            .unwrap();

        let ids: Vec<i32> = repo.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_file_must_belong_to_post() {
        let repo = InMemoryPostFileRepository::new();
        let saved = repo.save(attachment(1, "a.txt")).await.unwrap();

        assert!(repo.find_in_post(1, saved.id).await.unwrap().is_some());
        assert!(repo.find_in_post(2, saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_info_and_delete_by_post() {
        let repo = InMemoryPostFileRepository::new();
        repo.save(attachment(1, "a.txt")).await.unwrap();
        repo.save(attachment(1, "b.txt")).await.unwrap();
        repo.save(attachment(2, "c.txt")).await.unwrap();

        let infos = repo.list_info(&[1]).await.unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.size == 5));

        assert_eq!(repo.delete_by_post_id(1).await.unwrap(), 2);
        assert!(repo.list_info(&[1]).await.unwrap().is_empty());
        assert_eq!(repo.list_info(&[2]).await.unwrap().len(), 1);
    }
}
