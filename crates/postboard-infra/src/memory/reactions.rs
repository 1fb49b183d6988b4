use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use postboard_core::domain::{Reaction, ReactionKind, ReactionTally};
use postboard_core::error::RepoError;
use postboard_core::ports::ReactionRepository;

#[derive(Default)]
struct ReactionTable {
    /// Keyed by (user, post); the sequence number orders by recency.
    rows: HashMap<(i32, i32), (u64, Reaction)>,
    seq: u64,
}

/// In-memory like/dislike repository.
#[derive(Default)]
pub struct InMemoryReactionRepository {
    table: RwLock<ReactionTable>,
}

impl InMemoryReactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReactionRepository for InMemoryReactionRepository {
    async fn upsert(&self, reaction: Reaction) -> Result<Reaction, RepoError> {
        let mut table = self.table.write().await;
        table.seq += 1;
        let seq = table.seq;
        table
            .rows
            .insert((reaction.user_id, reaction.post_id), (seq, reaction.clone()));
        Ok(reaction)
    }

    async fn find(&self, user_id: i32, post_id: i32) -> Result<Option<Reaction>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&(user_id, post_id)).map(|(_, r)| r.clone()))
    }

    async fn tally(&self, post_ids: &[i32]) -> Result<HashMap<i32, ReactionTally>, RepoError> {
        let table = self.table.read().await;
        let mut tallies: HashMap<i32, ReactionTally> = HashMap::new();

        for (_, reaction) in table.rows.values() {
            if !post_ids.contains(&reaction.post_id) {
                continue;
            }
            let entry = tallies.entry(reaction.post_id).or_default();
            match reaction.kind {
                ReactionKind::Like => entry.likes += 1,
                ReactionKind::Dislike => entry.dislikes += 1,
            }
        }

        Ok(tallies)
    }

    async fn post_ids_by_user(
        &self,
        user_id: i32,
        kind: ReactionKind,
    ) -> Result<Vec<i32>, RepoError> {
        let table = self.table.read().await;
        let mut matching: Vec<&(u64, Reaction)> = table
            .rows
            .values()
            .filter(|(_, r)| r.user_id == user_id && r.kind == kind)
            .collect();
        matching.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(matching.into_iter().map(|(_, r)| r.post_id).collect())
    }

    async fn most_liked(&self, limit: u64) -> Result<Vec<(i32, u64)>, RepoError> {
        let table = self.table.read().await;
        let mut likes: HashMap<i32, u64> = HashMap::new();
        for (_, reaction) in table.rows.values() {
            if reaction.kind == ReactionKind::Like {
                *likes.entry(reaction.post_id).or_default() += 1;
            }
        }

        let mut ranked: Vec<(i32, u64)> = likes.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(ranked)
    }

    async fn delete_by_post_id(&self, post_id: i32) -> Result<u64, RepoError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|(_, p), _| *p != post_id);
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_replaces_previous_kind() {
        let repo = InMemoryReactionRepository::new();
        repo.upsert(Reaction::new(1, 10, ReactionKind::Like))
            .await
            .unwrap();
        repo.upsert(Reaction::new(1, 10, ReactionKind::Dislike))
            .await
            .unwrap();

        let tally = repo.tally(&[10]).await.unwrap();
        assert_eq!(tally[&10], ReactionTally { likes: 0, dislikes: 1 });
    }

    #[tokio::test]
    async fn test_most_liked_ranks_by_count_then_id() {
        let repo = InMemoryReactionRepository::new();
        for user in 1..=3 {
            repo.upsert(Reaction::new(user, 20, ReactionKind::Like))
                .await
                .unwrap();
        }
        repo.upsert(Reaction::new(1, 30, ReactionKind::Like))
            .await
            .unwrap();
        repo.upsert(Reaction::new(2, 10, ReactionKind::Like))
            .await
            .unwrap();
        repo.upsert(Reaction::new(3, 40, ReactionKind::Dislike))
            .await
            .unwrap();

        let ranked = repo.most_liked(2).await.unwrap();
        assert_eq!(ranked, vec![(20, 3), (10, 1)]);
    }

    #[tokio::test]
    async fn test_post_ids_by_user_most_recent_first() {
        let repo = InMemoryReactionRepository::new();
        repo.upsert(Reaction::new(1, 10, ReactionKind::Like))
            .await
            .unwrap();
        repo.upsert(Reaction::new(1, 20, ReactionKind::Like))
            .await
            .unwrap();
        repo.upsert(Reaction::new(1, 30, ReactionKind::Dislike))
            .await
            .unwrap();

        let liked = repo
            .post_ids_by_user(1, ReactionKind::Like)
            .await
            .unwrap();
        assert_eq!(liked, vec![20, 10]);
    }
}
