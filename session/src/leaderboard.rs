//! Time-bounded cache in front of the score store.

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::storage::{LeaderboardEntry, ScoreStore};

/// Leaderboard as shown to one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    /// The requesting player's row, when they rank outside `entries`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<LeaderboardEntry>,
}

/// Caches the top `size` rows for `ttl`.
///
/// Owned by the service; a successful submission calls [`invalidate`].
///
/// [`invalidate`]: LeaderboardCache::invalidate
pub struct LeaderboardCache {
    ttl: Duration,
    size: usize,
    cached: Mutex<Option<(Instant, Vec<LeaderboardEntry>)>>,
}

impl LeaderboardCache {
    pub fn new(ttl: Duration, size: usize) -> Self {
        Self {
            ttl,
            size,
            cached: Mutex::new(None),
        }
    }

    /// Top rows, from the cache when fresh.
    pub async fn top(&self, store: &dyn ScoreStore) -> Result<Vec<LeaderboardEntry>> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, entries)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(entries.clone());
            }
        }
        let entries = store.top(self.size).await?;
        debug!(rows = entries.len(), "Leaderboard refreshed");
        *cached = Some((Instant::now(), entries.clone()));
        Ok(entries)
    }

    /// Top rows plus the player's own row if they are not among them. The
    /// caller's row is flagged with `is_current_user` wherever it appears.
    pub async fn view(
        &self,
        store: &dyn ScoreStore,
        player_id: Option<u64>,
    ) -> Result<LeaderboardView> {
        let mut entries = self.top(store).await?;
        let Some(id) = player_id else {
            return Ok(LeaderboardView {
                entries,
                player: None,
            });
        };

        let mut in_top = false;
        for entry in entries.iter_mut().filter(|e| e.player_id == id) {
            entry.is_current_user = true;
            in_top = true;
        }
        let player = if in_top {
            None
        } else {
            store.entry_for(id).await?.map(|mut entry| {
                entry.is_current_user = true;
                entry
            })
        };
        Ok(LeaderboardView { entries, player })
    }

    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ScoreRecord, SqliteScoreStore};

    async fn seeded_store() -> SqliteScoreStore {
        let store = SqliteScoreStore::open_in_memory("s1").unwrap();
        for (id, score) in [(1, 500), (2, 400), (3, 300)] {
            store
                .submit(&ScoreRecord {
                    player_id: id,
                    score,
                    display_name: None,
                    address: None,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_serves_until_ttl() {
        let store = seeded_store().await;
        let cache = LeaderboardCache::new(Duration::from_secs(30), 2);
        assert_eq!(cache.top(&store).await.unwrap().len(), 2);

        store
            .submit(&ScoreRecord {
                player_id: 4,
                score: 900,
                display_name: Some("new".into()),
                address: None,
            })
            .await
            .unwrap();
        // Stale but cached
        assert_eq!(cache.top(&store).await.unwrap()[0].player_id, 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.top(&store).await.unwrap()[0].player_id, 4);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let store = seeded_store().await;
        let cache = LeaderboardCache::new(Duration::from_secs(3600), 5);
        assert_eq!(cache.top(&store).await.unwrap().len(), 3);

        store
            .submit(&ScoreRecord {
                player_id: 9,
                score: 1,
                display_name: None,
                address: None,
            })
            .await
            .unwrap();
        assert_eq!(cache.top(&store).await.unwrap().len(), 3);
        cache.invalidate().await;
        assert_eq!(cache.top(&store).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_view_appends_player_outside_top() {
        let store = seeded_store().await;
        let cache = LeaderboardCache::new(Duration::from_secs(30), 2);

        let view = cache.view(&store, Some(3)).await.unwrap();
        assert_eq!(view.entries.len(), 2);
        let player = view.player.unwrap();
        assert_eq!((player.player_id, player.rank), (3, 3));
        assert!(player.is_current_user);
        assert!(view.entries.iter().all(|e| !e.is_current_user));

        let view = cache.view(&store, Some(1)).await.unwrap();
        assert!(view.player.is_none());

        let view = cache.view(&store, Some(42)).await.unwrap();
        assert!(view.player.is_none());

        let view = cache.view(&store, None).await.unwrap();
        assert!(view.player.is_none());
        assert!(view.entries.iter().all(|e| !e.is_current_user));
    }

    #[tokio::test]
    async fn test_view_marks_player_inside_top() {
        let store = seeded_store().await;
        let cache = LeaderboardCache::new(Duration::from_secs(30), 3);

        let view = cache.view(&store, Some(2)).await.unwrap();
        assert!(view.player.is_none());
        let marked: Vec<(u64, u64)> = view
            .entries
            .iter()
            .filter(|e| e.is_current_user)
            .map(|e| (e.player_id, e.rank))
            .collect();
        assert_eq!(marked, vec![(2, 2)]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["entries"][1]["isCurrentUser"], true);
        assert_eq!(json["entries"][0]["isCurrentUser"], false);

        // The cached rows stay unmarked for the next caller
        let view = cache.view(&store, Some(1)).await.unwrap();
        let marked: Vec<u64> = view
            .entries
            .iter()
            .filter(|e| e.is_current_user)
            .map(|e| e.player_id)
            .collect();
        assert_eq!(marked, vec![1]);
        assert!(cache.top(&store).await.unwrap().iter().all(|e| !e.is_current_user));
    }
}
