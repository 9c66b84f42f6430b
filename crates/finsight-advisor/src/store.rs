//! Insight cache
//!
//! Analysis results are cached per user so later requests can be answered
//! without another model call. [`InsightStore`] is the seam for a shared
//! cache; [`MemoryInsightStore`] keeps entries in-process with a time to live.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use finsight_types::Insight;
use tokio::time::Instant;

use crate::error::Result;

/// Default lifetime of a cached entry (one hour)
pub const DEFAULT_INSIGHT_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait InsightStore: Send + Sync {
    /// Replace the cached insights for `user_id`
    async fn put(&self, user_id: &str, insights: Vec<Insight>) -> Result<()>;

    /// Cached insights for `user_id`, or `None` when absent or expired
    async fn get(&self, user_id: &str) -> Result<Option<Vec<Insight>>>;
}

#[derive(Debug, Clone)]
struct CachedInsights {
    insights: Vec<Insight>,
    expires_at: Instant,
}

/// In-process store with a fixed time to live per entry
#[derive(Debug, Clone)]
pub struct MemoryInsightStore {
    entries: Arc<DashMap<String, CachedInsights>>,
    ttl: Duration,
}

impl Default for MemoryInsightStore {
    fn default() -> Self {
        Self::new(DEFAULT_INSIGHT_TTL)
    }
}

impl MemoryInsightStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired insight cache entries");
        }
        removed
    }
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    async fn put(&self, user_id: &str, insights: Vec<Insight>) -> Result<()> {
        self.entries.insert(
            user_id.to_string(),
            CachedInsights {
                insights,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<Vec<Insight>>> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(user_id)
            .map(|cached| (cached.expires_at > now).then(|| cached.insights.clone()));

        match hit {
            Some(Some(insights)) => Ok(Some(insights)),
            Some(None) => {
                self.entries.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
