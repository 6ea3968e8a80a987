use crate::core::ranking::{RankedFund, RankingCriteria};
use crate::store::memory::MemoryCache;
use async_trait::async_trait;
use std::hash::Hash;
use std::time::Duration;
use tracing::debug;

/// Default lifetime of a cached ranking view.
pub const RANKING_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
    async fn clear(&self);
}

/// Cache key for a ranking view: the view name plus a canonical rendering of
/// its limit and criteria.
pub fn ranking_key(view: &str, limit: usize, criteria: &RankingCriteria) -> String {
    format!("{view}|limit={limit}|{}", criteria.canonical())
}

/// Time-limited memo of computed ranking views. Created once per service and
/// cleared explicitly after new data lands.
pub struct RankingCache {
    inner: MemoryCache<String, Vec<RankedFund>>,
    ttl: Duration,
}

impl RankingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: MemoryCache::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<Vec<RankedFund>> {
        self.inner.get(&key.to_string()).await
    }

    pub async fn put(&self, key: String, data: Vec<RankedFund>) {
        self.inner.put(key, data, Some(self.ttl)).await;
    }

    pub async fn clear(&self) {
        self.inner.clear().await;
        debug!("Ranking cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for RankingCache {
    fn default() -> Self {
        Self::new(RANKING_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::Category;
    use crate::core::ranking::ReturnPeriod;
    use tokio::time::sleep;

    #[test]
    fn test_ranking_key_is_canonical() {
        let a = RankingCriteria {
            category: Some(Category::Debt),
            min_aum: Some(500.0),
            ..Default::default()
        };
        let b = RankingCriteria {
            min_aum: Some(500.0),
            category: Some(Category::Debt),
            ..Default::default()
        };
        assert_eq!(ranking_key("top", 20, &a), ranking_key("top", 20, &b));
        assert_ne!(ranking_key("top", 20, &a), ranking_key("top", 50, &a));
        assert_ne!(
            ranking_key("top", 20, &a),
            ranking_key("risk_adjusted", 20, &a)
        );

        let c = RankingCriteria {
            return_period: Some(ReturnPeriod::ThreeYears),
            ..a.clone()
        };
        assert_ne!(ranking_key("top", 20, &a), ranking_key("top", 20, &c));
    }

    #[tokio::test]
    async fn test_ranking_cache_expiry() {
        let cache = RankingCache::new(Duration::from_millis(10));
        cache.put("top".to_string(), Vec::new()).await;
        assert!(cache.get("top").await.is_some());

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("top").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_ranking_cache_clear() {
        let cache = RankingCache::default();
        assert_eq!(cache.ttl(), RANKING_CACHE_TTL);
        cache.put("a".to_string(), Vec::new()).await;
        cache.put("b".to_string(), Vec::new()).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty().await);
    }
}
