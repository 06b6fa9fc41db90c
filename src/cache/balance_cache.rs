use crate::config::CacheSettings;
use crate::error::{AppError, Result};
use crate::observability::get_metrics;
use redis::AsyncCommands;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Cache statistics for monitoring.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
    pub errors: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn get_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn get_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn get_invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    pub fn get_errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Redis-based read cache for derived account balances (SPEC_FULL.md
/// §4.5.1). Never a source of truth — every write path invalidates the
/// entry for the accounts it touched, and a miss always falls back to the
/// ledger aggregation query.
pub struct BalanceCache {
    client: redis::Client,
    settings: CacheSettings,
    stats: Arc<CacheStats>,
}

impl BalanceCache {
    pub fn new(client: redis::Client, settings: CacheSettings) -> Self {
        Self {
            client,
            settings,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> Arc<CacheStats> {
        self.stats.clone()
    }

    fn cache_key(&self, account_id: Uuid) -> String {
        format!("{}:balance:{}", self.settings.key_prefix, account_id)
    }

    pub async fn get(&self, account_id: Uuid) -> Result<Option<Decimal>> {
        if !self.settings.enabled {
            return Ok(None);
        }

        let key = self.cache_key(account_id);
        let start = std::time::Instant::now();

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("Redis connection error in cache get: {}", e);
                return Ok(None);
            }
        };

        let result: Option<String> = match conn.get(&key).await {
            Ok(v) => v,
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("Redis get error: {}", e);
                return Ok(None);
            }
        };

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Some(raw) => match raw.parse::<Decimal>() {
                Ok(balance) => {
                    self.stats.record_hit();
                    get_metrics().record_balance_query_latency(duration_ms, true);
                    Ok(Some(balance))
                }
                Err(e) => {
                    self.stats.record_error();
                    tracing::warn!("Failed to parse cached balance: {}", e);
                    self.invalidate(account_id).await?;
                    Ok(None)
                }
            },
            None => {
                self.stats.record_miss();
                get_metrics().record_balance_query_latency(duration_ms, false);
                Ok(None)
            }
        }
    }

    pub async fn set(&self, account_id: Uuid, balance: Decimal) -> Result<()> {
        if !self.settings.enabled {
            return Ok(());
        }

        let key = self.cache_key(account_id);

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("Redis connection error in cache set: {}", e);
                return Ok(());
            }
        };

        let ttl = self.settings.balance_ttl_secs;
        match conn.set_ex::<_, _, ()>(&key, balance.to_string(), ttl).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("Redis set error: {}", e);
                Err(AppError::Redis(e))
            }
        }
    }

    /// Invalidates a cached balance. Called after every ledger write that
    /// touches the account.
    pub async fn invalidate(&self, account_id: Uuid) -> Result<()> {
        if !self.settings.enabled {
            return Ok(());
        }

        let key = self.cache_key(account_id);

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("Redis connection error in cache invalidate: {}", e);
                return Ok(());
            }
        };

        if let Err(e) = conn.del::<_, ()>(&key).await {
            self.stats.record_error();
            tracing::warn!("Redis del error: {}", e);
        } else {
            self.stats.record_invalidation();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats() {
        let stats = CacheStats::new();

        assert_eq!(stats.get_hits(), 0);
        assert_eq!(stats.get_misses(), 0);
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert_eq!(stats.get_hits(), 2);
        assert_eq!(stats.get_misses(), 1);
        assert!((stats.hit_rate() - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_cache_key_format() {
        let settings = CacheSettings {
            enabled: true,
            redis_url: "redis://localhost:6379".to_string(),
            balance_ttl_secs: 60,
            key_prefix: "test".to_string(),
        };
        let client = redis::Client::open(settings.redis_url.clone()).unwrap();
        let cache = BalanceCache::new(client, settings);

        let account_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = cache.cache_key(account_id);

        assert_eq!(key, "test:balance:550e8400-e29b-41d4-a716-446655440000");
    }
}
