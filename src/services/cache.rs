use crate::models::RoleMatch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// In-process cache of each role's stored matches
///
/// Re-ranking is triggered on every slider move, so the joined match rows
/// are kept in memory between requests. Entries are invalidated whenever a
/// matching run rewrites scores for the role, and expire after the TTL.
///
/// Every invalidation bumps a per-role generation. A read-through fill only
/// lands if the generation is unchanged since before its store read, so rows
/// read ahead of a matching run never outlive that run's invalidation.
pub struct CacheManager {
    role_matches: moka::future::Cache<String, Arc<Vec<RoleMatch>>>,
    generations: Mutex<HashMap<String, u64>>,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let role_matches = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            role_matches,
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Cached matches for a role, if present
    pub async fn get_role_matches(&self, role_id: &str) -> Option<Arc<Vec<RoleMatch>>> {
        let key = CacheKey::role_matches(role_id);
        let hit = self.role_matches.get(&key).await;
        if hit.is_some() {
            tracing::trace!("Cache hit: {}", key);
        } else {
            tracing::trace!("Cache miss: {}", key);
        }
        hit
    }

    /// Current invalidation generation of a role
    pub async fn generation(&self, role_id: &str) -> u64 {
        self.generations
            .lock()
            .await
            .get(role_id)
            .copied()
            .unwrap_or(0)
    }

    /// Store matches read at `generation`; skipped when the role was
    /// invalidated in between. Returns whether the entry was stored.
    pub async fn set_role_matches(
        &self,
        role_id: &str,
        generation: u64,
        matches: Arc<Vec<RoleMatch>>,
    ) -> bool {
        let generations = self.generations.lock().await;

        if generations.get(role_id).copied().unwrap_or(0) != generation {
            tracing::debug!("Skipping stale cache fill for role {}", role_id);
            return false;
        }

        self.role_matches
            .insert(CacheKey::role_matches(role_id), matches)
            .await;
        true
    }

    /// Cached matches for a role, or the result of `load` stored behind the
    /// generation check
    pub async fn get_or_load_role_matches<F, Fut, E>(
        &self,
        role_id: &str,
        load: F,
    ) -> Result<Arc<Vec<RoleMatch>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RoleMatch>, E>>,
    {
        if let Some(cached) = self.get_role_matches(role_id).await {
            return Ok(cached);
        }

        let generation = self.generation(role_id).await;
        let matches = Arc::new(load().await?);
        self.set_role_matches(role_id, generation, matches.clone()).await;

        Ok(matches)
    }

    /// Drop cached matches for the given roles
    pub async fn invalidate_roles(&self, role_ids: &[String]) {
        let mut generations = self.generations.lock().await;

        for role_id in role_ids {
            *generations.entry(role_id.clone()).or_insert(0) += 1;
            self.role_matches
                .invalidate(&CacheKey::role_matches(role_id))
                .await;
        }
        tracing::debug!("Invalidated cached matches for {} roles", role_ids.len());
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.role_matches.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a role's stored matches
    pub fn role_matches(role_id: &str) -> String {
        format!("role_matches:{}", role_id)
    }
}
