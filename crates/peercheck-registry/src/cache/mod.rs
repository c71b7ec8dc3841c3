//! Version-list caching with TTL support

use std::time::{Duration, SystemTime};
use dashmap::DashMap;
use peercheck_core::types::Version;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached published versions
    pub versions: Vec<Version>,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create new cache entry with default TTL (1 hour)
    pub fn new(versions: Vec<Version>) -> Self {
        Self::with_ttl(versions, Duration::from_secs(3600))
    }

    /// Create cache entry with custom TTL
    pub fn with_ttl(versions: Vec<Version>, ttl: Duration) -> Self {
        Self {
            versions,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory version cache with TTL
#[derive(Debug)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MetadataCache {
    /// Create new cache with the default one hour TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Create new cache whose entries live for `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Get cached versions if fresh
    pub fn get(&self, package_name: &str) -> Option<Vec<Version>> {
        let fresh = {
            let entry = self.cache.get(package_name)?;
            entry.is_fresh().then(|| entry.versions.clone())
        };

        if fresh.is_none() {
            // Remove stale entry; the read guard above is already released
            self.cache.remove(package_name);
        }
        fresh
    }

    /// Store versions with the cache TTL
    pub fn insert(&self, package_name: String, versions: Vec<Version>) {
        let entry = CacheEntry::with_ttl(versions, self.ttl);
        self.cache.insert(package_name, entry);
    }

    /// Check if package is cached and fresh
    pub fn contains_fresh(&self, package_name: &str) -> bool {
        self.cache
            .get(package_name)
            .map(|entry| entry.is_fresh())
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let fresh_entries = self.cache.iter().filter(|entry| entry.is_fresh()).count();

        CacheStats {
            total_entries: self.cache.len(),
            fresh_entries,
            stale_entries: self.cache.len() - fresh_entries,
        }
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of fresh entries
    pub fresh_entries: usize,
    /// Number of stale entries
    pub stale_entries: usize,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
