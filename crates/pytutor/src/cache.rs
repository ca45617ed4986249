//! Result cache: LRU over SHA-256 digests of (source, execution settings).
//!
//! The dominant tutor interaction is re-running an unchanged example, so the
//! sandbox remembers the output of completed runs and serves repeats without
//! touching the VM. Only completed runs are stored — timeouts and faults
//! always re-execute.
//!
//! The digest covers the source text, the output budget, and the sorted
//! module allowlist: the same snippet under a tighter budget or allowlist can
//! legitimately end differently, so those runs must not share an entry.
//! `timeout_ms` is deliberately excluded — a run that completed once is not
//! invalidated by a different deadline.
//!
//! # Environment variable
//!
//! `PYTUTOR_RESULT_CACHE_SIZE` — maximum number of entries; defaults to `64`.
//! `0` is treated as `1`.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::types::ExecutionSettings;

/// A 32-byte SHA-256 digest identifying one (source, settings) run.
pub type RunDigest = [u8; 32];

/// Digest of `source` under `settings`, for use as a [`ResultCache`] key.
pub fn run_digest(source: &str, settings: &ExecutionSettings) -> RunDigest {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update((settings.max_output_bytes as u64).to_le_bytes());
    let mut modules: Vec<&str> = settings.allowed_modules.iter().map(String::as_str).collect();
    modules.sort_unstable();
    for module in modules {
        hasher.update(module.as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().into()
}

#[derive(Clone)]
struct CachedOutput {
    stdout: String,
    stderr: String,
}

/// LRU cache mapping [`RunDigest`] → captured output of a completed run.
pub struct ResultCache {
    inner: Mutex<LruCache<RunDigest, CachedOutput>>,
    capacity: usize,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity >= 1");
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            capacity: capacity.max(1),
        }
    }

    /// Create a cache sized from `PYTUTOR_RESULT_CACHE_SIZE` (default 64).
    pub fn from_env() -> Self {
        let capacity = std::env::var("PYTUTOR_RESULT_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(64);
        Self::new(capacity)
    }

    /// Look up a completed run, advancing it to most-recently-used on a hit.
    pub fn lookup(&self, digest: &RunDigest) -> Option<(String, String)> {
        self.inner
            .lock()
            .expect("result cache mutex poisoned")
            .get(digest)
            .map(|entry| (entry.stdout.clone(), entry.stderr.clone()))
    }

    /// Record the output of a completed run, evicting the LRU entry at capacity.
    pub fn store(&self, digest: RunDigest, stdout: &str, stderr: &str) {
        self.inner
            .lock()
            .expect("result cache mutex poisoned")
            .put(
                digest,
                CachedOutput {
                    stdout: stdout.to_owned(),
                    stderr: stderr.to_owned(),
                },
            );
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("result cache mutex poisoned").len()
    }

    /// `true` when no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum entries before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry; capacity is unchanged.
    pub fn clear(&self) {
        self.inner.lock().expect("result cache mutex poisoned").clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ExecutionSettings {
        ExecutionSettings::default()
    }

    // ── run_digest ───────────────────────────────────────────────────────────

    #[test]
    fn test_digest_stable_for_same_input() {
        let a = run_digest("print('hi')", &settings());
        let b = run_digest("print('hi')", &settings());
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_differs_for_different_source() {
        let a = run_digest("x = 1", &settings());
        let b = run_digest("x = 2", &settings());
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_differs_for_different_allowlist() {
        let restricted = ExecutionSettings {
            allowed_modules: vec!["math".to_string()],
            ..settings()
        };
        assert_ne!(
            run_digest("import json", &settings()),
            run_digest("import json", &restricted)
        );
    }

    #[test]
    fn test_digest_differs_for_different_output_budget() {
        let tight = ExecutionSettings {
            max_output_bytes: 16,
            ..settings()
        };
        assert_ne!(
            run_digest("print('x' * 100)", &settings()),
            run_digest("print('x' * 100)", &tight)
        );
    }

    #[test]
    fn test_digest_ignores_allowlist_order() {
        let forward = ExecutionSettings {
            allowed_modules: vec!["math".to_string(), "json".to_string()],
            ..settings()
        };
        let reversed = ExecutionSettings {
            allowed_modules: vec!["json".to_string(), "math".to_string()],
            ..settings()
        };
        assert_eq!(run_digest("x = 1", &forward), run_digest("x = 1", &reversed));
    }

    #[test]
    fn test_digest_ignores_timeout() {
        let slow = ExecutionSettings {
            timeout_ms: 30_000,
            ..settings()
        };
        assert_eq!(run_digest("x = 1", &settings()), run_digest("x = 1", &slow));
    }

    // ── lookup / store ───────────────────────────────────────────────────────

    #[test]
    fn test_lookup_miss_returns_none() {
        let cache = ResultCache::new(8);
        assert!(cache.lookup(&run_digest("nothing", &settings())).is_none());
    }

    #[test]
    fn test_store_then_lookup() {
        let cache = ResultCache::new(8);
        let digest = run_digest("print(1)", &settings());
        cache.store(digest, "1\n", "");
        assert_eq!(
            cache.lookup(&digest),
            Some(("1\n".to_string(), String::new()))
        );
    }

    #[test]
    fn test_len_tracks_insertions() {
        let cache = ResultCache::new(8);
        assert!(cache.is_empty());
        cache.store(run_digest("a", &settings()), "", "");
        cache.store(run_digest("b", &settings()), "", "");
        assert_eq!(cache.len(), 2);
    }

    // ── LRU eviction ─────────────────────────────────────────────────────────

    #[test]
    fn test_eviction_at_capacity_one() {
        let cache = ResultCache::new(1);
        let first = run_digest("first", &settings());
        let second = run_digest("second", &settings());
        cache.store(first, "1", "");
        cache.store(second, "2", "");
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup(&first).is_none(), "first should be evicted");
        assert!(cache.lookup(&second).is_some());
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let cache = ResultCache::new(2);
        let a = run_digest("a", &settings());
        let b = run_digest("b", &settings());
        let c = run_digest("c", &settings());
        cache.store(a, "A", "");
        cache.store(b, "B", "");
        let _ = cache.lookup(&a); // b becomes LRU
        cache.store(c, "C", "");
        assert!(cache.lookup(&b).is_none(), "b should be evicted");
        assert!(cache.lookup(&a).is_some());
        assert!(cache.lookup(&c).is_some());
    }

    // ── Edge cases ───────────────────────────────────────────────────────────

    #[test]
    fn test_capacity_zero_clamped_to_one() {
        let cache = ResultCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.store(run_digest("x", &settings()), "", "");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_same_digest_keeps_len() {
        let cache = ResultCache::new(4);
        let digest = run_digest("same", &settings());
        cache.store(digest, "old", "");
        cache.store(digest, "new", "");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(&digest), Some(("new".to_string(), String::new())));
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = ResultCache::new(4);
        cache.store(run_digest("a", &settings()), "", "");
        cache.clear();
        assert!(cache.is_empty());
        // Still usable afterwards.
        cache.store(run_digest("b", &settings()), "", "");
        assert_eq!(cache.len(), 1);
    }
}
