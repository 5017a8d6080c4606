//! Kernel function cache
//!
//! Memoizes kernel evaluations for one (kernel, parameter set, dataset)
//! combination. Values are keyed by the dataset indices of the two
//! observations, so a single cache serves every fold split drawn from the
//! same dataset. Kernel matrices are symmetric, so we only cache K(i,j) where i <= j.

use crate::core::LabeledObservation;
use crate::kernel::KernelFunction;
use lru::LruCache;
use std::mem::size_of;
use std::sync::Arc;

/// Cache key for kernel values, normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    i: usize,
    j: usize,
}

impl CacheKey {
    /// Create a normalized cache key where i <= j
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// Bytes accounted per cached entry
///
/// An LRU node holds the key, the value and two list links, and is boxed
/// behind a hash table slot that stores the key again next to the pointer.
pub const BYTES_PER_ENTRY: usize = 2 * size_of::<CacheKey>()
    + size_of::<f64>()
    + 3 * size_of::<usize>()
    + HASH_TABLE_OVERHEAD;

/// Control bytes, load-factor slack and allocator rounding per entry
const HASH_TABLE_OVERHEAD: usize = 16;

/// LRU-bounded memo of kernel values for a fixed dataset
///
/// The kernel must be fully configured before the cache is built; a new
/// hyperparameter combination requires a new cache.
pub struct KernelFunctionCache {
    kernel: Arc<dyn KernelFunction>,
    cache: LruCache<CacheKey, f64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl KernelFunctionCache {
    /// Cache every pairwise value of the dataset
    pub fn new(kernel: Arc<dyn KernelFunction>, observations: &[LabeledObservation]) -> Self {
        let n = Self::index_bound(observations);
        Self::with_capacity(kernel, n * (n + 1) / 2)
    }

    /// Cache at most as many values as fit in `memory_bytes`
    ///
    /// Storage grows with use; nothing is allocated up front.
    pub fn with_memory_limit(
        kernel: Arc<dyn KernelFunction>,
        observations: &[LabeledObservation],
        memory_bytes: usize,
    ) -> Self {
        let n = Self::index_bound(observations);
        let capacity = (n * (n + 1) / 2).min(memory_bytes / BYTES_PER_ENTRY);
        Self::with_capacity(kernel, capacity)
    }

    fn with_capacity(kernel: Arc<dyn KernelFunction>, capacity: usize) -> Self {
        Self {
            kernel,
            cache: LruCache::unbounded(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    // Dataset indices of a subset can exceed its length.
    fn index_bound(observations: &[LabeledObservation]) -> usize {
        observations
            .iter()
            .map(|o| o.dataset_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Look up K(a, b), computing and storing it on a miss
    pub fn similarity(&mut self, a: &LabeledObservation, b: &LabeledObservation) -> f64 {
        let key = CacheKey::new(a.dataset_index, b.dataset_index);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            value
        } else {
            self.misses += 1;
            let value = self.kernel.similarity(&a.observation, &b.observation);
            if self.capacity == 0 {
                return value;
            }
            if self.cache.len() >= self.capacity {
                self.cache.pop_lru();
            }
            self.cache.put(key, value);
            value
        }
    }

    /// The configured kernel this cache evaluates
    pub fn kernel(&self) -> Arc<dyn KernelFunction> {
        Arc::clone(&self.kernel)
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.capacity,
            size: self.cache.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;
    use crate::kernel::LinearKernel;

    fn observations() -> Vec<LabeledObservation> {
        vec![
            LabeledObservation::new("a", Observation::new(vec![1.0, 0.0]), 0),
            LabeledObservation::new("a", Observation::new(vec![2.0, 1.0]), 1),
            LabeledObservation::new("b", Observation::new(vec![0.0, 3.0]), 2),
        ]
    }

    #[test]
    fn test_cache_key_normalization() {
        let key1 = CacheKey::new(1, 5);
        let key2 = CacheKey::new(5, 1);
        assert_eq!(key1, key2);
        assert_eq!(key1.i, 1);
        assert_eq!(key1.j, 5);
    }

    #[test]
    fn test_kernel_cache_basic() {
        let obs = observations();
        let mut cache = KernelFunctionCache::new(Arc::new(LinearKernel::new(0.0)), &obs);

        // Cache miss
        assert_eq!(cache.similarity(&obs[0], &obs[1]), 2.0);
        assert_eq!(cache.stats().misses, 1);

        // Symmetric access is a hit
        assert_eq!(cache.similarity(&obs[1], &obs[0]), 2.0);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_capacity_covers_upper_triangle() {
        let obs = observations();
        let cache = KernelFunctionCache::new(Arc::new(LinearKernel::new(0.0)), &obs);
        assert_eq!(cache.stats().capacity, 6);
    }

    #[test]
    fn test_cache_with_memory_limit() {
        let obs = observations();
        let mut cache = KernelFunctionCache::with_memory_limit(
            Arc::new(LinearKernel::new(0.0)),
            &obs,
            2 * BYTES_PER_ENTRY + 1,
        );
        assert_eq!(cache.stats().capacity, 2);

        cache.similarity(&obs[0], &obs[0]);
        cache.similarity(&obs[1], &obs[1]);
        cache.similarity(&obs[2], &obs[2]); // evicts (0, 0)
        assert_eq!(cache.stats().size, 2);

        cache.similarity(&obs[0], &obs[0]);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn test_memory_limit_is_respected() {
        let obs: Vec<LabeledObservation> = (0..2000)
            .map(|i| LabeledObservation::new("a", Observation::new(vec![i as f64]), i))
            .collect();
        let budget = 1_000_000;
        let mut cache =
            KernelFunctionCache::with_memory_limit(Arc::new(LinearKernel::new(0.0)), &obs, budget);

        // key, value, two links, node pointer and a table slot per entry
        assert!(BYTES_PER_ENTRY >= 48);
        assert!(cache.stats().capacity * BYTES_PER_ENTRY <= budget);

        for a in obs.iter().take(200) {
            for b in obs.iter().take(200) {
                cache.similarity(a, b);
            }
        }
        assert_eq!(cache.stats().size, cache.stats().capacity);
    }

    #[test]
    fn test_zero_budget_still_computes() {
        let obs = observations();
        let mut cache =
            KernelFunctionCache::with_memory_limit(Arc::new(LinearKernel::new(0.0)), &obs, 0);
        assert_eq!(cache.similarity(&obs[0], &obs[1]), 2.0);
        assert_eq!(cache.similarity(&obs[0], &obs[1]), 2.0);
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_keys_follow_dataset_index() {
        // a subset whose dataset indices are not contiguous
        let subset = vec![
            LabeledObservation::new("a", Observation::new(vec![1.0]), 7),
            LabeledObservation::new("b", Observation::new(vec![2.0]), 3),
        ];
        let mut cache = KernelFunctionCache::new(Arc::new(LinearKernel::new(1.0)), &subset);
        assert_eq!(cache.similarity(&subset[0], &subset[1]), 3.0);
        assert_eq!(cache.similarity(&subset[1], &subset[0]), 3.0);
        assert_eq!(cache.stats().hits, 1);
    }
}
