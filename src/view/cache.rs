//! Per-document display list cache

use std::num::NonZeroUsize;

use lru::LruCache;

/// Page index → display list memo for one open document.
///
/// Unbounded by default: each page is converted at most once for the lifetime
/// of the view. [`PageRenderCache::bounded`] keeps only the most recently
/// rendered pages instead.
pub struct PageRenderCache<L> {
    cache: LruCache<usize, L>,
}

impl<L> PageRenderCache<L> {
    /// Create a cache that never evicts
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: LruCache::unbounded(),
        }
    }

    /// Create a cache holding at most `capacity` pages (at least one)
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// `bounded(capacity)` for a non-zero capacity, `new()` for zero
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            Self::new()
        } else {
            Self::bounded(capacity)
        }
    }

    /// Return the cached entry for `page`, building it with `factory` on a miss.
    ///
    /// A failing factory leaves the cache untouched.
    pub fn get_or_create<E, F>(&mut self, page: usize, factory: F) -> Result<&L, E>
    where
        F: FnOnce(usize) -> Result<L, E>,
    {
        self.cache.try_get_or_insert(page, || factory(page))
    }

    /// Check if a page is cached without promoting it
    #[must_use]
    pub fn contains(&self, page: usize) -> bool {
        self.cache.contains(&page)
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<L> Default for PageRenderCache<L> {
    fn default() -> Self {
        Self::new()
    }
}
