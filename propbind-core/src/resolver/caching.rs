use std::sync::Arc;

use propbind_cache::CacheStrategy;

use super::Resolver;

/// A resolver decorator that caches resolved values.
///
/// Only present results are cached; absence is re-queried on every call so
/// a property appearing later in the backing source becomes visible without
/// an expiry.
pub struct CachingResolver {
    delegate: Arc<dyn Resolver>,
    cache: Arc<dyn CacheStrategy<String, String>>,
}

impl CachingResolver {
    pub fn new(
        delegate: Arc<dyn Resolver>,
        cache: Arc<dyn CacheStrategy<String, String>>,
    ) -> Self {
        Self { delegate, cache }
    }

    /// Drop the cached value for one property.
    pub fn expire(&self, name: &str) {
        self.cache.expire(&name.to_string());
    }

    /// Drop every cached value.
    pub fn expire_all(&self) {
        self.cache.expire_all();
    }
}

impl Resolver for CachingResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(&name.to_string()) {
            return Some(hit);
        }
        let value = self.delegate.resolve(name)?;
        self.cache.cache(name.to_string(), value.clone());
        Some(value)
    }
}
