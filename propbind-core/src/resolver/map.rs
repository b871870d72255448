use dashmap::DashMap;

use super::Resolver;

/// An in-memory resolver over a concurrent map.
///
/// Entries can be inserted and removed through a shared reference, which
/// makes this the resolver of choice for tests and programmatic overrides.
#[derive(Default)]
pub struct MapResolver {
    values: DashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.values.remove(name);
    }
}

impl FromIterator<(String, String)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let resolver = Self::new();
        for (name, value) in iter {
            resolver.insert(name, value);
        }
        resolver
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|entry| entry.value().clone())
    }
}
