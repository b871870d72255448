use std::collections::HashMap;
use std::sync::Arc;

use super::{BatchResolution, Resolver};

/// An ordered composition of resolvers.
///
/// `resolve` tries each delegate in registration order and returns the
/// first present result; when every delegate is absent the chain is absent.
/// The chain never synthesizes a value.
#[derive(Clone, Default)]
pub struct ResolverChain {
    delegates: Vec<Arc<dyn Resolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self {
            delegates: Vec::new(),
        }
    }

    pub fn of(delegates: Vec<Arc<dyn Resolver>>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, resolver: Arc<dyn Resolver>) {
        self.delegates.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl Resolver for ResolverChain {
    fn resolve(&self, name: &str) -> Option<String> {
        for (index, delegate) in self.delegates.iter().enumerate() {
            if let Some(value) = delegate.resolve(name) {
                tracing::trace!(property = name, delegate = index, "property resolved");
                return Some(value);
            }
        }
        tracing::trace!(property = name, "property not resolved by any delegate");
        None
    }

    fn resolve_batch(&self, names: &[String]) -> BatchResolution {
        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut remaining: Vec<String> = names.to_vec();
        for delegate in &self.delegates {
            if remaining.is_empty() {
                break;
            }
            let result = delegate.resolve_batch(&remaining);
            for (name, value) in result.resolved() {
                resolved.entry(name.clone()).or_insert_with(|| value.clone());
            }
            remaining = result.unresolved().to_vec();
        }
        BatchResolution::new(names.to_vec(), resolved)
    }
}
