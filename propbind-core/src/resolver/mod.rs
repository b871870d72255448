mod caching;
mod chain;
mod env;
mod map;

pub use caching::CachingResolver;
pub use chain::ResolverChain;
pub use env::EnvResolver;
pub use map::MapResolver;

use std::collections::HashMap;

use crate::error::PropError;

/// A source capable of answering "what is the value of property X".
///
/// Resolvers are read-only from the pipeline's perspective and must not
/// expose partial reads. Absence and transient backend failure are not
/// distinguished here; a resolver that wants retry semantics implements it
/// internally before reporting absence.
pub trait Resolver: Send + Sync {
    /// Resolve a single property, or `None` when absent.
    fn resolve(&self, name: &str) -> Option<String>;

    /// Resolve many properties in one pass.
    ///
    /// The default implementation loops [`Resolver::resolve`]; sources with
    /// a cheaper bulk path (a database query, a batched API call) override
    /// this.
    fn resolve_batch(&self, names: &[String]) -> BatchResolution {
        let mut resolved = HashMap::new();
        for name in names {
            if let Some(value) = self.resolve(name) {
                resolved.insert(name.clone(), value);
            }
        }
        BatchResolution::new(names.to_vec(), resolved)
    }
}

/// Result of a batch resolution: the requested names split into resolved
/// and unresolved subsets.
#[derive(Debug, Clone)]
pub struct BatchResolution {
    requested: Vec<String>,
    resolved: HashMap<String, String>,
    unresolved: Vec<String>,
}

impl BatchResolution {
    pub fn new(requested: Vec<String>, resolved: HashMap<String, String>) -> Self {
        let unresolved = requested
            .iter()
            .filter(|name| !resolved.contains_key(*name))
            .cloned()
            .collect();
        Self {
            requested,
            resolved,
            unresolved,
        }
    }

    /// Every name that was requested, in request order.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// The resolved subset, keyed by property name.
    pub fn resolved(&self) -> &HashMap<String, String> {
        &self.resolved
    }

    /// The names no source could resolve, in request order.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// The resolved value for `name`, if any.
    pub fn find(&self, name: &str) -> Option<&str> {
        self.resolved.get(name).map(String::as_str)
    }

    /// The resolved value for `name`, failing loudly when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PropError::Unresolved`] naming the property.
    pub fn require(&self, name: &str) -> Result<&str, PropError> {
        self.find(name).ok_or_else(|| PropError::Unresolved {
            property: name.to_string(),
        })
    }
}
