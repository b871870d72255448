use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use propbind_cache::CacheStrategy;

use crate::convert::{Converter, Directives, RootConverter};
use crate::error::PropError;
use crate::expand::VariableExpander;
use crate::resolver::{Resolver, ResolverChain};
use crate::typeref::{TypeKind, TypeRef};
use crate::value::{FromPropValue, PropValue};

/// Stable handle of a registered accessor. This is the identity the cache
/// is keyed by, indirectly: the registry maps it to one immutable
/// [`AccessorDescriptor`] for the accessor's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorId(u64);

/// Fallback applied when a property resolves to absent.
#[derive(Clone)]
pub enum Fallback {
    /// Already the target type; used as-is, no conversion.
    Value(PropValue),
    /// A raw default string, converted like a resolved value.
    Raw(String),
    /// Computed lazily, once per invocation that needs it; the result is
    /// already the target type.
    Provider(Arc<dyn Fn() -> PropValue + Send + Sync>),
}

impl std::fmt::Debug for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            Fallback::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Caller-built description of one accessor, registered with
/// [`PropertyBinder::register`].
#[derive(Debug, Clone)]
pub struct AccessorSpec {
    name: String,
    target: TypeRef,
    fallback: Option<Fallback>,
    delimiter: Option<char>,
    strip_empty: bool,
}

impl AccessorSpec {
    /// An accessor for the property named by `name` (a template which may
    /// contain `${...}` references), converted to `target`.
    pub fn new(name: impl Into<String>, target: TypeRef) -> Self {
        Self {
            name: name.into(),
            target,
            fallback: None,
            delimiter: None,
            strip_empty: false,
        }
    }

    /// Fall back to an already-typed value when the property is absent.
    pub fn with_fallback(mut self, value: PropValue) -> Self {
        self.fallback = Some(Fallback::Value(value));
        self
    }

    /// Fall back to a raw default string (converted to the target type)
    /// when the property is absent.
    pub fn with_raw_fallback(mut self, raw: impl Into<String>) -> Self {
        self.fallback = Some(Fallback::Raw(raw.into()));
        self
    }

    /// Fall back to a lazily-computed value when the property is absent.
    pub fn with_fallback_provider(
        mut self,
        provider: impl Fn() -> PropValue + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Some(Fallback::Provider(Arc::new(provider)));
        self
    }

    /// Override the collection delimiter for this accessor.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Discard empty elements when splitting collection values.
    pub fn strip_empty(mut self) -> Self {
        self.strip_empty = true;
        self
    }
}

/// Immutable description of one registered accessor.
///
/// Equality and hashing are identity-based (the registration handle), so
/// the `Arc<AccessorDescriptor>` itself serves as the cache key and a
/// weak-key cache naturally follows the descriptor's lifetime.
#[derive(Debug)]
pub struct AccessorDescriptor {
    id: u64,
    name: String,
    target: TypeRef,
    fallback: Option<Fallback>,
    directives: Directives,
}

impl AccessorDescriptor {
    /// The property-name template, before variable expansion.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TypeRef {
        &self.target
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }
}

impl PartialEq for AccessorDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AccessorDescriptor {}

impl std::hash::Hash for AccessorDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.id);
    }
}

/// Cache strategy seam of the pipeline, keyed by descriptor identity.
pub type AccessorCache = Arc<dyn CacheStrategy<Arc<AccessorDescriptor>, PropValue>>;

/// Builder for [`PropertyBinder`].
pub struct PropertyBinderBuilder {
    resolvers: Vec<Arc<dyn Resolver>>,
    converters: Vec<Arc<dyn Converter>>,
    with_default_converters: bool,
    expander: VariableExpander,
    cache: Option<AccessorCache>,
}

impl PropertyBinderBuilder {
    fn new() -> Self {
        Self {
            resolvers: Vec::new(),
            converters: Vec::new(),
            with_default_converters: false,
            expander: VariableExpander::default(),
            cache: None,
        }
    }

    /// Append a resolver to the chain. Delegates are tried in registration
    /// order, first present result wins.
    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn resolver_arc(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Append a converter. Converters registered here run before the
    /// built-in defaults (when those are enabled).
    pub fn converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Append the built-in converters after any custom ones.
    pub fn default_converters(mut self) -> Self {
        self.with_default_converters = true;
        self
    }

    /// Replace the default `${...}` variable expander.
    pub fn expander(mut self, expander: VariableExpander) -> Self {
        self.expander = expander;
        self
    }

    /// Cache resolved+converted results with the given strategy. Without a
    /// strategy every invocation re-resolves and re-converts.
    pub fn cache(mut self, cache: AccessorCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> PropertyBinder {
        let mut converters = self.converters;
        if self.with_default_converters {
            converters.extend(crate::convert::default_converters());
        }
        PropertyBinder {
            chain: ResolverChain::of(self.resolvers),
            engine: RootConverter::new(converters),
            expander: self.expander,
            cache: self.cache,
            accessors: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }
}

/// Registry of accessor descriptors plus the per-invocation pipeline:
/// expand the name template, resolve it through the chain, fall back or
/// fail on absence, convert to the target type, and optionally cache the
/// result keyed by accessor identity.
///
/// Shared freely across threads; invocations are synchronous and a
/// concurrent first access may compute the same value twice, with the
/// cache keeping the first writer's result.
pub struct PropertyBinder {
    chain: ResolverChain,
    engine: RootConverter,
    expander: VariableExpander,
    cache: Option<AccessorCache>,
    accessors: DashMap<u64, Arc<AccessorDescriptor>>,
    next_id: AtomicU64,
}

impl PropertyBinder {
    pub fn builder() -> PropertyBinderBuilder {
        PropertyBinderBuilder::new()
    }

    /// Register an accessor and return its handle.
    pub fn register(&self, spec: AccessorSpec) -> AccessorId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let descriptor = Arc::new(AccessorDescriptor {
            id,
            name: spec.name,
            target: spec.target,
            fallback: spec.fallback,
            directives: Directives {
                delimiter: spec.delimiter.unwrap_or(','),
                strip_empty: spec.strip_empty,
            },
        });
        self.accessors.insert(id, descriptor);
        AccessorId(id)
    }

    /// Drop an accessor. Its descriptor is released, which also lets a
    /// weak-key cache purge the matching entry.
    pub fn unregister(&self, id: AccessorId) {
        self.accessors.remove(&id.0);
    }

    pub fn descriptor(&self, id: AccessorId) -> Option<Arc<AccessorDescriptor>> {
        self.accessors.get(&id.0).map(|entry| Arc::clone(entry.value()))
    }

    /// Run the full pipeline for one accessor invocation.
    ///
    /// # Errors
    ///
    /// [`PropError::Expansion`] when the name template cannot be expanded,
    /// [`PropError::Unresolved`] when the property is absent with no
    /// fallback (and the target is not optional-wrapped),
    /// [`PropError::Conversion`] when the resolved value cannot be
    /// converted, and [`PropError::Contract`] for an unknown handle.
    pub fn invoke(&self, id: AccessorId) -> Result<PropValue, PropError> {
        let descriptor = self.descriptor(id).ok_or_else(|| {
            PropError::Contract(format!("no accessor registered under id {}", id.0))
        })?;

        // 1. Name resolution.
        let property = self.expander.expand(descriptor.name(), &self.chain)?;

        // 2. Cached result short-circuits resolution and conversion.
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&descriptor) {
                return Ok(hit);
            }
        }

        // 3. Value resolution, fallback, conversion.
        let value = match self.chain.resolve(&property) {
            Some(raw) => {
                self.engine
                    .convert_with(&raw, descriptor.target(), descriptor.directives())?
            }
            None => self.fallback_or_fail(&descriptor, &property)?,
        };

        // 4. Cache put (first writer wins on a racing key).
        if let Some(cache) = &self.cache {
            cache.cache(Arc::clone(&descriptor), value.clone());
        }

        Ok(value)
    }

    fn fallback_or_fail(
        &self,
        descriptor: &AccessorDescriptor,
        property: &str,
    ) -> Result<PropValue, PropError> {
        match descriptor.fallback() {
            Some(Fallback::Value(value)) => Ok(value.clone()),
            Some(Fallback::Provider(provider)) => Ok(provider.as_ref()()),
            Some(Fallback::Raw(raw)) => {
                self.engine
                    .convert_with(raw, descriptor.target(), descriptor.directives())
            }
            // An optional-wrapped accessor swallows resolution absence into
            // "no value present"; conversion failures of a resolved value
            // still propagate above.
            None if descriptor.target().kind() == TypeKind::Optional => {
                Ok(PropValue::Optional(None))
            }
            None => {
                tracing::debug!(property, "property unresolved and no fallback declared");
                Err(PropError::Unresolved {
                    property: property.to_string(),
                })
            }
        }
    }

    /// Invoke and extract a concrete Rust type in one call.
    pub fn get<T: FromPropValue>(&self, id: AccessorId) -> Result<T, PropError> {
        let descriptor = self.descriptor(id).ok_or_else(|| {
            PropError::Contract(format!("no accessor registered under id {}", id.0))
        })?;
        let value = self.invoke(id)?;
        T::from_prop_value(&value, descriptor.name())
    }

    /// Drop the cached result for one accessor.
    pub fn expire(&self, id: AccessorId) {
        if let (Some(cache), Some(descriptor)) = (&self.cache, self.descriptor(id)) {
            cache.expire(&descriptor);
        }
    }

    /// Drop every cached result.
    pub fn expire_all(&self) {
        if let Some(cache) = &self.cache {
            cache.expire_all();
        }
    }
}
