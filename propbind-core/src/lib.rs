//! Core pipeline for propbind: bind named, external configuration values to
//! strongly-typed accessor handles.
//!
//! Register an accessor (a property-name template, a target [`TypeRef`] and
//! an optional fallback) with a [`PropertyBinder`]; every invocation expands
//! `${...}` references in the name, resolves it through an ordered
//! [`ResolverChain`], converts the textual value to the declared target type
//! (including nested generic containers), and optionally caches the result
//! keyed by accessor identity.
//!
//! ```ignore
//! let properties = MapResolver::new();
//! properties.insert("pool.sizes", "1,2,4");
//!
//! let binder = PropertyBinder::builder()
//!     .resolver(properties)
//!     .resolver(EnvResolver)
//!     .default_converters()
//!     .build();
//!
//! let sizes = binder.register(AccessorSpec::new(
//!     "pool.sizes",
//!     TypeRef::list_of(TypeRef::new(TypeKind::U32)),
//! ));
//! let sizes: Vec<u32> = binder.get(sizes)?;
//! ```

pub mod convert;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod resolver;
pub mod typeref;
pub mod value;

pub use convert::{
    default_converters, ArrayConverter, CollectionFactory, Conversion, ConversionContext,
    Converter, DateTimeConverter, DateTimeFormats, Directives, EnumConverter, ListConverter,
    OptionalConverter, PrimitiveConverter, RootConverter, SetConverter,
};
pub use error::PropError;
pub use expand::VariableExpander;
pub use pipeline::{
    AccessorCache, AccessorDescriptor, AccessorId, AccessorSpec, Fallback, PropertyBinder,
    PropertyBinderBuilder,
};
pub use resolver::{
    BatchResolution, CachingResolver, EnvResolver, MapResolver, Resolver, ResolverChain,
};
pub use typeref::{EnumDecl, TypeKind, TypeRef};
pub use value::{FromPropValue, PropValue};
