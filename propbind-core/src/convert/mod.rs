mod collections;
mod datetime;
mod enums;
mod optional;
mod primitives;

pub use collections::{ArrayConverter, CollectionFactory, ListConverter, SetConverter};
pub use datetime::{DateTimeConverter, DateTimeFormats};
pub use enums::EnumConverter;
pub use optional::OptionalConverter;
pub use primitives::PrimitiveConverter;

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Outcome of a single converter attempt.
///
/// `Skipped` means "this converter does not apply to the request" and lets
/// the engine fall through to the next candidate. It is a sentinel, never
/// an error.
#[derive(Debug)]
pub enum Conversion {
    Converted(PropValue),
    Skipped,
}

/// Logic that turns a raw text value into a typed value for a specific
/// target type shape.
///
/// `can_convert_to` is consulted once per raw [`TypeKind`] when the engine
/// builds its memoized candidate list, so it must only inspect the kind,
/// not the parameters.
pub trait Converter: Send + Sync {
    fn can_convert_to(&self, target: &TypeRef) -> bool;

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError>;
}

/// Per-accessor conversion directives consulted by the collection
/// converters.
#[derive(Debug, Clone)]
pub struct Directives {
    /// Delimiter used to split collection values.
    pub delimiter: char,
    /// Whether empty elements between delimiters are discarded.
    pub strip_empty: bool,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            delimiter: ',',
            strip_empty: false,
        }
    }
}

/// Everything a converter needs for one conversion call: the raw value, the
/// target type, the accessor directives, and a handle back to the engine
/// for recursive conversion of nested type parameters.
///
/// Created fresh per conversion call; never shared across calls.
pub struct ConversionContext<'a> {
    value: &'a str,
    target: &'a TypeRef,
    engine: &'a RootConverter,
    directives: &'a Directives,
}

impl<'a> ConversionContext<'a> {
    pub fn value(&self) -> &str {
        self.value
    }

    pub fn target(&self) -> &TypeRef {
        self.target
    }

    pub fn directives(&self) -> &Directives {
        self.directives
    }

    /// Recursively convert a nested value (a collection element, an optional
    /// parameter) through the engine, keeping this accessor's directives.
    pub fn convert_inner(
        &self,
        value: &str,
        target: &TypeRef,
    ) -> Result<PropValue, PropError> {
        self.engine.convert_with(value, target, self.directives)
    }
}

/// The built-in converters in their default registration order:
/// primitives, list, array, set, optional, enum, date/time.
pub fn default_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(PrimitiveConverter),
        Arc::new(ListConverter::new()),
        Arc::new(ArrayConverter),
        Arc::new(SetConverter::new()),
        Arc::new(OptionalConverter),
        Arc::new(EnumConverter),
        Arc::new(DateTimeConverter::new()),
    ]
}

/// The conversion engine: dispatches a conversion request to the first
/// registered converter that can produce the target type.
///
/// Candidate lists are memoized per raw [`TypeKind`] (populated lazily,
/// assigned once per key) so the lookup is O(1) amortized on every call,
/// including recursive element conversions.
pub struct RootConverter {
    converters: Vec<Arc<dyn Converter>>,
    by_kind: DashMap<TypeKind, Arc<Vec<Arc<dyn Converter>>>>,
}

impl RootConverter {
    pub fn new(converters: Vec<Arc<dyn Converter>>) -> Self {
        Self {
            converters,
            by_kind: DashMap::new(),
        }
    }

    /// An engine with the built-in converters in their default registration
    /// order.
    pub fn with_defaults() -> Self {
        Self::new(default_converters())
    }

    pub fn can_convert_to(&self, target: &TypeRef) -> bool {
        match target.kind() {
            TypeKind::Str | TypeKind::Any => true,
            TypeKind::Var => false,
            kind => !self.converters_for(kind).is_empty(),
        }
    }

    pub fn convert(&self, value: &str, target: &TypeRef) -> Result<PropValue, PropError> {
        self.convert_with(value, target, &Directives::default())
    }

    /// Convert `value` to `target` under the given accessor directives.
    ///
    /// # Errors
    ///
    /// Returns [`PropError::Conversion`] when the target type contains an
    /// unresolved type variable, when no registered converter applies, or
    /// when the applicable converter fails.
    pub fn convert_with(
        &self,
        value: &str,
        target: &TypeRef,
        directives: &Directives,
    ) -> Result<PropValue, PropError> {
        // Checked once on entry; every recursive parameter conversion
        // re-enters here, so nested variables are covered too.
        if target.contains_var() {
            return Err(PropError::Conversion {
                value: value.to_string(),
                target: target.describe(),
                detail: "target type contains an unresolved type variable".to_string(),
            });
        }

        // No conversion needed since target type is string. This also keeps
        // recursion finite when converters recurse for nested string
        // parameters.
        if matches!(target.kind(), TypeKind::Str | TypeKind::Any) {
            return Ok(PropValue::Str(value.to_string()));
        }

        let candidates = self.converters_for(target.kind());
        let context = ConversionContext {
            value,
            target,
            engine: self,
            directives,
        };
        for converter in candidates.iter() {
            match converter.convert(&context)? {
                Conversion::Converted(converted) => return Ok(converted),
                Conversion::Skipped => continue,
            }
        }

        Err(PropError::Conversion {
            value: value.to_string(),
            target: target.describe(),
            detail: "no converter found for target type".to_string(),
        })
    }

    fn converters_for(&self, kind: TypeKind) -> Arc<Vec<Arc<dyn Converter>>> {
        if let Some(candidates) = self.by_kind.get(&kind) {
            return Arc::clone(candidates.value());
        }
        let probe = TypeRef::new(kind);
        let candidates: Vec<Arc<dyn Converter>> = self
            .converters
            .iter()
            .filter(|converter| converter.can_convert_to(&probe))
            .cloned()
            .collect();
        Arc::clone(
            self.by_kind
                .entry(kind)
                .or_insert_with(|| Arc::new(candidates))
                .value(),
        )
    }
}
