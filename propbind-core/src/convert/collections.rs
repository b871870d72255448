use std::sync::Arc;

use super::{Conversion, ConversionContext, Converter, Directives};
use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Factory for the backing storage of a converted list or set.
///
/// Must return a genuinely empty collection with the requested capacity;
/// a non-empty result is a programming-contract violation and fails the
/// conversion with [`PropError::Contract`].
pub type CollectionFactory = Arc<dyn Fn(usize) -> Vec<PropValue> + Send + Sync>;

fn split_elements<'a>(raw: &'a str, directives: &Directives) -> Vec<&'a str> {
    if raw.is_empty() {
        return Vec::new();
    }
    let mut elements: Vec<&str> = raw.split(directives.delimiter).collect();
    if directives.strip_empty {
        elements.retain(|element| !element.is_empty());
    }
    elements
}

/// The element type of a collection target; a missing parameter means the
/// elements are plain strings.
fn element_type(target: &TypeRef) -> TypeRef {
    target.param(0).cloned().unwrap_or_else(TypeRef::string)
}

fn convert_elements(
    context: &ConversionContext<'_>,
    element: &TypeRef,
) -> Result<Vec<PropValue>, PropError> {
    split_elements(context.value(), context.directives())
        .into_iter()
        .map(|raw| context.convert_inner(raw, element))
        .collect()
}

fn new_collection(factory: &CollectionFactory, capacity: usize) -> Result<Vec<PropValue>, PropError> {
    let collection = factory.as_ref()(capacity);
    if !collection.is_empty() {
        return Err(PropError::Contract(
            "collection factory must return an empty collection".to_string(),
        ));
    }
    Ok(collection)
}

fn default_factory() -> CollectionFactory {
    Arc::new(Vec::with_capacity)
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// Converts delimiter-separated values to an array of the element type.
///
/// An empty raw value yields an empty array. Empty elements between
/// delimiters are retained unless the accessor requests stripping.
pub struct ArrayConverter;

impl Converter for ArrayConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        target.kind() == TypeKind::Array
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        if context.target().kind() != TypeKind::Array {
            return Ok(Conversion::Skipped);
        }
        let element = element_type(context.target());
        let elements = convert_elements(context, &element)?;
        Ok(Conversion::Converted(PropValue::List(elements)))
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Converts delimiter-separated values to a list of the element type.
pub struct ListConverter {
    factory: CollectionFactory,
}

impl ListConverter {
    pub fn new() -> Self {
        Self {
            factory: default_factory(),
        }
    }

    pub fn with_factory(factory: CollectionFactory) -> Self {
        Self { factory }
    }
}

impl Default for ListConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for ListConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        target.kind() == TypeKind::List
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        if context.target().kind() != TypeKind::List {
            return Ok(Conversion::Skipped);
        }
        let element = element_type(context.target());
        let elements = convert_elements(context, &element)?;
        let mut list = new_collection(&self.factory, elements.len())?;
        list.extend(elements);
        Ok(Conversion::Converted(PropValue::List(list)))
    }
}

// ---------------------------------------------------------------------------
// Set
// ---------------------------------------------------------------------------

/// Converts delimiter-separated values to a set of the element type,
/// de-duplicating while preserving first-seen order.
pub struct SetConverter {
    factory: CollectionFactory,
}

impl SetConverter {
    pub fn new() -> Self {
        Self {
            factory: default_factory(),
        }
    }

    pub fn with_factory(factory: CollectionFactory) -> Self {
        Self { factory }
    }
}

impl Default for SetConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for SetConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        target.kind() == TypeKind::Set
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        if context.target().kind() != TypeKind::Set {
            return Ok(Conversion::Skipped);
        }
        let element = element_type(context.target());
        let elements = convert_elements(context, &element)?;
        let mut set = new_collection(&self.factory, elements.len())?;
        for element in elements {
            if !set.contains(&element) {
                set.push(element);
            }
        }
        Ok(Conversion::Converted(PropValue::List(set)))
    }
}
