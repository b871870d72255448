use super::{Conversion, ConversionContext, Converter};
use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Converts values to an optional of the parameter type.
///
/// A missing parameter is treated as `string`. A `string` or wildcard
/// parameter wraps the raw value directly, and an empty raw value still
/// yields a *present* optional containing the empty string: absence is
/// represented one level up by the pipeline, never by this converter.
/// A present-but-malformed inner value is a conversion error, never an
/// empty optional.
pub struct OptionalConverter;

impl Converter for OptionalConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        target.kind() == TypeKind::Optional
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        if context.target().kind() != TypeKind::Optional {
            return Ok(Conversion::Skipped);
        }

        let parameter = context
            .target()
            .param(0)
            .cloned()
            .unwrap_or_else(TypeRef::string);

        if matches!(parameter.kind(), TypeKind::Str | TypeKind::Any) {
            let wrapped = PropValue::Str(context.value().to_string());
            return Ok(Conversion::Converted(PropValue::Optional(Some(Box::new(
                wrapped,
            )))));
        }

        let inner = context.convert_inner(context.value(), &parameter)?;
        let converted = match inner {
            // An inner conversion that legitimately produced no value
            // collapses outward.
            PropValue::Optional(None) => PropValue::Optional(None),
            other => PropValue::Optional(Some(Box::new(other))),
        };
        Ok(Conversion::Converted(converted))
    }
}
