use super::{Conversion, ConversionContext, Converter};
use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Matches the raw value case-sensitively against the constant names of the
/// target's [`EnumDecl`](crate::typeref::EnumDecl).
pub struct EnumConverter;

impl Converter for EnumConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        target.kind() == TypeKind::Enum
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        if context.target().kind() != TypeKind::Enum {
            return Ok(Conversion::Skipped);
        }

        let decl = context.target().enum_decl().ok_or_else(|| {
            PropError::Contract("enum target type is missing its declaration".to_string())
        })?;

        let value = context.value();
        if !decl.has_variant(value) {
            return Err(PropError::Conversion {
                value: value.to_string(),
                target: context.target().describe(),
                detail: format!("no constant named '{}' in {}", value, decl.name()),
            });
        }

        Ok(Conversion::Converted(PropValue::Variant {
            decl: decl.name().to_string(),
            name: value.to_string(),
        }))
    }
}
