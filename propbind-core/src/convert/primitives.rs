use super::{Conversion, ConversionContext, Converter};
use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Converts values to the primitive numeric, boolean and character types.
pub struct PrimitiveConverter;

impl PrimitiveConverter {
    fn parse(&self, context: &ConversionContext<'_>) -> Result<Option<PropValue>, PropError> {
        let value = context.value();
        let converted = match context.target().kind() {
            TypeKind::Bool => PropValue::Bool(self.lexical(context, value.parse())?),
            TypeKind::Char => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => PropValue::Char(c),
                    _ => return Err(invalid(context)),
                }
            }
            TypeKind::I8 => PropValue::Int(self.lexical::<i8>(context, value.parse())?.into()),
            TypeKind::I16 => PropValue::Int(self.lexical::<i16>(context, value.parse())?.into()),
            TypeKind::I32 => PropValue::Int(self.lexical::<i32>(context, value.parse())?.into()),
            TypeKind::I64 => PropValue::Int(self.lexical(context, value.parse())?),
            TypeKind::U8 => PropValue::UInt(self.lexical::<u8>(context, value.parse())?.into()),
            TypeKind::U16 => PropValue::UInt(self.lexical::<u16>(context, value.parse())?.into()),
            TypeKind::U32 => PropValue::UInt(self.lexical::<u32>(context, value.parse())?.into()),
            TypeKind::U64 => PropValue::UInt(self.lexical(context, value.parse())?),
            TypeKind::Usize => {
                PropValue::UInt(self.lexical::<usize>(context, value.parse())? as u64)
            }
            TypeKind::F32 => PropValue::Float(self.lexical::<f32>(context, value.parse())?.into()),
            TypeKind::F64 => PropValue::Float(self.lexical(context, value.parse())?),
            _ => return Ok(None),
        };
        Ok(Some(converted))
    }

    fn lexical<T>(
        &self,
        context: &ConversionContext<'_>,
        parsed: Result<T, impl std::error::Error>,
    ) -> Result<T, PropError> {
        parsed.map_err(|_| invalid(context))
    }
}

fn invalid(context: &ConversionContext<'_>) -> PropError {
    PropError::Conversion {
        value: context.value().to_string(),
        target: context.target().describe(),
        detail: "invalid lexical form".to_string(),
    }
}

impl Converter for PrimitiveConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        matches!(
            target.kind(),
            TypeKind::Bool
                | TypeKind::Char
                | TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::U8
                | TypeKind::U16
                | TypeKind::U32
                | TypeKind::U64
                | TypeKind::Usize
                | TypeKind::F32
                | TypeKind::F64
        )
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        match self.parse(context)? {
            Some(converted) => Ok(Conversion::Converted(converted)),
            None => Ok(Conversion::Skipped),
        }
    }
}
