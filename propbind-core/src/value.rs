use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::PropError;

/// A converted property value.
///
/// This is what the conversion engine produces and what the cache stores.
/// Use [`FromPropValue`] to extract a concrete Rust type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Converted lists, sets and arrays. Sets are de-duplicated but keep
    /// first-seen order, so one representation serves all three.
    List(Vec<PropValue>),
    Optional(Option<Box<PropValue>>),
    /// A matched enum constant.
    Variant { decl: String, name: String },
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeTz(DateTime<FixedOffset>),
}

impl PropValue {
    /// Short name of the held variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Str(_) => "string",
            PropValue::Bool(_) => "bool",
            PropValue::Char(_) => "char",
            PropValue::Int(_) => "int",
            PropValue::UInt(_) => "uint",
            PropValue::Float(_) => "float",
            PropValue::List(_) => "list",
            PropValue::Optional(_) => "optional",
            PropValue::Variant { .. } => "enum",
            PropValue::Date(_) => "date",
            PropValue::Time(_) => "time",
            PropValue::DateTime(_) => "datetime",
            PropValue::DateTimeTz(_) => "datetime-tz",
        }
    }
}

fn mismatch(value: &PropValue, property: &str, expected: &'static str) -> PropError {
    PropError::Conversion {
        value: value.type_name().to_string(),
        target: expected.to_string(),
        detail: format!("property '{property}' does not hold this type"),
    }
}

/// Trait for extracting a concrete type out of a [`PropValue`].
pub trait FromPropValue: Sized {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError>;
}

impl FromPropValue for String {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Str(s) => Ok(s.clone()),
            PropValue::Bool(b) => Ok(b.to_string()),
            PropValue::Char(c) => Ok(c.to_string()),
            PropValue::Int(i) => Ok(i.to_string()),
            PropValue::UInt(u) => Ok(u.to_string()),
            PropValue::Float(x) => Ok(x.to_string()),
            PropValue::Variant { name, .. } => Ok(name.clone()),
            other => Err(mismatch(other, property, "String")),
        }
    }
}

impl FromPropValue for bool {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Bool(b) => Ok(*b),
            PropValue::Str(s) => s
                .parse()
                .map_err(|_| mismatch(value, property, "bool")),
            other => Err(mismatch(other, property, "bool")),
        }
    }
}

impl FromPropValue for char {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Char(c) => Ok(*c),
            other => Err(mismatch(other, property, "char")),
        }
    }
}

impl FromPropValue for i64 {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Int(i) => Ok(*i),
            PropValue::UInt(u) => {
                i64::try_from(*u).map_err(|_| mismatch(value, property, "i64"))
            }
            PropValue::Str(s) => s.parse().map_err(|_| mismatch(value, property, "i64")),
            other => Err(mismatch(other, property, "i64")),
        }
    }
}

impl FromPropValue for u64 {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::UInt(u) => Ok(*u),
            PropValue::Int(i) => {
                u64::try_from(*i).map_err(|_| mismatch(value, property, "u64"))
            }
            PropValue::Str(s) => s.parse().map_err(|_| mismatch(value, property, "u64")),
            other => Err(mismatch(other, property, "u64")),
        }
    }
}

impl FromPropValue for f64 {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Float(x) => Ok(*x),
            PropValue::Int(i) => Ok(*i as f64),
            PropValue::UInt(u) => Ok(*u as f64),
            PropValue::Str(s) => s.parse().map_err(|_| mismatch(value, property, "f64")),
            other => Err(mismatch(other, property, "f64")),
        }
    }
}

impl FromPropValue for f32 {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        f64::from_prop_value(value, property).map(|x| x as f32)
    }
}

// ── Narrow integer types via i64 with range check ───────────────────────

macro_rules! impl_from_prop_int {
    ($($ty:ty),+) => {
        $(
            impl FromPropValue for $ty {
                fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
                    let wide = i64::from_prop_value(value, property)?;
                    <$ty>::try_from(wide).map_err(|_| PropError::Conversion {
                        value: wide.to_string(),
                        target: stringify!($ty).to_string(),
                        detail: format!("property '{property}' is out of range"),
                    })
                }
            }
        )+
    };
}

impl_from_prop_int!(u8, u16, u32, i8, i16, i32, usize);

impl<T: FromPropValue> FromPropValue for Option<T> {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Optional(None) => Ok(None),
            PropValue::Optional(Some(inner)) => {
                T::from_prop_value(inner, property).map(Some)
            }
            other => T::from_prop_value(other, property).map(Some),
        }
    }
}

impl<T: FromPropValue> FromPropValue for Vec<T> {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::List(items) => items
                .iter()
                .map(|item| T::from_prop_value(item, property))
                .collect(),
            // Fallback: single value -> vec of one
            other => Ok(vec![T::from_prop_value(other, property)?]),
        }
    }
}

impl FromPropValue for NaiveDate {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Date(d) => Ok(*d),
            other => Err(mismatch(other, property, "date")),
        }
    }
}

impl FromPropValue for NaiveTime {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::Time(t) => Ok(*t),
            other => Err(mismatch(other, property, "time")),
        }
    }
}

impl FromPropValue for NaiveDateTime {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::DateTime(dt) => Ok(*dt),
            other => Err(mismatch(other, property, "datetime")),
        }
    }
}

impl FromPropValue for DateTime<FixedOffset> {
    fn from_prop_value(value: &PropValue, property: &str) -> Result<Self, PropError> {
        match value {
            PropValue::DateTimeTz(dt) => Ok(*dt),
            other => Err(mismatch(other, property, "datetime-tz")),
        }
    }
}
