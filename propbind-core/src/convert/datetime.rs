use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::{Conversion, ConversionContext, Converter};
use crate::error::PropError;
use crate::typeref::{TypeKind, TypeRef};
use crate::value::PropValue;

/// Per-kind format overrides for [`DateTimeConverter`], as `chrono` format
/// strings. An unset field keeps the ISO-8601 default for that kind.
#[derive(Debug, Clone, Default)]
pub struct DateTimeFormats {
    pub date: Option<String>,
    pub time: Option<String>,
    pub date_time: Option<String>,
    pub date_time_tz: Option<String>,
}

/// Converts values to the date/time types.
///
/// Defaults parse ISO-8601 text (`2024-07-01`, `13:45:00`,
/// `2024-07-01T13:45:00`, `2024-07-01T13:45:00+02:00`); each kind can be
/// given a custom format instead.
pub struct DateTimeConverter {
    formats: DateTimeFormats,
}

impl DateTimeConverter {
    pub fn new() -> Self {
        Self {
            formats: DateTimeFormats::default(),
        }
    }

    pub fn with_formats(formats: DateTimeFormats) -> Self {
        Self { formats }
    }
}

impl Default for DateTimeConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(context: &ConversionContext<'_>) -> PropError {
    PropError::Conversion {
        value: context.value().to_string(),
        target: context.target().describe(),
        detail: "invalid date/time format".to_string(),
    }
}

impl Converter for DateTimeConverter {
    fn can_convert_to(&self, target: &TypeRef) -> bool {
        matches!(
            target.kind(),
            TypeKind::Date | TypeKind::Time | TypeKind::DateTime | TypeKind::DateTimeTz
        )
    }

    fn convert(&self, context: &ConversionContext<'_>) -> Result<Conversion, PropError> {
        let value = context.value();
        let converted = match context.target().kind() {
            TypeKind::Date => {
                let parsed = match &self.formats.date {
                    Some(format) => NaiveDate::parse_from_str(value, format),
                    None => value.parse::<NaiveDate>(),
                };
                PropValue::Date(parsed.map_err(|_| invalid(context))?)
            }
            TypeKind::Time => {
                let parsed = match &self.formats.time {
                    Some(format) => NaiveTime::parse_from_str(value, format),
                    None => value.parse::<NaiveTime>(),
                };
                PropValue::Time(parsed.map_err(|_| invalid(context))?)
            }
            TypeKind::DateTime => {
                let parsed = match &self.formats.date_time {
                    Some(format) => NaiveDateTime::parse_from_str(value, format),
                    None => value.parse::<NaiveDateTime>(),
                };
                PropValue::DateTime(parsed.map_err(|_| invalid(context))?)
            }
            TypeKind::DateTimeTz => {
                let parsed = match &self.formats.date_time_tz {
                    Some(format) => DateTime::parse_from_str(value, format),
                    None => DateTime::parse_from_rfc3339(value),
                };
                PropValue::DateTimeTz(parsed.map_err(|_| invalid(context))?)
            }
            _ => return Ok(Conversion::Skipped),
        };
        Ok(Conversion::Converted(converted))
    }
}
