//! Literal parsing for condition values.
//!
//! Each resolved value type accepts a fixed literal shape. Parsing uses
//! `time` for dates, `rust_decimal` for decimals and `uuid` for GUIDs.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use crate::metadata::AttributeType;

/// Why a literal was rejected for its resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    Unexpected,
    Boolean,
    DateTime,
    Integer,
    Decimal,
    Guid,
    UnsupportedType(AttributeType),
}

/// Check `value` against the resolved value type.
///
/// `None` means the operator takes no value, so only a blank literal passes.
/// The value is trimmed before parsing.
pub fn check_literal(resolved: Option<AttributeType>, value: &str) -> Result<(), LiteralError> {
    let value = value.trim();
    let Some(value_type) = resolved else {
        return if value.is_empty() {
            Ok(())
        } else {
            Err(LiteralError::Unexpected)
        };
    };
    match value_type {
        AttributeType::Boolean => match value {
            "0" | "1" => Ok(()),
            _ => Err(LiteralError::Boolean),
        },
        AttributeType::DateTime => parse_datetime(value)
            .map(|_| ())
            .ok_or(LiteralError::DateTime),
        AttributeType::Integer
        | AttributeType::State
        | AttributeType::Status
        | AttributeType::Picklist
        | AttributeType::EntityName => i32::from_str(value)
            .map(|_| ())
            .map_err(|_| LiteralError::Integer),
        AttributeType::BigInt => i64::from_str(value)
            .map(|_| ())
            .map_err(|_| LiteralError::Integer),
        AttributeType::Decimal | AttributeType::Double | AttributeType::Money => {
            Decimal::from_str(value)
                .map(|_| ())
                .map_err(|_| LiteralError::Decimal)
        }
        AttributeType::Lookup
        | AttributeType::Customer
        | AttributeType::Owner
        | AttributeType::Uniqueidentifier => {
            parse_guid(value).map(|_| ()).ok_or(LiteralError::Guid)
        }
        AttributeType::String | AttributeType::Memo | AttributeType::Virtual => Ok(()),
        // Managed properties stay untyped until their schema is pinned down.
        AttributeType::ManagedProperty => Ok(()),
        AttributeType::PartyList | AttributeType::CalendarRules => {
            Err(LiteralError::UnsupportedType(value_type))
        }
    }
}

/// Parse a GUID of 32 hex digits: simple, hyphenated or braced.
pub fn parse_guid(value: &str) -> Option<Uuid> {
    let value = value.trim();
    let bare = match value.len() {
        32 | 36 => value,
        38 => value.strip_prefix('{')?.strip_suffix('}')?,
        _ => return None,
    };
    Uuid::parse_str(bare).ok()
}

/// Parse a date or date/time literal.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, and `YYYY-MM-DD hh:mm[:ss[.fff]]`
/// with either a space or `T` separator. The date part may also use `/`.
/// Date-only values resolve to midnight.
pub fn parse_datetime(value: &str) -> Option<PrimitiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(PrimitiveDateTime::new(dt.date(), dt.time()));
    }
    let formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]"),
    ];
    for format in formats {
        if let Ok(dt) = PrimitiveDateTime::parse(value, format) {
            return Some(dt);
        }
    }
    let dates = [
        format_description!("[year]-[month]-[day]"),
        format_description!("[year]/[month]/[day]"),
    ];
    dates
        .into_iter()
        .find_map(|format| Date::parse(value, format).ok())
        .map(Date::midnight)
}

/// Find an unterminated `[` character range in a LIKE pattern.
///
/// Only the most recent `[` matters: `[[]` is the escape for a literal `[`.
pub fn has_unbalanced_brackets(pattern: &str) -> bool {
    let mut in_range = false;
    for ch in pattern.chars() {
        match ch {
            '[' => in_range = true,
            ']' => in_range = false,
            _ => {}
        }
    }
    in_range
}
