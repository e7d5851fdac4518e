// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed values carried by parameters and command history attributes.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::proto::{self, ValueType};

/// A decoded engineering or raw value.
///
/// # Examples
///
/// ```
/// use missionlink::types::Value;
///
/// let voltage = Value::Double(27.4);
/// assert_eq!(voltage.as_f64(), Some(27.4));
/// assert_eq!(voltage.to_string(), "27.4");
///
/// let mode = Value::Enumerated("SAFE".to_string());
/// assert_eq!(mode.as_str(), Some("SAFE"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 32-bit integer.
    SInt32(i32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Signed 64-bit integer.
    SInt64(i64),
    /// Boolean.
    Bool(bool),
    /// Text.
    String(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Absolute time.
    Timestamp(DateTime<Utc>),
    /// Label of an enumerated state.
    Enumerated(String),
    /// Named members, in declaration order.
    Aggregate(Vec<(String, Value)>),
    /// Ordered elements.
    Array(Vec<Value>),
}

impl Value {
    /// Converts a wire value.
    ///
    /// Returns `None` for empty values and for value types this library does
    /// not know; the latter are logged so that newer servers keep working.
    pub(crate) fn from_proto(value: &proto::Value) -> Option<Self> {
        let Ok(kind) = ValueType::try_from(value.r#type) else {
            tracing::warn!(value_type = value.r#type, "Ignoring value of unknown type");
            return None;
        };

        let converted = match kind {
            ValueType::Float => Self::Float(value.float_value),
            ValueType::Double => Self::Double(value.double_value),
            ValueType::Uint32 => Self::UInt32(value.uint32_value),
            ValueType::Sint32 => Self::SInt32(value.sint32_value),
            ValueType::Uint64 => Self::UInt64(value.uint64_value),
            ValueType::Sint64 => Self::SInt64(value.sint64_value),
            ValueType::Boolean => Self::Bool(value.boolean_value),
            ValueType::String => Self::String(value.string_value.clone()),
            ValueType::Binary => Self::Binary(value.binary_value.clone()),
            ValueType::Enumerated => Self::Enumerated(value.string_value.clone()),
            ValueType::Timestamp => {
                Self::Timestamp(value.timestamp_value.as_ref().and_then(to_datetime)?)
            }
            ValueType::Aggregate => {
                let aggregate = value.aggregate_value.as_ref()?;
                let members = aggregate
                    .name
                    .iter()
                    .zip(&aggregate.value)
                    .filter_map(|(name, member)| {
                        Self::from_proto(member).map(|member| (name.clone(), member))
                    })
                    .collect();
                Self::Aggregate(members)
            }
            ValueType::Array => {
                Self::Array(value.array_value.iter().filter_map(Self::from_proto).collect())
            }
            ValueType::NoValue => return None,
        };
        Some(converted)
    }

    /// Returns the value as `f64` if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            Self::UInt32(v) => Some(f64::from(v)),
            Self::SInt32(v) => Some(f64::from(v)),
            // Large 64-bit integers lose precision, as in any float conversion
            #[allow(clippy::cast_precision_loss)]
            Self::UInt64(v) => Some(v as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::SInt64(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Returns the text of string and enumerated values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enumerated(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the time of a timestamp value.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Looks up a member of an aggregate value.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Aggregate(members) => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::SInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::SInt64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) | Self::Enumerated(s) => f.write_str(s),
            Self::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Aggregate(members) => {
                f.write_str("{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Converts a protobuf timestamp to UTC time.
///
/// Returns `None` for timestamps outside chrono's range or with negative
/// nanoseconds.
pub(crate) fn to_datetime(ts: &proto::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.seconds, u32::try_from(ts.nanos).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(kind: ValueType) -> proto::Value {
        proto::Value {
            r#type: kind as i32,
            ..Default::default()
        }
    }

    #[test]
    fn converts_double() {
        let mut value = wire(ValueType::Double);
        value.double_value = 3.5;
        assert_eq!(Value::from_proto(&value), Some(Value::Double(3.5)));
    }

    #[test]
    fn converts_enumerated_from_string_field() {
        let mut value = wire(ValueType::Enumerated);
        value.string_value = "NOMINAL".to_string();
        assert_eq!(
            Value::from_proto(&value),
            Some(Value::Enumerated("NOMINAL".to_string()))
        );
    }

    #[test]
    fn converts_timestamp() {
        let mut value = wire(ValueType::Timestamp);
        value.timestamp_value = Some(proto::Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        });
        let converted = Value::from_proto(&value).unwrap();
        assert_eq!(converted.as_timestamp().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn unknown_type_is_ignored() {
        let value = proto::Value {
            r#type: 99,
            ..Default::default()
        };
        assert_eq!(Value::from_proto(&value), None);
    }

    #[test]
    fn empty_value_is_none() {
        assert_eq!(Value::from_proto(&wire(ValueType::NoValue)), None);
    }

    #[test]
    fn aggregate_skips_unknown_members() {
        let mut x = wire(ValueType::Sint32);
        x.sint32_value = -4;
        let unknown = proto::Value {
            r#type: 42,
            ..Default::default()
        };
        let mut value = wire(ValueType::Aggregate);
        value.aggregate_value = Some(proto::AggregateValue {
            name: vec!["x".to_string(), "y".to_string()],
            value: vec![x, unknown],
        });

        let converted = Value::from_proto(&value).unwrap();
        assert_eq!(converted.member("x"), Some(&Value::SInt32(-4)));
        assert_eq!(converted.member("y"), None);
    }

    #[test]
    fn display_binary_as_hex() {
        assert_eq!(Value::Binary(vec![0x0a, 0xff]).to_string(), "0aff");
    }

    #[test]
    fn display_array() {
        let value = Value::Array(vec![Value::UInt32(1), Value::UInt32(2)]);
        assert_eq!(value.to_string(), "[1, 2]");
    }

    #[test]
    fn as_f64_on_non_numeric() {
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::SInt64(-2).as_f64(), Some(-2.0));
    }
}
