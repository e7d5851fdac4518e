// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages shared by several topics.

use super::impl_name;

/// Identifier of a named mission database item.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct NamedObjectId {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub namespace: Option<String>,
}

/// Discriminator of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ValueType {
    Float = 0,
    Double = 1,
    Uint32 = 2,
    Sint32 = 3,
    Binary = 4,
    String = 5,
    Timestamp = 6,
    Uint64 = 7,
    Sint64 = 8,
    Boolean = 9,
    Aggregate = 10,
    Array = 11,
    Enumerated = 12,
    NoValue = 13,
}

/// A typed engineering or raw value.
///
/// Only the field matching `type` is meaningful.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(enumeration = "ValueType", tag = "1")]
    pub r#type: i32,
    #[prost(float, tag = "2")]
    pub float_value: f32,
    #[prost(double, tag = "3")]
    pub double_value: f64,
    #[prost(sint32, tag = "4")]
    pub sint32_value: i32,
    #[prost(uint32, tag = "5")]
    pub uint32_value: u32,
    #[prost(bytes = "vec", tag = "6")]
    pub binary_value: Vec<u8>,
    #[prost(string, tag = "7")]
    pub string_value: String,
    #[prost(message, optional, tag = "8")]
    pub timestamp_value: Option<::prost_types::Timestamp>,
    #[prost(uint64, tag = "9")]
    pub uint64_value: u64,
    #[prost(sint64, tag = "10")]
    pub sint64_value: i64,
    #[prost(bool, tag = "11")]
    pub boolean_value: bool,
    #[prost(message, optional, tag = "12")]
    pub aggregate_value: Option<AggregateValue>,
    #[prost(message, repeated, tag = "13")]
    pub array_value: Vec<Value>,
}

/// Members of an aggregate value, `name[i]` belonging to `value[i]`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregateValue {
    #[prost(string, repeated, tag = "1")]
    pub name: Vec<String>,
    #[prost(message, repeated, tag = "2")]
    pub value: Vec<Value>,
}

impl_name!(NamedObjectId, Value, AggregateValue);
