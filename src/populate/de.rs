//! A serde `Deserializer` reading straight from a borrowed [`Value`] tree.
//!
//! Conversions follow the accessor rules: numbers truncate into integer fields,
//! bools are never inferred from numbers or strings. Arrays stored as values of
//! a map-shaped field must be non-empty lists of strings. Object entries holding
//! `null` are skipped, so they read as absent keys.

use std::collections::btree_map;
use std::slice;

use serde::de::value::{BorrowedStrDeserializer, StrDeserializer};
use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Unexpected, Visitor};

use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Value};

impl de::Error for AccessError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        AccessError::Populate(msg.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> ValueDeserializer<'de> {
    pub(super) fn new(value: &'de Value) -> Self {
        Self { value }
    }

    fn unexpected(&self) -> Unexpected<'de> {
        match self.value {
            Value::Null => Unexpected::Unit,
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(n) => Unexpected::Float(*n),
            Value::String(s) => Unexpected::Str(s),
            Value::Array(_) => Unexpected::Seq,
            Value::Object(_) => Unexpected::Map,
        }
    }

    fn invalid_type<V: Visitor<'de>>(&self, visitor: &V) -> AccessError {
        de::Error::invalid_type(self.unexpected(), visitor)
    }
}

fn unsupported(shape: &'static str) -> AccessError {
    // the enclosing struct fills in the field name
    AccessError::UnsupportedField {
        field: String::new(),
        shape,
    }
}

macro_rules! deserialize_signed {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            match self.value {
                Value::Number(n) => visitor.visit_i64(*n as i64),
                _ => Err(self.invalid_type(&visitor)),
            }
        }
    )*};
}

macro_rules! deserialize_unsigned {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            match self.value {
                Value::Number(n) if *n >= 0.0 => visitor.visit_u64(*n as u64),
                Value::Number(n) => visitor.visit_i64(*n as i64),
                _ => Err(self.invalid_type(&visitor)),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = AccessError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT => {
                visitor.visit_i64(*n as i64)
            }
            Value::Number(n) => visitor.visit_f64(*n),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Object(node) => visitor.visit_map(ObjectDeserializer::new(node, Target::Any)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(*b),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    deserialize_signed!(deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64);
    deserialize_unsigned!(deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64);

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Number(n) => visitor.visit_f64(*n),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(unsupported("bytes"))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(unsupported("bytes"))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(unsupported("tuple"))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(unsupported("tuple struct"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Object(node) => visitor.visit_map(ObjectDeserializer::new(node, Target::Map)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::Object(node) => visitor.visit_map(ObjectDeserializer::new(node, Target::Struct)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    /// Only unit variants, spelled as strings, are supported.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::String(s) => {
                let variant: StrDeserializer<'_, AccessError> = s.as_str().into_deserializer();
                visitor.visit_enum(variant)
            }
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

/// Largest magnitude below which every integer is exactly representable in `f64`.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

struct SeqDeserializer<'de> {
    iter: slice::Iter<'de, Value>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(items: &'de [Value]) -> Self {
        Self { iter: items.iter() }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = AccessError;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        self.iter
            .next()
            .map(|item| seed.deserialize(ValueDeserializer::new(item)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// What an object is being read into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// A record with named fields.
    Struct,
    /// A map-shaped field; list values are restricted.
    Map,
    /// A self-describing value such as `serde_json::Value`.
    Any,
}

struct ObjectDeserializer<'de> {
    iter: btree_map::Iter<'de, String, Value>,
    pending: Option<(&'de str, &'de Value)>,
    target: Target,
}

impl<'de> ObjectDeserializer<'de> {
    fn new(node: &'de ConfigNode, target: Target) -> Self {
        Self {
            iter: node.iter(),
            pending: None,
            target,
        }
    }
}

impl<'de> MapAccess<'de> for ObjectDeserializer<'de> {
    type Error = AccessError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        // an explicit null reads the same as an absent key, for every target
        let Some((key, value)) = self.iter.by_ref().find(|(_, v)| !v.is_null()) else {
            return Ok(None);
        };
        self.pending = Some((key.as_str(), value));
        seed.deserialize(BorrowedStrDeserializer::<AccessError>::new(key))
            .map(Some)
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value> {
        let (key, value) = self
            .pending
            .take()
            .ok_or_else(|| AccessError::Populate("map value requested before its key".into()))?;

        if self.target == Target::Map {
            check_map_value(key, value)?;
        }

        let target = self.target;
        seed.deserialize(ValueDeserializer::new(value))
            .map_err(|err| match err {
                AccessError::UnsupportedField { field, shape }
                    if field.is_empty() && target == Target::Struct =>
                {
                    AccessError::UnsupportedField {
                        field: key.to_string(),
                        shape,
                    }
                }
                other => other,
            })
    }
}

/// A list stored under a map key must be a non-empty list of strings; an empty
/// list carries no element type to convert to.
fn check_map_value(key: &str, value: &Value) -> Result<()> {
    let Value::Array(items) = value else {
        return Ok(());
    };

    match items.first() {
        None => Err(AccessError::EmptyArrayInMap {
            key: key.to_string(),
        }),
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(AccessError::ArrayInMap {
            key: key.to_string(),
            element: other.kind(),
        }),
    }
}
