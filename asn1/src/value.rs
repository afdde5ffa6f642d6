//! The decoded runtime form of an ASN.1 value.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::OidError;
use crate::oid::ObjectIdentifier;

/// An OBJECT IDENTIFIER as seen through a registry: its symbolic name when the
/// registry in scope knows it, otherwise the numeric form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Named(String),
    Oid(ObjectIdentifier),
}

impl Identifier {
    pub fn name(&self) -> Option<&str> {
        match self {
            Identifier::Named(name) => Some(name),
            Identifier::Oid(_) => None,
        }
    }

    pub fn oid(&self) -> Option<&ObjectIdentifier> {
        match self {
            Identifier::Named(_) => None,
            Identifier::Oid(oid) => Some(oid),
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Named(name) => write!(f, "{}", name),
            Identifier::Oid(oid) => write!(f, "{}", oid),
        }
    }
}

impl From<ObjectIdentifier> for Identifier {
    fn from(oid: ObjectIdentifier) -> Self {
        Identifier::Oid(oid)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// BIT STRING content: the bit data and the number of unused trailing bits
/// (0 to 7) in its final byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    pub fn unused(&self) -> u8 {
        self.unused
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        (self.data.len() * 8).saturating_sub(usize::from(self.unused))
    }

    /// Bit `n` counted from the most significant bit of the first byte, which
    /// is how named bits (KeyUsage and friends) are numbered.
    pub fn bit(&self, n: usize) -> bool {
        n < self.bit_len() && self.data[n / 8] & (0x80 >> (n % 8)) != 0
    }
}

/// Sequence or Set fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replaces the value of an existing key in place, otherwise appends.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Integer(BigInt),
    /// A named INTEGER or ENUMERATED value.
    Symbol(String),
    BitString(BitString),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Identifier),
    /// Decoded text of any character string kind.
    String(String),
    /// UTCTime or GeneralizedTime, always UTC.
    Time(NaiveDateTime),
    /// A complete TLV captured as is.
    Any(Vec<u8>),
    Sequence(Fields),
    /// SEQUENCE OF / SET OF members.
    List(Vec<Value>),
    Choice { name: String, value: Box<Value> },
}

impl Value {
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn octet_string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::OctetString(bytes.into())
    }

    pub fn bit_string(unused: u8, data: impl Into<Vec<u8>>) -> Self {
        Value::BitString(BitString::new(unused, data.into()))
    }

    pub fn any(tlv: impl Into<Vec<u8>>) -> Self {
        Value::Any(tlv.into())
    }

    /// An unnamed identifier from dotted or space separated notation.
    pub fn oid(s: &str) -> Result<Self, OidError> {
        Ok(Value::ObjectIdentifier(Identifier::Oid(
            ObjectIdentifier::from_str(s)?,
        )))
    }

    /// An identifier by its registry name.
    pub fn named_oid(name: impl Into<String>) -> Self {
        Value::ObjectIdentifier(Identifier::Named(name.into()))
    }

    pub fn sequence<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Sequence(fields.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn choice(name: impl Into<String>, value: Value) -> Self {
        Value::Choice {
            name: name.into(),
            value: Box::new(value),
        }
    }

    /// A field of a Sequence or Set value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_fields()?.get(key)
    }

    /// Follows a dotted chain of field keys, e.g. `tbsCertificate.serialNumber`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |value, key| match value {
                Value::Choice { name, value } if name == key => Some(value.as_ref()),
                _ => value.get(key),
            })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer()?.to_i64()
    }

    /// Text of a character string, or the name of a Symbol.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// OCTET STRING content or the full TLV of an ANY.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) | Value::Any(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bit_string(&self) -> Option<&BitString> {
        match self {
            Value::BitString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Value::ObjectIdentifier(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&Fields> {
        match self {
            Value::Sequence(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Choice { name, value } => Some((name, value)),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Symbol(_) => "Symbol",
            Value::BitString(_) => "BitString",
            Value::OctetString(_) => "OctetString",
            Value::Null => "Null",
            Value::ObjectIdentifier(_) => "ObjectIdentifier",
            Value::String(_) => "String",
            Value::Time(_) => "Time",
            Value::Any(_) => "Any",
            Value::Sequence(_) => "Sequence",
            Value::List(_) => "List",
            Value::Choice { .. } => "Choice",
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => match n.to_i64() {
                Some(n) => serializer.serialize_i64(n),
                None => serializer.collect_str(n),
            },
            Value::Symbol(s) | Value::String(s) => serializer.serialize_str(s),
            Value::BitString(b) if b.unused() == 0 => serializer.serialize_str(&hex(b.data())),
            Value::BitString(b) => {
                serializer.serialize_str(&format!("{}/{}", hex(b.data()), b.unused()))
            }
            Value::OctetString(b) | Value::Any(b) => serializer.serialize_str(&hex(b)),
            Value::Null => serializer.serialize_unit(),
            Value::ObjectIdentifier(id) => id.serialize(serializer),
            Value::Time(t) => serializer.collect_str(&t.format("%Y-%m-%dT%H:%M:%S%.fZ")),
            Value::Sequence(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Choice { name, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, value)?;
                map.end()
            }
        }
    }
}
