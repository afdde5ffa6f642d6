//! The immutable schema arena.
//!
//! Nodes are addressed by [`NodeId`] so that definitions can refer to each
//! other (and to themselves) without ownership cycles. A [`Schema`] is only
//! produced by [`crate::SchemaBuilder::build`], which validates the graph and
//! precomputes the tags each node can start with.

use std::collections::BTreeMap;
use std::sync::Arc;

use der::{Tag, TagClass};

use crate::decode::{DecodeOptions, Decoding};
use crate::dispatch::Dispatch;
use crate::encode::{EncodeOptions, Encoding};
use crate::error::{DecodeError, EncodeError};
use crate::registry::OidRegistry;
use crate::string::StringKind;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagging {
    None,
    /// Replace class and number, keep the primitive/constructed bit.
    Implicit(TagClass, u32),
    /// Wrap the natural encoding in one more constructed TLV.
    Explicit(TagClass, u32),
}

/// Symbolic names of INTEGER or ENUMERATED values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedValues(BTreeMap<i64, String>);

impl NamedValues {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (i64, S)>) -> Self {
        NamedValues(entries.into_iter().map(|(n, s)| (n, s.into())).collect())
    }

    pub fn name(&self, n: i64) -> Option<&str> {
        self.0.get(&n).map(String::as_str)
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        self.0.iter().find(|(_, s)| *s == name).map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.0.iter().map(|(n, s)| (*n, s.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) key: String,
    pub(crate) node: NodeId,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
}

impl Field {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub(crate) name: String,
    pub(crate) node: NodeId,
}

impl Alternative {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

#[derive(Debug, Clone)]
pub enum Kind {
    Boolean,
    Integer(Option<NamedValues>),
    Enumerated(NamedValues),
    BitString,
    /// An OCTET STRING, optionally holding a nested value typed by a sibling field.
    OctetString(Option<Dispatch>),
    Null,
    /// Resolved against the registry when one is attached.
    ObjectIdentifier(Option<Arc<OidRegistry>>),
    String(StringKind),
    UtcTime,
    GeneralizedTime,
    Any,
    Sequence(Vec<Field>),
    Set(Vec<Field>),
    SequenceOf(NodeId),
    SetOf(NodeId),
    Choice(Vec<Alternative>),
    Reference(NodeId),
}

impl Kind {
    pub(crate) fn natural_tag(&self) -> Option<Tag> {
        match self {
            Kind::Boolean => Some(Tag::BOOLEAN),
            Kind::Integer(_) => Some(Tag::INTEGER),
            Kind::Enumerated(_) => Some(Tag::ENUMERATED),
            Kind::BitString => Some(Tag::BIT_STRING),
            Kind::OctetString(_) => Some(Tag::OCTET_STRING),
            Kind::Null => Some(Tag::NULL),
            Kind::ObjectIdentifier(_) => Some(Tag::OBJECT_IDENTIFIER),
            Kind::String(kind) => Some(kind.tag()),
            Kind::UtcTime => Some(Tag::UTC_TIME),
            Kind::GeneralizedTime => Some(Tag::GENERALIZED_TIME),
            Kind::Sequence(_) | Kind::SequenceOf(_) => Some(Tag::SEQUENCE),
            Kind::Set(_) | Kind::SetOf(_) => Some(Tag::SET),
            Kind::Any | Kind::Choice(_) | Kind::Reference(_) => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Kind::Boolean => "BOOLEAN",
            Kind::Integer(_) => "INTEGER",
            Kind::Enumerated(_) => "ENUMERATED",
            Kind::BitString => "BIT STRING",
            Kind::OctetString(_) => "OCTET STRING",
            Kind::Null => "NULL",
            Kind::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Kind::String(kind) => kind.name(),
            Kind::UtcTime => "UTCTime",
            Kind::GeneralizedTime => "GeneralizedTime",
            Kind::Any => "ANY",
            Kind::Sequence(_) => "SEQUENCE",
            Kind::Set(_) => "SET",
            Kind::SequenceOf(_) => "SEQUENCE OF",
            Kind::SetOf(_) => "SET OF",
            Kind::Choice(_) => "CHOICE",
            Kind::Reference(_) => "reference",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: Kind,
    pub(crate) tagging: Tagging,
}

impl Node {
    /// The definition name, or a path-like name for anonymous nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn tagging(&self) -> Tagging {
        self.tagging
    }
}

/// The set of tags a node can start with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher {
    Any,
    Tags(Vec<Tag>),
}

impl Matcher {
    pub(crate) fn matches(&self, tag: Tag) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Tags(tags) => tags.contains(&tag),
        }
    }

    pub(crate) fn union<'a>(matchers: impl IntoIterator<Item = &'a Matcher>) -> Matcher {
        let mut tags = Vec::new();
        for m in matchers {
            match m {
                Matcher::Any => return Matcher::Any,
                Matcher::Tags(ts) => tags.extend_from_slice(ts),
            }
        }
        Matcher::Tags(tags)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Matcher::Any => "any tag".to_string(),
            Matcher::Tags(tags) => tags
                .iter()
                .map(Tag::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// A validated, immutable schema. Cheap to share between threads.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) nodes: Vec<Node>,
    /// Tags each node starts with, tagging included.
    pub(crate) outer: Vec<Matcher>,
    /// Tags the node's kind starts with, ignoring its own tagging.
    pub(crate) natural: Vec<Matcher>,
    pub(crate) names: BTreeMap<String, NodeId>,
}

impl Schema {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// A named definition.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Decodes exactly one DER element as `node`.
    pub fn decode(&self, node: NodeId, der: &[u8]) -> Result<Value, DecodeError> {
        self.decode_with(node, der, &DecodeOptions::default())
    }

    pub fn decode_with(
        &self,
        node: NodeId,
        der: &[u8],
        options: &DecodeOptions,
    ) -> Result<Value, DecodeError> {
        Decoding::new(self, options).decode_root(node, der)
    }

    /// Encodes `value` as `node`.
    pub fn encode(&self, node: NodeId, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.encode_with(node, value, &EncodeOptions::default())
    }

    pub fn encode_with(
        &self,
        node: NodeId,
        value: &Value,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, EncodeError> {
        Encoding::new(self, options).encode_root(node, value)
    }
}
