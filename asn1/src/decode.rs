//! Walks a schema against DER input.

use der::{Tag, Tlv};
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{DecodeError, DecodeErrorKind, Path, Segment};
use crate::oid::ObjectIdentifier;
use crate::schema::{Field, Kind, NodeId, Schema, Tagging};
use crate::time;
use crate::value::{Fields, Identifier, Value};

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest TLV nesting accepted before giving up with `NestingTooDeep`.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<der::Error> for DecodeErrorKind {
    fn from(e: der::Error) -> Self {
        match e {
            der::Error::TruncatedInput => DecodeErrorKind::TruncatedInput,
            der::Error::TrailingData(n) => DecodeErrorKind::TrailingData(n),
            der::Error::InvalidTagNumber => DecodeErrorKind::InvalidPrimitiveValue {
                what: "tag",
                reason: e.to_string(),
            },
            der::Error::IndefiniteLength
            | der::Error::NonMinimalLength
            | der::Error::LengthOverflow => DecodeErrorKind::InvalidLength(e),
        }
    }
}

fn invalid(what: &'static str, reason: impl Into<String>) -> DecodeErrorKind {
    DecodeErrorKind::InvalidPrimitiveValue {
        what,
        reason: reason.into(),
    }
}

/// One decode call: the schema, the options and where we are.
pub(crate) struct Decoding<'s> {
    schema: &'s Schema,
    options: &'s DecodeOptions,
    path: Vec<Segment>,
    depth: usize,
}

type Result<T> = std::result::Result<T, DecodeError>;

impl<'s> Decoding<'s> {
    pub(crate) fn new(schema: &'s Schema, options: &'s DecodeOptions) -> Self {
        Decoding {
            schema,
            options,
            path: Vec::new(),
            depth: 0,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, Path::new(self.path.clone()))
    }

    fn framing<T>(&self, res: std::result::Result<T, der::Error>) -> Result<T> {
        res.map_err(|e| self.error(e.into()))
    }

    fn unexpected(&self, expected: String, found: Tag) -> DecodeError {
        self.error(DecodeErrorKind::UnexpectedTag { expected, found })
    }

    pub(crate) fn decode_root(&mut self, id: NodeId, der: &[u8]) -> Result<Value> {
        let tlv = self.framing(Tlv::parse_exact(der))?;
        self.node(id, tlv, None)
    }

    /// Checks that `tlv` can start `id`, then decodes it.
    fn node(&mut self, id: NodeId, tlv: Tlv<'_>, scope: Option<&Fields>) -> Result<Value> {
        let outer = &self.schema.outer[id.0];
        if !outer.matches(tlv.tag()) {
            if self.is_choice(id) {
                return Err(self.error(DecodeErrorKind::UnmatchedChoice { found: tlv.tag() }));
            }
            return Err(self.unexpected(outer.describe(), tlv.tag()));
        }
        self.body(id, tlv, scope)
    }

    /// An untagged CHOICE, possibly behind untagged references.
    fn is_choice(&self, mut id: NodeId) -> bool {
        loop {
            let node = self.schema.node(id);
            match (node.tagging(), node.kind()) {
                (Tagging::None, Kind::Choice(_)) => return true,
                (Tagging::None, Kind::Reference(target)) => id = *target,
                _ => return false,
            }
        }
    }

    /// `tlv` carries the tag of `id`, already checked by the caller.
    fn body(&mut self, id: NodeId, tlv: Tlv<'_>, scope: Option<&Fields>) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(DecodeErrorKind::NestingTooDeep(self.options.max_depth)));
        }
        self.depth += 1;
        let res = match self.schema.node(id).tagging() {
            Tagging::Explicit(..) => self.explicit_inner(id, tlv, scope),
            Tagging::Implicit(..) | Tagging::None => self.kind(id, tlv, scope),
        };
        self.depth -= 1;
        res
    }

    fn explicit_inner(&mut self, id: NodeId, tlv: Tlv<'_>, scope: Option<&Fields>) -> Result<Value> {
        let inner = self.framing(Tlv::parse_exact(tlv.content()))?;
        let natural = &self.schema.natural[id.0];
        if !natural.matches(inner.tag()) {
            return Err(self.unexpected(natural.describe(), inner.tag()));
        }
        self.kind(id, inner, scope)
    }

    fn kind(&mut self, id: NodeId, tlv: Tlv<'_>, scope: Option<&Fields>) -> Result<Value> {
        let schema = self.schema;
        let content = tlv.content();
        match schema.node(id).kind() {
            Kind::Reference(target) => self.body(*target, tlv, scope),
            Kind::Choice(alts) => {
                let Some(alt) = alts
                    .iter()
                    .find(|alt| schema.outer[alt.node.0].matches(tlv.tag()))
                else {
                    return Err(self.error(DecodeErrorKind::UnmatchedChoice { found: tlv.tag() }));
                };
                trace!("{}: selected alternative {}", schema.node(id).name(), alt.name());
                self.path.push(Segment::Alternative(alt.name.clone()));
                let value = self.body(alt.node, tlv, scope)?;
                self.path.pop();
                Ok(Value::choice(alt.name.clone(), value))
            }
            Kind::Any => Ok(Value::Any(tlv.raw().to_vec())),
            Kind::Boolean => match content {
                [b] => Ok(Value::Boolean(*b != 0)),
                _ => Err(self.error(invalid("BOOLEAN", "content must be exactly one byte"))),
            },
            Kind::Integer(names) => {
                let n = self.integer(content)?;
                let symbol = names
                    .as_ref()
                    .zip(n.to_i64())
                    .and_then(|(names, i)| names.name(i));
                Ok(match symbol {
                    Some(name) => Value::symbol(name),
                    None => Value::Integer(n),
                })
            }
            Kind::Enumerated(names) => {
                let n = self.integer(content)?;
                match n.to_i64().and_then(|i| names.name(i)) {
                    Some(name) => Ok(Value::symbol(name)),
                    None => Err(self.error(DecodeErrorKind::MissingRequiredField(format!(
                        "enumerated value {}",
                        n
                    )))),
                }
            }
            Kind::BitString => match content {
                [] => Err(self.error(invalid("BIT STRING", "missing unused-bits byte"))),
                [unused, ..] if *unused > 7 => Err(self.error(invalid(
                    "BIT STRING",
                    format!("{} unused bits", unused),
                ))),
                [unused] if *unused != 0 => Err(self.error(invalid(
                    "BIT STRING",
                    "unused bits in an empty string",
                ))),
                [unused, data @ ..] => Ok(Value::bit_string(*unused, data)),
            },
            Kind::OctetString(None) => Ok(Value::octet_string(content)),
            Kind::OctetString(Some(dispatch)) => match dispatch.resolve(scope) {
                Some(nested) => {
                    let inner = self.framing(Tlv::parse_exact(content))?;
                    self.node(nested, inner, None)
                }
                None => {
                    debug!(
                        "{}: no schema for {} {:?}, keeping contents opaque",
                        schema.node(id).name(),
                        dispatch.field(),
                        dispatch.discriminant(scope)
                    );
                    Ok(Value::octet_string(content))
                }
            },
            Kind::Null => match content {
                [] => Ok(Value::Null),
                _ => Err(self.error(invalid("NULL", "content must be empty"))),
            },
            Kind::ObjectIdentifier(registry) => {
                let oid = ObjectIdentifier::from_der(content)
                    .map_err(|e| self.error(invalid("OBJECT IDENTIFIER", e.to_string())))?;
                Ok(Value::ObjectIdentifier(match registry {
                    Some(registry) => registry.resolve(oid),
                    None => Identifier::Oid(oid),
                }))
            }
            Kind::String(kind) => kind
                .decode(content)
                .map(Value::String)
                .map_err(|e| self.error(invalid(kind.name(), e))),
            Kind::UtcTime => time::parse_utc_time(content)
                .map(Value::Time)
                .map_err(|e| self.error(invalid("UTCTime", e))),
            Kind::GeneralizedTime => time::parse_generalized_time(content)
                .map(Value::Time)
                .map_err(|e| self.error(invalid("GeneralizedTime", e))),
            Kind::Sequence(fields) => self.sequence(tlv, fields),
            Kind::Set(fields) => self.set(tlv, fields),
            Kind::SequenceOf(item) | Kind::SetOf(item) => {
                let mut items = Vec::new();
                for (i, child) in tlv.children().enumerate() {
                    self.path.push(Segment::Index(i));
                    let child = self.framing(child)?;
                    items.push(self.node(*item, child, None)?);
                    self.path.pop();
                }
                Ok(Value::List(items))
            }
        }
    }

    fn integer(&self, content: &[u8]) -> Result<BigInt> {
        match content {
            [] => Err(self.error(invalid("INTEGER", "no content"))),
            [0x00, next, ..] if *next < 0x80 => {
                Err(self.error(invalid("INTEGER", "not minimally encoded")))
            }
            [0xff, next, ..] if *next >= 0x80 => {
                Err(self.error(invalid("INTEGER", "not minimally encoded")))
            }
            _ => Ok(BigInt::from_signed_bytes_be(content)),
        }
    }

    fn children<'a>(&self, tlv: Tlv<'a>) -> Result<Vec<Tlv<'a>>> {
        self.framing(tlv.children().collect::<std::result::Result<Vec<_>, _>>())
    }

    /// A field that has no TLV: its default, nothing, or an error.
    fn absent(&self, field: &Field, out: &mut Fields) -> Result<()> {
        match (&field.default, field.optional) {
            (Some(default), _) => {
                out.insert(field.key.clone(), default.clone());
                Ok(())
            }
            (None, true) => Ok(()),
            (None, false) => Err(self.error(DecodeErrorKind::MissingRequiredField(format!(
                "field '{}'",
                field.key
            )))),
        }
    }

    /// Children are read one at a time, so a framing error is reported at
    /// the field whose turn it is.
    fn sequence(&mut self, tlv: Tlv<'_>, fields: &[Field]) -> Result<Value> {
        let mut children = tlv.children().peekable();
        let mut out = Fields::new();
        for field in fields {
            self.path.push(Segment::Field(field.key.clone()));
            let child = match children.peek() {
                Some(Ok(child)) => Some(*child),
                Some(Err(e)) => return Err(self.error((*e).into())),
                None => None,
            };
            match child {
                Some(child) if self.schema.outer[field.node.0].matches(child.tag()) => {
                    children.next();
                    let value = self.node(field.node, child, Some(&out))?;
                    out.insert(field.key.clone(), value);
                }
                _ => self.absent(field, &mut out)?,
            }
            self.path.pop();
        }
        if let Some(extra) = children.next() {
            let extra = self.framing(extra)?;
            return Err(self.unexpected("end of SEQUENCE".to_string(), extra.tag()));
        }
        Ok(Value::Sequence(out))
    }

    /// Fields may arrive in any order; the result lists them in declaration order.
    fn set(&mut self, tlv: Tlv<'_>, fields: &[Field]) -> Result<Value> {
        let children = self.children(tlv)?;
        let mut seen = Fields::new();
        for child in children {
            let Some(field) = fields.iter().find(|f| {
                !seen.contains_key(&f.key) && self.schema.outer[f.node.0].matches(child.tag())
            }) else {
                return Err(self.unexpected("a member of SET".to_string(), child.tag()));
            };
            self.path.push(Segment::Field(field.key.clone()));
            let value = self.node(field.node, child, Some(&seen))?;
            self.path.pop();
            seen.insert(field.key.clone(), value);
        }

        let mut out = Fields::new();
        for field in fields {
            match seen.remove(&field.key) {
                Some(value) => {
                    out.insert(field.key.clone(), value);
                }
                None => {
                    self.path.push(Segment::Field(field.key.clone()));
                    self.absent(field, &mut out)?;
                    self.path.pop();
                }
            }
        }
        Ok(Value::Sequence(out))
    }
}
