//! Walks a schema against a value, producing DER.

use std::cmp::Ordering;

use der::{Tag, Tlv, TlvBuf};
use num_bigint::BigInt;

use crate::error::{EncodeError, EncodeErrorKind, Path, Segment};
use crate::schema::{Field, Kind, NodeId, Schema, Tagging};
use crate::time;
use crate::value::{Fields, Identifier, Value};

/// Member order for SET OF values and SET fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetOfOrder {
    /// Values are written in the order given, fields in declaration order.
    #[default]
    Insertion,
    /// X.690 11.6 ordering: SET OF members sorted by their encodings, SET
    /// fields by tag.
    Canonical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub set_of_order: SetOfOrder,
}

/// Octet string comparison with the shorter operand padded with zeros.
fn cmp_padded(a: &[u8], b: &[u8]) -> Ordering {
    let len = a.len().max(b.len());
    let pad = |s: &[u8], i: usize| s.get(i).copied().unwrap_or(0);
    (0..len)
        .map(|i| pad(a, i).cmp(&pad(b, i)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

pub(crate) struct Encoding<'s> {
    schema: &'s Schema,
    options: &'s EncodeOptions,
    path: Vec<Segment>,
}

type Result<T> = std::result::Result<T, EncodeError>;

impl<'s> Encoding<'s> {
    pub(crate) fn new(schema: &'s Schema, options: &'s EncodeOptions) -> Self {
        Encoding {
            schema,
            options,
            path: Vec::new(),
        }
    }

    fn error(&self, kind: EncodeErrorKind) -> EncodeError {
        EncodeError::new(kind, Path::new(self.path.clone()))
    }

    fn mismatch(&self, expected: impl Into<String>, found: &Value) -> EncodeError {
        self.error(EncodeErrorKind::ValueSchemaMismatch {
            expected: expected.into(),
            found: found.kind_name().to_string(),
        })
    }

    fn invalid(&self, expected: impl Into<String>, reason: String) -> EncodeError {
        self.error(EncodeErrorKind::ValueSchemaMismatch {
            expected: expected.into(),
            found: reason,
        })
    }

    pub(crate) fn encode_root(&mut self, id: NodeId, value: &Value) -> Result<Vec<u8>> {
        Ok(self.node(id, value, None)?.to_bytes())
    }

    fn node(&mut self, id: NodeId, value: &Value, scope: Option<&Fields>) -> Result<TlvBuf> {
        let tlv = self.kind(id, value, scope)?;
        Ok(match self.schema.node(id).tagging() {
            Tagging::None => tlv,
            Tagging::Implicit(class, n) => tlv.retag(class, n),
            Tagging::Explicit(class, n) => tlv.wrap(class, n),
        })
    }

    fn kind(&mut self, id: NodeId, value: &Value, scope: Option<&Fields>) -> Result<TlvBuf> {
        let schema = self.schema;
        let kind = schema.node(id).kind();
        match (kind, value) {
            (Kind::Reference(target), _) => self.node(*target, value, scope),
            (Kind::Choice(alts), Value::Choice { name, value }) => {
                let Some(alt) = alts.iter().find(|alt| alt.name == *name) else {
                    return Err(self.invalid(
                        format!("an alternative of {}", schema.node(id).name()),
                        format!("unknown alternative '{}'", name),
                    ));
                };
                self.path.push(Segment::Alternative(name.clone()));
                let tlv = self.node(alt.node, value, scope)?;
                self.path.pop();
                Ok(tlv)
            }
            (Kind::Any, Value::Any(raw)) => match Tlv::parse_exact(raw) {
                Ok(tlv) => Ok(TlvBuf::from(tlv)),
                Err(e) => Err(self.invalid("ANY holding one DER element", e.to_string())),
            },
            (Kind::Boolean, Value::Boolean(b)) => {
                Ok(TlvBuf::new(Tag::BOOLEAN, vec![if *b { 0xff } else { 0x00 }]))
            }
            (Kind::Integer(_), Value::Integer(n)) => {
                Ok(TlvBuf::new(Tag::INTEGER, n.to_signed_bytes_be()))
            }
            (Kind::Integer(Some(names)) | Kind::Enumerated(names), Value::Symbol(s)) => {
                let tag = match kind {
                    Kind::Enumerated(_) => Tag::ENUMERATED,
                    _ => Tag::INTEGER,
                };
                match names.number(s) {
                    Some(n) => Ok(TlvBuf::new(tag, BigInt::from(n).to_signed_bytes_be())),
                    None => Err(self.invalid(
                        format!("a named value of {}", schema.node(id).name()),
                        format!("unknown name '{}'", s),
                    )),
                }
            }
            (Kind::Enumerated(names), Value::Integer(n)) => {
                let known = i64::try_from(n).ok().and_then(|i| names.name(i)).is_some();
                if !known {
                    return Err(self.invalid(
                        format!("a named value of {}", schema.node(id).name()),
                        format!("unknown value {}", n),
                    ));
                }
                Ok(TlvBuf::new(Tag::ENUMERATED, n.to_signed_bytes_be()))
            }
            (Kind::BitString, Value::BitString(bits)) => {
                if bits.unused() > 7 || (bits.data().is_empty() && bits.unused() != 0) {
                    return Err(self.invalid(
                        "BIT STRING",
                        format!("{} unused bits over {} bytes", bits.unused(), bits.data().len()),
                    ));
                }
                let mut content = Vec::with_capacity(bits.data().len() + 1);
                content.push(bits.unused());
                content.extend_from_slice(bits.data());
                Ok(TlvBuf::new(Tag::BIT_STRING, content))
            }
            (Kind::OctetString(None), Value::OctetString(bytes)) => {
                Ok(TlvBuf::new(Tag::OCTET_STRING, bytes.clone()))
            }
            (Kind::OctetString(Some(dispatch)), _) => match dispatch.resolve(scope) {
                Some(nested) => {
                    let inner = self.node(nested, value, None)?;
                    Ok(TlvBuf::new(Tag::OCTET_STRING, inner.to_bytes()))
                }
                None => match value {
                    Value::OctetString(bytes) => Ok(TlvBuf::new(Tag::OCTET_STRING, bytes.clone())),
                    _ => Err(self.error(EncodeErrorKind::UnresolvedContainsType {
                        discriminant: dispatch.discriminant(scope),
                    })),
                },
            },
            (Kind::Null, Value::Null) => Ok(TlvBuf::new(Tag::NULL, Vec::new())),
            (Kind::ObjectIdentifier(registry), Value::ObjectIdentifier(ident)) => {
                let oid = match (ident, registry) {
                    (Identifier::Oid(oid), _) => Some(oid.clone()),
                    (Identifier::Named(_), Some(registry)) => registry.lookup(ident),
                    (Identifier::Named(_), None) => None,
                };
                match oid {
                    Some(oid) => Ok(TlvBuf::new(Tag::OBJECT_IDENTIFIER, oid.to_der())),
                    None => Err(self.invalid(
                        "registered OBJECT IDENTIFIER",
                        format!("unknown name '{}'", ident),
                    )),
                }
            }
            (Kind::String(kind), Value::String(s)) => match kind.encode(s) {
                Ok(content) => Ok(TlvBuf::new(kind.tag(), content)),
                Err(e) => Err(self.invalid(kind.name(), e)),
            },
            (Kind::UtcTime, Value::Time(t)) => match time::format_utc_time(t) {
                Ok(content) => Ok(TlvBuf::new(Tag::UTC_TIME, content)),
                Err(e) => Err(self.invalid("UTCTime", e)),
            },
            (Kind::GeneralizedTime, Value::Time(t)) => match time::format_generalized_time(t) {
                Ok(content) => Ok(TlvBuf::new(Tag::GENERALIZED_TIME, content)),
                Err(e) => Err(self.invalid("GeneralizedTime", e)),
            },
            (Kind::Sequence(fields), Value::Sequence(values)) => {
                let children = self.fields(fields, values)?;
                Ok(TlvBuf::constructed(Tag::SEQUENCE, &children))
            }
            (Kind::Set(fields), Value::Sequence(values)) => {
                let mut children = self.fields(fields, values)?;
                if self.options.set_of_order == SetOfOrder::Canonical {
                    children.sort_by_key(|c| (c.tag().class(), c.tag().number()));
                }
                Ok(TlvBuf::constructed(Tag::SET, &children))
            }
            (Kind::SequenceOf(item), Value::List(items)) => {
                let children = self.items(*item, items)?;
                Ok(TlvBuf::constructed(Tag::SEQUENCE, &children))
            }
            (Kind::SetOf(item), Value::List(items)) => {
                let mut children = self.items(*item, items)?;
                if self.options.set_of_order == SetOfOrder::Canonical {
                    children.sort_by(|a, b| cmp_padded(&a.to_bytes(), &b.to_bytes()));
                }
                Ok(TlvBuf::constructed(Tag::SET, &children))
            }
            (kind, value) => Err(self.mismatch(kind.describe(), value)),
        }
    }

    fn items(&mut self, item: NodeId, items: &[Value]) -> Result<Vec<TlvBuf>> {
        let mut children = Vec::with_capacity(items.len());
        for (i, value) in items.iter().enumerate() {
            self.path.push(Segment::Index(i));
            children.push(self.node(item, value, None)?);
            self.path.pop();
        }
        Ok(children)
    }

    /// A value spelled differently from the default (a named INTEGER given
    /// as a number) still counts as the default when the encodings agree.
    fn encodes_default(&self, field: &Field, tlv: &TlvBuf, scope: &Fields) -> bool {
        let Some(default) = &field.default else {
            return false;
        };
        Encoding::new(self.schema, self.options)
            .node(field.node, default, Some(scope))
            .is_ok_and(|d| d == *tlv)
    }

    /// Encodes present, non-default fields in declaration order.
    fn fields(&mut self, fields: &[Field], values: &Fields) -> Result<Vec<TlvBuf>> {
        if let Some(unknown) = values.keys().find(|k| !fields.iter().any(|f| f.key == *k)) {
            return Err(self.error(EncodeErrorKind::UnknownField(unknown.to_string())));
        }
        let mut children = Vec::with_capacity(fields.len());
        for field in fields {
            self.path.push(Segment::Field(field.key.clone()));
            match values.get(&field.key) {
                Some(value) if field.default.as_ref() == Some(value) => {}
                Some(value) => {
                    let tlv = self.node(field.node, value, Some(values))?;
                    if !self.encodes_default(field, &tlv, values) {
                        children.push(tlv);
                    }
                }
                None if field.optional || field.default.is_some() => {}
                None => {
                    return Err(self.error(EncodeErrorKind::InvalidOptionalState(field.key.clone())));
                }
            }
            self.path.pop();
        }
        Ok(children)
    }
}
