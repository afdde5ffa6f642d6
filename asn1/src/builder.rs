//! The combinator grammar schema authors use to describe types, and the
//! one-time build step that turns those descriptions into a [`Schema`].
//!
//! ```
//! use asn1::{SchemaBuilder, Type, field};
//!
//! let mut b = SchemaBuilder::new();
//! let validity = b
//!     .define("Validity", Type::sequence([
//!         field("notBefore", Type::utc_time()),
//!         field("notAfter", Type::utc_time()),
//!     ]))
//!     .unwrap();
//! let schema = b.build().unwrap();
//! assert_eq!(Some(validity), schema.lookup("Validity"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use der::TagClass;
use log::trace;

use crate::dispatch::Dispatch;
use crate::error::SchemaError;
use crate::registry::OidRegistry;
use crate::schema::{Alternative, Field, Kind, Matcher, NamedValues, Node, NodeId, Schema, Tagging};
use crate::string::StringKind;
use crate::value::Value;

#[derive(Debug, Clone)]
enum Shape {
    Kind(Kind),
    Sequence(Vec<FieldDef>),
    Set(Vec<FieldDef>),
    SequenceOf(Box<Type>),
    SetOf(Box<Type>),
    Choice(Vec<(String, Type)>),
    Use(NodeId),
    Tagged(Box<Type>),
}

/// A type expression. Lowered into schema nodes by [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub struct Type {
    shape: Shape,
    tagging: Tagging,
}

impl Type {
    fn kind(kind: Kind) -> Self {
        Type {
            shape: Shape::Kind(kind),
            tagging: Tagging::None,
        }
    }

    fn shape(shape: Shape) -> Self {
        Type {
            shape,
            tagging: Tagging::None,
        }
    }

    pub fn boolean() -> Self {
        Type::kind(Kind::Boolean)
    }

    pub fn integer() -> Self {
        Type::kind(Kind::Integer(None))
    }

    /// An INTEGER whose listed values decode to symbols.
    pub fn integer_named(values: NamedValues) -> Self {
        Type::kind(Kind::Integer(Some(values)))
    }

    /// A closed ENUMERATED set.
    pub fn enumerated(values: NamedValues) -> Self {
        Type::kind(Kind::Enumerated(values))
    }

    pub fn bit_string() -> Self {
        Type::kind(Kind::BitString)
    }

    pub fn octet_string() -> Self {
        Type::kind(Kind::OctetString(None))
    }

    /// An OCTET STRING whose contents are typed by a sibling field.
    pub fn octet_string_containing(dispatch: Dispatch) -> Self {
        Type::kind(Kind::OctetString(Some(dispatch)))
    }

    pub fn null() -> Self {
        Type::kind(Kind::Null)
    }

    pub fn object_identifier() -> Self {
        Type::kind(Kind::ObjectIdentifier(None))
    }

    /// An OBJECT IDENTIFIER resolved against `registry`.
    pub fn object_identifier_in(registry: Arc<OidRegistry>) -> Self {
        Type::kind(Kind::ObjectIdentifier(Some(registry)))
    }

    pub fn string(kind: StringKind) -> Self {
        Type::kind(Kind::String(kind))
    }

    pub fn utf8_string() -> Self {
        Type::string(StringKind::Utf8)
    }

    pub fn printable_string() -> Self {
        Type::string(StringKind::Printable)
    }

    pub fn ia5_string() -> Self {
        Type::string(StringKind::Ia5)
    }

    pub fn utc_time() -> Self {
        Type::kind(Kind::UtcTime)
    }

    pub fn generalized_time() -> Self {
        Type::kind(Kind::GeneralizedTime)
    }

    pub fn any() -> Self {
        Type::kind(Kind::Any)
    }

    pub fn sequence(fields: impl IntoIterator<Item = FieldDef>) -> Self {
        Type::shape(Shape::Sequence(fields.into_iter().collect()))
    }

    pub fn set(fields: impl IntoIterator<Item = FieldDef>) -> Self {
        Type::shape(Shape::Set(fields.into_iter().collect()))
    }

    pub fn sequence_of(item: Type) -> Self {
        Type::shape(Shape::SequenceOf(Box::new(item)))
    }

    pub fn set_of(item: Type) -> Self {
        Type::shape(Shape::SetOf(Box::new(item)))
    }

    pub fn choice<S: Into<String>>(alternatives: impl IntoIterator<Item = (S, Type)>) -> Self {
        Type::shape(Shape::Choice(
            alternatives
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        ))
    }

    /// Another node, typically a named definition.
    pub fn reference(node: NodeId) -> Self {
        Type::shape(Shape::Use(node))
    }

    /// Applies a tag. Tagging an already tagged type nests the tags, the new
    /// one outermost.
    pub fn tagged(self, tagging: Tagging) -> Self {
        if self.tagging == Tagging::None {
            return Type { tagging, ..self };
        }
        Type {
            shape: Shape::Tagged(Box::new(self)),
            tagging,
        }
    }

    /// `[n] EXPLICIT`, context-specific.
    pub fn explicit(self, n: u32) -> Self {
        self.tagged(Tagging::Explicit(TagClass::ContextSpecific, n))
    }

    /// `[n] IMPLICIT`, context-specific.
    pub fn implicit(self, n: u32) -> Self {
        self.tagged(Tagging::Implicit(TagClass::ContextSpecific, n))
    }
}

/// A SEQUENCE or SET member under construction.
#[derive(Debug, Clone)]
pub struct FieldDef {
    key: String,
    ty: Type,
    optional: bool,
    default: Option<Value>,
}

pub fn field(key: impl Into<String>, ty: Type) -> FieldDef {
    FieldDef {
        key: key.into(),
        ty,
        optional: false,
        default: None,
    }
}

impl FieldDef {
    pub fn optional(self) -> Self {
        FieldDef {
            optional: true,
            ..self
        }
    }

    pub fn default(self, value: Value) -> Self {
        FieldDef {
            default: Some(value),
            ..self
        }
    }
}

/// Collects definitions, then validates them all at once in [`build`].
///
/// [`build`]: SchemaBuilder::build
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<Option<Node>>,
    placeholder: Vec<String>,
    names: BTreeMap<String, NodeId>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    fn alloc(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(None);
        self.placeholder.push(name.to_string());
        id
    }

    /// Reserves a name so that it can be referenced before it is defined.
    /// Declaring an existing name returns its id.
    pub fn declare(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = self.alloc(name);
        self.names.insert(name.to_string(), id);
        id
    }

    /// Defines a named type, filling its declaration if there is one.
    pub fn define(&mut self, name: &str, ty: Type) -> Result<NodeId, SchemaError> {
        let id = self.declare(name);
        if self.nodes[id.0].is_some() {
            return Err(SchemaError::Redefined {
                name: name.to_string(),
            });
        }
        let node = self.lower_node(name, ty)?;
        self.nodes[id.0] = Some(node);
        Ok(id)
    }

    /// Adds an anonymous type.
    pub fn add(&mut self, ty: Type) -> Result<NodeId, SchemaError> {
        let name = format!("#{}", self.nodes.len());
        self.lower(&name, ty)
    }

    fn lower(&mut self, name: &str, ty: Type) -> Result<NodeId, SchemaError> {
        if let (Shape::Use(id), Tagging::None) = (&ty.shape, ty.tagging) {
            return Ok(*id);
        }
        let id = self.alloc(name);
        let node = self.lower_node(name, ty)?;
        self.nodes[id.0] = Some(node);
        Ok(id)
    }

    fn lower_fields(&mut self, name: &str, defs: Vec<FieldDef>) -> Result<Vec<Field>, SchemaError> {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(defs.len());
        for def in defs {
            if !seen.insert(def.key.clone()) {
                return Err(SchemaError::DuplicateField {
                    name: name.to_string(),
                    field: def.key,
                });
            }
            let node = self.lower(&format!("{}.{}", name, def.key), def.ty)?;
            fields.push(Field {
                key: def.key,
                node,
                optional: def.optional,
                default: def.default,
            });
        }
        Ok(fields)
    }

    fn lower_node(&mut self, name: &str, ty: Type) -> Result<Node, SchemaError> {
        let kind = match ty.shape {
            Shape::Kind(kind) => kind,
            Shape::Sequence(defs) => Kind::Sequence(self.lower_fields(name, defs)?),
            Shape::Set(defs) => Kind::Set(self.lower_fields(name, defs)?),
            Shape::SequenceOf(item) => Kind::SequenceOf(self.lower(&format!("{}[]", name), *item)?),
            Shape::SetOf(item) => Kind::SetOf(self.lower(&format!("{}[]", name), *item)?),
            Shape::Choice(alts) => {
                if alts.is_empty() {
                    return Err(SchemaError::EmptyChoice {
                        name: name.to_string(),
                    });
                }
                let mut seen = BTreeSet::new();
                let mut alternatives = Vec::with_capacity(alts.len());
                for (alt, ty) in alts {
                    if !seen.insert(alt.clone()) {
                        return Err(SchemaError::DuplicateAlternative {
                            name: name.to_string(),
                            alternative: alt,
                        });
                    }
                    let node = self.lower(&format!("{}.{}", name, alt), ty)?;
                    alternatives.push(Alternative { name: alt, node });
                }
                Kind::Choice(alternatives)
            }
            Shape::Use(id) => Kind::Reference(id),
            Shape::Tagged(inner) => Kind::Reference(self.lower(name, *inner)?),
        };
        Ok(Node {
            name: name.to_string(),
            kind,
            tagging: ty.tagging,
        })
    }

    /// Validates every definition and freezes the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (node, name) in self.nodes.into_iter().zip(self.placeholder) {
            nodes.push(node.ok_or(SchemaError::Undefined { name })?);
        }

        let mut resolver = Resolver {
            nodes: &nodes,
            outer: vec![None; nodes.len()],
            visiting: vec![false; nodes.len()],
        };
        let mut outer = Vec::with_capacity(nodes.len());
        for i in 0..nodes.len() {
            outer.push(resolver.outer(NodeId(i))?);
        }
        let natural = nodes
            .iter()
            .map(|node| natural_matcher(&node.kind, &outer))
            .collect::<Vec<_>>();

        for node in nodes.iter() {
            if let Kind::Choice(alts) = &node.kind {
                check_alternatives(&node.name, alts, &outer)?;
            }
        }

        trace!("schema built: {} nodes, {} named", nodes.len(), self.names.len());
        Ok(Schema {
            nodes,
            outer,
            natural,
            names: self.names,
        })
    }
}

fn natural_matcher(kind: &Kind, outer: &[Matcher]) -> Matcher {
    match kind {
        Kind::Any => Matcher::Any,
        Kind::Reference(t) => outer[t.0].clone(),
        Kind::Choice(alts) => Matcher::union(alts.iter().map(|a| &outer[a.node.0])),
        kind => Matcher::Tags(kind.natural_tag().into_iter().collect()),
    }
}

fn check_alternatives(choice: &str, alts: &[Alternative], outer: &[Matcher]) -> Result<(), SchemaError> {
    for (i, a) in alts.iter().enumerate() {
        for b in &alts[i + 1..] {
            let clash = match (&outer[a.node.0], &outer[b.node.0]) {
                (Matcher::Any, _) | (_, Matcher::Any) => Some("ANY".to_string()),
                (Matcher::Tags(x), Matcher::Tags(y)) => {
                    x.iter().find(|t| y.contains(t)).map(|t| t.to_string())
                }
            };
            if let Some(tag) = clash {
                return Err(SchemaError::AmbiguousChoice {
                    choice: choice.to_string(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                    tag,
                });
            }
        }
    }
    Ok(())
}

/// Computes outer matchers, following only the edges that do not consume a
/// tag. Revisiting a node on the current path means the definition can never
/// bottom out.
struct Resolver<'a> {
    nodes: &'a [Node],
    outer: Vec<Option<Matcher>>,
    visiting: Vec<bool>,
}

impl Resolver<'_> {
    fn outer(&mut self, id: NodeId) -> Result<Matcher, SchemaError> {
        if let Some(m) = &self.outer[id.0] {
            return Ok(m.clone());
        }
        let nodes = self.nodes;
        let node = &nodes[id.0];
        if self.visiting[id.0] {
            return Err(SchemaError::InfiniteExpansion {
                name: node.name.clone(),
            });
        }
        self.visiting[id.0] = true;
        let m = match node.tagging {
            Tagging::Explicit(class, n) => Matcher::Tags(vec![der::Tag::new(class, true, n)]),
            Tagging::Implicit(class, n) => {
                let constructed = self.constructed(id)?;
                Matcher::Tags(vec![der::Tag::new(class, constructed, n)])
            }
            Tagging::None => match &node.kind {
                Kind::Reference(t) => self.outer(*t)?,
                Kind::Choice(alts) => {
                    let mut ms = Vec::with_capacity(alts.len());
                    for alt in alts {
                        ms.push(self.outer(alt.node)?);
                    }
                    Matcher::union(ms.iter())
                }
                kind => natural_matcher(kind, &[]),
            },
        };
        self.visiting[id.0] = false;
        self.outer[id.0] = Some(m.clone());
        Ok(m)
    }

    /// The primitive/constructed bit an IMPLICIT tag on `id` keeps.
    fn constructed(&mut self, id: NodeId) -> Result<bool, SchemaError> {
        let nodes = self.nodes;
        let untaggable = || SchemaError::ImplicitUntaggable {
            name: nodes[id.0].name.clone(),
        };
        match &nodes[id.0].kind {
            Kind::Choice(_) | Kind::Any => Err(untaggable()),
            Kind::Reference(t) => {
                let t = *t;
                let m = self.outer(t)?;
                if self.is_untaggable(t) {
                    return Err(untaggable());
                }
                match m {
                    Matcher::Tags(tags) if tags.len() == 1 => Ok(tags[0].is_constructed()),
                    _ => Err(untaggable()),
                }
            }
            kind => Ok(kind.natural_tag().is_some_and(|t| t.is_constructed())),
        }
    }

    /// An untagged CHOICE or ANY, possibly behind untagged references.
    fn is_untaggable(&self, mut id: NodeId) -> bool {
        loop {
            let node = &self.nodes[id.0];
            if node.tagging != Tagging::None {
                return false;
            }
            match node.kind {
                Kind::Choice(_) | Kind::Any => return true,
                Kind::Reference(t) => id = t,
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use der::{Tag, TagClass};
    use rstest::rstest;

    use super::{SchemaBuilder, Type, field};
    use crate::error::SchemaError;
    use crate::schema::{Kind, Matcher, Tagging};

    #[test]
    fn test_forward_reference() {
        let mut b = SchemaBuilder::new();
        let name = b.declare("GeneralName");
        let names = b.define("GeneralNames", Type::sequence_of(Type::reference(name))).unwrap();
        b.define(
            "GeneralName",
            Type::choice([
                ("dNSName", Type::ia5_string().implicit(2)),
                ("uniformResourceIdentifier", Type::ia5_string().implicit(6)),
            ]),
        )
        .unwrap();
        let schema = b.build().unwrap();
        assert_eq!(Some(names), schema.lookup("GeneralNames"));
        let Kind::SequenceOf(item) = schema.node(names).kind() else {
            panic!("expected SEQUENCE OF");
        };
        assert_eq!(name, *item);
        assert_eq!(
            Matcher::Tags(vec![Tag::context(2, false), Tag::context(6, false)]),
            schema.outer[name.0]
        );
    }

    #[test]
    fn test_recursive_through_tags() {
        // a tag consumes input, so self reference under a field is fine
        let mut b = SchemaBuilder::new();
        let tree = b.declare("Tree");
        b.define(
            "Tree",
            Type::sequence([
                field("value", Type::integer()),
                field("left", Type::reference(tree).implicit(0)).optional(),
                field("right", Type::reference(tree).implicit(1)).optional(),
            ]),
        )
        .unwrap();
        let schema = b.build().unwrap();
        assert_eq!(Matcher::Tags(vec![Tag::context(0, true)]), schema.outer[2]);
        assert_eq!(Matcher::Tags(vec![Tag::context(1, true)]), schema.outer[3]);
    }

    #[test]
    fn test_nested_tagging() {
        let mut b = SchemaBuilder::new();
        let id = b.add(Type::integer().implicit(0).explicit(1)).unwrap();
        let schema = b.build().unwrap();
        assert_eq!(
            Tagging::Explicit(TagClass::ContextSpecific, 1),
            schema.node(id).tagging()
        );
        let Kind::Reference(inner) = schema.node(id).kind() else {
            panic!("expected reference");
        };
        assert_eq!(
            Tagging::Implicit(TagClass::ContextSpecific, 0),
            schema.node(*inner).tagging()
        );
    }

    fn ambiguous() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        b.define(
            "Time",
            Type::choice([("utcTime", Type::utc_time()), ("otherTime", Type::utc_time())]),
        )
        .unwrap();
        b
    }

    fn ambiguous_any() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        b.define(
            "Opaque",
            Type::choice([("int", Type::integer()), ("anything", Type::any())]),
        )
        .unwrap();
        b
    }

    fn ambiguous_nested() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        let inner = b
            .define("Inner", Type::choice([("a", Type::integer()), ("b", Type::null())]))
            .unwrap();
        b.define(
            "Outer",
            Type::choice([("inner", Type::reference(inner)), ("c", Type::null())]),
        )
        .unwrap();
        b
    }

    fn undefined() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        let missing = b.declare("Missing");
        b.add(Type::sequence([field("x", Type::reference(missing))])).unwrap();
        b
    }

    fn self_loop() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        let a = b.declare("A");
        b.define("A", Type::choice([("again", Type::reference(a)), ("stop", Type::null())]))
            .unwrap();
        b
    }

    fn implicit_loop() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        let a = b.declare("A");
        let c = b.define("C", Type::reference(a)).unwrap();
        b.define("A", Type::reference(c).implicit(0)).unwrap();
        b
    }

    fn implicit_choice() -> SchemaBuilder {
        let mut b = SchemaBuilder::new();
        let time = b
            .define("Time", Type::choice([("utcTime", Type::utc_time()), ("generalTime", Type::generalized_time())]))
            .unwrap();
        b.add(Type::reference(time).implicit(0)).unwrap();
        b
    }

    #[rstest(builder, expected,
        case(ambiguous(), SchemaError::AmbiguousChoice {
            choice: "Time".to_string(),
            first: "utcTime".to_string(),
            second: "otherTime".to_string(),
            tag: "[UNIVERSAL 23]/P".to_string(),
        }),
        case(ambiguous_any(), SchemaError::AmbiguousChoice {
            choice: "Opaque".to_string(),
            first: "int".to_string(),
            second: "anything".to_string(),
            tag: "ANY".to_string(),
        }),
        case(ambiguous_nested(), SchemaError::AmbiguousChoice {
            choice: "Outer".to_string(),
            first: "inner".to_string(),
            second: "c".to_string(),
            tag: "[UNIVERSAL 5]/P".to_string(),
        }),
        case(undefined(), SchemaError::Undefined { name: "Missing".to_string() }),
        case(self_loop(), SchemaError::InfiniteExpansion { name: "A".to_string() }),
        case(implicit_loop(), SchemaError::InfiniteExpansion { name: "A".to_string() }),
        case(implicit_choice(), SchemaError::ImplicitUntaggable { name: "#3".to_string() }),
    )]
    fn test_build_error(builder: SchemaBuilder, expected: SchemaError) {
        assert_eq!(Err(expected), builder.build().map(|s| s.len()));
    }

    #[test]
    fn test_define_error() {
        let mut b = SchemaBuilder::new();
        b.define("A", Type::null()).unwrap();
        assert_eq!(
            Err(SchemaError::Redefined { name: "A".to_string() }),
            b.define("A", Type::boolean())
        );
        assert_eq!(
            Err(SchemaError::DuplicateField { name: "B".to_string(), field: "x".to_string() }),
            b.define("B", Type::sequence([field("x", Type::null()), field("x", Type::boolean())]))
        );
        assert_eq!(
            Err(SchemaError::EmptyChoice { name: "C".to_string() }),
            b.define("C", Type::choice(Vec::<(String, Type)>::new()))
        );
    }
}
