//! Error types for schema construction, decoding and encoding.

use std::fmt::{Display, Formatter};

use der::Tag;
use thiserror::Error;

/// One step from the schema root towards the place an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A SEQUENCE or SET field key.
    Field(String),
    /// The selected CHOICE alternative.
    Alternative(String),
    /// A SEQUENCE OF / SET OF member.
    Index(usize),
}

/// Ordered segments from the schema root to the failure point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Path(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(key) | Segment::Alternative(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                Segment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

/// Errors raised while building a schema. These never occur at decode or
/// encode time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{name}: declared but never defined")]
    Undefined { name: String },
    #[error("{name}: defined twice")]
    Redefined { name: String },
    #[error("{name}: expands into itself without consuming a tag")]
    InfiniteExpansion { name: String },
    #[error("{choice}: alternatives '{first}' and '{second}' share the tag {tag}")]
    AmbiguousChoice {
        choice: String,
        first: String,
        second: String,
        tag: String,
    },
    #[error("{name}: CHOICE has no alternatives")]
    EmptyChoice { name: String },
    #[error("{name}: IMPLICIT tag cannot be applied to a CHOICE or ANY")]
    ImplicitUntaggable { name: String },
    #[error("{name}: duplicate field '{field}'")]
    DuplicateField { name: String, field: String },
    #[error("{name}: duplicate alternative '{alternative}'")]
    DuplicateAlternative { name: String, alternative: String },
    #[error("invalid object identifier: {0}")]
    ObjectIdentifier(#[from] OidError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("unexpected tag {found}, expected {expected}")]
    UnexpectedTag { expected: String, found: Tag },
    #[error("truncated input")]
    TruncatedInput,
    #[error("invalid length: {0}")]
    InvalidLength(der::Error),
    #[error("invalid {what}: {reason}")]
    InvalidPrimitiveValue { what: &'static str, reason: String },
    #[error("no alternative matches tag {found}")]
    UnmatchedChoice { found: Tag },
    #[error("missing required {0}")]
    MissingRequiredField(String),
    #[error("{0} trailing byte(s)")]
    TrailingData(usize),
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// A decode failure and where in the schema it happened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("decode error at {path}: {kind}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    path: Path,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, path: Path) -> Self {
        DecodeError { kind, path }
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeErrorKind {
    #[error("value does not match schema: expected {expected}, found {found}")]
    ValueSchemaMismatch { expected: String, found: String },
    #[error("no schema registered for discriminant {discriminant:?} and value is not raw bytes")]
    UnresolvedContainsType { discriminant: Option<String> },
    #[error("required field '{0}' is absent")]
    InvalidOptionalState(String),
    #[error("field '{0}' is not declared by the schema")]
    UnknownField(String),
}

/// An encode failure and where in the value it happened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("encode error at {path}: {kind}")]
pub struct EncodeError {
    kind: EncodeErrorKind,
    path: Path,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind, path: Path) -> Self {
        EncodeError { kind, path }
    }

    pub fn kind(&self) -> &EncodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OidError {
    #[error("OBJECT IDENTIFIER: no data")]
    NoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    IncompleteEncoding,
    #[error("OBJECT IDENTIFIER: subidentifier is not minimally encoded")]
    NonMinimal,
    #[error("OBJECT IDENTIFIER: arc does not fit in 64 bits")]
    Overflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    TooFewComponents,
    #[error("OBJECT IDENTIFIER: first arcs {0}.{1} out of range")]
    InvalidFirstArcs(u64, u64),
    #[error("OBJECT IDENTIFIER: invalid component '{0}'")]
    InvalidComponent(String),
}
