//! Schema-driven ASN.1 DER codec.
//!
//! Types are described once with the combinator grammar in [`builder`]
//! ([`Type`], [`field`], [`SchemaBuilder`]) and frozen into a [`Schema`]. A
//! schema then decodes DER into [`Value`]s and encodes values back to DER:
//!
//! ```
//! use asn1::{SchemaBuilder, Type, Value, field};
//!
//! let mut b = SchemaBuilder::new();
//! let point = b
//!     .define("Point", Type::sequence([
//!         field("x", Type::integer()),
//!         field("y", Type::integer().explicit(0)).optional(),
//!     ]))
//!     .unwrap();
//! let schema = b.build().unwrap();
//!
//! let value = Value::sequence([("x", Value::integer(5)), ("y", Value::integer(-1))]);
//! let der = schema.encode(point, &value).unwrap();
//! assert_eq!(der, [0x30, 0x08, 0x02, 0x01, 0x05, 0xa0, 0x03, 0x02, 0x01, 0xff]);
//! assert_eq!(value, schema.decode(point, &der).unwrap());
//! ```
//!
//! Building validates the whole graph: choices whose alternatives share a
//! tag, definitions that expand into themselves and declarations that are
//! never defined are rejected before anything is decoded.

#![forbid(unsafe_code)]

pub mod builder;
mod decode;
pub mod dispatch;
mod encode;
pub mod error;
pub mod oid;
pub mod registry;
pub mod schema;
pub mod string;
mod time;
pub mod value;

pub use builder::{FieldDef, SchemaBuilder, Type, field};
pub use decode::{DEFAULT_MAX_DEPTH, DecodeOptions};
pub use der::TagClass;
pub use dispatch::Dispatch;
pub use encode::{EncodeOptions, SetOfOrder};
pub use error::{
    DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, OidError, Path, SchemaError,
    Segment,
};
pub use oid::ObjectIdentifier;
pub use registry::OidRegistry;
pub use schema::{NamedValues, NodeId, Schema, Tagging};
pub use string::StringKind;
pub use value::{BitString, Fields, Identifier, Value};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use der::Tag;
    use rstest::rstest;

    use super::*;

    struct Fixture {
        schema: Schema,
        boxed: NodeId,
        implicit_seq: NodeId,
        version: NodeId,
        extension: NodeId,
        status: NodeId,
        time: NodeId,
        set: NodeId,
        set_of: NodeId,
        nested: NodeId,
        strict: NodeId,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(
            OidRegistry::from_entries(&[("2 5 29 19", "basicConstraints")]).unwrap(),
        );
        let mut b = SchemaBuilder::new();
        let boxed = b
            .define("Boxed", Type::sequence([field("n", Type::integer().explicit(1))]))
            .unwrap();
        let implicit_seq = b
            .define(
                "ImplicitSeq",
                Type::sequence([field(
                    "inner",
                    Type::sequence([field("flag", Type::boolean())]).implicit(2),
                )]),
            )
            .unwrap();
        let version = b
            .define(
                "Versioned",
                Type::sequence([
                    field(
                        "version",
                        Type::integer_named(NamedValues::new([(0, "v1"), (1, "v2"), (2, "v3")]))
                            .explicit(0),
                    )
                    .default(Value::symbol("v1")),
                    field("serial", Type::integer()),
                ]),
            )
            .unwrap();
        let basic = b
            .define(
                "BasicConstraints",
                Type::sequence([
                    field("cA", Type::boolean()).default(Value::Boolean(false)),
                    field("pathLenConstraint", Type::integer()).optional(),
                ]),
            )
            .unwrap();
        let extension = b
            .define(
                "Extension",
                Type::sequence([
                    field("extnID", Type::object_identifier_in(registry.clone())),
                    field("critical", Type::boolean()).default(Value::Boolean(false)),
                    field(
                        "extnValue",
                        Type::octet_string_containing(
                            Dispatch::on("extnID")
                                .with_registry(registry)
                                .route("basicConstraints", basic),
                        ),
                    ),
                ]),
            )
            .unwrap();
        let status = b
            .define(
                "Status",
                Type::sequence([
                    field(
                        "responseStatus",
                        Type::enumerated(NamedValues::new([(0, "successful"), (1, "malformedRequest")])),
                    ),
                    field("responseBytes", Type::octet_string().explicit(0)).optional(),
                ]),
            )
            .unwrap();
        let time = b
            .define(
                "Time",
                Type::choice([
                    ("utcTime", Type::utc_time()),
                    ("generalTime", Type::generalized_time()),
                ]),
            )
            .unwrap();
        let set = b
            .define(
                "Pair",
                Type::set([
                    field("name", Type::utf8_string().implicit(1)),
                    field("age", Type::integer().implicit(0)).optional(),
                ]),
            )
            .unwrap();
        let set_of = b.define("Bag", Type::set_of(Type::octet_string())).unwrap();
        let list = b.declare("List");
        let nested = b
            .define(
                "List",
                Type::sequence([field("next", Type::reference(list).explicit(0)).optional()]),
            )
            .unwrap();
        let strict = b
            .define(
                "Strict",
                Type::sequence([
                    field("a", Type::integer()),
                    field("b", Type::utf8_string()),
                ]),
            )
            .unwrap();
        Fixture {
            schema: b.build().unwrap(),
            boxed,
            implicit_seq,
            version,
            extension,
            status,
            time,
            set,
            set_of,
            nested,
            strict,
        }
    }

    #[test]
    fn test_explicit_tag_wraps_natural_encoding() {
        let f = fixture();
        let value = Value::sequence([("n", Value::integer(5))]);
        let der = f.schema.encode(f.boxed, &value).unwrap();
        assert_eq!(vec![0x30, 0x05, 0xa1, 0x03, 0x02, 0x01, 0x05], der);
        assert_eq!(value, f.schema.decode(f.boxed, &der).unwrap());
    }

    #[test]
    fn test_implicit_tag_keeps_constructed_bit() {
        let f = fixture();
        let value = Value::sequence([("inner", Value::sequence([("flag", Value::Boolean(true))]))]);
        let der = f.schema.encode(f.implicit_seq, &value).unwrap();
        assert_eq!(vec![0x30, 0x05, 0xa2, 0x03, 0x01, 0x01, 0xff], der);
        assert_eq!(value, f.schema.decode(f.implicit_seq, &der).unwrap());
    }

    #[rstest(value, expected,
        case(
            Value::sequence([("version", Value::symbol("v1")), ("serial", Value::integer(1))]),
            vec![0x30, 0x03, 0x02, 0x01, 0x01],
        ),
        case(
            Value::sequence([("version", Value::symbol("v3")), ("serial", Value::integer(1))]),
            vec![0x30, 0x08, 0xa0, 0x03, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01],
        ),
    )]
    fn test_default_omission(value: Value, expected: Vec<u8>) {
        let f = fixture();
        let der = f.schema.encode(f.version, &value).unwrap();
        assert_eq!(expected, der);
        assert_eq!(value, f.schema.decode(f.version, &der).unwrap());
    }

    #[rstest(version, expected,
        case(Value::integer(0), vec![0x30, 0x03, 0x02, 0x01, 0x01]),
        case(Value::integer(2), vec![0x30, 0x08, 0xa0, 0x03, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01]),
    )]
    fn test_default_omission_numeric_form(version: Value, expected: Vec<u8>) {
        let f = fixture();
        let value = Value::sequence([("version", version), ("serial", Value::integer(1))]);
        let der = f.schema.encode(f.version, &value).unwrap();
        assert_eq!(expected, der);
        assert_eq!(der, f.schema.encode(f.version, &f.schema.decode(f.version, &der).unwrap()).unwrap());
    }

    #[test]
    fn test_default_filled_when_field_missing() {
        let f = fixture();
        let value = Value::sequence([("serial", Value::integer(7))]);
        let der = f.schema.encode(f.version, &value).unwrap();
        assert_eq!(
            Value::sequence([("version", Value::symbol("v1")), ("serial", Value::integer(7))]),
            f.schema.decode(f.version, &der).unwrap()
        );
    }

    #[test]
    fn test_named_integer_outside_names_stays_numeric() {
        let f = fixture();
        let der = [0x30, 0x08, 0xa0, 0x03, 0x02, 0x01, 0x09, 0x02, 0x01, 0x01];
        let value = f.schema.decode(f.version, &der).unwrap();
        assert_eq!(Some(&Value::integer(9)), value.get("version"));
    }

    #[test]
    fn test_dispatch_known_extension() {
        let f = fixture();
        let value = Value::sequence([
            ("extnID", Value::named_oid("basicConstraints")),
            ("critical", Value::Boolean(true)),
            (
                "extnValue",
                Value::sequence([("cA", Value::Boolean(true)), ("pathLenConstraint", Value::integer(0))]),
            ),
        ]);
        let der = f.schema.encode(f.extension, &value).unwrap();
        assert_eq!(
            vec![
                0x30, 0x12, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff, 0x04, 0x08, 0x30,
                0x06, 0x01, 0x01, 0xff, 0x02, 0x01, 0x00,
            ],
            der
        );
        assert_eq!(value, f.schema.decode(f.extension, &der).unwrap());
    }

    #[test]
    fn test_dispatch_unknown_extension_stays_opaque() {
        let f = fixture();
        let value = Value::sequence([
            ("extnID", Value::oid("2 5 29 99").unwrap()),
            ("critical", Value::Boolean(false)),
            ("extnValue", Value::octet_string(vec![0x05, 0x00])),
        ]);
        let der = f.schema.encode(f.extension, &value).unwrap();
        assert_eq!(
            vec![0x30, 0x09, 0x06, 0x03, 0x55, 0x1d, 0x63, 0x04, 0x02, 0x05, 0x00],
            der
        );
        assert_eq!(value, f.schema.decode(f.extension, &der).unwrap());
    }

    #[test]
    fn test_dispatch_unresolved_structured_value() {
        let f = fixture();
        let value = Value::sequence([
            ("extnID", Value::oid("2.5.29.99").unwrap()),
            ("extnValue", Value::sequence([("cA", Value::Boolean(true))])),
        ]);
        let err = f.schema.encode(f.extension, &value).unwrap_err();
        assert_eq!(
            &EncodeErrorKind::UnresolvedContainsType {
                discriminant: Some("2.5.29.99".to_string())
            },
            err.kind()
        );
        assert_eq!("extnValue", err.path().to_string());
    }

    #[test]
    fn test_dispatch_malformed_known_extension() {
        let f = fixture();
        let der = [
            0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x04, 0x03, 0x02, 0x01, 0x00,
        ];
        let err = f.schema.decode(f.extension, &der).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::UnexpectedTag { .. }));
        assert_eq!("extnValue", err.path().to_string());
    }

    #[rstest(der, expected,
        case(vec![0x30, 0x03, 0x0a, 0x01, 0x00], Value::sequence([("responseStatus", Value::symbol("successful"))])),
        case(vec![0x30, 0x09, 0x0a, 0x01, 0x01, 0xa0, 0x04, 0x04, 0x02, 0xca, 0xfe], Value::sequence([
            ("responseStatus", Value::symbol("malformedRequest")),
            ("responseBytes", Value::octet_string(vec![0xca, 0xfe])),
        ])),
    )]
    fn test_optional_absent(der: Vec<u8>, expected: Value) {
        let f = fixture();
        let value = f.schema.decode(f.status, &der).unwrap();
        assert_eq!(expected, value);
        assert_eq!(der, f.schema.encode(f.status, &value).unwrap());
    }

    #[test]
    fn test_enumerated_unknown_value() {
        let f = fixture();
        let err = f.schema.decode(f.status, &[0x30, 0x03, 0x0a, 0x01, 0x04]).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::MissingRequiredField(_)));
        assert_eq!("responseStatus", err.path().to_string());
    }

    #[rstest(der, expected,
        case(b"\x17\x0d250101000000Z".to_vec(), "utcTime"),
        case(b"\x18\x0f20500101000000Z".to_vec(), "generalTime"),
    )]
    fn test_choice_selects_by_tag(der: Vec<u8>, expected: &str) {
        let f = fixture();
        let value = f.schema.decode(f.time, &der).unwrap();
        let (name, inner) = value.as_choice().unwrap();
        assert_eq!(expected, name);
        assert!(inner.as_time().is_some());
        assert_eq!(der, f.schema.encode(f.time, &value).unwrap());
    }

    #[test]
    fn test_choice_unmatched() {
        let f = fixture();
        let err = f.schema.decode(f.time, &[0x05, 0x00]).unwrap_err();
        assert_eq!(&DecodeErrorKind::UnmatchedChoice { found: Tag::NULL }, err.kind());
    }

    #[test]
    fn test_choice_unknown_alternative() {
        let f = fixture();
        let time = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let err = f
            .schema
            .encode(f.time, &Value::choice("localTime", Value::Time(time)))
            .unwrap_err();
        assert!(matches!(err.kind(), EncodeErrorKind::ValueSchemaMismatch { .. }));
    }

    #[test]
    fn test_set_accepts_any_order() {
        let f = fixture();
        let der = [0x31, 0x07, 0x80, 0x01, 0x2a, 0x81, 0x02, 0x68, 0x69];
        let value = f.schema.decode(f.set, &der).unwrap();
        assert_eq!(
            Value::sequence([("name", Value::string("hi")), ("age", Value::integer(42))]),
            value
        );
        assert_eq!(
            vec![0x31, 0x07, 0x81, 0x02, 0x68, 0x69, 0x80, 0x01, 0x2a],
            f.schema.encode(f.set, &value).unwrap()
        );
        let canonical = EncodeOptions {
            set_of_order: SetOfOrder::Canonical,
        };
        assert_eq!(der.to_vec(), f.schema.encode_with(f.set, &value, &canonical).unwrap());
    }

    #[test]
    fn test_set_of_order() {
        let f = fixture();
        let value = Value::list([
            Value::octet_string(vec![0x02]),
            Value::octet_string(vec![0x01, 0x00]),
            Value::octet_string(vec![0x01]),
        ]);
        assert_eq!(
            vec![0x31, 0x0a, 0x04, 0x01, 0x02, 0x04, 0x02, 0x01, 0x00, 0x04, 0x01, 0x01],
            f.schema.encode(f.set_of, &value).unwrap()
        );
        let canonical = EncodeOptions {
            set_of_order: SetOfOrder::Canonical,
        };
        assert_eq!(
            vec![0x31, 0x0a, 0x04, 0x01, 0x01, 0x04, 0x01, 0x02, 0x04, 0x02, 0x01, 0x00],
            f.schema.encode_with(f.set_of, &value, &canonical).unwrap()
        );
    }

    #[test]
    fn test_nesting_too_deep() {
        let f = fixture();
        // an explicit tag must hold exactly one element
        let der = [0x30, 0x06, 0xa0, 0x04, 0x30, 0x02, 0xa0, 0x00];
        assert_eq!(
            &DecodeErrorKind::TruncatedInput,
            f.schema.decode(f.nested, &der).unwrap_err().kind()
        );

        // List { next [0] List { next [0] List {} } }
        let der = [0x30, 0x08, 0xa0, 0x06, 0x30, 0x04, 0xa0, 0x02, 0x30, 0x00];
        let value = f.schema.decode(f.nested, &der).unwrap();
        assert_eq!(Some(&Value::sequence(Vec::<(String, Value)>::new())), value.pointer("next.next"));

        let shallow = DecodeOptions { max_depth: 3 };
        let err = f.schema.decode_with(f.nested, &der, &shallow).unwrap_err();
        assert_eq!(&DecodeErrorKind::NestingTooDeep(3), err.kind());
    }

    #[rstest(der, expected, path,
        case(vec![0x30, 0x03, 0x02, 0x01, 0x01], DecodeErrorKind::MissingRequiredField("field 'b'".to_string()), "b"),
        case(vec![0x30, 0x03, 0x02, 0x01, 0x01, 0x00], DecodeErrorKind::TrailingData(1), "<root>"),
        case(vec![0x30, 0x04, 0x02, 0x00, 0x0c, 0x00], DecodeErrorKind::InvalidPrimitiveValue {
            what: "INTEGER",
            reason: "no content".to_string(),
        }, "a"),
        case(vec![0x30, 0x06, 0x02, 0x02, 0x00, 0x01, 0x0c, 0x00], DecodeErrorKind::InvalidPrimitiveValue {
            what: "INTEGER",
            reason: "not minimally encoded".to_string(),
        }, "a"),
        case(vec![0x30, 0x05, 0x02, 0x01, 0x01, 0x0c, 0x05], DecodeErrorKind::TruncatedInput, "b"),
        case(vec![0x30, 0x81, 0x05, 0x02, 0x01, 0x01, 0x0c, 0x00], DecodeErrorKind::InvalidLength(der::Error::NonMinimalLength), "<root>"),
        case(vec![0x30, 0x80, 0x02, 0x01, 0x01, 0x0c, 0x00, 0x00, 0x00], DecodeErrorKind::InvalidLength(der::Error::IndefiniteLength), "<root>"),
        case(vec![0x30, 0x07, 0x02, 0x01, 0x01, 0x0c, 0x00, 0x05, 0x00], DecodeErrorKind::UnexpectedTag {
            expected: "end of SEQUENCE".to_string(),
            found: Tag::NULL,
        }, "<root>"),
    )]
    fn test_decode_error(der: Vec<u8>, expected: DecodeErrorKind, path: &str) {
        let f = fixture();
        let err = f.schema.decode(f.strict, &der).unwrap_err();
        assert_eq!(&expected, err.kind());
        assert_eq!(path, err.path().to_string());
    }

    #[test]
    fn test_framing_error_in_nested_field() {
        let f = fixture();
        // inner [2] { flag BOOLEAN } with the BOOLEAN length running past the end
        let err = f
            .schema
            .decode(f.implicit_seq, &[0x30, 0x04, 0xa2, 0x02, 0x01, 0x05])
            .unwrap_err();
        assert_eq!(&DecodeErrorKind::TruncatedInput, err.kind());
        assert_eq!("inner.flag", err.path().to_string());
    }

    #[rstest(value, expected,
        case(
            Value::sequence([("a", Value::integer(1))]),
            EncodeErrorKind::InvalidOptionalState("b".to_string()),
        ),
        case(
            Value::sequence([("a", Value::integer(1)), ("b", Value::string("x")), ("c", Value::Null)]),
            EncodeErrorKind::UnknownField("c".to_string()),
        ),
        case(
            Value::sequence([("a", Value::Boolean(true)), ("b", Value::string("x"))]),
            EncodeErrorKind::ValueSchemaMismatch {
                expected: "INTEGER".to_string(),
                found: "Boolean".to_string(),
            },
        ),
        case(
            Value::list([Value::integer(1)]),
            EncodeErrorKind::ValueSchemaMismatch {
                expected: "SEQUENCE".to_string(),
                found: "List".to_string(),
            },
        ),
    )]
    fn test_encode_error(value: Value, expected: EncodeErrorKind) {
        let f = fixture();
        let err = f.schema.encode(f.strict, &value).unwrap_err();
        assert_eq!(&expected, err.kind());
    }

    #[rstest(n, expected,
        case(0, vec![0x02, 0x01, 0x00]),
        case(127, vec![0x02, 0x01, 0x7f]),
        case(128, vec![0x02, 0x02, 0x00, 0x80]),
        case(-128, vec![0x02, 0x01, 0x80]),
        case(-129, vec![0x02, 0x02, 0xff, 0x7f]),
        case(256, vec![0x02, 0x02, 0x01, 0x00]),
    )]
    fn test_integer_minimal(n: i64, expected: Vec<u8>) {
        let mut b = SchemaBuilder::new();
        let int = b.add(Type::integer()).unwrap();
        let schema = b.build().unwrap();
        let der = schema.encode(int, &Value::integer(n)).unwrap();
        assert_eq!(expected, der);
        assert_eq!(Value::integer(n), schema.decode(int, &der).unwrap());
    }

    #[test]
    fn test_long_content_uses_minimal_length() {
        let mut b = SchemaBuilder::new();
        let octets = b.add(Type::octet_string()).unwrap();
        let schema = b.build().unwrap();
        for (len, header) in [(127usize, vec![0x04, 0x7f]), (128, vec![0x04, 0x81, 0x80]), (256, vec![0x04, 0x82, 0x01, 0x00])] {
            let der = schema.encode(octets, &Value::octet_string(vec![0u8; len])).unwrap();
            assert_eq!(header.as_slice(), &der[..header.len()]);
            assert_eq!(header.len() + len, der.len());
        }
    }

    #[test]
    fn test_private_and_long_form_tags() {
        let mut b = SchemaBuilder::new();
        let id = b
            .add(Type::boolean().tagged(Tagging::Implicit(TagClass::Private, 200)))
            .unwrap();
        let schema = b.build().unwrap();
        let der = schema.encode(id, &Value::Boolean(false)).unwrap();
        assert_eq!(vec![0xdf, 0x81, 0x48, 0x01, 0x00], der);
        assert_eq!(Value::Boolean(false), schema.decode(id, &der).unwrap());
    }

    #[test]
    fn test_any_captures_whole_tlv() {
        let mut b = SchemaBuilder::new();
        let id = b
            .add(Type::sequence([field("algorithm", Type::object_identifier()), field("parameters", Type::any()).optional()]))
            .unwrap();
        let schema = b.build().unwrap();
        let der = [
            0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b, 0x05,
            0x00,
        ];
        let value = schema.decode(id, &der).unwrap();
        assert_eq!(Some(&Value::any(vec![0x05, 0x00])), value.get("parameters"));
        assert_eq!(der.to_vec(), schema.encode(id, &value).unwrap());
    }
}
