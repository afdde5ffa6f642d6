//! RFC 5280 certificate and CRL schemas.
//!
//! [`Rfc5280::define`] adds every type of the profile to a
//! [`SchemaBuilder`]: certificates, CRLs, names, the X.400 address form and
//! the bodies of all standard extensions. `Extension.extnValue` is decoded
//! as the body registered for `extnID`; unregistered extensions stay opaque.
//!
//! ```
//! use asn1::{SchemaBuilder, Value};
//! use x509::Rfc5280;
//!
//! let mut b = SchemaBuilder::new();
//! let rfc5280 = Rfc5280::define(&mut b).unwrap();
//! let schema = b.build().unwrap();
//!
//! let der = [0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x15, 0x04, 0x03, 0x0a, 0x01, 0x01];
//! let extension = schema.decode(rfc5280.extension, &der).unwrap();
//! assert_eq!(
//!     Some(&Value::symbol("keyCompromise")),
//!     extension.get("extnValue")
//! );
//! ```

#![forbid(unsafe_code)]

use std::sync::Arc;

use asn1::{NodeId, OidRegistry, SchemaBuilder, SchemaError};

mod certificate;
mod crl;
pub mod extensions;
mod name;
mod or_address;

pub use extensions::EXTENSIONS;

/// Handles to the RFC 5280 types other catalogs and callers start from.
///
/// Every other type is reachable by name through `Schema::lookup`.
#[derive(Debug, Clone)]
pub struct Rfc5280 {
    pub certificate: NodeId,
    pub tbs_certificate: NodeId,
    pub certificate_list: NodeId,
    pub tbs_cert_list: NodeId,
    pub version: NodeId,
    pub certificate_serial_number: NodeId,
    pub algorithm_identifier: NodeId,
    pub time: NodeId,
    pub name: NodeId,
    pub general_name: NodeId,
    pub general_names: NodeId,
    pub extension: NodeId,
    pub extensions: NodeId,
    pub crl_reason: NodeId,
    /// Names of the extension identifiers in [`EXTENSIONS`].
    pub registry: Arc<OidRegistry>,
}

impl Rfc5280 {
    pub fn define(b: &mut SchemaBuilder) -> Result<Rfc5280, SchemaError> {
        let registry = Arc::new(extensions::registry()?);
        certificate::define(b)?;
        crl::define(b)?;
        name::define(b)?;
        or_address::define(b)?;
        extensions::define(b, registry.clone())?;

        Ok(Rfc5280 {
            certificate: b.declare("Certificate"),
            tbs_certificate: b.declare("TBSCertificate"),
            certificate_list: b.declare("CertificateList"),
            tbs_cert_list: b.declare("TBSCertList"),
            version: b.declare("Version"),
            certificate_serial_number: b.declare("CertificateSerialNumber"),
            algorithm_identifier: b.declare("AlgorithmIdentifier"),
            time: b.declare("Time"),
            name: b.declare("Name"),
            general_name: b.declare("GeneralName"),
            general_names: b.declare("GeneralNames"),
            extension: b.declare("Extension"),
            extensions: b.declare("Extensions"),
            crl_reason: b.declare("CRLReason"),
            registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use asn1::{DecodeErrorKind, Schema, SchemaBuilder, Value};
    use chrono::{NaiveDate, NaiveDateTime};
    use rstest::rstest;

    use super::{EXTENSIONS, Rfc5280};

    fn catalog() -> (Schema, Rfc5280) {
        let mut b = SchemaBuilder::new();
        let rfc5280 = Rfc5280::define(&mut b).unwrap();
        (b.build().unwrap(), rfc5280)
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn extension(id: Value, critical: bool, body: Value) -> Value {
        Value::sequence([
            ("extnID", id),
            ("critical", Value::Boolean(critical)),
            ("extnValue", body),
        ])
    }

    #[test]
    fn test_every_extension_body_is_defined() {
        let (schema, rfc5280) = catalog();
        assert_eq!(EXTENSIONS.len(), rfc5280.registry.len());
        for (oid, name, body) in EXTENSIONS {
            assert!(schema.lookup(body).is_some(), "{} has no body", name);
            let registered = rfc5280.registry.oid(name).map(|oid| oid.to_string());
            assert_eq!(Some(oid.to_string()), registered);
        }
    }

    #[rstest(der, expected,
        case(
            vec![0x30, 0x0f, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff, 0x04, 0x05, 0x30, 0x03, 0x01, 0x01, 0xff],
            extension(
                Value::named_oid("basicConstraints"),
                true,
                Value::sequence([("cA", Value::Boolean(true))]),
            )
        ),
        case(
            vec![0x30, 0x0e, 0x06, 0x03, 0x55, 0x1d, 0x0f, 0x01, 0x01, 0xff, 0x04, 0x04, 0x03, 0x02, 0x05, 0xa0],
            extension(Value::named_oid("keyUsage"), true, Value::bit_string(5, vec![0xa0]))
        ),
        case(
            vec![
                0x30, 0x14, 0x06, 0x03, 0x55, 0x1d, 0x11, 0x04, 0x0d, 0x30, 0x0b, 0x82, 0x09,
                0x61, 0x2e, 0x65, 0x78, 0x61, 0x6d, 0x70, 0x6c, 0x65,
            ],
            extension(
                Value::named_oid("subjectAlternativeName"),
                false,
                Value::list([Value::choice("dNSName", Value::string("a.example"))]),
            )
        ),
        case(
            vec![0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x15, 0x04, 0x03, 0x0a, 0x01, 0x01],
            extension(Value::named_oid("reasonCode"), false, Value::symbol("keyCompromise"))
        ),
        case(
            vec![0x30, 0x0c, 0x06, 0x03, 0x55, 0x1d, 0x23, 0x04, 0x05, 0x30, 0x03, 0x80, 0x01, 0x2a],
            extension(
                Value::named_oid("authorityKeyIdentifier"),
                false,
                Value::sequence([("keyIdentifier", Value::octet_string(vec![0x2a]))]),
            )
        ),
        case(
            vec![0x30, 0x09, 0x06, 0x03, 0x55, 0x1d, 0x63, 0x04, 0x02, 0x05, 0x00],
            extension(Value::oid("2.5.29.99").unwrap(), false, Value::octet_string(vec![0x05, 0x00]))
        ),
    )]
    fn test_extension(der: Vec<u8>, expected: Value) {
        let (schema, rfc5280) = catalog();
        let value = schema.decode(rfc5280.extension, &der).unwrap();
        assert_eq!(expected, value);
        assert_eq!(der, schema.encode(rfc5280.extension, &value).unwrap());
    }

    #[test]
    fn test_extension_with_malformed_body() {
        let (schema, rfc5280) = catalog();
        // basicConstraints holding a bare BOOLEAN
        let der = [0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x04, 0x03, 0x01, 0x01, 0xff];
        let err = schema.decode(rfc5280.extension, &der).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::UnexpectedTag { .. }));
        assert_eq!("extnValue", err.path().to_string());
    }

    #[rstest(der, expected,
        case(
            vec![0x30, 0x09, 0x82, 0x01, 0x61, 0x80, 0x01, 0x01, 0x81, 0x01, 0x05],
            Value::sequence([
                ("base", Value::choice("dNSName", Value::string("a"))),
                ("minimum", Value::integer(1)),
                ("maximum", Value::integer(5)),
            ])
        ),
        case(
            vec![0x30, 0x03, 0x82, 0x01, 0x61],
            Value::sequence([
                ("base", Value::choice("dNSName", Value::string("a"))),
                ("minimum", Value::integer(0)),
            ])
        ),
    )]
    fn test_general_subtree(der: Vec<u8>, expected: Value) {
        let (schema, _) = catalog();
        let Some(subtree) = schema.lookup("GeneralSubtree") else {
            panic!("GeneralSubtree is not defined");
        };
        let value = schema.decode(subtree, &der).unwrap();
        assert_eq!(expected, value);
        assert_eq!(der, schema.encode(subtree, &value).unwrap());
    }

    #[rstest(der, expected,
        case(
            vec![0xa5, 0x07, 0xa1, 0x05, 0x0c, 0x03, 0x41, 0x43, 0x4d],
            Value::choice(
                "ediPartyName",
                Value::sequence([("partyName", Value::choice("utf8String", Value::string("ACM")))]),
            )
        ),
        case(
            vec![0x87, 0x04, 0x0a, 0x00, 0x00, 0x01],
            Value::choice("iPAddress", Value::octet_string(vec![0x0a, 0x00, 0x00, 0x01]))
        ),
        case(
            vec![0x88, 0x03, 0x2a, 0x03, 0x04],
            Value::choice("registeredID", Value::oid("1.2.3.4").unwrap())
        ),
        case(
            vec![0xa4, 0x04, 0x30, 0x02, 0x31, 0x00],
            Value::choice("directoryName", Value::choice("rdnSequence", Value::list([Value::List(vec![])])))
        ),
        case(
            vec![0xa3, 0x0a, 0x30, 0x08, 0x61, 0x06, 0x12, 0x04, 0x30, 0x30, 0x31, 0x32],
            Value::choice(
                "x400Address",
                Value::sequence([(
                    "builtInStandardAttributes",
                    Value::sequence([("countryName", Value::choice("x121DccCode", Value::string("0012")))]),
                )]),
            )
        ),
    )]
    fn test_general_name(der: Vec<u8>, expected: Value) {
        let (schema, rfc5280) = catalog();
        let value = schema.decode(rfc5280.general_name, &der).unwrap();
        assert_eq!(expected, value);
        assert_eq!(der, schema.encode(rfc5280.general_name, &value).unwrap());
    }

    #[test]
    fn test_name() {
        let (schema, rfc5280) = catalog();
        // CN=a
        let der = [
            0x30, 0x0c, 0x31, 0x0a, 0x30, 0x08, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0c, 0x01, 0x61,
        ];
        let value = schema.decode(rfc5280.name, &der).unwrap();
        let expected = Value::choice(
            "rdnSequence",
            Value::list([Value::list([Value::sequence([
                ("type", Value::oid("2.5.4.3").unwrap()),
                ("value", Value::any(vec![0x0c, 0x01, 0x61])),
            ])])]),
        );
        assert_eq!(expected, value);
        assert_eq!(der.to_vec(), schema.encode(rfc5280.name, &value).unwrap());
    }

    #[test]
    fn test_validity_time_forms() {
        let (schema, _) = catalog();
        let Some(validity) = schema.lookup("Validity") else {
            panic!("Validity is not defined");
        };
        let mut der = vec![0x30, 0x20, 0x17, 0x0d];
        der.extend_from_slice(b"250101000000Z");
        der.extend_from_slice(&[0x18, 0x0f]);
        der.extend_from_slice(b"20500101000000Z");

        let value = schema.decode(validity, &der).unwrap();
        let expected = Value::sequence([
            ("notBefore", Value::choice("utcTime", Value::Time(at(2025, 1, 1)))),
            ("notAfter", Value::choice("generalTime", Value::Time(at(2050, 1, 1)))),
        ]);
        assert_eq!(expected, value);
        assert_eq!(der, schema.encode(validity, &value).unwrap());
    }

    #[test]
    fn test_personal_name_optional_components() {
        let (schema, _) = catalog();
        let Some(personal_name) = schema.lookup("PersonalName") else {
            panic!("PersonalName is not defined");
        };
        // SET { surname [0] "Doe" }
        let der = [0x31, 0x05, 0x80, 0x03, 0x44, 0x6f, 0x65];
        let value = schema.decode(personal_name, &der).unwrap();
        assert_eq!(Value::sequence([("surname", Value::string("Doe"))]), value);
    }
}
