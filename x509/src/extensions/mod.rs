use std::sync::Arc;

use asn1::{Dispatch, OidError, OidRegistry, SchemaBuilder, SchemaError, Type, Value, field};

mod access;
mod constraints;
mod crl;
mod distribution_point;
mod key;
mod policy;

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.9

Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension

Extension  ::=  SEQUENCE  {
    extnID      OBJECT IDENTIFIER,
    critical    BOOLEAN DEFAULT FALSE,
    extnValue   OCTET STRING
                -- contains the DER encoding of an ASN.1 value
                -- corresponding to the extension type identified
                -- by extnID
}
*/

/// Certificate and CRL extensions understood by [`Extension`]: identifier,
/// registered name and the type its `extnValue` holds.
///
/// [`Extension`]: crate::Rfc5280::extension
pub const EXTENSIONS: &[(&str, &str, &str)] = &[
    ("2.5.29.9", "subjectDirectoryAttributes", "SubjectDirectoryAttributes"),
    ("2.5.29.14", "subjectKeyIdentifier", "SubjectKeyIdentifier"),
    ("2.5.29.15", "keyUsage", "KeyUsage"),
    ("2.5.29.17", "subjectAlternativeName", "SubjectAltName"),
    ("2.5.29.18", "issuerAlternativeName", "IssuerAltName"),
    ("2.5.29.19", "basicConstraints", "BasicConstraints"),
    ("2.5.29.20", "cRLNumber", "CRLNumber"),
    ("2.5.29.21", "reasonCode", "CRLReason"),
    ("2.5.29.24", "invalidityDate", "InvalidityDate"),
    ("2.5.29.27", "deltaCRLIndicator", "BaseCRLNumber"),
    ("2.5.29.28", "issuingDistributionPoint", "IssuingDistributionPoint"),
    ("2.5.29.29", "certificateIssuer", "CertificateIssuer"),
    ("2.5.29.30", "nameConstraints", "NameConstraints"),
    ("2.5.29.31", "cRLDistributionPoints", "CRLDistributionPoints"),
    ("2.5.29.32", "certificatePolicies", "CertificatePolicies"),
    ("2.5.29.33", "policyMappings", "PolicyMappings"),
    ("2.5.29.35", "authorityKeyIdentifier", "AuthorityKeyIdentifier"),
    ("2.5.29.36", "policyConstraints", "PolicyConstraints"),
    ("2.5.29.37", "extendedKeyUsage", "ExtKeyUsageSyntax"),
    ("2.5.29.46", "freshestCRL", "FreshestCRL"),
    ("2.5.29.54", "inhibitAnyPolicy", "InhibitAnyPolicy"),
    ("1.3.6.1.5.5.7.1.1", "authorityInformationAccess", "AuthorityInfoAccessSyntax"),
    ("1.3.6.1.5.5.7.1.11", "subjectInformationAccess", "SubjectInfoAccessSyntax"),
];

/// The extension identifier registry.
pub fn registry() -> Result<OidRegistry, OidError> {
    let entries: Vec<(&str, &str)> = EXTENSIONS.iter().map(|(oid, name, _)| (*oid, *name)).collect();
    OidRegistry::from_entries(&entries)
}

pub(crate) fn define(b: &mut SchemaBuilder, registry: Arc<OidRegistry>) -> Result<(), SchemaError> {
    let mut dispatch = Dispatch::on("extnID").with_registry(registry.clone());
    for (_, name, body) in EXTENSIONS {
        dispatch = dispatch.route(*name, b.declare(body));
    }
    let extension = b.declare("Extension");

    b.define(
        "Extension",
        Type::sequence([
            field("extnID", Type::object_identifier_in(registry)),
            field("critical", Type::boolean()).default(Value::Boolean(false)),
            field("extnValue", Type::octet_string_containing(dispatch)),
        ]),
    )?;
    b.define("Extensions", Type::sequence_of(Type::reference(extension)))?;

    // SubjectDirectoryAttributes ::= SEQUENCE SIZE (1..MAX) OF Attribute
    let attribute = b.declare("Attribute");
    b.define("SubjectDirectoryAttributes", Type::sequence_of(Type::reference(attribute)))?;

    // SubjectAltName ::= GeneralNames
    // IssuerAltName ::= GeneralNames
    let general_names = b.declare("GeneralNames");
    b.define("SubjectAltName", Type::reference(general_names))?;
    b.define("IssuerAltName", Type::reference(general_names))?;

    key::define(b)?;
    policy::define(b)?;
    constraints::define(b)?;
    distribution_point::define(b)?;
    access::define(b)?;
    crl::define(b)?;
    Ok(())
}
