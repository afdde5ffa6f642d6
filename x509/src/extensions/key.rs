use asn1::{SchemaBuilder, SchemaError, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.1

AuthorityKeyIdentifier ::= SEQUENCE {
    keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }

KeyIdentifier ::= OCTET STRING

SubjectKeyIdentifier ::= KeyIdentifier
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let key_identifier = b.declare("KeyIdentifier");
    let general_names = b.declare("GeneralNames");
    let serial = b.declare("CertificateSerialNumber");
    let key_purpose_id = b.declare("KeyPurposeId");

    b.define(
        "AuthorityKeyIdentifier",
        Type::sequence([
            field("keyIdentifier", Type::reference(key_identifier).implicit(0)).optional(),
            field("authorityCertIssuer", Type::reference(general_names).implicit(1)).optional(),
            field("authorityCertSerialNumber", Type::reference(serial).implicit(2)).optional(),
        ]),
    )?;
    b.define("KeyIdentifier", Type::octet_string())?;
    b.define("SubjectKeyIdentifier", Type::reference(key_identifier))?;

    /*
    KeyUsage ::= BIT STRING {
         digitalSignature        (0),
         nonRepudiation          (1),
         keyEncipherment         (2),
         dataEncipherment        (3),
         keyAgreement            (4),
         keyCertSign             (5),
         cRLSign                 (6),
         encipherOnly            (7),
         decipherOnly            (8) }
     */
    b.define("KeyUsage", Type::bit_string())?;

    // ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
    b.define("ExtKeyUsageSyntax", Type::sequence_of(Type::reference(key_purpose_id)))?;
    b.define("KeyPurposeId", Type::object_identifier())?;
    Ok(())
}
