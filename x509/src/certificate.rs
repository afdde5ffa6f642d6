use asn1::{NamedValues, SchemaBuilder, SchemaError, Type, Value, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

Certificate  ::=  SEQUENCE  {
    tbsCertificate       TBSCertificate,
    signatureAlgorithm   AlgorithmIdentifier,
    signatureValue       BIT STRING
}

TBSCertificate  ::=  SEQUENCE  {
     version         [0]  EXPLICIT Version DEFAULT v1,
     serialNumber         CertificateSerialNumber,
     signature            AlgorithmIdentifier,
     issuer               Name,
     validity             Validity,
     subject              Name,
     subjectPublicKeyInfo SubjectPublicKeyInfo,
     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
     extensions      [3]  EXPLICIT Extensions OPTIONAL
}
 */

pub(crate) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let tbs = b.declare("TBSCertificate");
    let algorithm = b.declare("AlgorithmIdentifier");
    let version = b.declare("Version");
    let serial = b.declare("CertificateSerialNumber");
    let name = b.declare("Name");
    let validity = b.declare("Validity");
    let time = b.declare("Time");
    let spki = b.declare("SubjectPublicKeyInfo");
    let unique_id = b.declare("UniqueIdentifier");
    let extensions = b.declare("Extensions");

    b.define(
        "Certificate",
        Type::sequence([
            field("tbsCertificate", Type::reference(tbs)),
            field("signatureAlgorithm", Type::reference(algorithm)),
            field("signature", Type::bit_string()),
        ]),
    )?;
    b.define(
        "TBSCertificate",
        Type::sequence([
            field("version", Type::reference(version).explicit(0)).default(Value::symbol("v1")),
            field("serialNumber", Type::reference(serial)),
            field("signature", Type::reference(algorithm)),
            field("issuer", Type::reference(name)),
            field("validity", Type::reference(validity)),
            field("subject", Type::reference(name)),
            field("subjectPublicKeyInfo", Type::reference(spki)),
            field("issuerUniqueID", Type::reference(unique_id).implicit(1)).optional(),
            field("subjectUniqueID", Type::reference(unique_id).implicit(2)).optional(),
            field("extensions", Type::reference(extensions).explicit(3)).optional(),
        ]),
    )?;

    // Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
    b.define(
        "Version",
        Type::integer_named(NamedValues::new([(0, "v1"), (1, "v2"), (2, "v3")])),
    )?;
    b.define("CertificateSerialNumber", Type::integer())?;
    b.define("UniqueIdentifier", Type::bit_string())?;

    b.define(
        "Validity",
        Type::sequence([
            field("notBefore", Type::reference(time)),
            field("notAfter", Type::reference(time)),
        ]),
    )?;
    b.define(
        "Time",
        Type::choice([
            ("utcTime", Type::utc_time()),
            ("generalTime", Type::generalized_time()),
        ]),
    )?;

    /*
    AlgorithmIdentifier  ::=  SEQUENCE  {
         algorithm               OBJECT IDENTIFIER,
         parameters              ANY DEFINED BY algorithm OPTIONAL  }
     */
    b.define(
        "AlgorithmIdentifier",
        Type::sequence([
            field("algorithm", Type::object_identifier()),
            field("parameters", Type::any()).optional(),
        ]),
    )?;
    b.define(
        "SubjectPublicKeyInfo",
        Type::sequence([
            field("algorithm", Type::reference(algorithm)),
            field("subjectPublicKey", Type::bit_string()),
        ]),
    )?;
    Ok(())
}
