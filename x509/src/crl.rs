use asn1::{SchemaBuilder, SchemaError, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-5.1

CertificateList  ::=  SEQUENCE  {
     tbsCertList          TBSCertList,
     signatureAlgorithm   AlgorithmIdentifier,
     signatureValue       BIT STRING  }

TBSCertList  ::=  SEQUENCE  {
     version                 Version OPTIONAL,
                                  -- if present, MUST be v2
     signature               AlgorithmIdentifier,
     issuer                  Name,
     thisUpdate              Time,
     nextUpdate              Time OPTIONAL,
     revokedCertificates     SEQUENCE OF SEQUENCE  {
          userCertificate         CertificateSerialNumber,
          revocationDate          Time,
          crlEntryExtensions      Extensions OPTIONAL
                                   -- if present, version MUST be v2
                               }  OPTIONAL,
     crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
                                   -- if present, version MUST be v2
                               }
 */

pub(crate) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let tbs = b.declare("TBSCertList");
    let algorithm = b.declare("AlgorithmIdentifier");
    let version = b.declare("Version");
    let serial = b.declare("CertificateSerialNumber");
    let name = b.declare("Name");
    let time = b.declare("Time");
    let revoked = b.declare("RevokedCertificate");
    let extensions = b.declare("Extensions");

    b.define(
        "CertificateList",
        Type::sequence([
            field("tbsCertList", Type::reference(tbs)),
            field("signatureAlgorithm", Type::reference(algorithm)),
            field("signature", Type::bit_string()),
        ]),
    )?;
    b.define(
        "TBSCertList",
        Type::sequence([
            field("version", Type::reference(version)).optional(),
            field("signature", Type::reference(algorithm)),
            field("issuer", Type::reference(name)),
            field("thisUpdate", Type::reference(time)),
            field("nextUpdate", Type::reference(time)).optional(),
            field("revokedCertificates", Type::sequence_of(Type::reference(revoked))).optional(),
            field("crlExtensions", Type::reference(extensions).explicit(0)).optional(),
        ]),
    )?;
    b.define(
        "RevokedCertificate",
        Type::sequence([
            field("userCertificate", Type::reference(serial)),
            field("revocationDate", Type::reference(time)),
            field("crlEntryExtensions", Type::reference(extensions)).optional(),
        ]),
    )?;
    Ok(())
}
