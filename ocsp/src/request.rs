use asn1::{SchemaBuilder, SchemaError, Type, Value, field};
use x509::Rfc5280;

/*
https://datatracker.ietf.org/doc/html/rfc2560#section-4.1.1

OCSPRequest     ::=     SEQUENCE {
    tbsRequest                  TBSRequest,
    optionalSignature   [0]     EXPLICIT Signature OPTIONAL }

TBSRequest      ::=     SEQUENCE {
    version             [0]     EXPLICIT Version DEFAULT v1,
    requestorName       [1]     EXPLICIT GeneralName OPTIONAL,
    requestList                 SEQUENCE OF Request,
    requestExtensions   [2]     EXPLICIT Extensions OPTIONAL }

Signature       ::=     SEQUENCE {
    signatureAlgorithm      AlgorithmIdentifier,
    signature               BIT STRING,
    certs               [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL}

Request         ::=     SEQUENCE {
    reqCert                     CertID,
    singleRequestExtensions     [0] EXPLICIT Extensions OPTIONAL }

CertID          ::=     SEQUENCE {
    hashAlgorithm       AlgorithmIdentifier,
    issuerNameHash      OCTET STRING, -- Hash of Issuer's DN
    issuerKeyHash       OCTET STRING, -- Hash of Issuers public key
    serialNumber        CertificateSerialNumber }
 */

pub(crate) fn define(b: &mut SchemaBuilder, rfc5280: &Rfc5280) -> Result<(), SchemaError> {
    let tbs = b.declare("TBSRequest");
    let signature = b.declare("Signature");
    let request = b.declare("Request");
    let cert_id = b.declare("CertID");

    b.define(
        "OCSPRequest",
        Type::sequence([
            field("tbsRequest", Type::reference(tbs)),
            field("optionalSignature", Type::reference(signature).explicit(0)).optional(),
        ]),
    )?;
    b.define(
        "TBSRequest",
        Type::sequence([
            field("version", Type::reference(rfc5280.version).explicit(0))
                .default(Value::symbol("v1")),
            field("requestorName", Type::reference(rfc5280.general_name).explicit(1)).optional(),
            field("requestList", Type::sequence_of(Type::reference(request))),
            field("requestExtensions", Type::reference(rfc5280.extensions).explicit(2)).optional(),
        ]),
    )?;
    b.define(
        "Signature",
        Type::sequence([
            field("signatureAlgorithm", Type::reference(rfc5280.algorithm_identifier)),
            field("signature", Type::bit_string()),
            field("certs", Type::sequence_of(Type::reference(rfc5280.certificate)).explicit(0))
                .optional(),
        ]),
    )?;
    b.define(
        "Request",
        Type::sequence([
            field("reqCert", Type::reference(cert_id)),
            field(
                "singleRequestExtensions",
                Type::reference(rfc5280.extensions).explicit(0),
            )
            .optional(),
        ]),
    )?;
    b.define(
        "CertID",
        Type::sequence([
            field("hashAlgorithm", Type::reference(rfc5280.algorithm_identifier)),
            field("issuerNameHash", Type::octet_string()),
            field("issuerKeyHash", Type::octet_string()),
            field("serialNumber", Type::reference(rfc5280.certificate_serial_number)),
        ]),
    )?;
    Ok(())
}
