use std::sync::Arc;

use asn1::{Dispatch, NamedValues, OidRegistry, SchemaBuilder, SchemaError, Type, Value, field};
use x509::Rfc5280;

/*
https://datatracker.ietf.org/doc/html/rfc2560#section-4.2.1

OCSPResponse ::= SEQUENCE {
   responseStatus         OCSPResponseStatus,
   responseBytes          [0] EXPLICIT ResponseBytes OPTIONAL }

OCSPResponseStatus ::= ENUMERATED {
    successful            (0),  --Response has valid confirmations
    malformedRequest      (1),  --Illegal confirmation request
    internalError         (2),  --Internal error in issuer
    tryLater              (3),  --Try again later
                                --(4) is not used
    sigRequired           (5),  --Must sign the request
    unauthorized          (6)   --Request unauthorized
}

ResponseBytes ::=       SEQUENCE {
    responseType   OBJECT IDENTIFIER,
    response       OCTET STRING }
 */

pub(crate) fn define(
    b: &mut SchemaBuilder,
    rfc5280: &Rfc5280,
    response_types: Arc<OidRegistry>,
) -> Result<(), SchemaError> {
    let status = b.declare("OCSPResponseStatus");
    let response_bytes = b.declare("ResponseBytes");
    let basic = b.declare("BasicOCSPResponse");
    let response_data = b.declare("ResponseData");
    let responder_id = b.declare("ResponderID");
    let key_hash = b.declare("KeyHash");
    let single_response = b.declare("SingleResponse");
    let cert_id = b.declare("CertID");
    let cert_status = b.declare("CertStatus");
    let revoked_info = b.declare("RevokedInfo");

    b.define(
        "OCSPResponse",
        Type::sequence([
            field("responseStatus", Type::reference(status)),
            field("responseBytes", Type::reference(response_bytes).explicit(0)).optional(),
        ]),
    )?;
    b.define(
        "OCSPResponseStatus",
        Type::enumerated(NamedValues::new([
            (0, "successful"),
            (1, "malformedRequest"),
            (2, "internalError"),
            (3, "tryLater"),
            (5, "sigRequired"),
            (6, "unauthorized"),
        ])),
    )?;
    let dispatch = Dispatch::on("responseType")
        .with_registry(response_types.clone())
        .route("id-pkix-ocsp-basic", basic);
    b.define(
        "ResponseBytes",
        Type::sequence([
            field("responseType", Type::object_identifier_in(response_types)),
            field("response", Type::octet_string_containing(dispatch)),
        ]),
    )?;

    /*
    BasicOCSPResponse       ::= SEQUENCE {
       tbsResponseData      ResponseData,
       signatureAlgorithm   AlgorithmIdentifier,
       signature            BIT STRING,
       certs                [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }

    ResponseData ::= SEQUENCE {
       version              [0] EXPLICIT Version DEFAULT v1,
       responderID              ResponderID,
       producedAt               GeneralizedTime,
       responses                SEQUENCE OF SingleResponse,
       responseExtensions   [1] EXPLICIT Extensions OPTIONAL }

    ResponderID ::= CHOICE {
       byName               [1] Name,
       byKey                [2] KeyHash }

    KeyHash ::= OCTET STRING -- SHA-1 hash of responder's public key
                             -- (excluding the tag and length fields)
     */
    b.define(
        "BasicOCSPResponse",
        Type::sequence([
            field("tbsResponseData", Type::reference(response_data)),
            field("signatureAlgorithm", Type::reference(rfc5280.algorithm_identifier)),
            field("signature", Type::bit_string()),
            field("certs", Type::sequence_of(Type::reference(rfc5280.certificate)).explicit(0))
                .optional(),
        ]),
    )?;
    b.define(
        "ResponseData",
        Type::sequence([
            field("version", Type::reference(rfc5280.version).explicit(0))
                .default(Value::symbol("v1")),
            field("responderID", Type::reference(responder_id)),
            field("producedAt", Type::generalized_time()),
            field("responses", Type::sequence_of(Type::reference(single_response))),
            field("responseExtensions", Type::reference(rfc5280.extensions).explicit(1)).optional(),
        ]),
    )?;
    b.define(
        "ResponderID",
        Type::choice([
            ("byName", Type::reference(rfc5280.name).explicit(1)),
            ("byKey", Type::reference(key_hash).explicit(2)),
        ]),
    )?;
    b.define("KeyHash", Type::octet_string())?;

    /*
    SingleResponse ::= SEQUENCE {
       certID                       CertID,
       certStatus                   CertStatus,
       thisUpdate                   GeneralizedTime,
       nextUpdate         [0]       EXPLICIT GeneralizedTime OPTIONAL,
       singleExtensions   [1]       EXPLICIT Extensions OPTIONAL }

    CertStatus ::= CHOICE {
        good        [0]     IMPLICIT NULL,
        revoked     [1]     IMPLICIT RevokedInfo,
        unknown     [2]     IMPLICIT UnknownInfo }

    RevokedInfo ::= SEQUENCE {
        revocationTime              GeneralizedTime,
        revocationReason    [0]     EXPLICIT CRLReason OPTIONAL }

    UnknownInfo ::= NULL -- this can be replaced with an enumeration
     */
    b.define(
        "SingleResponse",
        Type::sequence([
            field("certID", Type::reference(cert_id)),
            field("certStatus", Type::reference(cert_status)),
            field("thisUpdate", Type::generalized_time()),
            field("nextUpdate", Type::generalized_time().explicit(0)).optional(),
            field("singleExtensions", Type::reference(rfc5280.extensions).explicit(1)).optional(),
        ]),
    )?;
    b.define(
        "CertStatus",
        Type::choice([
            ("good", Type::null().implicit(0)),
            ("revoked", Type::reference(revoked_info).implicit(1)),
            ("unknown", Type::null().implicit(2)),
        ]),
    )?;
    b.define(
        "RevokedInfo",
        Type::sequence([
            field("revocationTime", Type::generalized_time()),
            field("revocationReason", Type::reference(rfc5280.crl_reason).explicit(0)).optional(),
        ]),
    )?;

    // Nonce ::= OCTET STRING
    b.define("Nonce", Type::octet_string())?;
    Ok(())
}
