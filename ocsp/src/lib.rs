//! RFC 2560 OCSP request and response schemas.
//!
//! Builds on the [`x509::Rfc5280`] catalog, so both have to be defined on
//! the same builder. `ResponseBytes.response` is decoded as the type
//! registered for `responseType`; only `id-pkix-ocsp-basic` is known.

#![forbid(unsafe_code)]

use std::sync::Arc;

use asn1::{NodeId, OidError, OidRegistry, SchemaBuilder, SchemaError};
use x509::Rfc5280;

mod request;
mod response;

pub const ID_PKIX_OCSP: &str = "1.3.6.1.5.5.7.48.1";
pub const ID_PKIX_OCSP_BASIC: &str = "1.3.6.1.5.5.7.48.1.1";
pub const ID_PKIX_OCSP_NONCE: &str = "1.3.6.1.5.5.7.48.1.2";

/// Names of the OCSP identifiers, including the response types
/// `ResponseBytes` dispatches on.
pub fn registry() -> Result<OidRegistry, OidError> {
    OidRegistry::from_entries(&[
        (ID_PKIX_OCSP, "id-pkix-ocsp"),
        (ID_PKIX_OCSP_BASIC, "id-pkix-ocsp-basic"),
        (ID_PKIX_OCSP_NONCE, "id-pkix-ocsp-nonce"),
    ])
}

#[derive(Debug, Clone)]
pub struct Rfc2560 {
    pub ocsp_request: NodeId,
    pub tbs_request: NodeId,
    pub request: NodeId,
    pub cert_id: NodeId,
    pub ocsp_response: NodeId,
    pub response_status: NodeId,
    pub response_bytes: NodeId,
    pub basic_ocsp_response: NodeId,
    pub response_data: NodeId,
    pub single_response: NodeId,
    pub cert_status: NodeId,
    pub nonce: NodeId,
    pub registry: Arc<OidRegistry>,
}

impl Rfc2560 {
    pub fn define(b: &mut SchemaBuilder, rfc5280: &Rfc5280) -> Result<Rfc2560, SchemaError> {
        let registry = Arc::new(registry()?);
        request::define(b, rfc5280)?;
        response::define(b, rfc5280, registry.clone())?;

        Ok(Rfc2560 {
            ocsp_request: b.declare("OCSPRequest"),
            tbs_request: b.declare("TBSRequest"),
            request: b.declare("Request"),
            cert_id: b.declare("CertID"),
            ocsp_response: b.declare("OCSPResponse"),
            response_status: b.declare("OCSPResponseStatus"),
            response_bytes: b.declare("ResponseBytes"),
            basic_ocsp_response: b.declare("BasicOCSPResponse"),
            response_data: b.declare("ResponseData"),
            single_response: b.declare("SingleResponse"),
            cert_status: b.declare("CertStatus"),
            nonce: b.declare("Nonce"),
            registry,
        })
    }
}
