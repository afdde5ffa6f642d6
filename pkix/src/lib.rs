//! Certificates, CRLs and OCSP messages through one DER schema.
//!
//! [`Pkix`] defines the RFC 5280 and RFC 2560 catalogs on a single
//! [`SchemaBuilder`] and keeps the built [`Schema`]. It is immutable after
//! construction and can be shared between threads.
//!
//! ```no_run
//! use pkix::{Object, Pkix};
//!
//! let pkix = Pkix::new().unwrap();
//! let text = std::fs::read_to_string("leaf.pem").unwrap();
//! let cert = pkix.from_pem(Object::Certificate, &text).unwrap();
//! println!("{:?}", cert.pointer("tbsCertificate.serialNumber"));
//! ```

#![forbid(unsafe_code)]

use std::str::FromStr;

use asn1::{NodeId, Schema, SchemaBuilder, Value};
use kumiki::decoder::Decoder;
use log::trace;
use ocsp::Rfc2560;
use pem::Pem;
use x509::Rfc5280;

mod error;

pub use error::{Error, Result};

/// The top-level wire objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Object {
    Certificate,
    CertificateList,
    OcspRequest,
    OcspResponse,
    BasicOcspResponse,
    CertId,
}

impl Object {
    /// The conventional PEM label, for objects that have one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Object::Certificate => Some(pem::CERTIFICATE_LABEL),
            Object::CertificateList => Some(pem::X509_CRL_LABEL),
            Object::OcspRequest => Some(pem::OCSP_REQUEST_LABEL),
            Object::OcspResponse => Some(pem::OCSP_RESPONSE_LABEL),
            Object::BasicOcspResponse | Object::CertId => None,
        }
    }
}

#[derive(Debug)]
pub struct Pkix {
    schema: Schema,
    rfc5280: Rfc5280,
    rfc2560: Rfc2560,
}

impl Pkix {
    pub fn new() -> Result<Self> {
        let mut b = SchemaBuilder::new();
        let rfc5280 = Rfc5280::define(&mut b)?;
        let rfc2560 = Rfc2560::define(&mut b, &rfc5280)?;
        let schema = b.build()?;
        trace!("pkix catalog ready: {} nodes", schema.len());
        Ok(Pkix {
            schema,
            rfc5280,
            rfc2560,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rfc5280(&self) -> &Rfc5280 {
        &self.rfc5280
    }

    pub fn rfc2560(&self) -> &Rfc2560 {
        &self.rfc2560
    }

    pub fn node(&self, object: Object) -> NodeId {
        match object {
            Object::Certificate => self.rfc5280.certificate,
            Object::CertificateList => self.rfc5280.certificate_list,
            Object::OcspRequest => self.rfc2560.ocsp_request,
            Object::OcspResponse => self.rfc2560.ocsp_response,
            Object::BasicOcspResponse => self.rfc2560.basic_ocsp_response,
            Object::CertId => self.rfc2560.cert_id,
        }
    }

    pub fn decode(&self, object: Object, der: &[u8]) -> Result<Value> {
        Ok(self.schema.decode(self.node(object), der)?)
    }

    pub fn encode(&self, object: Object, value: &Value) -> Result<Vec<u8>> {
        Ok(self.schema.encode(self.node(object), value)?)
    }

    /// Encodes `value` and armors it under the label of `object`.
    pub fn to_pem(&self, object: Object, value: &Value) -> Result<String> {
        let label = object.label().ok_or(Error::NoPemLabel(object))?;
        let der = self.encode(object, value)?;
        Ok(pem::armor(&der, label)?)
    }

    /// Unarmors the first PEM block of `text` and decodes it as `object`.
    ///
    /// The block label has to be the label of `object`.
    pub fn from_pem(&self, object: Object, text: &str) -> Result<Value> {
        let expected = object.label().ok_or(Error::NoPemLabel(object))?;
        let pem = Pem::from_str(text)?;
        if pem.label() != expected {
            return Err(Error::LabelMissMatch {
                expected: expected.to_string(),
                found: pem.label().to_string(),
            });
        }
        let der: Vec<u8> = pem.decode()?;
        self.decode(object, &der)
    }
}
