use asn1::{DecodeError, EncodeError, SchemaError};
use thiserror::Error;

use crate::Object;

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("PEM error: {0}")]
    Pem(#[from] pem::Error),
    #[error("label miss match: expected {expected}, found {found}")]
    LabelMissMatch { expected: String, found: String },
    #[error("{0:?} has no PEM label")]
    NoPemLabel(Object),
}

pub type Result<T> = std::result::Result<T, Error>;
