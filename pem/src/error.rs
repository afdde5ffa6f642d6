use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when armoring or unarmoring PEM text.
///
/// Parsing follows RFC 7468: a block needs both boundary lines with the same
/// label and a body of standard base64.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing the opening boundary (e.g. `-----BEGIN CERTIFICATE-----`)
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// Missing the closing boundary (e.g. `-----END CERTIFICATE-----`)
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// A blank line where the body should start
    #[error("missing PEM data")]
    MissingData,

    /// The label cannot appear in a boundary line
    #[error("invalid label: {0:?}")]
    InvalidLabel(String),

    /// The BEGIN and END labels differ
    #[error("label doesn't match: BEGIN {begin}, END {end}")]
    LabelMissMatch { begin: String, end: String },

    /// Malformed boundary line
    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// Blank line inside the body
    #[error("invalid base64line")]
    InvalidBase64Line,

    /// Invalid final base64 line (the line holding the padding)
    #[error("invalid base64finl")]
    InvalidBase64Finl,

    /// The body is not valid base64
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
