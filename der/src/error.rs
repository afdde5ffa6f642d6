use thiserror::Error;

/// Framing errors raised while reading a tag or a length.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A tag, length or content runs past the end of the buffer.
    #[error("truncated input")]
    TruncatedInput,

    /// The 0x80 length byte. DER only allows definite lengths.
    #[error("indefinite length is not allowed in DER")]
    IndefiniteLength,

    /// A long-form length with a leading zero byte, or one that fits the short form.
    #[error("length is not minimally encoded")]
    NonMinimalLength,

    /// A length that does not fit in `usize`, or the reserved 0xff length byte.
    #[error("length overflow")]
    LengthOverflow,

    /// A long-form tag number that is not minimal or does not fit in `u32`.
    #[error("invalid tag number encoding")]
    InvalidTagNumber,

    /// Bytes left over after a value that must fill its container.
    #[error("{0} trailing byte(s) after TLV")]
    TrailingData(usize),
}
