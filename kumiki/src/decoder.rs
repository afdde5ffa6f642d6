//! Decoder trait for type-safe conversions.
//!
//! The `Decoder` trait converts a source type `T` into a destination type
//! `D`. The `der` crate uses it to read a TLV out of a byte slice and the
//! `pem` crate uses it to turn text into a `Pem` block and a `Pem` block into
//! DER bytes.
//!
//! # Implementation Guide
//!
//! ```no_run
//! use kumiki::decoder::{Decoder, DecodableFrom};
//!
//! struct Armored(String);
//! struct Raw(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct MyError;
//!
//! impl DecodableFrom<Armored> for Raw {}
//!
//! impl Decoder<Armored, Raw> for Armored {
//!     type Error = MyError;
//!
//!     fn decode(&self) -> Result<Raw, Self::Error> {
//!         Ok(Raw(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type. The destination type must implement
/// `DecodableFrom<T>`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed for the destination type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T> {}
