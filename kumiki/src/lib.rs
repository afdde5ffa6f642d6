//! # kumiki
//!
//! Core conversion traits shared by the kumiki ASN.1 codec crates.
//!
//! Every layer of the codec is a conversion from one representation to the
//! next:
//! ```text
//! PEM text → Pem → Vec<u8> → Tlv → Value (driven by a Schema)
//! ```
//!
//! The `Decoder` and `Encoder` traits describe the schema-free steps of that
//! pipeline (PEM armoring and TLV framing). The schema-driven steps take a
//! schema node in addition to the input and live on `asn1::Schema`.
//!
//! ## Type Safety
//!
//! Both traits are guarded by marker traits (`DecodableFrom` and
//! `EncodableTo`) so that only the conversions a crate explicitly opts into
//! can be expressed.
//!
//! ## Example
//!
//! ```ignore
//! use kumiki::decoder::Decoder;
//! use pem::Pem;
//!
//! let pem: Pem = "-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----".decode()?;
//! let der: Vec<u8> = pem.decode()?;
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
