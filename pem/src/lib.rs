//! RFC 7468 textual armoring of DER data.
//!
//! [`armor`] wraps DER bytes in a `-----BEGIN <label>-----` envelope and
//! [`unarmor`] strips it again. Labels are caller-supplied and are only
//! checked for being expressible in a boundary line.

pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::LazyLock,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use kumiki::decoder::{DecodableFrom, Decoder};
use kumiki::encoder::{EncodableTo, Encoder};
use regex::Regex;

pub use error::Error;

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const X509_CRL_LABEL: &str = "X509 CRL";
pub const OCSP_REQUEST_LABEL: &str = "OCSP REQUEST";
pub const OCSP_RESPONSE_LABEL: &str = "OCSP RESPONSE";

const LINE_WIDTH: usize = 64;

// label = [ labelchar *( ["-" / SP] labelchar ) ], labelchar = %x21-2C / %x2E-7E
const LABEL: &str = r"(?:[\x21-\x2c\x2e-\x7e]+(?:[- ][\x21-\x2c\x2e-\x7e]+)*)?";

static BOUNDARY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(&format!(r"^-----(BEGIN|END) ({LABEL})-----\s*$")));

static LABEL_ONLY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(&format!("^{LABEL}$")));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Boundary {
    Begin(String),
    End(String),
}

impl Boundary {
    fn parse(line: &str) -> Result<Boundary, Error> {
        let re = BOUNDARY
            .as_ref()
            .map_err(|_| Error::InvalidEncapsulationBoundary)?;
        let captured = re
            .captures(line)
            .ok_or(Error::InvalidEncapsulationBoundary)?;
        let label = captured
            .get(2)
            .ok_or(Error::InvalidEncapsulationBoundary)?
            .as_str()
            .to_string();
        match captured.get(1).map(|m| m.as_str()) {
            Some("BEGIN") => Ok(Boundary::Begin(label)),
            Some("END") => Ok(Boundary::End(label)),
            _ => Err(Error::InvalidEncapsulationBoundary),
        }
    }
}

fn check_label(label: &str) -> Result<(), Error> {
    match LABEL_ONLY.as_ref() {
        Ok(re) if re.is_match(label) => Ok(()),
        _ => Err(Error::InvalidLabel(label.to_string())),
    }
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: String,
    base64_data: String, // base64 encoded data
}

impl Pem {
    pub fn new(label: impl Into<String>, base64_data: String) -> Result<Self, Error> {
        let label = label.into();
        check_label(&label)?;
        Ok(Pem { label, base64_data })
    }

    pub fn from_bytes(label: impl Into<String>, data: &[u8]) -> Result<Self, Error> {
        Pem::new(label, STANDARD.encode(data))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----BEGIN {}-----", self.label)?;
        for chunk in self.base64_data.as_bytes().chunks(LINE_WIDTH) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        write!(f, "-----END {}-----", self.label)
    }
}

/// Armors `der` under `label`.
///
/// ```
/// let text = pem::armor(&[0x05, 0x00], "NULL").unwrap();
/// assert_eq!("-----BEGIN NULL-----\nBQA=\n-----END NULL-----", text);
/// ```
pub fn armor(der: &[u8], label: &str) -> Result<String, Error> {
    Ok(Pem::from_bytes(label, der)?.to_string())
}

/// Reverses [`armor`], discarding the label.
pub fn unarmor(text: &str) -> Result<Vec<u8>, Error> {
    let pem: Pem = text.decode()?;
    pem.decode()
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        STANDARD.decode(self.data()).map_err(Error::Base64Decode)
    }
}

impl DecodableFrom<String> for Pem {}

impl Decoder<String, Pem> for String {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

impl DecodableFrom<&str> for Pem {}

impl Decoder<&str, Pem> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

impl EncodableTo<Pem> for String {}

impl Encoder<Pem, String> for Pem {
    type Error = Error;

    fn encode(&self) -> Result<String, Self::Error> {
        check_label(&self.label)?;
        Ok(self.to_string())
    }
}

/// Parse multiple PEM blocks from a string.
///
/// Text outside of blocks is ignored, which makes this suitable for
/// certificate chains and bundles carrying explanatory text.
///
/// # Example
/// ```
/// use pem::parse_many;
///
/// let pem_data = "-----BEGIN CERTIFICATE-----\nAAA=\n-----END CERTIFICATE-----\n-----BEGIN X509 CRL-----\nBBB=\n-----END X509 CRL-----";
/// let pems = parse_many(pem_data).unwrap();
/// assert_eq!(pems.len(), 2);
/// assert_eq!(pems[1].label(), "X509 CRL");
/// ```
pub fn parse_many(s: &str) -> Result<Vec<Pem>, Error> {
    // Normalize input: ensure each boundary marker is on its own line
    let normalized = s.replace("----------", "-----\n-----");

    let mut pems = Vec::new();
    let mut current_block: Option<(String, Vec<&str>)> = None;

    for line in normalized.lines() {
        match Boundary::parse(line) {
            Ok(Boundary::Begin(label)) => current_block = Some((label, vec![line])),
            Ok(Boundary::End(label)) => {
                let Some((begin, mut lines)) = current_block.take() else {
                    return Err(Error::MissingPreEncapsulationBoundary);
                };
                if begin != label {
                    return Err(Error::LabelMissMatch { begin, end: label });
                }
                lines.push(line);
                pems.push(Pem::from_str(&lines.join("\n"))?);
            }
            Err(_) => {
                if let Some((_, ref mut lines)) = current_block {
                    lines.push(line);
                }
            }
        }
    }

    if current_block.is_some() {
        return Err(Error::MissingPostEncapsulationBoundary);
    }
    if pems.is_empty() {
        return Err(Error::MissingPreEncapsulationBoundary);
    }
    Ok(pems)
}

fn post_boundary(line: &str, begin: &str) -> Option<Result<(), Error>> {
    match Boundary::parse(line) {
        Ok(Boundary::End(end)) if end == begin => Some(Ok(())),
        Ok(Boundary::End(end)) => Some(Err(Error::LabelMissMatch {
            begin: begin.to_string(),
            end,
        })),
        Ok(Boundary::Begin(_)) => Some(Err(Error::MissingPostEncapsulationBoundary)),
        Err(_) => None,
    }
}

impl FromStr for Pem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = PemParsingState::default();
        let mut label = String::new();
        let mut base64_lines = vec![];
        let mut base64_finl_lines = vec![];
        let mut lines = s.lines();
        loop {
            match state {
                PemParsingState::Init => match lines.next() {
                    // explanatory text before the block is skipped
                    // https://www.rfc-editor.org/rfc/rfc7468.html#section-5.2
                    Some(line) => {
                        if let Ok(Boundary::Begin(l)) = Boundary::parse(line) {
                            label = l;
                            state = PemParsingState::PreEncapsulationBoundary;
                        }
                    }
                    None => return Err(Error::MissingPreEncapsulationBoundary),
                },
                PemParsingState::PreEncapsulationBoundary => match lines.next() {
                    Some(line) => {
                        if line.trim().is_empty() {
                            return Err(Error::MissingData);
                        }
                        if let Some(end) = post_boundary(line, &label) {
                            // an empty body armors zero bytes
                            end?;
                            state = PemParsingState::PostEncapsulationBoundary;
                        } else if is_base64_finl(line) {
                            base64_finl_lines.push(line);
                            state = PemParsingState::Base64Finl;
                        } else {
                            base64_lines.push(line.trim_end());
                            state = PemParsingState::Base64Lines;
                        }
                    }
                    None => return Err(Error::MissingData),
                },
                PemParsingState::Base64Lines => match lines.next() {
                    Some(line) => {
                        if line.trim().is_empty() {
                            return Err(Error::InvalidBase64Line);
                        }
                        if let Some(end) = post_boundary(line, &label) {
                            end?;
                            state = PemParsingState::PostEncapsulationBoundary;
                        } else if is_base64_finl(line) {
                            base64_finl_lines.push(line);
                            state = PemParsingState::Base64Finl;
                        } else {
                            base64_lines.push(line.trim_end());
                        }
                    }
                    None => return Err(Error::MissingPostEncapsulationBoundary),
                },
                PemParsingState::Base64Finl => match lines.next() {
                    Some(line) => {
                        if line.trim().is_empty() {
                            return Err(Error::InvalidBase64Finl);
                        }
                        if let Some(end) = post_boundary(line, &label) {
                            end?;
                            state = PemParsingState::PostEncapsulationBoundary;
                        } else {
                            if !is_base64_finl(line) {
                                return Err(Error::InvalidBase64Finl);
                            }
                            base64_finl_lines.push(line);
                        }
                    }
                    None => return Err(Error::MissingPostEncapsulationBoundary),
                },
                PemParsingState::PostEncapsulationBoundary => break,
            }
        }
        let finl = base64_finl(&base64_finl_lines)?;
        base64_lines.push(&finl);

        Ok(Pem {
            label,
            base64_data: base64_lines.join(""),
        })
    }
}

/*
* pre-eb ->          base64finl -> post-eb
*        -> base64lines-|---------->
*        ------------------------->
*            |_|
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum PemParsingState {
    #[default]
    Init,
    PreEncapsulationBoundary,
    Base64Lines,
    Base64Finl,
    PostEncapsulationBoundary,
}

fn base64_finl(lines: &[&str]) -> Result<String, Error> {
    // base64finl = *base64char (base64pad *WSP eol base64pad / *2base64pad) *WSP eol
    // exp-1)
    // ..AB=\s\s\s\n
    // =\s\s\n
    // exp-2)
    // ..AB==\s\s\n
    if lines.iter().any(|l| l.is_empty()) {
        return Err(Error::InvalidBase64Finl);
    }
    Ok(lines.iter().map(|l| l.trim()).collect())
}

fn is_base64_finl(line: &str) -> bool {
    line.contains('=')
}
