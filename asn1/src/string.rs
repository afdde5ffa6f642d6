//! Character string kinds and their charsets.

use der::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    Utf8,
    Printable,
    Ia5,
    Numeric,
    Visible,
    /// T61String. Read and written as Latin-1.
    Teletex,
    /// UCS-4 big endian.
    Universal,
    /// UCS-2 big endian.
    Bmp,
}

fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
}

impl StringKind {
    pub fn tag(&self) -> Tag {
        match self {
            StringKind::Utf8 => Tag::UTF8_STRING,
            StringKind::Printable => Tag::PRINTABLE_STRING,
            StringKind::Ia5 => Tag::IA5_STRING,
            StringKind::Numeric => Tag::NUMERIC_STRING,
            StringKind::Visible => Tag::VISIBLE_STRING,
            StringKind::Teletex => Tag::TELETEX_STRING,
            StringKind::Universal => Tag::UNIVERSAL_STRING,
            StringKind::Bmp => Tag::BMP_STRING,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8String",
            StringKind::Printable => "PrintableString",
            StringKind::Ia5 => "IA5String",
            StringKind::Numeric => "NumericString",
            StringKind::Visible => "VisibleString",
            StringKind::Teletex => "TeletexString",
            StringKind::Universal => "UniversalString",
            StringKind::Bmp => "BMPString",
        }
    }

    fn allows(&self, c: char) -> bool {
        match self {
            StringKind::Utf8 | StringKind::Universal => true,
            StringKind::Printable => is_printable(c),
            StringKind::Ia5 => c.is_ascii(),
            StringKind::Numeric => c.is_ascii_digit() || c == ' ',
            StringKind::Visible => c.is_ascii_graphic() || c == ' ',
            StringKind::Teletex => u32::from(c) <= 0xff,
            StringKind::Bmp => u32::from(c) <= 0xffff,
        }
    }

    fn check(&self, s: &str) -> Result<(), String> {
        match s.chars().find(|&c| !self.allows(c)) {
            Some(c) => Err(format!("character {:?} is not allowed in {}", c, self.name())),
            None => Ok(()),
        }
    }

    /// Decodes content octets to text, validating the charset.
    pub fn decode(&self, content: &[u8]) -> Result<String, String> {
        let s = match self {
            StringKind::Teletex => content.iter().map(|&b| char::from(b)).collect(),
            StringKind::Universal => {
                if content.len() % 4 != 0 {
                    return Err("length is not a multiple of 4".to_string());
                }
                content
                    .chunks_exact(4)
                    .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .map(|n| char::from_u32(n).ok_or_else(|| format!("invalid code point {:#x}", n)))
                    .collect::<Result<String, String>>()?
            }
            StringKind::Bmp => {
                if content.len() % 2 != 0 {
                    return Err("length is not a multiple of 2".to_string());
                }
                content
                    .chunks_exact(2)
                    .map(|c| u32::from(u16::from_be_bytes([c[0], c[1]])))
                    .map(|n| char::from_u32(n).ok_or_else(|| format!("invalid code point {:#x}", n)))
                    .collect::<Result<String, String>>()?
            }
            _ => String::from_utf8(content.to_vec()).map_err(|e| e.to_string())?,
        };
        self.check(&s)?;
        Ok(s)
    }

    /// Encodes text to content octets, validating the charset.
    pub fn encode(&self, s: &str) -> Result<Vec<u8>, String> {
        self.check(s)?;
        let bytes = match self {
            StringKind::Teletex => s.chars().map(|c| u32::from(c) as u8).collect(),
            StringKind::Universal => s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
            StringKind::Bmp => s
                .chars()
                .flat_map(|c| (u32::from(c) as u16).to_be_bytes())
                .collect(),
            _ => s.as_bytes().to_vec(),
        };
        Ok(bytes)
    }
}
