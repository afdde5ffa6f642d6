//! Identifier octets.
//!
//! ```text
//! bit  8 7 | 6 | 5 4 3 2 1
//!     class| C | number (11111 = long form follows)
//! ```

use std::fmt::{Display, Formatter};

use nom::IResult;

use crate::error::Error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_LONG_FORM: u8 = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    fn bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xc0,
        }
    }

    fn from_bits(b: u8) -> Self {
        match b >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// A decoded identifier: class, primitive/constructed bit and tag number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    class: TagClass,
    constructed: bool,
    number: u32,
}

impl Tag {
    pub const BOOLEAN: Tag = Tag::universal(1, false);
    pub const INTEGER: Tag = Tag::universal(2, false);
    pub const BIT_STRING: Tag = Tag::universal(3, false);
    pub const OCTET_STRING: Tag = Tag::universal(4, false);
    pub const NULL: Tag = Tag::universal(5, false);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(6, false);
    pub const ENUMERATED: Tag = Tag::universal(10, false);
    pub const UTF8_STRING: Tag = Tag::universal(12, false);
    pub const SEQUENCE: Tag = Tag::universal(16, true);
    pub const SET: Tag = Tag::universal(17, true);
    pub const NUMERIC_STRING: Tag = Tag::universal(18, false);
    pub const PRINTABLE_STRING: Tag = Tag::universal(19, false);
    pub const TELETEX_STRING: Tag = Tag::universal(20, false);
    pub const IA5_STRING: Tag = Tag::universal(22, false);
    pub const UTC_TIME: Tag = Tag::universal(23, false);
    pub const GENERALIZED_TIME: Tag = Tag::universal(24, false);
    pub const VISIBLE_STRING: Tag = Tag::universal(26, false);
    pub const UNIVERSAL_STRING: Tag = Tag::universal(28, false);
    pub const BMP_STRING: Tag = Tag::universal(30, false);

    pub const fn new(class: TagClass, constructed: bool, number: u32) -> Self {
        Tag {
            class,
            constructed,
            number,
        }
    }

    pub const fn universal(number: u32, constructed: bool) -> Self {
        Tag::new(TagClass::Universal, constructed, number)
    }

    pub const fn context(number: u32, constructed: bool) -> Self {
        Tag::new(TagClass::ContextSpecific, constructed, number)
    }

    pub fn class(&self) -> TagClass {
        self.class
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Same class and number with the given primitive/constructed bit.
    pub fn with_constructed(self, constructed: bool) -> Self {
        Tag {
            constructed,
            ..self
        }
    }

    /// Reads one identifier from the front of `input`.
    pub fn parse(input: &[u8]) -> Result<(&[u8], Tag), Error> {
        let (input, first) = be_u8(input)?;
        let class = TagClass::from_bits(first);
        let constructed = first & TAG_CONSTRUCTED == TAG_CONSTRUCTED;

        if first & TAG_LONG_FORM != TAG_LONG_FORM {
            let number = u32::from(first & TAG_LONG_FORM);
            return Ok((input, Tag::new(class, constructed, number)));
        }

        // long form: base-128, high bit marks continuation
        let mut input = input;
        let mut number: u32 = 0;
        let mut first_octet = true;
        loop {
            let (rest, b) = be_u8(input)?;
            input = rest;
            if first_octet && b == 0x80 {
                return Err(Error::InvalidTagNumber);
            }
            first_octet = false;
            number = number
                .checked_mul(128)
                .ok_or(Error::InvalidTagNumber)?
                | u32::from(b & 0x7f);
            if b & 0x80 == 0 {
                break;
            }
        }
        if number < u32::from(TAG_LONG_FORM) {
            // must have used the short form
            return Err(Error::InvalidTagNumber);
        }
        Ok((input, Tag::new(class, constructed, number)))
    }

    /// Appends the identifier octets to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        let lead = self.class.bits() | if self.constructed { TAG_CONSTRUCTED } else { 0 };
        if self.number < u32::from(TAG_LONG_FORM) {
            out.push(lead | self.number as u8);
            return;
        }

        out.push(lead | TAG_LONG_FORM);
        let mut groups = Vec::new();
        let mut n = self.number;
        loop {
            groups.push((n & 0x7f) as u8);
            n >>= 7;
            if n == 0 {
                break;
            }
        }
        while let Some(g) = groups.pop() {
            out.push(if groups.is_empty() { g } else { g | 0x80 });
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let form = if self.constructed { "C" } else { "P" };
        match self.class {
            TagClass::Universal => write!(f, "[UNIVERSAL {}]/{}", self.number, form),
            TagClass::Application => write!(f, "[APPLICATION {}]/{}", self.number, form),
            TagClass::ContextSpecific => write!(f, "[{}]/{}", self.number, form),
            TagClass::Private => write!(f, "[PRIVATE {}]/{}", self.number, form),
        }
    }
}

pub(crate) fn be_u8(input: &[u8]) -> Result<(&[u8], u8), Error> {
    let res: IResult<&[u8], u8> = nom::number::complete::be_u8(input);
    res.map_err(|_| Error::TruncatedInput)
}
