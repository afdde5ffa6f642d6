//! DER tag-length-value framing.
//!
//! [`Tlv`] is a borrowed view over one encoded element, [`TlvBuf`] is an owned
//! element being assembled by an encoder. Neither knows anything about ASN.1
//! types beyond the identifier and length rules of X.690.

use kumiki::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;
mod length;
mod tag;

pub use error::Error;
pub use length::{length_len, parse_length, write_length};
pub use tag::{TAG_CONSTRUCTED, Tag, TagClass};

/// One encoded element borrowed from an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    tag: Tag,
    content: &'a [u8],
    raw: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Reads one TLV from the front of `input` and returns the remaining bytes.
    pub fn parse(input: &'a [u8]) -> Result<(&'a [u8], Tlv<'a>), Error> {
        let (rest, tag) = Tag::parse(input)?;
        let (rest, length) = parse_length(rest)?;
        let res: IResult<&[u8], &[u8]> = nom::bytes::complete::take(length).parse(rest);
        let (rest, content) = res.map_err(|_| Error::TruncatedInput)?;
        let consumed = input.len() - rest.len();
        Ok((
            rest,
            Tlv {
                tag,
                content,
                raw: &input[..consumed],
            },
        ))
    }

    /// Reads exactly one TLV spanning the whole of `input`.
    pub fn parse_exact(input: &'a [u8]) -> Result<Tlv<'a>, Error> {
        let (rest, tlv) = Self::parse(input)?;
        if !rest.is_empty() {
            return Err(Error::TrailingData(rest.len()));
        }
        Ok(tlv)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Content octets only.
    pub fn content(&self) -> &'a [u8] {
        self.content
    }

    /// Identifier, length and content octets.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Iterates over the TLVs nested in the content of a constructed element.
    pub fn children(&self) -> Tlvs<'a> {
        Tlvs::new(self.content)
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Tlv<'a> {}

impl<'a> Decoder<&'a [u8], Tlv<'a>> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Tlv<'a>, Self::Error> {
        Tlv::parse_exact(*self)
    }
}

/// Iterator over consecutive TLVs. Stops after the first error.
#[derive(Debug, Clone)]
pub struct Tlvs<'a> {
    input: &'a [u8],
}

impl<'a> Tlvs<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tlvs { input }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

impl<'a> Iterator for Tlvs<'a> {
    type Item = Result<Tlv<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.input.is_empty() {
            return None;
        }
        match Tlv::parse(self.input) {
            Ok((rest, tlv)) => {
                self.input = rest;
                Some(Ok(tlv))
            }
            Err(e) => {
                self.input = &[];
                Some(Err(e))
            }
        }
    }
}

/// An owned element: a tag and its already-encoded content octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvBuf {
    tag: Tag,
    content: Vec<u8>,
}

impl TlvBuf {
    pub fn new(tag: Tag, content: Vec<u8>) -> Self {
        TlvBuf { tag, content }
    }

    /// A constructed element whose content is the concatenation of `children`.
    pub fn constructed(tag: Tag, children: &[TlvBuf]) -> Self {
        let mut content = Vec::with_capacity(children.iter().map(TlvBuf::encoded_len).sum());
        for child in children {
            child.write(&mut content);
        }
        TlvBuf {
            tag: tag.with_constructed(true),
            content,
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replaces class and number, keeping the primitive/constructed bit (IMPLICIT).
    pub fn retag(self, class: TagClass, number: u32) -> Self {
        TlvBuf {
            tag: Tag::new(class, self.tag.is_constructed(), number),
            content: self.content,
        }
    }

    /// Wraps this element in a constructed element with the given tag (EXPLICIT).
    pub fn wrap(self, class: TagClass, number: u32) -> Self {
        TlvBuf::constructed(Tag::new(class, true, number), &[self])
    }

    /// Total size of identifier, length and content octets.
    pub fn encoded_len(&self) -> usize {
        let mut tag = Vec::with_capacity(6);
        self.tag.write(&mut tag);
        tag.len() + length_len(self.content.len()) + self.content.len()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        self.tag.write(out);
        write_length(self.content.len(), out);
        out.extend_from_slice(&self.content);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write(&mut out);
        out
    }
}

impl From<Tlv<'_>> for TlvBuf {
    fn from(tlv: Tlv<'_>) -> Self {
        TlvBuf::new(tlv.tag(), tlv.content().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use kumiki::decoder::Decoder;
    use rstest::rstest;

    use crate::{Error, Tag, TagClass, Tlv, TlvBuf, Tlvs};

    #[rstest(input, expected_tag, expected_content,
        case(vec![0x02, 0x01, 0x01], Tag::INTEGER, vec![0x01]),
        case(vec![0x02, 0x09, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01], Tag::INTEGER, vec![0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]),
        case(vec![0x13, 0x02, 0x68, 0x69], Tag::PRINTABLE_STRING, vec![0x68, 0x69]),
        case(vec![0x16, 0x02, 0x68, 0x69], Tag::IA5_STRING, vec![0x68, 0x69]),
        case(vec![0x0c, 0x04, 0xf0, 0x9f, 0x98, 0x8e], Tag::UTF8_STRING, vec![0xf0, 0x9f, 0x98, 0x8e]),
        case(vec![0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b], Tag::OBJECT_IDENTIFIER, vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b]),
        case(vec![0x05, 0x00], Tag::NULL, vec![]),
        case(vec![0x04, 0x04, 0x03, 0x02, 0x06, 0xa0], Tag::OCTET_STRING, vec![0x03, 0x02, 0x06, 0xa0]),
        case(vec![0x03, 0x04, 0x06, 0x6e, 0x5d, 0xc0], Tag::BIT_STRING, vec![0x06, 0x6e, 0x5d, 0xc0]),
    )]
    fn test_tlv_parse_primitive(input: Vec<u8>, expected_tag: Tag, expected_content: Vec<u8>) {
        let (rest, tlv) = Tlv::parse(&input).unwrap();
        assert!(rest.is_empty());
        assert_eq!(expected_tag, tlv.tag());
        assert_eq!(expected_content.as_slice(), tlv.content());
        assert_eq!(input.as_slice(), tlv.raw());
    }

    #[test]
    fn test_tlv_parse_structured() {
        let input = vec![0x30, 0x09, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09];
        let tlv: Tlv = input.as_slice().decode().unwrap();
        assert_eq!(Tag::SEQUENCE, tlv.tag());
        let children = tlv.children().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(3, children.len());
        for (child, expected) in children.iter().zip([0x07u8, 0x08, 0x09]) {
            assert_eq!(Tag::INTEGER, child.tag());
            assert_eq!(&[expected], child.content());
        }
    }

    #[rstest(input, expected,
        case(vec![0x30, 0x05, 0x02, 0x01], Error::TruncatedInput),
        case(vec![0x04, 0x80, 0x00, 0x00], Error::IndefiniteLength),
        case(vec![0x04, 0x81, 0x01, 0x00], Error::NonMinimalLength),
        case(vec![0x05, 0x00, 0x05, 0x00], Error::TrailingData(2)),
    )]
    fn test_tlv_parse_exact_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), Tlv::parse_exact(&input));
    }

    #[test]
    fn test_tlvs_stop_after_error() {
        let input = [0x05, 0x00, 0x02, 0x05, 0x01];
        let mut tlvs = Tlvs::new(&input);
        assert!(matches!(tlvs.next(), Some(Ok(_))));
        assert_eq!(Some(Err(Error::TruncatedInput)), tlvs.next());
        assert_eq!(None, tlvs.next());
    }

    #[test]
    fn test_tlv_buf_explicit_and_implicit() {
        let five = TlvBuf::new(Tag::INTEGER, vec![0x05]);
        assert_eq!(vec![0xa1, 0x03, 0x02, 0x01, 0x05], five.clone().wrap(TagClass::ContextSpecific, 1).to_bytes());
        assert_eq!(vec![0x81, 0x01, 0x05], five.retag(TagClass::ContextSpecific, 1).to_bytes());

        let seq = TlvBuf::constructed(Tag::SEQUENCE, &[]);
        assert_eq!(vec![0xa2, 0x00], seq.retag(TagClass::ContextSpecific, 2).to_bytes());
    }

    #[test]
    fn test_tlv_buf_long_content() {
        let buf = TlvBuf::new(Tag::OCTET_STRING, vec![0xaa; 300]);
        let bytes = buf.to_bytes();
        assert_eq!(&[0x04, 0x82, 0x01, 0x2c], &bytes[..4]);
        assert_eq!(bytes.len(), buf.encoded_len());
        assert_eq!(buf, TlvBuf::from(Tlv::parse_exact(&bytes).unwrap()));
    }
}
