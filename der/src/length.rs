//! Length octets. Definite form only.

use nom::{IResult, Parser};

use crate::error::Error;
use crate::tag::be_u8;

const LONG_FORM: u8 = 0x80;

/// Reads one DER length from the front of `input`.
///
/// Short form (0..=127) is a single byte. Long form is `0x80 | n` followed by
/// `n` big-endian bytes with no leading zero, used only for lengths >= 128.
pub fn parse_length(input: &[u8]) -> Result<(&[u8], usize), Error> {
    let (input, n) = be_u8(input)?;
    if n & LONG_FORM == 0 {
        return Ok((input, usize::from(n)));
    }

    let count = usize::from(n & !LONG_FORM);
    if count == 0 {
        return Err(Error::IndefiniteLength);
    }
    if count > size_of::<usize>() {
        return Err(Error::LengthOverflow);
    }
    let res: IResult<&[u8], &[u8]> = nom::bytes::complete::take(count).parse(input);
    let (input, bs) = res.map_err(|_| Error::TruncatedInput)?;
    if bs.first() == Some(&0) {
        return Err(Error::NonMinimalLength);
    }
    let length = bs.iter().fold(0usize, |n, &b| (n << 8) | usize::from(b));
    if length < usize::from(LONG_FORM) {
        return Err(Error::NonMinimalLength);
    }
    Ok((input, length))
}

/// Appends the minimal DER encoding of `length` to `out`.
pub fn write_length(length: usize, out: &mut Vec<u8>) {
    if length < usize::from(LONG_FORM) {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(LONG_FORM | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Number of bytes `write_length` emits for `length`.
pub fn length_len(length: usize) -> usize {
    if length < usize::from(LONG_FORM) {
        1
    } else {
        1 + (usize::BITS - length.leading_zeros()).div_ceil(8) as usize
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{length_len, parse_length, write_length};
    use crate::error::Error;

    #[rstest(input, expected,
        case(vec![0x00], 0),
        case(vec![0x02, 0x01], 0x02),
        case(vec![0x7f], 0x7f),
        case(vec![0x81, 0x80], 0x80),
        case(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10),
        case(vec![0x83, 0x01, 0x00, 0x00], 256 * 256),
        case(vec![0x82, 0xff, 0xff], 256 * 0xff + 0xff),
    )]
    fn test_parse_length(input: Vec<u8>, expected: usize) {
        let (_, actual) = parse_length(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![], Error::TruncatedInput),
        case(vec![0x80], Error::IndefiniteLength),
        case(vec![0x81], Error::TruncatedInput),
        case(vec![0x82, 0x01], Error::TruncatedInput),
        case(vec![0x81, 0x7f], Error::NonMinimalLength),
        case(vec![0x82, 0x00, 0x80], Error::NonMinimalLength),
        case(vec![0x89, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], Error::LengthOverflow),
        case(vec![0xff], Error::LengthOverflow),
    )]
    fn test_parse_length_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), parse_length(&input).map(|(_, n)| n));
    }

    #[rstest(length, expected,
        case(0, vec![0x00]),
        case(127, vec![0x7f]),
        case(128, vec![0x81, 0x80]),
        case(255, vec![0x81, 0xff]),
        case(256, vec![0x82, 0x01, 0x00]),
        case(65536, vec![0x83, 0x01, 0x00, 0x00]),
    )]
    fn test_write_length(length: usize, expected: Vec<u8>) {
        let mut out = Vec::new();
        write_length(length, &mut out);
        assert_eq!(expected, out);
        assert_eq!(expected.len(), length_len(length));
    }
}
