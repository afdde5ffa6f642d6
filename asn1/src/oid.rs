use std::fmt::Display;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::OidError;

/// An OBJECT IDENTIFIER as its sequence of arcs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn new(arcs: Vec<u64>) -> Result<Self, OidError> {
        match arcs.as_slice() {
            [] | [_] => Err(OidError::TooFewComponents),
            [first, second, ..] if *first > 2 || (*first < 2 && *second >= 40) => {
                Err(OidError::InvalidFirstArcs(*first, *second))
            }
            [_, second, ..] if second.checked_add(80).is_none() => Err(OidError::Overflow),
            _ => Ok(ObjectIdentifier { inner: arcs }),
        }
    }

    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }

    /// Parses the content octets of an OBJECT IDENTIFIER.
    pub fn from_der(value: &[u8]) -> Result<Self, OidError> {
        if value.is_empty() {
            return Err(OidError::NoData);
        }

        let mut subids = Vec::new();
        let mut val = 0u64;
        let mut start = true;
        for &b in value {
            if start && b == 0x80 {
                return Err(OidError::NonMinimal);
            }
            if val >> 57 != 0 {
                return Err(OidError::Overflow);
            }
            val = (val << 7) | u64::from(b & 0x7f);
            start = b & 0x80 == 0;
            if start {
                subids.push(val);
                val = 0;
            }
        }
        if !start {
            return Err(OidError::IncompleteEncoding);
        }

        // the first subidentifier packs two arcs as X * 40 + Y
        let first = subids[0];
        let mut arcs = Vec::with_capacity(subids.len() + 1);
        match first {
            0..40 => arcs.extend([0, first]),
            40..80 => arcs.extend([1, first - 40]),
            _ => arcs.extend([2, first - 80]),
        }
        arcs.extend_from_slice(&subids[1..]);
        Ok(ObjectIdentifier { inner: arcs })
    }

    /// Content octets of this identifier.
    pub fn to_der(&self) -> Vec<u8> {
        let mut result = Vec::new();
        let first = self.inner[0] * 40 + self.inner[1];
        write_subidentifier(first, &mut result);
        for v in self.inner[2..].iter() {
            write_subidentifier(*v, &mut result);
        }
        result
    }
}

fn write_subidentifier(value: u64, out: &mut Vec<u8>) {
    let mut encoded = vec![(value & 0x7f) as u8];
    let mut value = value >> 7;
    while value > 0 {
        encoded.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(encoded.iter().rev());
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self.inner.first() {
            Some(n) => self.inner[1..]
                .iter()
                .fold(n.to_string(), |s, n| s + "." + &n.to_string()),
            None => String::new(),
        };
        write!(f, "{}", s)
    }
}

/// Accepts dotted (`2.5.29.15`) or space separated (`2 5 29 15`) notation.
impl FromStr for ObjectIdentifier {
    type Err = OidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = if s.contains('.') { '.' } else { ' ' };
        let values = s
            .trim()
            .split(sep)
            .map(|c| {
                c.parse::<u64>()
                    .map_err(|_| OidError::InvalidComponent(c.to_string()))
            })
            .collect::<Result<Vec<u64>, OidError>>()?;
        ObjectIdentifier::new(values)
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
