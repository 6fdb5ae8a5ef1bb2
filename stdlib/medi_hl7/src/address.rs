//! Segment types, dotted field addresses and repetition/sub-component indices.
//!
//! An address has the shape `TTT.f[.c]`: a three character segment type made
//! of `A-Z` and `0-9`, then up to two positive numbers naming a field and a
//! component. Reads may stop at the segment type; writes need the field.

use std::fmt;
use std::str::FromStr;

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::multi::many_m_n;
use nom::sequence::{pair, preceded};
use nom::IResult;

use crate::error::{invalid_param, invalid_param_because, Hl7Error, Hl7Result};

/// Type of the message header segment
pub const HEADER_SEGMENT_TYPE: &str = "MSH";

/// Segment types commonly seen in ADT and order/result messages.
/// Any other well-formed code is still accepted.
pub const KNOWN_SEGMENT_TYPES: [&str; 14] = [
    "DG1", "EVN", "GT1", "IN1", "MSH", "NK1", "NTE", "OBR", "OBX", "ORC", "PID", "PR1", "PV1",
    "PV2",
];

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

fn segment_code(input: &str) -> IResult<&str, &str> {
    take_while_m_n(3, 3, is_code_char)(input)
}

fn position(input: &str) -> IResult<&str, usize> {
    preceded(char('.'), map_res(digit1, str::parse::<usize>))(input)
}

fn address_parts(input: &str) -> IResult<&str, (&str, Vec<usize>)> {
    all_consuming(pair(segment_code, many_m_n(0, 2, position)))(input)
}

/// Dotted `f[.c]` suffix used by reindexing, without the segment type
fn field_path_parts(input: &str) -> IResult<&str, (usize, Option<usize>)> {
    all_consuming(pair(
        map_res(digit1, str::parse::<usize>),
        opt(position),
    ))(input)
}

/// A validated three character segment code such as `PID` or `ZX1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct SegmentType(String);

impl SegmentType {
    pub fn new(code: &str) -> Hl7Result<Self> {
        match all_consuming(segment_code)(code) {
            Ok(_) => Ok(SegmentType(code.to_string())),
            Err(_) => invalid_param("type", code),
        }
    }

    /// The message header type, whose field numbering starts at 2
    pub fn header() -> Self {
        SegmentType(HEADER_SEGMENT_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_header(&self) -> bool {
        self.0 == HEADER_SEGMENT_TYPE
    }

    pub fn is_well_known(&self) -> bool {
        KNOWN_SEGMENT_TYPES.contains(&self.0.as_str())
    }

    /// First field number carrying data. The header's field 1 is the field
    /// separator itself and never holds a value.
    pub(crate) fn first_field(&self) -> usize {
        if self.is_header() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SegmentType {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SegmentType::new(s)
    }
}

impl TryFrom<String> for SegmentType {
    type Error = Hl7Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SegmentType::new(&value)
    }
}

impl From<SegmentType> for String {
    fn from(value: SegmentType) -> Self {
        value.0
    }
}

impl AsRef<str> for SegmentType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SegmentType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SegmentType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A parsed `TTT.f[.c]` address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    segment_type: SegmentType,
    field: Option<usize>,
    component: Option<usize>,
}

impl Address {
    /// Parse an address for reading. The field and component are optional.
    pub fn parse_read(address: &str) -> Hl7Result<Self> {
        let (code, positions) = match address_parts(address) {
            Ok((_, parts)) => parts,
            Err(_) => return invalid_param("field", address),
        };

        if positions.contains(&0) {
            return invalid_param_because(
                "field",
                address,
                "Field and component numbers start at 1.",
            );
        }

        Ok(Address {
            segment_type: SegmentType(code.to_string()),
            field: positions.first().copied(),
            component: positions.get(1).copied(),
        })
    }

    /// Parse an address for writing. The field part is required.
    pub fn parse_write(address: &str) -> Hl7Result<Self> {
        let parsed = Self::parse_read(address)?;
        if parsed.field.is_none() {
            return invalid_param("field", address);
        }
        Ok(parsed)
    }

    /// Join a segment type with a `f[.c]` field path, as reindexing does
    pub fn with_field_path(segment_type: &SegmentType, path: &str) -> Hl7Result<Self> {
        let (field, component) = match field_path_parts(path) {
            Ok((_, parts)) => parts,
            Err(_) => return invalid_param("field", path),
        };

        if field == 0 || component == Some(0) {
            return invalid_param_because("field", path, "Field and component numbers start at 1.");
        }

        Ok(Address {
            segment_type: segment_type.clone(),
            field: Some(field),
            component,
        })
    }

    pub fn segment_type(&self) -> &SegmentType {
        &self.segment_type
    }

    pub fn field(&self) -> Option<usize> {
        self.field
    }

    pub fn component(&self) -> Option<usize> {
        self.component
    }
}

impl FromStr for Address {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse_read(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment_type)?;
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
        }
        if let Some(component) = self.component {
            write!(f, ".{component}")?;
        }
        Ok(())
    }
}

/// Selects one repetition / sub-component, or all of them joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    At(usize),
    All,
}

impl Default for Index {
    fn default() -> Self {
        Index::At(0)
    }
}

impl From<usize> for Index {
    fn from(value: usize) -> Self {
        Index::At(value)
    }
}

/// Integer protocol: `-1` means all, other negatives are rejected
impl TryFrom<i64> for Index {
    type Error = Hl7Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Index::All),
            n => match usize::try_from(n) {
                Ok(n) => Ok(Index::At(n)),
                Err(_) => invalid_param("index", n),
            },
        }
    }
}

impl Index {
    /// The concrete position for a write. Writes never accept `All`.
    pub(crate) fn position(self, name: &str) -> Hl7Result<usize> {
        match self {
            Index::At(n) => Ok(n),
            Index::All => invalid_param_because(name, -1, "Writes need a concrete index."),
        }
    }
}
