//! Dotted-decimal IPv4 parsing
//!
//! Converts a single line (terminator already stripped) into a packed `u32`.
//! Octets are packed big-endian: `o1` lands in the most significant byte.
//! Parsing works on the borrowed bytes and never allocates.

use crate::constants::OCTET_COUNT;
use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

/// Reasons a line is not a dotted-decimal IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not split into exactly four dot-separated groups
    #[error("expected 4 octets, found {found}")]
    WrongOctetCount { found: usize },
    /// Two separators are adjacent, or the line starts/ends with a separator
    #[error("octet {index} is empty")]
    EmptyOctet { index: usize },
    /// A byte other than an ASCII digit or '.'
    #[error("octet {index} contains invalid byte 0x{byte:02x}")]
    InvalidDigit { index: usize, byte: u8 },
    /// The octet value exceeds 255
    #[error("octet {index} is out of range ({value} > 255)")]
    OctetOutOfRange { index: usize, value: u16 },
}

/// How octet groups are validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OctetMode {
    /// Digits only, non-empty, each octet in 0..=255
    #[default]
    Strict,
    /// Only the separator count is checked; octets accumulate in a wrapping
    /// 8-bit value, so `256` aliases to `0`
    Wrapping,
}

impl OctetMode {
    /// Parse a line according to this mode
    #[inline]
    pub fn parse(self, line: &[u8]) -> Result<u32, ParseError> {
        match self {
            Self::Strict => parse_ipv4(line),
            Self::Wrapping => parse_ipv4_wrapping(line),
        }
    }
}

/// Parse a strictly formed dotted-decimal address
#[inline]
pub fn parse_ipv4(line: &[u8]) -> Result<u32, ParseError> {
    let mut octets = [0u8; OCTET_COUNT];
    let mut index = 0;
    let mut value: u16 = 0;
    let mut digits = 0usize;

    for &byte in line {
        match byte {
            b'.' => {
                if digits == 0 {
                    return Err(ParseError::EmptyOctet { index });
                }
                if index == OCTET_COUNT - 1 {
                    return Err(ParseError::WrongOctetCount {
                        found: group_count(line),
                    });
                }
                octets[index] = value as u8;
                index += 1;
                value = 0;
                digits = 0;
            }
            b'0'..=b'9' => {
                value = value * 10 + (byte - b'0') as u16;
                if value > 255 {
                    return Err(ParseError::OctetOutOfRange { index, value });
                }
                digits += 1;
            }
            _ => return Err(ParseError::InvalidDigit { index, byte }),
        }
    }

    if index != OCTET_COUNT - 1 {
        return Err(ParseError::WrongOctetCount { found: index + 1 });
    }
    if digits == 0 {
        return Err(ParseError::EmptyOctet { index });
    }
    octets[index] = value as u8;

    Ok(BigEndian::read_u32(&octets))
}

/// Parse a dotted-decimal address without range or digit checks
///
/// Each octet is accumulated as `value * 10 + (byte - b'0')` in a wrapping
/// `u8`. Only the number of separators is validated.
#[inline]
pub fn parse_ipv4_wrapping(line: &[u8]) -> Result<u32, ParseError> {
    let mut octets = [0u8; OCTET_COUNT];
    let mut index = 0;

    for &byte in line {
        if byte == b'.' {
            index += 1;
            if index == OCTET_COUNT {
                return Err(ParseError::WrongOctetCount {
                    found: group_count(line),
                });
            }
        } else {
            octets[index] = octets[index]
                .wrapping_mul(10)
                .wrapping_add(byte.wrapping_sub(b'0'));
        }
    }

    if index != OCTET_COUNT - 1 {
        return Err(ParseError::WrongOctetCount { found: index + 1 });
    }

    Ok(BigEndian::read_u32(&octets))
}

/// Number of dot-separated groups in the line (cold path, errors only)
#[cold]
fn group_count(line: &[u8]) -> usize {
    memchr::memchr_iter(b'.', line).count() + 1
}
