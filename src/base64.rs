//! RFC 4648 base64 with `=` padding, used for QR code payloads.

use std::fmt;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PADDING: char = '=';
const BITS_PER_CHAR: usize = 6;

/// Errors that can occur during decoding.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The input contains a character outside the alphabet
    InvalidCharacter { char: char, position: usize },
    /// Data follows the padding, or there is too much of it
    InvalidPadding,
    /// Number of significant characters cannot come from whole bytes
    InvalidLength { actual: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidCharacter { char: c, position } => {
                write!(f, "base64: invalid character '{}' at position {}", c, position)
            }
            DecodeError::InvalidPadding => {
                write!(f, "base64: invalid padding")?;
                write!(f, "\nhint: '=' may only appear at the end of the input")
            }
            DecodeError::InvalidLength { actual } => {
                write!(
                    f,
                    "base64: {} significant characters do not form whole bytes",
                    actual
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

fn decode_char(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 26),
        '0'..='9' => Some(c as u32 - '0' as u32 + 52),
        '+' => Some(62),
        '/' => Some(63),
        _ => None,
    }
}

pub fn encode(data: &[u8]) -> String {
    let output_chars = (data.len() * 8).div_ceil(BITS_PER_CHAR);
    let padded_chars = output_chars.div_ceil(4) * 4;
    let mut result = String::with_capacity(padded_chars);

    let mut bit_buffer = 0u32;
    let mut bits_in_buffer = 0usize;

    for &byte in data {
        bit_buffer = (bit_buffer << 8) | (byte as u32);
        bits_in_buffer += 8;

        while bits_in_buffer >= BITS_PER_CHAR {
            bits_in_buffer -= BITS_PER_CHAR;
            let index = ((bit_buffer >> bits_in_buffer) & 0x3F) as usize;
            result.push(ALPHABET[index] as char);
        }
    }

    // Handle remaining bits
    if bits_in_buffer > 0 {
        let index = ((bit_buffer << (BITS_PER_CHAR - bits_in_buffer)) & 0x3F) as usize;
        result.push(ALPHABET[index] as char);
    }

    while result.len() < padded_chars {
        result.push(PADDING);
    }

    result
}

/// Decode padded or unpadded base64. Surrounding whitespace is ignored.
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let encoded = encoded.trim();
    let significant = encoded.trim_end_matches(PADDING);
    if encoded.len() - significant.len() > 2 {
        return Err(DecodeError::InvalidPadding);
    }
    if significant.len() % 4 == 1 {
        return Err(DecodeError::InvalidLength {
            actual: significant.len(),
        });
    }

    let mut result = Vec::with_capacity(significant.len() * BITS_PER_CHAR / 8);
    let mut bit_buffer = 0u32;
    let mut bits_in_buffer = 0usize;

    for (position, c) in significant.chars().enumerate() {
        if c == PADDING {
            return Err(DecodeError::InvalidPadding);
        }
        let digit =
            decode_char(c).ok_or(DecodeError::InvalidCharacter { char: c, position })?;

        bit_buffer = (bit_buffer << BITS_PER_CHAR) | digit;
        bits_in_buffer += BITS_PER_CHAR;

        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push(((bit_buffer >> bits_in_buffer) & 0xFF) as u8);
        }
    }

    Ok(result)
}
