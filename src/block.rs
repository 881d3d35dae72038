//! Decoding of the binary block returned by `:WAVeform:DATA?` into raw ADC codes.
//!
//! The reply is an IEEE 488.2 block: `#`, one digit `n`, `n` digits of payload length, the
//! payload, and usually a line terminator. `#0` denotes an indefinite length block that runs
//! up to the terminator.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleWidth {
    /// 8-bit codes.
    Byte,
    /// 16-bit codes.
    #[default]
    Word,
}

impl SampleWidth {
    /// Map the `format` field of the preamble to a binary sample width. ASCII transfers and
    /// unknown codes have no binary width.
    pub fn from_format_code(format: f64) -> Option<SampleWidth> {
        if format == 0.0 {
            Some(SampleWidth::Byte)
        } else if format == 1.0 {
            Some(SampleWidth::Word)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// Interpretation of codes as selected by `:WAVeform:UNSigned`, for either width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signedness {
    /// Two's complement codes.
    Signed,
    /// Offset binary codes; mid-scale is `0x80` or `0x8000`.
    #[default]
    Unsigned,
}

fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedBlock(message.into())
}

/// Locate the payload of a definite or indefinite length block.
pub fn parse_block(reply: &[u8]) -> Result<&[u8]> {
    let (&marker, rest) = reply.split_first()
        .ok_or_else(|| malformed("empty reply"))?;
    if marker != b'#' {
        return Err(malformed(format!("expected '#', got {:#04x}", marker)))
    }
    let (&digits, rest) = rest.split_first()
        .ok_or_else(|| malformed("missing length digit count"))?;
    if !digits.is_ascii_digit() {
        return Err(malformed(format!("length digit count {:#04x} is not a digit", digits)))
    }
    let digits = (digits - b'0') as usize;
    if digits == 0 {
        let payload = rest.strip_suffix(b"\n").unwrap_or(rest);
        let payload = payload.strip_suffix(b"\r").unwrap_or(payload);
        log::trace!("indefinite length block, {} bytes", payload.len());
        return Ok(payload)
    }
    if rest.len() < digits {
        return Err(malformed(format!("expected {} length digits, got {}", digits, rest.len())))
    }
    let (length, rest) = rest.split_at(digits);
    let length = std::str::from_utf8(length).ok()
        .filter(|text| text.bytes().all(|byte| byte.is_ascii_digit()))
        .and_then(|text| text.parse::<usize>().ok())
        .ok_or_else(|| malformed(format!("invalid length field {:02x?}", length)))?;
    if rest.len() < length {
        return Err(malformed(format!("expected {} payload bytes, got {}", length, rest.len())))
    }
    log::trace!("definite length block, {} bytes, {} trailing", length, rest.len() - length);
    Ok(&rest[..length])
}

/// Convert a block payload into ADC codes.
pub fn decode_samples(payload: &[u8], width: SampleWidth, order: ByteOrder, signedness: Signedness)
        -> Result<Vec<i64>> {
    match width {
        SampleWidth::Byte => Ok(match signedness {
            Signedness::Signed => payload.iter().map(|&code| code as i8 as i64).collect(),
            Signedness::Unsigned => payload.iter().map(|&code| code as i64).collect(),
        }),
        SampleWidth::Word => {
            let words: &[[u8; 2]] = bytemuck::try_cast_slice(payload)
                .map_err(|_| malformed(format!("{} bytes is not a whole number of words",
                    payload.len())))?;
            let decode = match order {
                ByteOrder::MsbFirst => u16::from_be_bytes,
                ByteOrder::LsbFirst => u16::from_le_bytes,
            };
            Ok(match signedness {
                Signedness::Signed =>
                    words.iter().map(|&word| decode(word) as i16 as i64).collect(),
                Signedness::Unsigned =>
                    words.iter().map(|&word| decode(word) as i64).collect(),
            })
        }
    }
}
