//! Text transcoding for the host/engine boundary.
//!
//! Everything crossing into engine linear memory is UTF-8 bytes. Text coming
//! from the browser DOM is a sequence of UTF-16 code units, so the encoder
//! also accepts raw code units and performs surrogate pairing itself rather
//! than trusting the DOM to hand over well-formed strings.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed utf-8 in engine memory at byte {position}")]
    MalformedUtf8 { position: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Encode a host string as UTF-8 bytes.
pub fn encode_utf8(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

/// Encode a sequence of UTF-16 code units as UTF-8 bytes.
///
/// A high surrogate followed by a low surrogate combines into one code point
/// (code points >= U+10000 become a single 4-byte sequence). A lone surrogate
/// is encoded best-effort as a single 3-byte unit instead of erroring, so a
/// half-typed astral character in a textarea cannot abort a submission.
pub fn encode_utf16_units(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let unit = u32::from(units[i]);
        if unit < 0x80 {
            out.push(unit as u8);
        } else if unit < 0x800 {
            out.push(0xc0 | (unit >> 6) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        } else if (0xd800..0xdc00).contains(&unit)
            && units
                .get(i + 1)
                .is_some_and(|next| (0xdc00..0xe000).contains(&u32::from(*next)))
        {
            let low = u32::from(units[i + 1]);
            let code = 0x10000 + (((unit & 0x3ff) << 10) | (low & 0x3ff));
            out.push(0xf0 | (code >> 18) as u8);
            out.push(0x80 | ((code >> 12) & 0x3f) as u8);
            out.push(0x80 | ((code >> 6) & 0x3f) as u8);
            out.push(0x80 | (code & 0x3f) as u8);
            i += 1;
        } else {
            // BMP code point, or a lone surrogate encoded as-is
            out.push(0xe0 | (unit >> 12) as u8);
            out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        }
        i += 1;
    }
    out
}

/// Decode a UTF-8 byte span sliced out of engine memory.
///
/// Malformed bytes are an engine contract violation and propagate as
/// [`DecodeError`]; they are never papered over with replacement characters.
pub fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| DecodeError::MalformedUtf8 {
            position: err.valid_up_to(),
        })
}
