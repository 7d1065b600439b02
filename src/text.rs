//! Plain-text detection and decoding.
//!
//! Detection is delegated to `content_inspector`, which looks at byte-order
//! marks and NUL bytes in the leading bytes of the content. Anything it does
//! not classify as binary is decoded into a `String` according to the
//! encoding it reported.

use content_inspector::{inspect, ContentType};

pub fn is_plain_text(bytes: &[u8]) -> bool {
    !inspect(bytes).is_binary()
}

/// Decodes text content, stripping any byte-order mark.
///
/// Returns a human-readable reason when the bytes are binary or are not
/// valid in the detected encoding.
pub fn decode_text(bytes: &[u8]) -> Result<String, String> {
    match inspect(bytes) {
        ContentType::BINARY => Err("content is binary".to_string()),
        ContentType::UTF_8 => utf8(bytes),
        ContentType::UTF_8_BOM => utf8(&bytes[3..]),
        ContentType::UTF_16LE => utf16(&bytes[2..], u16::from_le_bytes),
        ContentType::UTF_16BE => utf16(&bytes[2..], u16::from_be_bytes),
        ContentType::UTF_32LE => utf32(&bytes[4..], u32::from_le_bytes),
        ContentType::UTF_32BE => utf32(&bytes[4..], u32::from_be_bytes),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| format!("invalid UTF-8: {}", e))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("truncated UTF-16 content".to_string());
    }
    let units = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| format!("invalid UTF-16: {}", e))
}

fn utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> Result<String, String> {
    if bytes.len() % 4 != 0 {
        return Err("truncated UTF-32 content".to_string());
    }
    bytes
        .chunks_exact(4)
        .map(|c| {
            let code = unit([c[0], c[1], c[2], c[3]]);
            char::from_u32(code).ok_or_else(|| format!("invalid UTF-32 code point {:#x}", code))
        })
        .collect()
}
