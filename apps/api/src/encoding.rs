//! WinAnsiEncoding codec shared by the PDF writer and the PDF text extractor.
//!
//! The writer uses the standard Type1 Helvetica fonts, which only address
//! single-byte WinAnsi codes. The extractor decodes through each font's own
//! encoding and only reaches `decode_pdf_string` when lopdf cannot provide one.

/// WinAnsi codes 0x80..=0x9F. `None` marks the five undefined slots.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// Encodes text as WinAnsi bytes. Unmappable characters become `?`;
/// control characters are dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            let code = c as u32;
            if code < 0x80 || (0xA0..=0xFF).contains(&code) {
                code as u8
            } else {
                WIN_ANSI_HIGH
                    .iter()
                    .position(|slot| *slot == Some(c))
                    .map(|i| 0x80 + i as u8)
                    .unwrap_or(b'?')
            }
        })
        .collect()
}

/// Decodes WinAnsi bytes. Undefined codes become U+FFFD.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WIN_ANSI_HIGH[(b - 0x80) as usize].unwrap_or('\u{FFFD}'),
            _ => b as char,
        })
        .collect()
}

/// Decodes a PDF string operand: UTF-16BE with BOM, then UTF-8, then WinAnsi.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => decode_win_ansi(bytes),
    }
}
