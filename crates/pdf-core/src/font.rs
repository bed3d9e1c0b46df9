//! Built-in Helvetica font
//!
//! Reports are written with the PDF base-14 Helvetica font so no font
//! program has to be embedded. Text is encoded with WinAnsiEncoding, which
//! covers the Latin-1 range used by Portuguese labels (Ç, Ã, É, ...).

use lopdf::{Dictionary, Object};

/// Resource name under which the font is registered on every page
pub const FONT_RESOURCE: &str = "F1";

/// Helvetica ascender as a fraction of the font size
///
/// Used to turn a top-of-line y coordinate into a baseline.
pub const FONT_ASCENT: f64 = 0.718;

/// Replacement byte for characters WinAnsiEncoding cannot represent
const REPLACEMENT: u8 = b'?';

/// Helvetica advance widths for 0x20..=0x7E (1/1000 em)
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Helvetica advance widths for 0xA0..=0xFF (1/1000 em)
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Map a character to its WinAnsiEncoding byte
fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '\t' | '\n' | '\r' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => REPLACEMENT,
    }
}

/// Advance width of a WinAnsiEncoding byte in 1/1000 em
fn byte_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        0xA0..=0xFF => LATIN1_WIDTHS[(byte - 0xA0) as usize],
        0x80 | 0x96 => 556,
        0x82 | 0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x85 | 0x97 => 1000,
        _ => ASCII_WIDTHS[(REPLACEMENT - 0x20) as usize],
    }
}

/// Encode text as WinAnsiEncoding bytes
///
/// Characters outside the encoding are replaced by `?`; line breaks and
/// tabs become spaces since text is always written on a single line.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// Encode text as a PDF hex string (e.g., "<48656C6C6F>")
pub fn encode_text_hex(text: &str) -> String {
    let mut hex = String::with_capacity(text.len() * 2 + 2);
    hex.push('<');
    for byte in encode_win_ansi(text) {
        hex.push_str(&format!("{byte:02X}"));
    }
    hex.push('>');
    hex
}

/// Width of text in points at the given font size
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| byte_width(b) as u32)
        .sum();
    units as f64 * font_size / 1000.0
}

/// Font dictionary for the built-in Helvetica font
pub fn font_dictionary() -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Font".to_vec()));
    dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii() {
        assert_eq!(encode_win_ansi("AZ az"), b"AZ az".to_vec());
    }

    #[test]
    fn test_encode_portuguese() {
        assert_eq!(encode_win_ansi("ÇÃÉ"), vec![0xC7, 0xC3, 0xC9]);
        assert_eq!(encode_win_ansi("ção"), vec![0xE7, 0xE3, b'o']);
    }

    #[test]
    fn test_encode_unsupported_char() {
        assert_eq!(encode_win_ansi("a\u{0E01}b"), b"a?b".to_vec());
    }

    #[test]
    fn test_encode_line_break_becomes_space() {
        assert_eq!(encode_win_ansi("a\nb"), b"a b".to_vec());
    }

    #[test]
    fn test_encode_text_hex() {
        assert_eq!(encode_text_hex("Hi"), "<4869>");
        assert_eq!(encode_text_hex(""), "<>");
    }

    #[test]
    fn test_text_width() {
        // H = 722, i = 222
        let width = text_width("Hi", 10.0);
        assert!((width - 9.44).abs() < 1e-9);
    }

    #[test]
    fn test_text_width_accented_matches_base_letter() {
        assert_eq!(text_width("É", 12.0), text_width("E", 12.0));
        assert_eq!(text_width("ã", 12.0), text_width("a", 12.0));
    }

    #[test]
    fn test_font_dictionary() {
        let dict = font_dictionary();
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica"
        );
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
