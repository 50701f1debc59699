//! Text decoding for terminal character sets
//!
//! Terminals transmit display and receipt text in a fixed single-byte
//! encoding configured at the device; CP437 is the factory default on
//! most field hardware. The tables below map the non-ASCII halves onto
//! Unicode.

use zvtlink_types::TextEncoding;

/// Decode terminal text with the configured encoding
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Iso8859_2 => decode_with_high_table(bytes, &ISO_8859_2_HIGH),
        TextEncoding::Iso8859_15 => bytes.iter().map(|&b| iso8859_15_char(b)).collect(),
        TextEncoding::CodePage437 => decode_with_high_table(bytes, &CP437_HIGH),
    }
}

fn decode_with_high_table(bytes: &[u8], high: &[char; 128]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                high[(b - 0x80) as usize]
            }
        })
        .collect()
}

// ISO-8859-15 differs from Latin-1 in exactly eight positions.
fn iso8859_15_char(b: u8) -> char {
    match b {
        0xA4 => '€',
        0xA6 => 'Š',
        0xA8 => 'š',
        0xB4 => 'Ž',
        0xB8 => 'ž',
        0xBC => 'Œ',
        0xBD => 'œ',
        0xBE => 'Ÿ',
        other => other as char,
    }
}

// 0x80-0xFF of ISO-8859-2. The 0x80-0x9F range passes the C1 controls
// through unchanged.
const ISO_8859_2_HIGH: [char; 128] = [
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\u{85}', '\u{86}', '\u{87}',
    '\u{88}', '\u{89}', '\u{8A}', '\u{8B}', '\u{8C}', '\u{8D}', '\u{8E}', '\u{8F}',
    '\u{90}', '\u{91}', '\u{92}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{97}',
    '\u{98}', '\u{99}', '\u{9A}', '\u{9B}', '\u{9C}', '\u{9D}', '\u{9E}', '\u{9F}',
    '\u{A0}', 'Ą', '˘', 'Ł', '¤', 'Ľ', 'Ś', '§',
    '¨', 'Š', 'Ş', 'Ť', 'Ź', '\u{AD}', 'Ž', 'Ż',
    '°', 'ą', '˛', 'ł', '´', 'ľ', 'ś', 'ˇ',
    '¸', 'š', 'ş', 'ť', 'ź', '˝', 'ž', 'ż',
    'Ŕ', 'Á', 'Â', 'Ă', 'Ä', 'Ĺ', 'Ć', 'Ç',
    'Č', 'É', 'Ę', 'Ë', 'Ě', 'Í', 'Î', 'Ď',
    'Đ', 'Ń', 'Ň', 'Ó', 'Ô', 'Ő', 'Ö', '×',
    'Ř', 'Ů', 'Ú', 'Ű', 'Ü', 'Ý', 'Ţ', 'ß',
    'ŕ', 'á', 'â', 'ă', 'ä', 'ĺ', 'ć', 'ç',
    'č', 'é', 'ę', 'ë', 'ě', 'í', 'î', 'ď',
    'đ', 'ń', 'ň', 'ó', 'ô', 'ő', 'ö', '÷',
    'ř', 'ů', 'ú', 'ű', 'ü', 'ý', 'ţ', '˙',
];

// 0x80-0xFF of the original IBM PC code page.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç',
    'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù',
    'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º',
    '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖',
    '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟',
    '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫',
    '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ',
    'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈',
    '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_passes_through_everywhere() {
        for encoding in [
            TextEncoding::Utf8,
            TextEncoding::Iso8859_1,
            TextEncoding::Iso8859_2,
            TextEncoding::Iso8859_15,
            TextEncoding::CodePage437,
        ] {
            assert_eq!(decode_text(b"SUMME  EUR 1,23", encoding), "SUMME  EUR 1,23");
        }
    }

    #[test]
    fn test_cp437_umlauts() {
        // "Beleg für Kä" fragment as CP437 bytes
        assert_eq!(decode_text(&[0x66, 0x81, 0x72], TextEncoding::CodePage437), "für");
        assert_eq!(decode_text(&[0x4B, 0x84], TextEncoding::CodePage437), "Kä");
    }

    #[test]
    fn test_latin1() {
        assert_eq!(decode_text(&[0xFC, 0xDF], TextEncoding::Iso8859_1), "üß");
    }

    #[test]
    fn test_latin9_euro_sign() {
        assert_eq!(decode_text(&[0xA4], TextEncoding::Iso8859_15), "€");
        assert_eq!(decode_text(&[0xA4], TextEncoding::Iso8859_1), "¤");
    }

    #[test]
    fn test_latin2() {
        assert_eq!(decode_text(&[0xA3, 0xB1], TextEncoding::Iso8859_2), "Łą");
    }

    #[test]
    fn test_utf8_lossy() {
        assert_eq!(decode_text(&[0xE2, 0x82, 0xAC], TextEncoding::Utf8), "€");
        assert_eq!(decode_text(&[0xFF], TextEncoding::Utf8), "\u{FFFD}");
    }
}
