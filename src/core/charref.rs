//! Numeric character reference parsing
//!
//! Handles the `#...;` and `#x...;` forms that follow a `&`, producing a
//! validated Unicode scalar. Every failure mode (empty digit run, stray
//! bytes before the `;`, arithmetic overflow, values past U+10FFFF,
//! surrogates) yields `None`; the caller re-emits the source text verbatim.

/// Parse a numeric character reference.
///
/// `rest` is the text immediately after the `&` and must start with `#`.
/// Returns the decoded character and the number of bytes consumed within
/// `rest`, through the terminating `;`.
pub(crate) fn parse_numeric(rest: &[u8]) -> Option<(char, usize)> {
    if rest.first() != Some(&b'#') {
        return None;
    }
    let (digits_start, hex) = match rest.get(1) {
        Some(b'x') | Some(b'X') => (2, true),
        _ => (1, false),
    };

    let run = rest[digits_start..]
        .iter()
        .take_while(|&&b| {
            if hex {
                b.is_ascii_hexdigit()
            } else {
                b.is_ascii_digit()
            }
        })
        .count();
    if run == 0 {
        // `&#;`, `&#x;`, or a non-digit right after the marker.
        return None;
    }
    let end = digits_start + run;
    if rest.get(end) != Some(&b';') {
        // The digit run must butt directly against the delimiter.
        return None;
    }

    let digits = &rest[digits_start..end];
    let value = if hex {
        parse_hex_codepoint(digits)
    } else {
        parse_dec_codepoint(digits)
    }?;

    // from_u32 applies both the U+10FFFF cap and the surrogate exclusion.
    let decoded = char::from_u32(value)?;
    Some((decoded, end + 1))
}

/// Parse a hexadecimal code point from digit bytes with overflow checking
fn parse_hex_codepoint(digits: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for &byte in digits {
        let digit = match byte {
            b'0'..=b'9' => u32::from(byte - b'0'),
            b'a'..=b'f' => u32::from(byte - b'a' + 10),
            b'A'..=b'F' => u32::from(byte - b'A' + 10),
            _ => return None,
        };
        value = value.checked_mul(16)?.checked_add(digit)?;
    }
    Some(value)
}

/// Parse a decimal code point from digit bytes with overflow checking
fn parse_dec_codepoint(digits: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }
        value = value
            .checked_mul(10)?
            .checked_add(u32::from(byte - b'0'))?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_references() {
        assert_eq!(parse_numeric(b"#65;"), Some(('A', 4)));
        assert_eq!(parse_numeric(b"#9731;"), Some(('\u{2603}', 6)));
        assert_eq!(parse_numeric(b"#0;"), Some(('\0', 3)));
        assert_eq!(parse_numeric(b"#1114111;"), Some(('\u{10FFFF}', 9)));
    }

    #[test]
    fn parses_hex_references() {
        assert_eq!(parse_numeric(b"#x41;"), Some(('A', 5)));
        assert_eq!(parse_numeric(b"#X41;"), Some(('A', 5)));
        assert_eq!(parse_numeric(b"#xaB;"), Some(('\u{AB}', 5)));
        assert_eq!(parse_numeric(b"#x2603;"), Some(('\u{2603}', 7)));
        assert_eq!(parse_numeric(b"#x10FFFF;"), Some(('\u{10FFFF}', 9)));
    }

    #[test]
    fn leading_zeros_are_harmless() {
        assert_eq!(parse_numeric(b"#0000065;"), Some(('A', 9)));
        assert_eq!(parse_numeric(b"#x000041;"), Some(('A', 9)));
    }

    #[test]
    fn consumed_length_excludes_trailing_text() {
        assert_eq!(parse_numeric(b"#65; tail"), Some(('A', 4)));
        assert_eq!(parse_numeric(b"#x41;&"), Some(('A', 5)));
    }

    #[test]
    fn rejects_empty_digit_runs() {
        assert_eq!(parse_numeric(b"#;"), None);
        assert_eq!(parse_numeric(b"#x;"), None);
        assert_eq!(parse_numeric(b"#X;"), None);
        assert_eq!(parse_numeric(b"#"), None);
        assert_eq!(parse_numeric(b"#x"), None);
    }

    #[test]
    fn rejects_interrupted_digit_runs() {
        assert_eq!(parse_numeric(b"#12a;"), None);
        assert_eq!(parse_numeric(b"#xg;"), None);
        assert_eq!(parse_numeric(b"# 65;"), None);
        assert_eq!(parse_numeric(b"#+65;"), None);
        assert_eq!(parse_numeric(b"#-65;"), None);
        assert_eq!(parse_numeric(b"#65 ;"), None);
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert_eq!(parse_numeric(b"#65"), None);
        assert_eq!(parse_numeric(b"#x41"), None);
        assert_eq!(parse_numeric(b"#65:"), None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        // One past the last scalar value.
        assert_eq!(parse_numeric(b"#x110000;"), None);
        assert_eq!(parse_numeric(b"#1114112;"), None);
        // u32 overflow, decimal and hex.
        assert_eq!(parse_numeric(b"#4294967296;"), None);
        assert_eq!(parse_numeric(b"#99999999999999;"), None);
        assert_eq!(parse_numeric(b"#x100000000;"), None);
    }

    #[test]
    fn rejects_surrogates() {
        assert_eq!(parse_numeric(b"#xD800;"), None);
        assert_eq!(parse_numeric(b"#xDFFF;"), None);
        assert_eq!(parse_numeric(b"#55296;"), None);
        // The scalars flanking the surrogate block are fine.
        assert_eq!(parse_numeric(b"#xD7FF;"), Some(('\u{D7FF}', 7)));
        assert_eq!(parse_numeric(b"#xE000;"), Some(('\u{E000}', 7)));
    }

    #[test]
    fn rejects_text_without_the_marker() {
        assert_eq!(parse_numeric(b"65;"), None);
        assert_eq!(parse_numeric(b""), None);
    }
}
