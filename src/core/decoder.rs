//! Entity decoding engine
//!
//! Single left-to-right scan over the input, jumping between `&` markers
//! with SIMD byte search. Each marker is resolved at most once: a named
//! table hit, a numeric character reference, or a failure that re-emits
//! the marker verbatim and rescans from the next byte. Decoding never
//! grows the text, which is what makes the in-place variants sound.

use std::borrow::Cow;

use memchr::memchr;
use thiserror::Error;

use crate::core::{charref, encoding, table};

/// Error returned by [`decode_strict`] for a malformed numeric reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at byte {offset}")]
pub struct DecodeError {
    /// Byte offset of the `&` that opened the offending reference.
    pub offset: usize,
    /// Static description of the failure.
    pub reason: &'static str,
}

/// A successfully parsed reference body.
enum Reference {
    Named(&'static str),
    Scalar(char),
}

/// Try to parse a character reference at `rest`, the text following a `&`.
///
/// Returns the replacement and the byte count consumed within `rest`,
/// through the terminating `;`. `None` covers every malformed shape; the
/// callers re-emit the source text and rescan after the `&`.
fn parse_reference(rest: &[u8]) -> Option<(Reference, usize)> {
    match rest.first() {
        Some(&b'#') => {
            charref::parse_numeric(rest).map(|(c, len)| (Reference::Scalar(c), len))
        }
        Some(_) => table::lookup(rest).map(|(text, len)| (Reference::Named(text), len)),
        None => None,
    }
}

/// Decode entity references, borrowing when there is nothing to do
///
/// Returns `Cow::Borrowed` if the input contains no `&` (zero-copy),
/// `Cow::Owned` with the decoded bytes otherwise. Unknown or malformed
/// references pass through unchanged.
pub fn decode(input: &[u8]) -> Cow<'_, [u8]> {
    // Fast path: check for any reference at all using SIMD
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(input.len());
    decode_into(input, &mut out);
    Cow::Owned(out)
}

/// Decode entity references, appending the result to `out`.
///
/// Returns the number of bytes appended. The output is never longer than
/// the input.
pub fn decode_into(input: &[u8], out: &mut Vec<u8>) -> usize {
    let start = out.len();
    let mut pos = 0;

    while let Some(found) = memchr(b'&', &input[pos..]) {
        let amp = pos + found;
        out.extend_from_slice(&input[pos..amp]);

        let parsed = parse_reference(&input[amp + 1..]);
        match parsed {
            Some((Reference::Named(text), len)) => {
                out.extend_from_slice(text.as_bytes());
                pos = amp + 1 + len;
            }
            Some((Reference::Scalar(c), len)) => {
                encoding::push_utf8(out, c);
                pos = amp + 1 + len;
            }
            None => {
                // Malformed: keep the marker, rescan right after it.
                out.push(b'&');
                pos = amp + 1;
            }
        }
    }

    out.extend_from_slice(&input[pos..]);
    out.len() - start
}

/// Decode entity references inside `buf` itself, returning the decoded
/// length. Bytes past that length are left unspecified.
///
/// A reference always consumes at least as many bytes as its replacement
/// produces, so the write cursor can never pass the read cursor and one
/// buffer safely serves as both source and destination.
pub fn decode_in_place(buf: &mut [u8]) -> usize {
    if memchr(b'&', buf).is_none() {
        return buf.len();
    }

    let mut read = 0;
    let mut write = 0;

    while let Some(found) = memchr(b'&', &buf[read..]) {
        let amp = read + found;
        buf.copy_within(read..amp, write);
        write += amp - read;

        let parsed = parse_reference(&buf[amp + 1..]);
        match parsed {
            Some((Reference::Named(text), len)) => {
                let bytes = text.as_bytes();
                buf[write..write + bytes.len()].copy_from_slice(bytes);
                write += bytes.len();
                read = amp + 1 + len;
            }
            Some((Reference::Scalar(c), len)) => {
                write += encoding::write_utf8_at(buf, write, c);
                read = amp + 1 + len;
            }
            None => {
                buf[write] = b'&';
                write += 1;
                read = amp + 1;
            }
        }
        debug_assert!(write <= read);
    }

    let tail = buf.len() - read;
    buf.copy_within(read.., write);
    write + tail
}

/// Decode entity references inside an owned buffer, truncating it to the
/// decoded length.
pub fn decode_vec(buf: &mut Vec<u8>) {
    let decoded = decode_in_place(buf);
    buf.truncate(decoded);
}

/// Decode entity references in a string slice.
///
/// Returns `Cow::Borrowed` if the input contains no `&`. References are
/// pure ASCII and replacements are single scalars, so the output is built
/// directly as a `String` with no revalidation pass.
pub fn decode_str(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    // Every slice boundary below sits on an ASCII byte (`&` or one past a
    // `;`), so the str indexing cannot split a multi-byte character.
    while let Some(found) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + found;
        out.push_str(&input[pos..amp]);

        let parsed = parse_reference(&bytes[amp + 1..]);
        match parsed {
            Some((Reference::Named(text), len)) => {
                out.push_str(text);
                pos = amp + 1 + len;
            }
            Some((Reference::Scalar(c), len)) => {
                out.push(c);
                pos = amp + 1 + len;
            }
            None => {
                out.push('&');
                pos = amp + 1;
            }
        }
    }

    out.push_str(&input[pos..]);
    Cow::Owned(out)
}

/// Decode entity references in strict mode.
///
/// A numeric-shaped reference (`&#` with a `;` somewhere ahead) that fails
/// to parse is a hard error carrying the offset of its `&`. Unknown named
/// entities and unterminated references still pass through unchanged, as
/// in lenient mode.
pub fn decode_strict(input: &[u8]) -> Result<Cow<'_, [u8]>, DecodeError> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }

    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while let Some(found) = memchr(b'&', &input[pos..]) {
        let amp = pos + found;
        out.extend_from_slice(&input[pos..amp]);

        let rest = &input[amp + 1..];
        let parsed = parse_reference(rest);
        match parsed {
            Some((Reference::Named(text), len)) => {
                out.extend_from_slice(text.as_bytes());
                pos = amp + 1 + len;
            }
            Some((Reference::Scalar(c), len)) => {
                encoding::push_utf8(&mut out, c);
                pos = amp + 1 + len;
            }
            None => {
                if rest.first() == Some(&b'#') && memchr(b';', rest).is_some() {
                    return Err(DecodeError {
                        offset: amp,
                        reason: "Invalid character reference",
                    });
                }
                out.push(b'&');
                pos = amp + 1;
            }
        }
    }

    out.extend_from_slice(&input[pos..]);
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::NAMED_ENTITIES;

    fn decoded(input: &[u8]) -> Vec<u8> {
        decode(input).into_owned()
    }

    #[test]
    fn plain_text_borrows() {
        assert!(matches!(decode(b"no references here"), Cow::Borrowed(_)));
        assert!(matches!(decode(b""), Cow::Borrowed(_)));
        assert!(matches!(decode(b"&amp;"), Cow::Owned(_)));
    }

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decoded(b"Fish &amp; Chips"), b"Fish & Chips");
        assert_eq!(decoded(b"&lt;b&gt;bold&lt;/b&gt;"), b"<b>bold</b>");
        assert_eq!(decoded(b"&quot;hi&quot; &apos;there&apos;"), b"\"hi\" 'there'");
        assert_eq!(decoded(b"&copy; 2004"), "\u{A9} 2004".as_bytes());
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(decoded(b"&#65;&#66;&#67;"), b"ABC");
        assert_eq!(decoded(b"&#x41;&#X42;"), b"AB");
        assert_eq!(decoded(b"snow: &#9731;"), "snow: \u{2603}".as_bytes());
        assert_eq!(decoded(b"&#x1F600;"), "\u{1F600}".as_bytes());
        assert_eq!(decoded(b"&#0;"), b"\0");
        assert_eq!(decoded(b"&#0000065;"), b"A");
    }

    #[test]
    fn adjacent_references_each_decode() {
        assert_eq!(decoded(b"a &amp;&amp; b"), b"a && b");
        assert_eq!(decoded(b"&lt;&#x2F;a&gt;"), b"</a>");
    }

    #[test]
    fn malformed_references_pass_through() {
        for input in [
            b"&amp".as_slice(),
            b"&;",
            b"&",
            b"tail &",
            b"&#;",
            b"&#x;",
            b"&#12x;",
            b"&# 65;",
            b"&#+65;",
            b"&#x110000;",
            b"&#4294967296;",
            b"&#xD800;",
            b"&unknownname;",
            b"&AMP;",
            b"100 & 200",
        ] {
            assert_eq!(decoded(input), input, "{:?}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn failed_marker_rescans_from_the_next_byte() {
        // The second `&` opens a valid reference even though the first
        // could not.
        assert_eq!(decoded(b"&&amp;"), b"&&");
        assert_eq!(decoded(b"&#&#65;"), b"&#A");
        assert_eq!(decoded(b"&amp&amp;"), b"&amp&");
    }

    #[test]
    fn surrounding_text_is_untouched() {
        assert_eq!(
            decoded("caf\u{E9} &amp; cr\u{E8}me".as_bytes()),
            "caf\u{E9} & cr\u{E8}me".as_bytes()
        );
        // Arbitrary non-UTF-8 bytes outside references survive.
        assert_eq!(decoded(b"\xFF&amp;\xFE"), b"\xFF&\xFE");
    }

    #[test]
    fn every_table_entry_decodes() {
        for &(name, replacement) in NAMED_ENTITIES {
            let mut input = vec![b'&'];
            input.extend_from_slice(name);
            assert_eq!(
                decoded(&input),
                replacement.as_bytes(),
                "&{}",
                String::from_utf8_lossy(name)
            );
        }
    }

    #[test]
    fn output_never_grows() {
        let inputs: [&[u8]; 6] = [
            b"&amp;&amp;&amp;",
            b"&#0;&#x10FFFF;",
            b"& &# &; &#x;",
            b"plain",
            b"",
            b"&thetasym;",
        ];
        for input in inputs {
            assert!(decoded(input).len() <= input.len());
        }
    }

    #[test]
    fn decode_into_appends_and_reports_length() {
        let mut out = b"seed:".to_vec();
        let appended = decode_into(b"&lt;x&gt;", &mut out);
        assert_eq!(appended, 3);
        assert_eq!(out, b"seed:<x>");

        let mut empty_out = Vec::new();
        assert_eq!(decode_into(b"", &mut empty_out), 0);
        assert!(empty_out.is_empty());
    }

    #[test]
    fn in_place_matches_separate_buffer_decode() {
        let inputs: [&[u8]; 10] = [
            b"Fish &amp; Chips",
            b"&lt;b&gt;&#9731;&lt;/b&gt;",
            b"&#x1F600; and &#65;",
            b"broken &#x110000; stays",
            b"&&amp;",
            b"&amp",
            b"no references at all",
            b"",
            b"&",
            b"&thetasym;&thetasym;",
        ];
        for input in inputs {
            let expected = decoded(input);
            let mut buf = input.to_vec();
            let len = decode_in_place(&mut buf);
            assert_eq!(&buf[..len], &expected[..], "{:?}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn in_place_leading_reference_lands_at_the_front() {
        let mut buf = b"&#9731;x".to_vec();
        let len = decode_in_place(&mut buf);
        assert_eq!(&buf[..len], "\u{2603}x".as_bytes());
    }

    #[test]
    fn decode_vec_truncates() {
        let mut buf = b"&amp; tail".to_vec();
        decode_vec(&mut buf);
        assert_eq!(buf, b"& tail");

        let mut untouched = b"plain".to_vec();
        decode_vec(&mut untouched);
        assert_eq!(untouched, b"plain");
    }

    #[test]
    fn decode_str_round_trips_utf8() {
        assert!(matches!(decode_str("caf\u{E9}"), Cow::Borrowed(_)));
        assert_eq!(decode_str("caf\u{E9} &amp; cr\u{E8}me"), "caf\u{E9} & cr\u{E8}me");
        assert_eq!(decode_str("&#x1F600;!"), "\u{1F600}!");
        assert_eq!(decode_str("&broken &#x; text"), "&broken &#x; text");
    }

    #[test]
    fn strict_accepts_what_lenient_decodes() {
        let ok = decode_strict(b"&lt;a&gt; &amp; &#x2603;").unwrap();
        assert_eq!(ok.as_ref(), "<a> & \u{2603}".as_bytes());
        assert!(matches!(decode_strict(b"plain"), Ok(Cow::Borrowed(_))));
    }

    #[test]
    fn strict_keeps_unknown_names_and_bare_markers() {
        assert_eq!(decode_strict(b"&unknownname; &amp").unwrap().as_ref(), b"&unknownname; &amp");
        assert_eq!(decode_strict(b"100 & 200").unwrap().as_ref(), b"100 & 200");
        // Numeric-shaped but never terminated: literal text, not an error.
        assert_eq!(decode_strict(b"&#x41").unwrap().as_ref(), b"&#x41");
    }

    #[test]
    fn strict_rejects_malformed_numeric_references() {
        let err = decode_strict(b"ab &#x110000; cd").unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(err.reason, "Invalid character reference");
        assert_eq!(err.to_string(), "Invalid character reference at byte 3");

        assert!(decode_strict(b"&#;").is_err());
        assert!(decode_strict(b"&#xD800;").is_err());
        assert!(decode_strict(b"&#12z;").is_err());
        // A later `;` still marks the reference as numeric-shaped.
        assert!(decode_strict(b"&# some text;").is_err());
    }
}
