//! Unicode scalar to UTF-8
//!
//! Thin wrappers over the standard encoder that report how many bytes were
//! produced: one byte through U+007F, two through U+07FF, three through
//! U+FFFF, four through U+10FFFF. The byte count feeds the decode engine's
//! cursor arithmetic.

/// Append the UTF-8 encoding of `c` to `out`, returning the byte count.
pub(crate) fn push_utf8(out: &mut Vec<u8>, c: char) -> usize {
    let mut buf = [0u8; 4];
    let encoded = c.encode_utf8(&mut buf);
    out.extend_from_slice(encoded.as_bytes());
    encoded.len()
}

/// Write the UTF-8 encoding of `c` into `buf` at offset `at`, returning the
/// byte count. The caller guarantees `at + c.len_utf8() <= buf.len()`.
pub(crate) fn write_utf8_at(buf: &mut [u8], at: usize, c: char) -> usize {
    let mut tmp = [0u8; 4];
    let encoded = c.encode_utf8(&mut tmp);
    buf[at..at + encoded.len()].copy_from_slice(encoded.as_bytes());
    encoded.len()
}
