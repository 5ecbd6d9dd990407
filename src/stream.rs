//! Streaming entity decoding
//!
//! Stateful decoder that processes text in chunks with bounded carry. A
//! reference body never contains a second `&`, so only the trailing bytes
//! after the last undecided `&` can change meaning when more input arrives;
//! everything before that point decodes now, and the output over a whole
//! stream is byte-identical to a one-shot decode of the concatenated input.

use memchr::{memchr, memrchr};

use crate::core::decoder::decode_into;
use crate::core::table::MAX_NAME_LEN;

/// Default cap on the carried potential-reference fragment. Large enough
/// for any named entity and any plausible numeric reference; a fragment
/// that outgrows it is flushed as literal text.
const DEFAULT_CARRY_CAP: usize = 64;

/// Stateful chunked entity decoder
pub struct StreamDecoder {
    /// Trailing bytes that may still grow into a reference
    pending: Vec<u8>,
    /// Flush threshold for the carried fragment
    carry_cap: usize,
}

impl StreamDecoder {
    /// Create a streaming decoder with the default carry cap.
    pub fn new() -> Self {
        Self::with_carry_cap(DEFAULT_CARRY_CAP)
    }

    /// Create a streaming decoder with an explicit carry cap.
    ///
    /// The cap is raised to at least the longest named entity so chunking
    /// can never break a reference the table knows about. A numeric
    /// reference spelled with more digits than the cap allows is flushed
    /// as literal text instead of decoded; this is the one divergence from
    /// one-shot decoding, and it is deliberate so an adversarial stream
    /// cannot force unbounded buffering.
    pub fn with_carry_cap(cap: usize) -> Self {
        StreamDecoder {
            pending: Vec::new(),
            carry_cap: cap.max(MAX_NAME_LEN + 1),
        }
    }

    /// Number of bytes currently held back waiting for more input.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Feed the next chunk, appending all now-decidable output to `out`.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        self.pending.extend_from_slice(chunk);
        let boundary = self.safe_boundary();
        if boundary == 0 {
            return;
        }
        decode_into(&self.pending[..boundary], out);
        self.pending.drain(..boundary);
    }

    /// Flush the held-back fragment, appending it to `out`, and reset.
    ///
    /// Whatever is still pending at end of input has no terminating `;`,
    /// so a one-shot decode would emit it verbatim as well.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        out.append(&mut self.pending);
    }

    /// Length of the prefix that decodes identically with or without the
    /// bytes that may arrive later.
    fn safe_boundary(&self) -> usize {
        let buf = &self.pending[..];
        let amp = match memrchr(b'&', buf) {
            Some(position) => position,
            None => return buf.len(),
        };
        let tail = &buf[amp + 1..];

        // A `;` after the last `&` closes whatever reference it could
        // open; nothing later input brings can reach back past it.
        if memchr(b';', tail).is_some() {
            return buf.len();
        }
        // A byte outside [A-Za-z0-9#] can appear in no reference body, so
        // this `&` is already decided as literal text.
        if !tail.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'#') {
            return buf.len();
        }
        // Still growing. Hold the fragment back unless it is too long to
        // be worth waiting for.
        if buf.len() - amp > self.carry_cap {
            return buf.len();
        }
        amp
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
