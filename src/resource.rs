//! ResourceArc Wrappers
//!
//! Persistent state for streaming decoders held across NIF calls.

use crate::stream::StreamDecoder;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for StreamDecoder that can be stored in a ResourceArc
pub struct StreamDecoderResource {
    pub inner: Mutex<StreamDecoder>,
}

impl StreamDecoderResource {
    pub fn new() -> Self {
        StreamDecoderResource {
            inner: Mutex::new(StreamDecoder::new()),
        }
    }

    pub fn with_carry_cap(cap: usize) -> Self {
        StreamDecoderResource {
            inner: Mutex::new(StreamDecoder::with_carry_cap(cap)),
        }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for StreamDecoderResource {}

impl Default for StreamDecoderResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for the ResourceArc
pub type StreamDecoderRef = ResourceArc<StreamDecoderResource>;
