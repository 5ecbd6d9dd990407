//! RustyEntities - Fast HTML/XML character reference decoding
//!
//! Surfaces:
//! - One-shot: decode / decode_str (zero-copy Cow when there is no `&`)
//! - In-place: decode_in_place / decode_vec (one buffer, no allocation)
//! - Strict: decode_strict (malformed numeric references become errors)
//! - Streaming: StreamDecoder (chunked input with bounded carry)
//! - Batch: decode_many (parallel via Rayon)
//!
//! Unknown and malformed references pass through verbatim in the default
//! lenient mode, and decoding never grows the text.

mod core;
mod parallel;
mod stream;

#[cfg(feature = "nif")]
mod resource;
#[cfg(feature = "nif")]
mod term;

pub use crate::core::decoder::{
    decode, decode_in_place, decode_into, decode_str, decode_strict, decode_vec, DecodeError,
};
pub use parallel::decode_many;
pub use stream::StreamDecoder;

#[cfg(feature = "nif")]
use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

#[cfg(feature = "nif")]
use resource::{StreamDecoderRef, StreamDecoderResource};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// One-Shot Decoding NIFs
// ============================================================================

/// Decode entity references in a binary
#[cfg(feature = "nif")]
#[rustler::nif(name = "decode")]
fn decode_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let decoded = decode(input.as_slice());
    Ok(term::bytes_to_binary(env, &decoded))
}

/// Decode in strict mode (returns {:ok, binary} or {:error, reason})
#[cfg(feature = "nif")]
#[rustler::nif(name = "decode_strict")]
fn decode_strict_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match decode_strict(input.as_slice()) {
        Ok(decoded) => Ok((term::ok(), term::bytes_to_binary(env, &decoded)).encode(env)),
        Err(e) => Ok((term::error(), e.to_string()).encode(env)),
    }
}

// ============================================================================
// Batch Decoding NIF
// ============================================================================

/// Decode multiple binaries in parallel
#[cfg(feature = "nif")]
#[rustler::nif(schedule = "DirtyCpu", name = "decode_many")]
fn decode_many_nif<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    let slices: Vec<&[u8]> = inputs.iter().map(|input| input.as_slice()).collect();
    let outputs = decode_many(&slices);
    Ok(term::outputs_to_list(env, &outputs))
}

// ============================================================================
// Streaming Decoder NIFs
// ============================================================================

/// Create a new streaming decoder
#[cfg(feature = "nif")]
#[rustler::nif]
fn stream_new() -> StreamDecoderRef {
    ResourceArc::new(StreamDecoderResource::new())
}

/// Create a streaming decoder with an explicit carry cap
#[cfg(feature = "nif")]
#[rustler::nif]
fn stream_new_with_carry_cap(cap: usize) -> StreamDecoderRef {
    ResourceArc::new(StreamDecoderResource::with_carry_cap(cap))
}

/// Feed a chunk to a streaming decoder, returning the decodable output
#[cfg(feature = "nif")]
#[rustler::nif]
fn stream_feed<'a>(
    env: Env<'a>,
    decoder: StreamDecoderRef,
    chunk: Binary<'a>,
) -> NifResult<Term<'a>> {
    let bytes = chunk.as_slice();
    let mut inner = decoder.inner.lock().unwrap();
    let mut out = Vec::with_capacity(bytes.len());
    inner.feed(bytes, &mut out);
    Ok(term::bytes_to_binary(env, &out))
}

/// Flush the held-back fragment and reset the decoder
#[cfg(feature = "nif")]
#[rustler::nif]
fn stream_finalize<'a>(env: Env<'a>, decoder: StreamDecoderRef) -> NifResult<Term<'a>> {
    let mut inner = decoder.inner.lock().unwrap();
    let mut out = Vec::new();
    inner.finish(&mut out);
    Ok(term::bytes_to_binary(env, &out))
}

/// Number of bytes currently held back waiting for more input
#[cfg(feature = "nif")]
#[rustler::nif]
fn stream_pending(decoder: StreamDecoderRef) -> usize {
    let inner = decoder.inner.lock().unwrap();
    inner.pending()
}

// ============================================================================
// NIF Initialization
// ============================================================================

#[cfg(feature = "nif")]
#[allow(non_local_definitions)]
fn load(env: Env, _info: Term) -> bool {
    let _ = env.register::<StreamDecoderResource>();
    true
}

#[cfg(feature = "nif")]
rustler::init!("Elixir.RustyEntities.Native", load = load);
