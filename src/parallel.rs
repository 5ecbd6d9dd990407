//! Parallel batch decoding
//!
//! Uses Rayon to decode many independent inputs at once. Inputs are fully
//! independent, so this is a plain data-parallel map; output order matches
//! input order.

use rayon::prelude::*;
use std::borrow::Cow;

use crate::core::decoder::decode;

/// Decode multiple inputs in parallel, preserving order.
///
/// Inputs without any `&` come back borrowed, exactly as with [`decode`].
pub fn decode_many<'a>(inputs: &[&'a [u8]]) -> Vec<Cow<'a, [u8]>> {
    inputs.par_iter().map(|input| decode(input)).collect()
}
