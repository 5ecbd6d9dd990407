//! Elixir Term Conversion Utilities
//!
//! Converts decoder output to Elixir terms.

use rustler::{Env, NewBinary, Term};
use std::borrow::Cow;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Convert a batch of decoded outputs to a list of binaries - build in
/// reverse order with list_prepend to avoid an intermediate Vec
pub fn outputs_to_list<'a>(env: Env<'a>, outputs: &[Cow<'_, [u8]>]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for output in outputs.iter().rev() {
        list = list.list_prepend(bytes_to_binary(env, output));
    }
    list
}
