//! Core decoding primitives
//!
//! This module contains the fundamental building blocks for entity decoding:
//! - Table: static byte-sorted named-entity table with binary-search lookup
//! - Charref: decimal and hex numeric character reference parsing
//! - Encoding: Unicode scalar to UTF-8 with byte-count reporting
//! - Decoder: the scanning engine with Cow, in-place and strict surfaces

pub mod charref;
pub mod decoder;
pub mod encoding;
pub mod table;
