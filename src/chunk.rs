// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Splitting of record data into DNS character-strings.
//!
//! A TXT rdata is a sequence of character-strings, each prefixed on the wire by
//! a one-octet length and so limited to 255 octets. Longer values are split into
//! consecutive strings, which resolvers present concatenated.

use std::num::NonZeroUsize;

/// Split `s` into consecutive byte slices of at most `max_len` octets.
///
/// Concatenating the slices reproduces `s`. Empty input yields no slices; the
/// update transmitter refuses to publish a record without character-strings.
///
/// ```rust
/// use diem_dns::chunk::chunk;
/// use std::num::NonZeroUsize;
///
/// let parts = chunk("abcdefg", NonZeroUsize::new(3).unwrap());
/// assert_eq!(parts, vec![&b"abc"[..], &b"def"[..], &b"g"[..]]);
/// ```
#[must_use]
pub fn chunk(s: &str, max_len: NonZeroUsize) -> Vec<&[u8]> {
    s.as_bytes().chunks(max_len.get()).collect()
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod chunk_tests;
