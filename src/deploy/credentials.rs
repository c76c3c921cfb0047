// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Database credential generation.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

/// ASCII letters, digits and punctuation
pub const CREDENTIAL_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
ABCDEFGHIJKLMNOPQRSTUVWXYZ\
0123456789\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Generate a random credential of `length` characters using the OS random source.
pub fn generate_credential(length: usize) -> String {
    assert!(length > 0, "credential length must be positive");

    (0..length)
        .filter_map(|_| CREDENTIAL_CHARSET.choose(&mut OsRng))
        .map(|&b| b as char)
        .collect()
}
