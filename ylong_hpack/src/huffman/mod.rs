// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [Huffman coding] implementation of the HTTP/2 protocol.
//!
//! [Huffman Coding]: https://en.wikipedia.org/wiki/Huffman_coding
//!
//! # Huffman code in Http/2
//! There is a table of Huffman code in `RFC7541`. This [Huffman code] was
//! generated from statistics obtained on a large sample of HTTP headers. It is
//! a canonical Huffman code with some tweaking to ensure that no symbol has a
//! unique code length.
//!
//! Encoding pads the last octet with the most significant bits of the `EOS`
//! code. Decoding accepts such a padding only when it is shorter than 8 bits.
//!
//! [Huffman Code]: https://www.rfc-editor.org/rfc/rfc7541.html#ref-HUFFMAN

mod consts;

use std::sync::OnceLock;

use consts::{EOS, HUFFMAN_ENCODE};
use thiserror::Error;

/// Gets the length of the Huffman code of `src` in octets, padding included.
pub(crate) fn huffman_encoded_len(src: &[u8]) -> usize {
    let bits = src
        .iter()
        .map(|byte| HUFFMAN_ENCODE[*byte as usize].1 as usize)
        .sum::<usize>();
    (bits + 7) >> 3
}

/// Converts a string to a Huffman code, and then put it into the
/// specified `Vec<u8>`.
pub(crate) fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // `state` keeps the bits not written yet in its lowest `unwritten` bits.
    // A code is at most 30 bits long, so at most 37 bits are ever pending.
    let mut state = 0u64;
    let mut unwritten = 0u32;

    dst.reserve(huffman_encoded_len(src));
    for byte in src.iter() {
        let (code, nbits) = HUFFMAN_ENCODE[*byte as usize];
        state = (state << nbits) | code as u64;
        unwritten += nbits as u32;
        while unwritten >= 8 {
            unwritten -= 8;
            dst.push((state >> unwritten) as u8);
        }
    }

    if unwritten > 0 {
        dst.push(((state << (8 - unwritten)) as u8) | (0xff >> unwritten));
    }
}

/// Converts a Huffman code into a literal string at one time, and then put it
/// into the specified `Vec<u8>`.
pub(crate) fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HuffmanDecodeError> {
    // The input is consumed 4 bits at a time. A state is an internal node of
    // the code tree, the root being state 0. Codes are at least 5 bits long,
    // so one nibble decodes at most one byte.
    let table = decode_table();
    let mut state = 0usize;
    let mut accepted = true;

    dst.reserve(src.len() + (src.len() >> 1));
    for byte in src.iter() {
        for nibble in [byte >> 4, byte & 0x0f] {
            let entry = &table[state][nibble as usize];
            if entry.flags & FAILED != 0 {
                return Err(HuffmanDecodeError::InvalidHuffmanCode);
            }
            if entry.flags & DECODED != 0 {
                dst.push(entry.byte);
            }
            state = entry.next as usize;
            accepted = entry.flags & ACCEPTED != 0;
        }
    }

    match accepted {
        true => Ok(()),
        false => Err(HuffmanDecodeError::InvalidPadding),
    }
}

/// Possible errors in Huffman decoding operations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub(crate) enum HuffmanDecodeError {
    /// The string contains the `EOS` symbol.
    #[error("invalid huffman code")]
    InvalidHuffmanCode,

    /// The trailing bits are not an `EOS` prefix shorter than 8 bits.
    #[error("invalid huffman padding")]
    InvalidPadding,
}

/// A symbol is decoded by this transition.
const DECODED: u8 = 0x1;
/// The bits consumed since the last decoded symbol form a valid padding.
const ACCEPTED: u8 = 0x2;
/// The transition runs into `EOS`.
const FAILED: u8 = 0x4;

#[derive(Clone, Copy, Default)]
struct DecodeEntry {
    next: u16,
    byte: u8,
    flags: u8,
}

#[derive(Clone, Copy)]
enum Child {
    Empty,
    Node(usize),
    Leaf(usize),
}

fn decode_table() -> &'static [[DecodeEntry; 16]] {
    static DECODE_TABLE: OnceLock<Vec<[DecodeEntry; 16]>> = OnceLock::new();
    DECODE_TABLE.get_or_init(build_decode_table)
}

fn build_decode_table() -> Vec<[DecodeEntry; 16]> {
    let tree = build_tree();

    // A state is a valid end state when it is the root, or when it was reached
    // from the root by at most 7 one bits.
    let mut accepting = vec![false; tree.len()];
    let mut node = 0;
    for depth in 0..8 {
        accepting[node] = true;
        match tree[node][1] {
            Child::Node(next) if depth < 7 => node = next,
            _ => break,
        }
    }

    let mut table = vec![[DecodeEntry::default(); 16]; tree.len()];
    for (state, row) in table.iter_mut().enumerate() {
        for (nibble, entry) in row.iter_mut().enumerate() {
            let mut node = state;
            for shift in (0..4).rev() {
                match tree[node][(nibble >> shift) & 1] {
                    Child::Node(next) => node = next,
                    Child::Leaf(symbol) if symbol != EOS => {
                        entry.byte = symbol as u8;
                        entry.flags |= DECODED;
                        node = 0;
                    }
                    _ => {
                        entry.flags |= FAILED;
                        break;
                    }
                }
            }
            if entry.flags & FAILED == 0 {
                entry.next = node as u16;
                if accepting[node] {
                    entry.flags |= ACCEPTED;
                }
            }
        }
    }
    table
}

/// Builds the code tree. Every item is an internal node, `0` is the root.
fn build_tree() -> Vec<[Child; 2]> {
    let mut tree = vec![[Child::Empty; 2]];
    for (symbol, (code, nbits)) in HUFFMAN_ENCODE.iter().enumerate() {
        let mut node = 0;
        for shift in (0..*nbits).rev() {
            let bit = ((code >> shift) & 1) as usize;
            if shift == 0 {
                tree[node][bit] = Child::Leaf(symbol);
                break;
            }
            node = match tree[node][bit] {
                Child::Node(next) => next,
                _ => {
                    tree.push([Child::Empty; 2]);
                    let next = tree.len() - 1;
                    tree[node][bit] = Child::Node(next);
                    next
                }
            };
        }
    }
    tree
}
