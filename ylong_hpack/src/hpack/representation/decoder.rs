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

use std::borrow::Cow;

use crate::error::HpackError;
use crate::hpack::integer::IntegerDecoder;
use crate::hpack::representation::{
    Name, PrefixBit, Representation, HUFFMAN_BIT, STRING_LENGTH_MASK,
};
use crate::huffman::huffman_decode;

/// Decoder implementation for decoding representation. Every time users call
/// `decode`, the `ReprDecoder` will try to decode a `Representation` from the
/// front of `buf`. Once `buf` has been fully decoded, `decode` returns `None`.
///
/// `buf` always holds a complete header block, so running out of octets in
/// the middle of a representation is an error.
///
/// ```text
///            +-------------+
///  buf ----> | First Octet | --(1xxxxxxx / 001xxxxx)--> Integer ----------+
///            +-------------+                                             |
///                   |                                                    |
///            (01xxxxxx / 0001xxxx / 0000xxxx)                            |
///                   |                                                    |
///                   V                                                    V
///         Index == 0 ? Name String : Name Index --> Value String --> Representation
/// ```
pub(crate) struct ReprDecoder<'a> {
    /// `buf` represents the bytes not decoded yet.
    buf: &'a [u8],
}

impl<'a> ReprDecoder<'a> {
    /// Creates a new `ReprDecoder`.
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Decodes the next `Representation` of `self.buf`.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation<'a>>, HpackError> {
        let prefix = match self.buf.first() {
            Some(byte) => PrefixBit::from_u8(*byte),
            None => return Ok(None),
        };
        let index = decode_integer(&mut self.buf, prefix.index_mask())?;

        let repr = match prefix {
            PrefixBit::INDEXED => Representation::Indexed { index },
            PrefixBit::SIZE_UPDATE => Representation::SizeUpdate { max_size: index },
            _ => {
                let name = match index {
                    0 => Name::Literal(decode_name(&mut self.buf)?),
                    index => Name::Index(index),
                };
                let value = decode_string(&mut self.buf)?;
                match prefix {
                    PrefixBit::LITERAL_WITH_INDEXING => {
                        Representation::LiteralWithIndexing { name, value }
                    }
                    PrefixBit::LITERAL_NEVER_INDEXED => {
                        Representation::LiteralNeverIndexed { name, value }
                    }
                    _ => Representation::LiteralWithoutIndexing { name, value },
                }
            }
        };
        Ok(Some(repr))
    }
}

/// Decodes a prefixed integer from the front of `buf`.
fn decode_integer(buf: &mut &[u8], mask: u8) -> Result<usize, HpackError> {
    let octets = *buf;
    let (first, mut rest) = octets
        .split_first()
        .ok_or(HpackError::MalformedInteger)?;
    let mut int = match IntegerDecoder::first_byte(*first, mask) {
        Ok(index) => {
            *buf = rest;
            return Ok(index);
        }
        Err(int) => int,
    };
    while let Some((byte, next)) = rest.split_first() {
        rest = next;
        if let Some(index) = int.next_byte(*byte)? {
            *buf = rest;
            return Ok(index);
        }
    }
    Err(HpackError::MalformedInteger)
}

/// Decodes a [String Literal] from the front of `buf`. Raw octets are
/// borrowed, Huffman coded octets are decoded into a new buffer.
///
/// [String Literal]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
fn decode_string<'a>(buf: &mut &'a [u8]) -> Result<Cow<'a, [u8]>, HpackError> {
    let huffman = match buf.first() {
        Some(byte) => byte & HUFFMAN_BIT == HUFFMAN_BIT,
        None => return Err(HpackError::MalformedString),
    };
    let len = decode_integer(buf, STRING_LENGTH_MASK)?;
    let remaining: &'a [u8] = *buf;
    if len > remaining.len() {
        return Err(HpackError::MalformedString);
    }
    let (octets, rest) = remaining.split_at(len);
    *buf = rest;

    match huffman {
        true => {
            let mut vec = Vec::new();
            huffman_decode(octets, &mut vec)?;
            Ok(Cow::Owned(vec))
        }
        false => Ok(Cow::Borrowed(octets)),
    }
}

/// Decodes a literal header name, which must not contain uppercase
/// characters (`RFC9113 section-8.2`).
fn decode_name<'a>(buf: &mut &'a [u8]) -> Result<Cow<'a, [u8]>, HpackError> {
    let name = decode_string(buf)?;
    match name.iter().any(u8::is_ascii_uppercase) {
        true => Err(HpackError::InvalidHeaderName),
        false => Ok(name),
    }
}
