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

use crate::hpack::integer::IntegerEncoder;
use crate::hpack::representation::{Name, Representation, HUFFMAN_BIT, STRING_LENGTH_MASK};
use crate::huffman::{huffman_encode, huffman_encoded_len};

/// Encoder implementation for encoding representation. It appends the octets
/// of one `Representation` to the given buffer.
#[derive(Debug)]
pub(crate) struct ReprEncoder {
    use_huffman: bool,
}

impl ReprEncoder {
    /// Creates a new `ReprEncoder`. With `use_huffman`, string literals are
    /// Huffman coded whenever that makes them shorter.
    pub(crate) fn new(use_huffman: bool) -> Self {
        Self { use_huffman }
    }

    /// Encodes a `Representation` into `dst`.
    pub(crate) fn encode(&self, repr: &Representation<'_>, dst: &mut Vec<u8>) {
        let prefix = repr.prefix_bit();
        match repr {
            Representation::Indexed { index } => {
                IntegerEncoder::new(*index, prefix.index_mask(), prefix.bits()).encode(dst)
            }
            Representation::SizeUpdate { max_size } => {
                IntegerEncoder::new(*max_size, prefix.index_mask(), prefix.bits()).encode(dst)
            }
            Representation::LiteralWithIndexing { name, value }
            | Representation::LiteralWithoutIndexing { name, value }
            | Representation::LiteralNeverIndexed { name, value } => {
                match name {
                    Name::Index(index) => {
                        IntegerEncoder::new(*index, prefix.index_mask(), prefix.bits())
                            .encode(dst)
                    }
                    Name::Literal(octets) => {
                        dst.push(prefix.bits());
                        self.encode_string(octets, dst);
                    }
                }
                self.encode_string(value, dst);
            }
        }
    }

    /// Encodes a [String Literal], Huffman coded only if it is strictly
    /// shorter than the raw octets.
    ///
    /// [String Literal]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
    fn encode_string(&self, src: &[u8], dst: &mut Vec<u8>) {
        if self.use_huffman {
            let len = huffman_encoded_len(src);
            if len < src.len() {
                IntegerEncoder::new(len, STRING_LENGTH_MASK, HUFFMAN_BIT).encode(dst);
                huffman_encode(src, dst);
                return;
            }
        }
        IntegerEncoder::new(src.len(), STRING_LENGTH_MASK, 0x00).encode(dst);
        dst.extend_from_slice(src);
    }
}
