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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! An encoded header field is either an index into the tables or a literal.
//! Literals come in three flavors that differ only in what they do to the
//! dynamic table: with incremental indexing, without indexing, and never
//! indexed. A fifth instruction, the dynamic table size update, carries no
//! header field at all.
//!
//! The leading bits of the first octet select the representation, so the
//! decoder resolves each one with a single match. Names and values of literals
//! are [String Literals], either raw octets or Huffman coded.
//!
//! [String Literals]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2

mod decoder;
mod encoder;

use std::borrow::Cow;

pub(crate) use decoder::ReprDecoder;
pub(crate) use encoder::ReprEncoder;

/// Definition and [binary format] of each of the different
/// [header field representations] and the [dynamic table size update]
/// instruction.
///
/// Octets borrow from the coded buffer when possible.
///
/// [binary format]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6
/// [header field representations]: https://www.rfc-editor.org/rfc/rfc7541.html#section-3.2
/// [dynamic table size update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Representation<'a> {
    /// [Indexed Header Field].
    ///
    /// [Indexed Header Field]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.1
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// [Literal Header Field with Incremental Indexing]. The field is appended
    /// to the header list and inserted into the dynamic table.
    ///
    /// [Literal Header Field with Incremental Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.1
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    ///
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |           0           |
    /// +---+---+-----------------------+
    /// | H |     Name Length (7+)      |
    /// +---+---------------------------+
    /// |  Name String (Length octets)  |
    /// +---+---------------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralWithIndexing { name: Name<'a>, value: Cow<'a, [u8]> },

    /// [Literal Header Field without Indexing]. The dynamic table is left
    /// untouched.
    ///
    /// [Literal Header Field without Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.2
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 0 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    /// A zero index is followed by the name string, as above.
    LiteralWithoutIndexing { name: Name<'a>, value: Cow<'a, [u8]> },

    /// [Literal Header Field Never Indexed]. The dynamic table is left
    /// untouched, and intermediaries **MUST** use the same representation
    /// when forwarding the field.
    ///
    /// [Literal Header Field Never Indexed]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.3
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 1 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    /// A zero index is followed by the name string, as above.
    LiteralNeverIndexed { name: Name<'a>, value: Cow<'a, [u8]> },

    /// [Dynamic Table Size Update].
    ///
    /// [Dynamic Table Size Update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---+---+-------------------+
    /// ```
    SizeUpdate { max_size: usize },
}

impl Representation<'_> {
    /// Gets the prefix bit of the `Representation`.
    pub(crate) const fn prefix_bit(&self) -> PrefixBit {
        match self {
            Self::Indexed { .. } => PrefixBit::INDEXED,
            Self::LiteralWithIndexing { .. } => PrefixBit::LITERAL_WITH_INDEXING,
            Self::SizeUpdate { .. } => PrefixBit::SIZE_UPDATE,
            Self::LiteralNeverIndexed { .. } => PrefixBit::LITERAL_NEVER_INDEXED,
            Self::LiteralWithoutIndexing { .. } => PrefixBit::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// Prefix bit of `Representation`. An integer is represented in two
/// parts: a prefix that fills the current octet and an optional list of octets
/// that are used if the integer value does not fit within the prefix.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Selects the representation of a first octet by its leading bits.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Gets the prefix bits as an octet.
    pub(crate) const fn bits(self) -> u8 {
        self.0
    }

    /// Gets the mask of the integer that follows the prefix bits.
    ///
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 1 | 1 | 1 | 1 | 1 |  SIZE_UPDATE
    /// +---+---+---+---+---+---+---+---+
    /// ```
    pub(crate) const fn index_mask(self) -> u8 {
        match self.0 {
            0x80 => 0x7f,
            0x40 => 0x3f,
            0x20 => 0x1f,
            _ => 0x0f,
        }
    }
}

/// Name of a literal `Representation`. It can be represented as string
/// literals or an index.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Name<'a> {
    Index(usize),
    Literal(Cow<'a, [u8]>),
}

/// String literals whose `H` bit is set are Huffman coded.
pub(crate) const HUFFMAN_BIT: u8 = 0x80;

/// Mask of the length of a string literal.
pub(crate) const STRING_LENGTH_MASK: u8 = 0x7f;
