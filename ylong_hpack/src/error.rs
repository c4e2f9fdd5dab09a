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

//! Errors that may occur in this crate.
//!
//! [`HpackError`] covers every failure of decoding a header block. All of
//! them are fatal to the block, and the connection layer is expected to treat
//! them as a connection error of type `COMPRESSION_ERROR`.
//!
//! Encoding has no error states of its own, only `std::io::Error` of the
//! output sink is propagated.

use thiserror::Error;

use crate::huffman::HuffmanDecodeError;

/// Errors that may occur when decoding a header block.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum HpackError {
    /// An integer is truncated, or its continuation bytes exceed the 28-bit
    /// shift budget.
    #[error("malformed integer")]
    MalformedInteger,

    /// A string literal is truncated or its length exceeds the remaining
    /// buffer.
    #[error("malformed string literal")]
    MalformedString,

    /// Index `0`, or an index beyond the current static and dynamic table
    /// occupancy.
    #[error("invalid table index {0}")]
    InvalidIndex(usize),

    /// A literal header name contains uppercase ASCII.
    #[error("invalid header name")]
    InvalidHeaderName,

    /// A dynamic table size update follows a header field of the same block.
    #[error("dynamic table size update after a header field")]
    OutOfOrderTableUpdate,

    /// A dynamic table size update exceeds the size allowed by the local
    /// setting.
    #[error("dynamic table size update {size} exceeds the maximum {max}")]
    TableSizeTooLarge {
        /// Size requested by the peer.
        size: usize,
        /// Size allowed by `SETTINGS_HEADER_TABLE_SIZE`.
        max: usize,
    },

    /// The decoded header list exceeds `SETTINGS_MAX_HEADER_LIST_SIZE`.
    #[error("header list too large")]
    HeaderListTooLarge,

    /// Trailing bits of a Huffman string are not a valid `EOS` prefix.
    #[error("invalid huffman padding")]
    InvalidHuffmanPadding,

    /// A Huffman string contains the `EOS` symbol.
    #[error("invalid huffman code")]
    InvalidHuffmanCode,

    /// The requested range lies outside the input buffer.
    #[error("header block range out of bounds")]
    InvalidRange,
}

impl HpackError {
    /// `COMPRESSION_ERROR` of `RFC9113 section-7`.
    pub const COMPRESSION_ERROR: u32 = 0x09;

    /// Gets the `HTTP/2` error code the connection must be closed with.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::HpackError;
    ///
    /// assert_eq!(HpackError::MalformedInteger.error_code(), 0x09);
    /// ```
    pub fn error_code(&self) -> u32 {
        Self::COMPRESSION_ERROR
    }
}

impl From<HuffmanDecodeError> for HpackError {
    fn from(err: HuffmanDecodeError) -> Self {
        match err {
            HuffmanDecodeError::InvalidHuffmanCode => HpackError::InvalidHuffmanCode,
            HuffmanDecodeError::InvalidPadding => HpackError::InvalidHuffmanPadding,
        }
    }
}
