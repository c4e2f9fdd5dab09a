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

//! `ylong_hpack` provides the [HPACK] header compression used by `HTTP/2`.
//!
//! The crate contains the static table, the dynamic table, the canonical
//! Huffman code and a stateful encoder/decoder pair. The frame layer hands
//! complete header blocks to [`HpackDecoder`] and gets compressed blocks from
//! [`HpackEncoder`]. Each side owns its own dynamic table, which must be driven
//! in connection order.
//!
//! # Examples
//!
//! ```
//! use ylong_hpack::{HeaderField, HpackDecoder, HpackEncoder};
//!
//! let mut encoder = HpackEncoder::default();
//! let mut decoder = HpackDecoder::default();
//!
//! let fields = vec![
//!     HeaderField::new(":method", "GET"),
//!     HeaderField::new(":path", "/index.html"),
//!     HeaderField::new("authorization", "Bearer secret"),
//! ];
//!
//! let mut block = Vec::new();
//! encoder.encode_block(&mut block, &fields).unwrap();
//!
//! let decoded = decoder.decode(&block).unwrap();
//! assert_eq!(decoded, fields);
//! ```
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html

pub mod error;
mod header;
pub mod hpack;
mod huffman;

pub(crate) mod util;

pub use error::HpackError;
pub use header::HeaderField;
pub use hpack::{DecoderBuilder, EncoderBuilder, HpackDecoder, HpackEncoder};
pub use util::header_names;
