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

//! [HPACK] implementation of the [HTTP/2 protocol].
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! # Introduction
//! HPACK compresses header fields by referring to entries of two tables. The
//! static table is defined by the RFC and is the same for every connection.
//! The dynamic table is built while header blocks are coded, so the encoder
//! of one endpoint and the decoder of its peer keep identical copies of it.
//!
//! Because the dynamic table is a dictionary shared with the peer, header
//! blocks must be coded strictly in connection order. An encoder or decoder
//! whose table diverged from the peer's cannot recover, the connection has to
//! be closed.
//!
//! Header field values that carry secrets can be sent with the
//! `Literal Header Field Never Indexed` representation, so that they are never
//! stored in a dynamic table (see [Probing Dynamic Table State]).
//!
//! [Probing Dynamic Table State]: https://www.rfc-editor.org/rfc/rfc7541.html#section-7.1

mod decoder;
mod encoder;
mod integer;
mod representation;
pub mod table;

pub use decoder::{DecoderBuilder, HpackDecoder};
pub use encoder::{EncoderBuilder, HpackEncoder};

/// Default `SETTINGS_HEADER_TABLE_SIZE` of `RFC9113 section-6.5.2`.
pub const DEFAULT_MAX_TABLE_SIZE: usize = 4096;

/// Default upper bound of a decoded header list.
pub const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 8192;
