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

//! Fuzz target for `HpackDecoder`.
//!
//! The input is split in two header blocks at its first byte, so that the
//! second block runs against the dynamic table left by the first one.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_hpack_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use ylong_hpack::{HpackDecoder, HpackError};

const MAX_TABLE_SIZE: usize = 4096;
const MAX_HEADER_LIST_SIZE: usize = 16384;

fuzz_target!(|data: &[u8]| {
    let mut decoder = HpackDecoder::new(MAX_TABLE_SIZE, MAX_HEADER_LIST_SIZE);
    let (split, blocks) = match data.split_first() {
        Some((split, blocks)) => (*split as usize, blocks),
        None => return,
    };
    let first = split.min(blocks.len());

    for (offset, length) in [(0, first), (first, blocks.len() - first)] {
        match decoder.decode_block(blocks, offset, length) {
            Ok(fields) => {
                let size: usize = fields.iter().map(|field| field.size()).sum();
                assert!(size <= MAX_HEADER_LIST_SIZE);
            }
            Err(e) => assert_eq!(e.error_code(), HpackError::COMPRESSION_ERROR),
        }
        assert!(decoder.table().curr_size() <= decoder.table().max_size());
    }
});
