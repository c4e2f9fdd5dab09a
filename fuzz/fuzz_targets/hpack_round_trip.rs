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

//! Fuzz target for `HpackEncoder` and `HpackDecoder` together.
//!
//! Whatever the decoder accepts is encoded again and must decode to the same
//! header list, with the dynamic tables of both sides in step.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_hpack_round_trip
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use ylong_hpack::{DecoderBuilder, HpackDecoder, HpackEncoder};

fuzz_target!(|data: &[u8]| {
    let fields = match HpackDecoder::default().decode(data) {
        Ok(fields) => fields,
        Err(_) => return,
    };

    for use_huffman in [false, true] {
        let mut encoder = HpackEncoder::new(4096, use_huffman);
        let mut decoder = DecoderBuilder::new()
            .max_header_list_size(usize::MAX)
            .build();

        // Twice, so that the second block refers to the dynamic table.
        for _ in 0..2 {
            let mut block = Vec::new();
            if encoder.encode_block(&mut block, &fields).is_err() {
                return;
            }
            let decoded = decoder.decode(&block);
            assert_eq!(decoded.as_ref(), Ok(&fields));
            assert_eq!(encoder.table().curr_size(), decoder.table().curr_size());
        }
    }
});
