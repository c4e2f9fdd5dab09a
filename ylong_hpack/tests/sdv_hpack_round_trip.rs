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

use proptest::prelude::*;
use ylong_hpack::{DecoderBuilder, EncoderBuilder, HeaderField, HpackDecoder, HpackEncoder};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn header_field() -> impl Strategy<Value = HeaderField> {
    (
        prop_oneof![
            Just(":method".to_string()),
            Just(":path".to_string()),
            Just("cookie".to_string()),
            Just("authorization".to_string()),
            Just("content-type".to_string()),
            "[a-z][a-z0-9-]{0,15}",
        ],
        prop_oneof![
            Just("GET".to_string()),
            Just("/".to_string()),
            "[ -~]{0,32}",
            // Every `ISO-8859-1` character above `0x7F`, one octet each.
            "[ -~\u{80}-\u{ff}]{0,32}",
        ],
        any::<bool>(),
    )
        .prop_map(|(name, value, sensitive)| {
            HeaderField::new(name, value).with_sensitive(sensitive)
        })
}

fn header_blocks() -> impl Strategy<Value = Vec<(Option<usize>, Vec<HeaderField>)>> {
    proptest::collection::vec(
        (
            proptest::option::of(0usize..=4096),
            proptest::collection::vec(header_field(), 0..16),
        ),
        1..8,
    )
}

fn check_round_trip(mut encoder: HpackEncoder, blocks: &[(Option<usize>, Vec<HeaderField>)]) {
    let mut decoder = DecoderBuilder::new()
        .max_header_list_size(usize::MAX)
        .build();
    for (table_size, fields) in blocks {
        if let Some(size) = table_size {
            encoder.set_max_table_size(*size);
        }
        let mut block = Vec::new();
        encoder.encode_block(&mut block, fields).unwrap();

        let decoded = decoder.decode(&block).unwrap();
        assert_eq!(&decoded, fields);
        for (sent, received) in fields.iter().zip(decoded.iter()) {
            if sent.is_sensitive() {
                assert!(received.is_sensitive());
            }
        }

        assert_eq!(encoder.table().curr_size(), decoder.table().curr_size());
        assert_eq!(encoder.table().max_size(), decoder.table().max_size());
        assert!(encoder.table().iter().eq(decoder.table().iter()));
    }
}

proptest! {
    /// SDV test cases for `HpackEncoder` and `HpackDecoder`.
    ///
    /// # Brief
    /// 1. Encodes random header blocks with Huffman coding, changing the
    ///    table size between blocks.
    /// 2. Decodes every block with one `HpackDecoder`.
    /// 3. Checks the fields and both dynamic tables are the same.
    #[test]
    fn sdv_hpack_round_trip_huffman(blocks in header_blocks()) {
        init_tracing();
        check_round_trip(HpackEncoder::default(), &blocks);
    }

    /// SDV test cases for `HpackEncoder` and `HpackDecoder` without Huffman
    /// coding.
    ///
    /// # Brief
    /// 1. Encodes random header blocks with raw string literals.
    /// 2. Decodes every block with one `HpackDecoder`.
    /// 3. Checks the fields and both dynamic tables are the same.
    #[test]
    fn sdv_hpack_round_trip_raw(blocks in header_blocks()) {
        init_tracing();
        check_round_trip(EncoderBuilder::new().use_huffman(false).build(), &blocks);
    }

    /// SDV test cases for fields that must never be indexed.
    ///
    /// # Brief
    /// 1. Encodes random header blocks.
    /// 2. Checks no sensitive field and no field with a never indexed name is
    ///    in the dynamic table.
    #[test]
    fn sdv_hpack_never_indexed(blocks in header_blocks()) {
        // The same name and value may also be sent as a regular field.
        let regular: Vec<&HeaderField> = blocks
            .iter()
            .flat_map(|(_, fields)| fields)
            .filter(|field| !field.is_sensitive())
            .collect();

        let mut encoder = HpackEncoder::default();
        for (_, fields) in &blocks {
            let mut block = Vec::new();
            encoder.encode_block(&mut block, fields).unwrap();
            for field in fields
                .iter()
                .filter(|field| field.is_sensitive() && !regular.contains(field))
            {
                prop_assert!(encoder.table().find_full_match(field.name(), field.value()).is_none());
            }
            for name in ["authorization", "cookie", "proxy-authorization", "set-cookie"] {
                prop_assert_eq!(encoder.table().find_name_match(name), None);
            }
        }
    }
}

/// SDV test cases for a request and its response on one connection.
///
/// # Brief
/// 1. Encodes two requests with a client encoder, and a response with a
///    server encoder that has a smaller table.
/// 2. Decodes them with the peers' decoders.
/// 3. Checks the fields and the repeated fields are indexed.
#[test]
fn sdv_hpack_connection() {
    init_tracing();
    let mut client = HpackEncoder::default();
    let mut server_decoder = HpackDecoder::default();
    let mut server = EncoderBuilder::new().max_table_size(256).build();
    let mut client_decoder = DecoderBuilder::new().max_table_size(256).build();

    let request: Vec<HeaderField> = vec![
        (":method", "GET").into(),
        (":scheme", "https").into(),
        (":authority", "example.com").into(),
        (":path", "/index.html").into(),
        ("user-agent", "ylong").into(),
        ("cookie", "id=1").into(),
    ];

    let mut first = Vec::new();
    client.encode_block(&mut first, &request).unwrap();
    assert_eq!(server_decoder.decode(&first).unwrap(), request);

    let mut second = Vec::new();
    client.encode_block(&mut second, &request).unwrap();
    assert_eq!(server_decoder.decode(&second).unwrap(), request);
    // Everything but the cookie is an index now.
    assert!(second.len() < first.len());
    assert_eq!(second[..5], [0x82, 0x87, 0xbf, 0x85, 0xbe]);

    let response: Vec<HeaderField> = vec![
        (":status", "200").into(),
        ("content-type", "text/html").into(),
        ("set-cookie", "id=2").into(),
    ];
    let mut block = Vec::new();
    server.encode_block(&mut block, &response).unwrap();
    let decoded = client_decoder.decode(&block).unwrap();
    assert_eq!(decoded, response);
    assert!(decoded[2].is_sensitive());
    assert_eq!(client_decoder.table().len(), 1);
}

/// SDV test cases for values with `ISO-8859-1` characters in a small dynamic
/// table.
///
/// # Brief
/// 1. Creates an encoder and a decoder with a 100 octets table.
/// 2. Sends two fields that fill the table up to 99 octets, one of them with
///    characters above `U+007F`, then sends both again.
/// 3. Checks both tables keep both entries and the repeated fields are
///    indexed.
#[test]
fn sdv_hpack_latin1_table_size() {
    init_tracing();
    let mut encoder = EncoderBuilder::new().max_table_size(100).build();
    let mut decoder = DecoderBuilder::new().max_table_size(100).build();

    let fields: Vec<HeaderField> = vec![
        ("x", "\u{e5}\u{bb}o").into(),
        ("y", "a".repeat(30)).into(),
    ];
    for _ in 0..2 {
        let mut block = Vec::new();
        encoder.encode_block(&mut block, &fields).unwrap();
        assert_eq!(decoder.decode(&block).unwrap(), fields);
        assert_eq!(encoder.table().curr_size(), 99);
        assert_eq!(decoder.table().curr_size(), 99);
        assert_eq!(decoder.table().len(), 2);
    }

    let mut block = Vec::new();
    encoder.encode_block(&mut block, &fields).unwrap();
    assert_eq!(block, [0xbf, 0xbe]);
}
