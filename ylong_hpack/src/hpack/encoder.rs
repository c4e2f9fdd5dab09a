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
use std::io::{self, Write};

#[cfg(feature = "tracing")]
use tracing::{instrument, trace};

use crate::header::{is_latin1, latin1_str, string_to_latin1, HeaderField};
use crate::hpack::representation::{Name, ReprEncoder, Representation};
use crate::hpack::table::{DynamicTable, TableIndex, TableSearcher};
use crate::hpack::DEFAULT_MAX_TABLE_SIZE;
use crate::util::header_names;

/// Names whose fields are always sent as `Literal Header Field Never Indexed`,
/// whatever their `sensitive` flag says.
const NEVER_INDEXED: [&str; 4] = ["authorization", "cookie", "proxy-authorization", "set-cookie"];

/// Encoder implementation of [`HPACK`].
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// A `HpackEncoder` writes header blocks into any `std::io::Write` sink. It
/// owns the dynamic table of one direction of a connection, so blocks must be
/// sent in the order they were encoded.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HpackEncoder;
///
/// let mut encoder = HpackEncoder::new(4096, false);
/// let mut block = Vec::new();
/// encoder.begin_header_block(&mut block).unwrap();
/// encoder.encode_header(&mut block, ":method", "GET", false).unwrap();
/// encoder.encode_header(&mut block, "x-custom", "v1", false).unwrap();
/// assert_eq!(block[0], 0x82);
/// assert_eq!(encoder.table().curr_size(), 8 + 2 + 32);
///
/// block.clear();
/// encoder.encode_header(&mut block, "x-custom", "v1", false).unwrap();
/// assert_eq!(block, [0xbe]);
/// ```
#[derive(Debug)]
pub struct HpackEncoder {
    table: DynamicTable,
    encoder: ReprEncoder,
    pending: Option<SizeUpdate>,
    buf: Vec<u8>,
}

// A table size change that has not been announced to the peer yet.
#[derive(Clone, Copy, Debug)]
struct SizeUpdate {
    min: usize,
    last: usize,
}

impl HpackEncoder {
    /// Creates a `HpackEncoder` with the given dynamic table size and Huffman
    /// usage.
    pub fn new(max_table_size: usize, use_huffman: bool) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_table_size),
            encoder: ReprEncoder::new(use_huffman),
            pending: None,
            buf: Vec::new(),
        }
    }

    /// Creates an `EncoderBuilder`.
    pub fn builder() -> EncoderBuilder {
        EncoderBuilder::new()
    }

    /// Changes the size of the dynamic table, usually after the peer updated
    /// `SETTINGS_HEADER_TABLE_SIZE`.
    ///
    /// The table is resized at once. The change is announced at the start of
    /// the next header block. If the size was lowered and raised again in
    /// between, the lowest size is announced first, so that the peer evicts
    /// the same entries.
    pub fn set_max_table_size(&mut self, max_table_size: usize) {
        if max_table_size == self.table.max_size() {
            return;
        }
        self.table.set_max_size(max_table_size);
        self.pending = Some(match self.pending {
            Some(update) => SizeUpdate {
                min: update.min.min(max_table_size),
                last: max_table_size,
            },
            None => SizeUpdate {
                min: max_table_size,
                last: max_table_size,
            },
        });
    }

    /// Starts a new header block, writing the pending dynamic table size
    /// updates to `dst`.
    pub fn begin_header_block<W: Write>(&mut self, dst: &mut W) -> io::Result<()> {
        let update = match self.pending.take() {
            Some(update) => update,
            None => return Ok(()),
        };
        #[cfg(feature = "tracing")]
        trace!(min = update.min, last = update.last, "dynamic table size update");

        self.buf.clear();
        if update.min < update.last {
            let repr = Representation::SizeUpdate {
                max_size: update.min,
            };
            self.encoder.encode(&repr, &mut self.buf);
        }
        let repr = Representation::SizeUpdate {
            max_size: update.last,
        };
        self.encoder.encode(&repr, &mut self.buf);
        dst.write_all(&self.buf)
    }

    /// Encodes one header field into `dst`.
    ///
    /// Fields that are `sensitive`, or whose name is one of `authorization`,
    /// `cookie`, `proxy-authorization` and `set-cookie`, are never indexed.
    /// Other fields are either indexed or added to the dynamic table.
    ///
    /// Names are sent in lowercase. Names and values are sent as
    /// `ISO-8859-1` octets.
    pub fn encode_header<W: Write>(
        &mut self,
        dst: &mut W,
        name: &str,
        value: &str,
        sensitive: bool,
    ) -> io::Result<()> {
        let name = lowercase(name);
        let name = match is_latin1(&name) {
            true => name,
            false => Cow::Owned(latin1_str(&name).into_owned()),
        };
        let value = latin1_str(value);
        if self.encode_to_buf(&name, &value, sensitive) {
            let name = match header_names::intern(name.as_bytes()) {
                Some(known) => Cow::Borrowed(known),
                None => Cow::Owned(name.into_owned()),
            };
            self.table.add(name, value);
        }
        dst.write_all(&self.buf)
    }

    /// Encodes one `HeaderField` into `dst`.
    pub fn encode_field<W: Write>(&mut self, dst: &mut W, field: &HeaderField) -> io::Result<()> {
        // A lowercase `ISO-8859-1` name is shared with the dynamic table as is.
        if has_uppercase(field.name()) || !is_latin1(field.name()) {
            return self.encode_header(dst, field.name(), field.value(), field.is_sensitive());
        }
        let value = latin1_str(field.value());
        if self.encode_to_buf(field.name(), &value, field.is_sensitive()) {
            self.table.add(field.shared_name(), value);
        }
        dst.write_all(&self.buf)
    }

    /// Encodes a complete header block into `dst`, pending size updates
    /// included.
    #[cfg_attr(feature = "tracing", instrument(skip_all, level = "trace"))]
    pub fn encode_block<W: Write>(&mut self, dst: &mut W, fields: &[HeaderField]) -> io::Result<()> {
        self.begin_header_block(dst)?;
        for field in fields {
            self.encode_field(dst, field)?;
        }
        Ok(())
    }

    /// Gets the dynamic table.
    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    // Fills `buf` with the representation of the field. Returns whether the
    // field must be added to the dynamic table.
    fn encode_to_buf(&mut self, name: &str, value: &str, sensitive: bool) -> bool {
        self.buf.clear();
        let searcher = TableSearcher::new(&self.table);
        let octets = string_to_latin1(value);

        let (repr, indexing) = if sensitive || NEVER_INDEXED.iter().any(|never| *never == name) {
            let name = match searcher.name_index(name) {
                Some(index) => Name::Index(index),
                None => Name::Literal(string_to_latin1(name)),
            };
            let repr = Representation::LiteralNeverIndexed {
                name,
                value: octets,
            };
            (repr, false)
        } else {
            match searcher.index(name, value) {
                Some(TableIndex::Header(index)) => (Representation::Indexed { index }, false),
                Some(TableIndex::HeaderName(index)) => (
                    Representation::LiteralWithIndexing {
                        name: Name::Index(index),
                        value: octets,
                    },
                    true,
                ),
                None => (
                    Representation::LiteralWithIndexing {
                        name: Name::Literal(string_to_latin1(name)),
                        value: octets,
                    },
                    true,
                ),
            }
        };
        self.encoder.encode(&repr, &mut self.buf);
        indexing
    }
}

fn has_uppercase(name: &str) -> bool {
    name.bytes().any(|b| b.is_ascii_uppercase())
}

fn lowercase(name: &str) -> Cow<'_, str> {
    match has_uppercase(name) {
        true => Cow::Owned(name.to_ascii_lowercase()),
        false => Cow::Borrowed(name),
    }
}

impl Default for HpackEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TABLE_SIZE, true)
    }
}

/// Builder of [`HpackEncoder`].
///
/// # Examples
///
/// ```
/// use ylong_hpack::EncoderBuilder;
///
/// let encoder = EncoderBuilder::new()
///     .max_table_size(256)
///     .use_huffman(false)
///     .build();
/// assert_eq!(encoder.table().max_size(), 256);
/// ```
#[derive(Clone, Debug)]
pub struct EncoderBuilder {
    max_table_size: usize,
    use_huffman: bool,
}

impl EncoderBuilder {
    /// Creates an `EncoderBuilder` with a 4096 octets table and Huffman
    /// coding.
    pub fn new() -> Self {
        Self {
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
            use_huffman: true,
        }
    }

    /// Sets the size of the dynamic table.
    pub fn max_table_size(mut self, size: usize) -> Self {
        self.max_table_size = size;
        self
    }

    /// Sets whether string literals may be Huffman coded.
    pub fn use_huffman(mut self, use_huffman: bool) -> Self {
        self.use_huffman = use_huffman;
        self
    }

    /// Builds the `HpackEncoder`.
    pub fn build(self) -> HpackEncoder {
        HpackEncoder::new(self.max_table_size, self.use_huffman)
    }
}

impl Default for EncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod ut_hpack_encoder {
    use crate::header::HeaderField;
    use crate::hpack::{EncoderBuilder, HpackEncoder};
    use crate::util::test_util::decode;

    // Every group of fields is passed as one header block, in the order of
    // `RFC7541`.
    macro_rules! hpack_test_case {
        (
            $enc: expr, $res: literal, $size: expr,
            { $($h: literal => $v: literal),* $(,)? } $(,)?
        ) => {
            let _encoder = $enc;
            let fields = vec![$(HeaderField::new($h, $v)),*];
            let mut vec = Vec::new();
            _encoder.encode_block(&mut vec, &fields).unwrap();
            assert_eq!(vec, decode($res).unwrap());
            assert_eq!(_encoder.table().curr_size(), $size);
        };
    }

    /// UT test cases for `HpackEncoder` with the examples of `RFC7541
    /// Appendix C`.
    ///
    /// # Brief
    /// 1. Creates a `HpackEncoder`.
    /// 2. Calls `HpackEncoder::encode_block()` with each header list in order.
    /// 3. Checks the encoded blocks and the dynamic table size.
    #[test]
    fn ut_hpack_encoder_rfc7541() {
        // C.2.1. Literal Header Field with Indexing
        hpack_test_case!(
            &mut HpackEncoder::new(4096, false),
            "400a637573746f6d2d6b65790d637573746f6d2d686561646572", 55,
            { "custom-key" => "custom-header" },
        );

        // C.2.4. Indexed Header Field
        hpack_test_case!(
            &mut HpackEncoder::new(4096, false),
            "82", 0,
            { ":method" => "GET" },
        );

        // C.3. Request Examples without Huffman Coding
        {
            let mut encoder = HpackEncoder::new(4096, false);
            // C.3.1. First Request
            hpack_test_case!(
                &mut encoder,
                "828684410f7777772e6578616d706c652e636f6d", 57,
                {
                    ":method" => "GET",
                    ":scheme" => "http",
                    ":path" => "/",
                    ":authority" => "www.example.com",
                },
            );

            // C.3.2. Second Request
            hpack_test_case!(
                &mut encoder,
                "828684be58086e6f2d6361636865", 110,
                {
                    ":method" => "GET",
                    ":scheme" => "http",
                    ":path" => "/",
                    ":authority" => "www.example.com",
                    "cache-control" => "no-cache",
                },
            );

            // C.3.3. Third Request
            hpack_test_case!(
                &mut encoder,
                "828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565", 164,
                {
                    ":method" => "GET",
                    ":scheme" => "https",
                    ":path" => "/index.html",
                    ":authority" => "www.example.com",
                    "custom-key" => "custom-value",
                },
            );
        }

        // C.4. Request Examples with Huffman Coding
        {
            let mut encoder = HpackEncoder::default();
            // C.4.1. First Request
            hpack_test_case!(
                &mut encoder,
                "828684418cf1e3c2e5f23a6ba0ab90f4ff", 57,
                {
                    ":method" => "GET",
                    ":scheme" => "http",
                    ":path" => "/",
                    ":authority" => "www.example.com",
                },
            );

            // C.4.2. Second Request
            hpack_test_case!(
                &mut encoder,
                "828684be5886a8eb10649cbf", 110,
                {
                    ":method" => "GET",
                    ":scheme" => "http",
                    ":path" => "/",
                    ":authority" => "www.example.com",
                    "cache-control" => "no-cache",
                },
            );

            // C.4.3. Third Request
            hpack_test_case!(
                &mut encoder,
                "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf", 164,
                {
                    ":method" => "GET",
                    ":scheme" => "https",
                    ":path" => "/index.html",
                    ":authority" => "www.example.com",
                    "custom-key" => "custom-value",
                },
            );
        }

        // C.5. Response Examples without Huffman Coding
        {
            let mut encoder = HpackEncoder::new(256, false);
            // C.5.1. First Response
            hpack_test_case!(
                &mut encoder,
                "4803333032580770726976617465611d\
                4d6f6e2c203231204f63742032303133\
                2032303a31333a323120474d546e1768\
                747470733a2f2f7777772e6578616d70\
                6c652e636f6d",
                222,
                {
                    ":status" => "302",
                    "cache-control" => "private",
                    "date" => "Mon, 21 Oct 2013 20:13:21 GMT",
                    "location" => "https://www.example.com",
                },
            );

            // C.5.2. Second Response
            hpack_test_case!(
                &mut encoder,
                "4803333037c1c0bf", 222,
                {
                    ":status" => "307",
                    "cache-control" => "private",
                    "date" => "Mon, 21 Oct 2013 20:13:21 GMT",
                    "location" => "https://www.example.com",
                },
            );
        }
    }

    /// UT test cases for fields that must never be indexed.
    ///
    /// # Brief
    /// 1. Encodes sensitive fields and fields with the never indexed names.
    /// 2. Checks the `Literal Header Field Never Indexed` representation is
    ///    used and the dynamic table stays empty.
    #[test]
    fn ut_hpack_encoder_never_indexed() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut vec = Vec::new();

        // authorization is static index 23.
        encoder
            .encode_header(&mut vec, "authorization", "Bearer x", false)
            .unwrap();
        assert_eq!(vec, decode("1f08 08 4265617265722078").unwrap());

        vec.clear();
        encoder.encode_header(&mut vec, "cookie", "", false).unwrap();
        assert_eq!(vec, decode("1f11 00").unwrap());

        vec.clear();
        let field = HeaderField::new("x-token", "abc").with_sensitive(true);
        encoder.encode_field(&mut vec, &field).unwrap();
        assert_eq!(vec, decode("10 07782d746f6b656e 03616263").unwrap());

        // Sending it twice does not turn it into an index.
        vec.clear();
        encoder.encode_field(&mut vec, &field).unwrap();
        assert_eq!(vec, decode("10 07782d746f6b656e 03616263").unwrap());

        assert!(encoder.table().is_empty());
    }

    /// UT test cases for fields that are added to the dynamic table.
    ///
    /// # Brief
    /// 1. Encodes the same field twice, then the same name with another
    ///    value.
    /// 2. Checks the literal, index and name index representations.
    #[test]
    fn ut_hpack_encoder_indexing() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut vec = Vec::new();

        encoder.encode_header(&mut vec, "x-custom", "v1", false).unwrap();
        assert_eq!(vec, decode("40 08782d637573746f6d 027631").unwrap());
        assert_eq!(encoder.table().curr_size(), 8 + 2 + 32);

        vec.clear();
        encoder.encode_header(&mut vec, "x-custom", "v1", false).unwrap();
        assert_eq!(vec, [0xbe]);

        vec.clear();
        encoder.encode_header(&mut vec, "x-custom", "v2", false).unwrap();
        assert_eq!(vec, decode("7e 027632").unwrap());
        assert_eq!(encoder.table().len(), 2);

        // Static name, new value.
        vec.clear();
        encoder.encode_header(&mut vec, ":path", "/sample", false).unwrap();
        assert_eq!(vec, decode("44 072f73616d706c65").unwrap());
        assert_eq!(encoder.table().find_full_match(":path", "/sample"), Some(62));
    }

    /// UT test cases for `HpackEncoder::set_max_table_size`.
    ///
    /// # Brief
    /// 1. Changes the dynamic table size between header blocks.
    /// 2. Checks the size updates written by `begin_header_block`.
    #[test]
    fn ut_hpack_encoder_size_update() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut vec = Vec::new();

        encoder.set_max_table_size(4096);
        encoder.begin_header_block(&mut vec).unwrap();
        assert!(vec.is_empty());

        // Lowered, then raised: both are announced.
        encoder.encode_header(&mut vec, "x-custom", "v1", false).unwrap();
        encoder.set_max_table_size(0);
        assert!(encoder.table().is_empty());
        encoder.set_max_table_size(4096);
        vec.clear();
        encoder.begin_header_block(&mut vec).unwrap();
        assert_eq!(vec, decode("20 3fe11f").unwrap());

        // Only once.
        vec.clear();
        encoder.begin_header_block(&mut vec).unwrap();
        assert!(vec.is_empty());

        // Lowered twice: only the last size is announced.
        encoder.set_max_table_size(1024);
        encoder.set_max_table_size(512);
        encoder
            .encode_block(&mut vec, &[HeaderField::new(":method", "GET")])
            .unwrap();
        assert_eq!(vec, decode("3fe103 82").unwrap());
        assert_eq!(encoder.table().max_size(), 512);
    }

    /// UT test cases for names that are not lowercase.
    ///
    /// # Brief
    /// 1. Encodes fields whose names contain uppercase letters.
    /// 2. Checks the names are sent and indexed in lowercase, and that
    ///    `Cookie` is never indexed.
    #[test]
    fn ut_hpack_encoder_uppercase_name() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut vec = Vec::new();

        encoder.encode_header(&mut vec, "X-Foo", "1", false).unwrap();
        assert_eq!(vec, decode("40 05782d666f6f 0131").unwrap());
        assert_eq!(encoder.table().find_full_match("x-foo", "1"), Some(62));

        vec.clear();
        encoder.encode_header(&mut vec, "Cookie", "", false).unwrap();
        assert_eq!(vec, decode("1f11 00").unwrap());

        // content-type is static index 31.
        vec.clear();
        let field = HeaderField::new("Content-Type", "text/html");
        encoder.encode_field(&mut vec, &field).unwrap();
        assert_eq!(vec, decode("5f 09746578742f68746d6c").unwrap());
        assert_eq!(encoder.table().get(62).unwrap().name(), "content-type");
        assert_eq!(encoder.table().len(), 2);
    }

    /// UT test cases for values with characters above `U+007F`.
    ///
    /// # Brief
    /// 1. Encodes values holding `ISO-8859-1` characters, then a value and a
    ///    name holding a character above `U+00FF`.
    /// 2. Checks one octet is sent per character, that the dynamic table
    ///    counts octets and stores the `?` the peer decodes.
    #[test]
    fn ut_hpack_encoder_latin1_value() {
        let mut encoder = HpackEncoder::new(4096, false);
        let mut vec = Vec::new();

        encoder
            .encode_header(&mut vec, "x", "\u{e5}\u{bb}o", false)
            .unwrap();
        assert_eq!(vec, decode("40 0178 03e5bb6f").unwrap());
        assert_eq!(encoder.table().curr_size(), 1 + 3 + 32);

        vec.clear();
        let field = HeaderField::new("y", "\u{20ac}1");
        encoder.encode_field(&mut vec, &field).unwrap();
        assert_eq!(vec, decode("40 0179 023f31").unwrap());
        assert_eq!(encoder.table().get(62).unwrap().value(), "?1");
        assert_eq!(encoder.table().curr_size(), 36 + 1 + 2 + 32);

        vec.clear();
        let field = HeaderField::new("\u{20ac}", "1");
        encoder.encode_field(&mut vec, &field).unwrap();
        assert_eq!(vec, decode("40 013f 0131").unwrap());
        assert_eq!(encoder.table().get(62).unwrap().name(), "?");
    }

    /// UT test cases for `EncoderBuilder`.
    ///
    /// # Brief
    /// 1. Builds encoders with and without Huffman coding.
    /// 2. Checks the encoded string literals.
    #[test]
    fn ut_encoder_builder() {
        let mut vec = Vec::new();
        let mut encoder = EncoderBuilder::new().use_huffman(false).build();
        encoder
            .encode_header(&mut vec, ":authority", "www.example.com", false)
            .unwrap();
        assert_eq!(vec, decode("410f7777772e6578616d706c652e636f6d").unwrap());

        vec.clear();
        let mut encoder = EncoderBuilder::default().max_table_size(0).build();
        encoder
            .encode_header(&mut vec, ":authority", "www.example.com", false)
            .unwrap();
        assert_eq!(vec, decode("418cf1e3c2e5f23a6ba0ab90f4ff").unwrap());
        assert!(encoder.table().is_empty());
    }
}
