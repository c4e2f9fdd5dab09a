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

#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

use crate::error::HpackError;
use crate::header::{latin1_to_string, HeaderField};
use crate::hpack::representation::{Name, ReprDecoder, Representation};
use crate::hpack::table::{DynamicTable, TableSearcher};
use crate::hpack::{DEFAULT_MAX_HEADER_LIST_SIZE, DEFAULT_MAX_TABLE_SIZE};
use crate::util::header_names;

/// Decoder implementation of [`HPACK`].
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// A `HpackDecoder` turns complete header blocks into ordered lists of header
/// fields. It owns the dynamic table of one direction of a connection, so the
/// blocks must be passed in the order they were received.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HpackDecoder;
///
/// let mut decoder = HpackDecoder::default();
/// // C.2.1. Literal Header Field with Indexing
/// let block = b"\x40\x0acustom-key\x0dcustom-header";
/// let fields = decoder.decode(block).unwrap();
/// assert_eq!(fields[0].name(), "custom-key");
/// assert_eq!(fields[0].value(), "custom-header");
/// assert_eq!(decoder.table().curr_size(), 55);
/// ```
#[derive(Debug)]
pub struct HpackDecoder {
    table: DynamicTable,
    max_table_size: usize,
    max_header_list_size: usize,
}

impl HpackDecoder {
    /// Creates a `HpackDecoder` with the given `SETTINGS_HEADER_TABLE_SIZE`
    /// and `SETTINGS_MAX_HEADER_LIST_SIZE`.
    pub fn new(max_table_size: usize, max_header_list_size: usize) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_table_size),
            max_table_size,
            max_header_list_size,
        }
    }

    /// Creates a `DecoderBuilder`.
    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    /// Decodes a complete header block.
    ///
    /// Any error is fatal to the block and no partial result is returned. The
    /// dynamic table may still have been changed by the representations that
    /// preceded the error.
    pub fn decode(&mut self, buf: &[u8]) -> Result<Vec<HeaderField>, HpackError> {
        self.decode_block(buf, 0, buf.len())
    }

    /// Decodes the header block stored in `buf[offset..offset + length]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{HpackDecoder, HpackError};
    ///
    /// let mut decoder = HpackDecoder::default();
    /// let frame = [0x00, 0x00, 0x82, 0x84];
    /// let fields = decoder.decode_block(&frame, 2, 2).unwrap();
    /// assert_eq!(fields[0].value(), "GET");
    /// assert_eq!(fields[1].value(), "/");
    ///
    /// assert_eq!(decoder.decode_block(&frame, 3, 2), Err(HpackError::InvalidRange));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(skip_all, level = "trace"))]
    pub fn decode_block(
        &mut self,
        buf: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<Vec<HeaderField>, HpackError> {
        let block = offset
            .checked_add(length)
            .and_then(|end| buf.get(offset..end))
            .ok_or(HpackError::InvalidRange)?;

        let mut decoder = ReprDecoder::new(block);
        let mut updater = Updater::new(
            &mut self.table,
            self.max_table_size,
            self.max_header_list_size,
        );
        let result = loop {
            match decoder.decode() {
                Ok(Some(repr)) => {
                    if let Err(e) = updater.update(repr) {
                        break Err(e);
                    }
                }
                Ok(None) => break Ok(updater.into_fields()),
                Err(e) => break Err(e),
            }
        };

        #[cfg(feature = "tracing")]
        if let Err(e) = &result {
            debug!(error = %e, "failed to decode header block");
        }
        result
    }

    /// Updates `SETTINGS_HEADER_TABLE_SIZE`. The dynamic table is resized at
    /// once, and later size updates must not exceed the new value.
    pub fn set_max_table_size(&mut self, max_table_size: usize) {
        self.max_table_size = max_table_size;
        self.table.set_max_size(max_table_size);
    }

    /// Updates `SETTINGS_MAX_HEADER_LIST_SIZE`.
    pub fn set_max_header_list_size(&mut self, max_header_list_size: usize) {
        self.max_header_list_size = max_header_list_size;
    }

    /// Gets the dynamic table.
    pub fn table(&self) -> &DynamicTable {
        &self.table
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TABLE_SIZE, DEFAULT_MAX_HEADER_LIST_SIZE)
    }
}

/// Builder of [`HpackDecoder`].
///
/// # Examples
///
/// ```
/// use ylong_hpack::DecoderBuilder;
///
/// let decoder = DecoderBuilder::new()
///     .max_table_size(256)
///     .max_header_list_size(16 << 10)
///     .build();
/// assert_eq!(decoder.table().max_size(), 256);
/// ```
#[derive(Clone, Debug)]
pub struct DecoderBuilder {
    max_table_size: usize,
    max_header_list_size: usize,
}

impl DecoderBuilder {
    /// Creates a `DecoderBuilder` with the default sizes.
    pub fn new() -> Self {
        Self {
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
        }
    }

    /// Sets `SETTINGS_HEADER_TABLE_SIZE`.
    pub fn max_table_size(mut self, size: usize) -> Self {
        self.max_table_size = size;
        self
    }

    /// Sets `SETTINGS_MAX_HEADER_LIST_SIZE`.
    pub fn max_header_list_size(mut self, size: usize) -> Self {
        self.max_header_list_size = size;
        self
    }

    /// Builds the `HpackDecoder`.
    pub fn build(self) -> HpackDecoder {
        HpackDecoder::new(self.max_table_size, self.max_header_list_size)
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `Updater` applies decoded representations to the `DynamicTable` and
/// collects the header fields of one block.
struct Updater<'a> {
    table: &'a mut DynamicTable,
    max_table_size: usize,
    max_header_list_size: usize,
    header_list_size: usize,
    fields: Vec<HeaderField>,
}

impl<'a> Updater<'a> {
    fn new(table: &'a mut DynamicTable, max_table_size: usize, max_header_list_size: usize) -> Self {
        Self {
            table,
            max_table_size,
            max_header_list_size,
            header_list_size: 0,
            fields: Vec::new(),
        }
    }

    fn update(&mut self, repr: Representation<'_>) -> Result<(), HpackError> {
        match repr {
            Representation::Indexed { index } => {
                let field = TableSearcher::new(self.table).field(index)?;
                self.push(field)
            }
            Representation::LiteralWithIndexing { name, value } => {
                let field = self.literal(name, value)?;
                self.push(field.clone())?;
                self.table.insert(field);
                Ok(())
            }
            Representation::LiteralWithoutIndexing { name, value } => {
                let field = self.literal(name, value)?;
                self.push(field)
            }
            Representation::LiteralNeverIndexed { name, value } => {
                let field = self.literal(name, value)?.with_sensitive(true);
                self.push(field)
            }
            Representation::SizeUpdate { max_size } => self.update_size(max_size),
        }
    }

    // Size updates are only allowed at the beginning of a block.
    fn update_size(&mut self, max_size: usize) -> Result<(), HpackError> {
        if !self.fields.is_empty() {
            return Err(HpackError::OutOfOrderTableUpdate);
        }
        if max_size > self.max_table_size {
            return Err(HpackError::TableSizeTooLarge {
                size: max_size,
                max: self.max_table_size,
            });
        }
        self.table.set_max_size(max_size);
        Ok(())
    }

    fn literal(&self, name: Name<'_>, value: Cow<'_, [u8]>) -> Result<HeaderField, HpackError> {
        let name = match name {
            Name::Index(index) => TableSearcher::new(self.table).name(index)?,
            Name::Literal(octets) => match header_names::intern(&octets) {
                Some(known) => Cow::Borrowed(known),
                None => Cow::Owned(latin1_to_string(&octets)),
            },
        };
        Ok(HeaderField::new(name, latin1_to_string(&value)))
    }

    fn push(&mut self, field: HeaderField) -> Result<(), HpackError> {
        self.header_list_size += field.size();
        if self.header_list_size > self.max_header_list_size {
            return Err(HpackError::HeaderListTooLarge);
        }
        self.fields.push(field);
        Ok(())
    }

    fn into_fields(self) -> Vec<HeaderField> {
        self.fields
    }
}
