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

//! [Static Table] and [Dynamic Table] of HPACK.
//!
//! [Static Table]: https://httpwg.org/specs/rfc7541.html#static.table
//! [Dynamic Table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
//!
//! # Index Address Space
//! ```text
//!  <----------  Index Address Space ---------->
//!  <-- Static  Table -->  <-- Dynamic Table -->
//!  +---+-----------+---+  +---+-----------+---+
//!  | 1 |    ...    | s |  |s+1|    ...    |s+k|
//!  +---+-----------+---+  +---+-----------+---+
//!                         ^                   |
//!                         |                   V
//!                  Insertion Point      Dropping Point
//! ```

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::OnceLock;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::error::HpackError;
use crate::header::HeaderField;

/// `TableSearcher` is used to find specified content in static and dynamic
/// tables.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Searches a header field in static and dynamic tables.
    pub(crate) fn field(&self, index: usize) -> Result<HeaderField, HpackError> {
        match StaticTable::get(index) {
            Some((name, value)) => Ok(HeaderField::new(name, value)),
            None if index == 0 => Err(HpackError::InvalidIndex(index)),
            None => self.dynamic.get(index).cloned(),
        }
    }

    /// Searches a header name in static and dynamic tables.
    pub(crate) fn name(&self, index: usize) -> Result<Cow<'static, str>, HpackError> {
        match StaticTable::get(index) {
            Some((name, _)) => Ok(Cow::Borrowed(name)),
            None if index == 0 => Err(HpackError::InvalidIndex(index)),
            None => self
                .dynamic
                .get(index)
                .map(HeaderField::shared_name),
        }
    }

    /// Searches the index of a header name, static table first.
    pub(crate) fn name_index(&self, name: &str) -> Option<usize> {
        StaticTable::find_name_match(name).or_else(|| self.dynamic.find_name_match(name))
    }

    /// Searches the best index of a header field. A full match is preferred
    /// over a name match, and the static table over the dynamic table.
    pub(crate) fn index(&self, name: &str, value: &str) -> Option<TableIndex> {
        StaticTable::find_full_match(name, value)
            .or_else(|| self.dynamic.find_full_match(name, value))
            .map(TableIndex::Header)
            .or_else(|| self.name_index(name).map(TableIndex::HeaderName))
    }
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum TableIndex {
    Header(usize),
    HeaderName(usize),
}

/// The [`Dynamic Table`][dynamic_table] implementation of [HPACK].
///
/// [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry in a dynamic table is
/// at the lowest index, and the oldest entry of a dynamic table is at the
/// highest index.
///
/// The dynamic table can contain duplicate entries (i.e., entries with the same
/// name and same value). Therefore, duplicate entries MUST NOT be treated as an
/// error by a decoder.
///
/// Indexes are those of the whole address space, so the newest entry is
/// always at index 62.
///
/// # Examples
///
/// ```
/// use ylong_hpack::hpack::table::DynamicTable;
///
/// let mut table = DynamicTable::with_max_size(4096);
/// table.add("x-custom", "v1");
/// assert_eq!(table.curr_size(), 8 + 2 + 32);
/// assert_eq!(table.find_full_match("x-custom", "v1"), Some(62));
/// assert_eq!(table.get(62).unwrap().value(), "v1");
/// ```
#[derive(Debug)]
pub struct DynamicTable {
    queue: VecDeque<Entry>,
    curr_size: usize,
    max_size: usize,
}

#[derive(Debug)]
struct Entry {
    field: HeaderField,
    // Cached, so that eviction does not recompute it.
    size: usize,
}

impl DynamicTable {
    /// Creates a `Dynamic Table` based on the size limit.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            max_size,
        }
    }

    /// Gets the sum of the sizes of all entries.
    pub fn curr_size(&self) -> usize {
        self.curr_size
    }

    /// Gets the size limit.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Gets the number of entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Checks whether the table has no entry.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Gets the entry at `index` of the address space.
    ///
    /// Returns `HpackError::InvalidIndex` if `index` does not address an
    /// entry of this table.
    pub fn get(&self, index: usize) -> Result<&HeaderField, HpackError> {
        index
            .checked_sub(StaticTable::len() + 1)
            .and_then(|offset| self.queue.get(offset))
            .map(|entry| &entry.field)
            .ok_or(HpackError::InvalidIndex(index))
    }

    /// Inserts a header field as the newest entry, evicting the oldest
    /// entries to make room for it.
    ///
    /// An entry larger than the size limit empties the table and is not
    /// inserted.
    pub fn add<N, V>(&mut self, name: N, value: V)
    where
        N: Into<Cow<'static, str>>,
        V: Into<String>,
    {
        self.insert(HeaderField::new(name, value))
    }

    pub(crate) fn insert(&mut self, field: HeaderField) {
        let size = field.size();
        if size > self.max_size {
            #[cfg(feature = "tracing")]
            trace!(size, max_size = self.max_size, "entry larger than dynamic table");
            self.clear();
            return;
        }
        self.evict(self.max_size - size);
        self.curr_size += size;
        self.queue.push_front(Entry {
            field: field.with_sensitive(false),
            size,
        });
    }

    /// Gets the index of the newest entry with this name and value.
    pub fn find_full_match(&self, name: &str, value: &str) -> Option<usize> {
        self.position(|field| field.name() == name && field.value() == value)
    }

    /// Gets the index of the newest entry with this name.
    pub fn find_name_match(&self, name: &str) -> Option<usize> {
        self.position(|field| field.name() == name)
    }

    /// Changes the size limit, evicting the oldest entries that no longer
    /// fit.
    pub fn set_max_size(&mut self, max_size: usize) {
        if max_size == self.max_size {
            return;
        }
        #[cfg(feature = "tracing")]
        trace!(from = self.max_size, to = max_size, "dynamic table resized");
        self.max_size = max_size;
        self.evict(max_size);
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.curr_size = 0;
    }

    /// Iterates over the entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.queue.iter().map(|entry| &entry.field)
    }

    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&HeaderField) -> bool,
    {
        self.queue
            .iter()
            .position(|entry| predicate(&entry.field))
            .map(|offset| offset + StaticTable::len() + 1)
    }

    /// Evicts the oldest entries until `curr_size <= limit`.
    fn evict(&mut self, limit: usize) {
        while self.curr_size > limit {
            match self.queue.pop_back() {
                Some(entry) => self.curr_size -= entry.size,
                None => break,
            }
        }
    }
}

/// The [`Static Table`][static_table] implementation of [HPACK].
///
/// [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// The static table consists of the 61 predefined header fields of
/// `RFC7541 Appendix A`, addressed from index 1. Entries are bucketed by the
/// length of their names, so a lookup compares a few entries only and never
/// allocates.
///
/// # Examples
///
/// ```
/// use ylong_hpack::hpack::table::StaticTable;
///
/// assert_eq!(StaticTable::get(2), Some((":method", "GET")));
/// assert_eq!(StaticTable::find_full_match(":status", "404"), Some(13));
/// assert_eq!(StaticTable::find_name_match(":status"), Some(8));
/// assert_eq!(StaticTable::find_name_match("x-custom"), None);
/// ```
pub struct StaticTable;

impl StaticTable {
    /// Gets the number of entries, which is 61.
    pub fn len() -> usize {
        STATIC_TABLE.len()
    }

    /// Gets the name and value at `index`, `None` outside `1..=61`.
    pub fn get(index: usize) -> Option<(&'static str, &'static str)> {
        index
            .checked_sub(1)
            .and_then(|offset| STATIC_TABLE.get(offset))
            .copied()
    }

    /// Gets the index of the entry with this name and value.
    pub fn find_full_match(name: &str, value: &str) -> Option<usize> {
        Self::bucket(name)
            .iter()
            .map(|index| *index as usize)
            .find(|index| STATIC_TABLE[index - 1] == (name, value))
    }

    /// Gets the index of the first entry with this name in table order.
    pub fn find_name_match(name: &str) -> Option<usize> {
        Self::bucket(name)
            .iter()
            .map(|index| *index as usize)
            .find(|index| STATIC_TABLE[index - 1].0 == name)
    }

    fn bucket(name: &str) -> &'static [u8] {
        static BUCKETS: OnceLock<Vec<Vec<u8>>> = OnceLock::new();
        let buckets = BUCKETS.get_or_init(|| {
            let longest = STATIC_TABLE
                .iter()
                .map(|(name, _)| name.len())
                .max()
                .unwrap_or(0);
            let mut buckets = vec![Vec::new(); longest + 1];
            for (offset, (name, _)) in STATIC_TABLE.iter().enumerate() {
                buckets[name.len()].push((offset + 1) as u8);
            }
            buckets
        });
        buckets
            .get(name.len())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[rustfmt::skip]
static STATIC_TABLE: [(&str, &str); 61] = [
    (":authority", ""),                     // 1
    (":method", "GET"),                     // 2
    (":method", "POST"),                    // 3
    (":path", "/"),                         // 4
    (":path", "/index.html"),               // 5
    (":scheme", "http"),                    // 6
    (":scheme", "https"),                   // 7
    (":status", "200"),                     // 8
    (":status", "204"),                     // 9
    (":status", "206"),                     // 10
    (":status", "304"),                     // 11
    (":status", "400"),                     // 12
    (":status", "404"),                     // 13
    (":status", "500"),                     // 14
    ("accept-charset", ""),                 // 15
    ("accept-encoding", "gzip, deflate"),   // 16
    ("accept-language", ""),                // 17
    ("accept-ranges", ""),                  // 18
    ("accept", ""),                         // 19
    ("access-control-allow-origin", ""),    // 20
    ("age", ""),                            // 21
    ("allow", ""),                          // 22
    ("authorization", ""),                  // 23
    ("cache-control", ""),                  // 24
    ("content-disposition", ""),            // 25
    ("content-encoding", ""),               // 26
    ("content-language", ""),               // 27
    ("content-length", ""),                 // 28
    ("content-location", ""),               // 29
    ("content-range", ""),                  // 30
    ("content-type", ""),                   // 31
    ("cookie", ""),                         // 32
    ("date", ""),                           // 33
    ("etag", ""),                           // 34
    ("expect", ""),                         // 35
    ("expires", ""),                        // 36
    ("from", ""),                           // 37
    ("host", ""),                           // 38
    ("if-match", ""),                       // 39
    ("if-modified-since", ""),              // 40
    ("if-none-match", ""),                  // 41
    ("if-range", ""),                       // 42
    ("if-unmodified-since", ""),            // 43
    ("last-modified", ""),                  // 44
    ("link", ""),                           // 45
    ("location", ""),                       // 46
    ("max-forwards", ""),                   // 47
    ("proxy-authenticate", ""),             // 48
    ("proxy-authorization", ""),            // 49
    ("range", ""),                          // 50
    ("referer", ""),                        // 51
    ("refresh", ""),                        // 52
    ("retry-after", ""),                    // 53
    ("server", ""),                         // 54
    ("set-cookie", ""),                     // 55
    ("strict-transport-security", ""),      // 56
    ("transfer-encoding", ""),              // 57
    ("user-agent", ""),                     // 58
    ("vary", ""),                           // 59
    ("via", ""),                            // 60
    ("www-authenticate", ""),               // 61
];

#[cfg(test)]
mod ut_static_table {
    use crate::hpack::table::StaticTable;

    /// UT test cases for `StaticTable::get`.
    ///
    /// # Brief
    /// 1. Gets entries inside and outside `1..=61`.
    /// 2. Checks the results.
    #[test]
    fn ut_static_table_get() {
        assert_eq!(StaticTable::len(), 61);
        assert_eq!(StaticTable::get(0), None);
        assert_eq!(StaticTable::get(1), Some((":authority", "")));
        assert_eq!(StaticTable::get(16), Some(("accept-encoding", "gzip, deflate")));
        assert_eq!(StaticTable::get(61), Some(("www-authenticate", "")));
        assert_eq!(StaticTable::get(62), None);
    }

    /// UT test cases for `StaticTable::find_full_match` and
    /// `StaticTable::find_name_match`.
    ///
    /// # Brief
    /// 1. Looks up every entry of the table.
    /// 2. Looks up duplicated names and unknown fields.
    /// 3. Checks the results.
    #[test]
    fn ut_static_table_find() {
        for index in 1..=StaticTable::len() {
            let (name, value) = StaticTable::get(index).unwrap();
            assert_eq!(StaticTable::find_full_match(name, value), Some(index));
            assert!(StaticTable::find_name_match(name).unwrap() <= index);
        }
        assert_eq!(StaticTable::find_name_match(":method"), Some(2));
        assert_eq!(StaticTable::find_name_match(":path"), Some(4));
        assert_eq!(StaticTable::find_name_match(":status"), Some(8));
        assert_eq!(StaticTable::find_full_match(":status", "418"), None);
        assert_eq!(StaticTable::find_full_match("accept-encoding", "br"), None);
        assert_eq!(StaticTable::find_name_match("x-custom"), None);
        assert_eq!(StaticTable::find_name_match(""), None);
        assert_eq!(
            StaticTable::find_name_match("an-extremely-long-header-name-beyond-any-bucket"),
            None
        );
    }
}
