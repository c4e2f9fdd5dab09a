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

/// RFC7541-4.1: The additional 32 octets account for an estimated overhead
/// associated with an entry.
pub(crate) const ENTRY_OVERHEAD: usize = 32;

/// A header field, that is a name and value pair.
///
/// The name of a decoded field is always lowercase. Well known names are
/// borrowed from a static registry instead of being allocated.
///
/// Names and values are sent as `ISO-8859-1` octets, one octet per
/// character. Characters above `U+00FF` cannot be sent and go out as `?`.
///
/// The `sensitive` flag asks the encoder to use the `Literal Header Field
/// Never Indexed` representation. The decoder sets it on fields that arrived
/// in that representation. It does not take part in comparisons.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HeaderField;
///
/// let field = HeaderField::new("x-token", "abc").with_sensitive(true);
/// assert_eq!(field.name(), "x-token");
/// assert_eq!(field.value(), "abc");
/// assert!(field.is_sensitive());
/// assert_eq!(field.size(), 7 + 3 + 32);
/// assert_eq!(field, HeaderField::new("x-token", "abc"));
///
/// // One octet per character on the wire.
/// assert_eq!(HeaderField::new("x", "\u{e5}").size(), 1 + 1 + 32);
/// ```
#[derive(Clone, Debug, Eq)]
pub struct HeaderField {
    name: Cow<'static, str>,
    value: String,
    sensitive: bool,
}

impl HeaderField {
    /// Creates a new, non sensitive `HeaderField`.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// Sets whether the field must never be indexed.
    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Checks whether the field must never be indexed.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Size of the field as accounted by the dynamic table and by
    /// `SETTINGS_MAX_HEADER_LIST_SIZE`, counted in octets on the wire.
    pub fn size(&self) -> usize {
        octet_len(&self.name) + octet_len(&self.value) + ENTRY_OVERHEAD
    }

    pub(crate) fn shared_name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    /// Splits the field into its name and value.
    pub fn into_parts(self) -> (Cow<'static, str>, String) {
        (self.name, self.value)
    }
}

impl PartialEq for HeaderField {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl<N, V> From<(N, V)> for HeaderField
where
    N: Into<Cow<'static, str>>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Self {
        HeaderField::new(name, value)
    }
}

/// Number of `ISO-8859-1` octets of `s`.
pub(crate) fn octet_len(s: &str) -> usize {
    match s.is_ascii() {
        true => s.len(),
        false => s.chars().count(),
    }
}

/// Converts `ISO-8859-1` octets to a `String`, each octet becoming the
/// character of the same code point.
pub(crate) fn latin1_to_string(octets: &[u8]) -> String {
    octets.iter().copied().map(char::from).collect()
}

/// Converts `s` to `ISO-8859-1` octets. Characters above `U+00FF` become `?`.
pub(crate) fn string_to_latin1(s: &str) -> Cow<'_, [u8]> {
    match s.is_ascii() {
        true => Cow::Borrowed(s.as_bytes()),
        false => Cow::Owned(s.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()),
    }
}

/// Checks whether every character of `s` fits in one `ISO-8859-1` octet.
pub(crate) fn is_latin1(s: &str) -> bool {
    s.chars().all(|c| u32::from(c) <= 0xff)
}

/// Replaces the characters of `s` that `ISO-8859-1` cannot hold with `?`,
/// giving the string the peer will decode.
pub(crate) fn latin1_str(s: &str) -> Cow<'_, str> {
    match is_latin1(s) {
        true => Cow::Borrowed(s),
        false => Cow::Owned(
            s.chars()
                .map(|c| match u32::from(c) <= 0xff {
                    true => c,
                    false => '?',
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod ut_header_field {
    use std::borrow::Cow;

    use super::{latin1_str, latin1_to_string, octet_len, string_to_latin1, HeaderField};

    /// UT test cases for `HeaderField`.
    ///
    /// # Brief
    /// 1. Creates `HeaderField`s from borrowed and owned names.
    /// 2. Checks accessors, size and equality.
    #[test]
    fn ut_header_field() {
        let borrowed = HeaderField::new(":path", "/");
        assert!(matches!(borrowed.clone().into_parts().0, Cow::Borrowed(":path")));
        assert_eq!(borrowed.size(), 5 + 1 + 32);

        let owned = HeaderField::new(String::from(":path"), String::from("/"));
        assert_eq!(borrowed, owned);
        assert_ne!(borrowed, HeaderField::new(":path", "/index.html"));

        let sensitive = HeaderField::from(("cookie", "a=b")).with_sensitive(true);
        assert!(sensitive.is_sensitive());
        assert_eq!(sensitive, HeaderField::new("cookie", "a=b"));
        assert_eq!(sensitive.size(), 6 + 3 + 32);
    }

    /// UT test cases for the `ISO-8859-1` conversions.
    ///
    /// # Brief
    /// 1. Converts octets above `0x7f` to strings and back.
    /// 2. Checks one character stands for one octet, and that characters
    ///    above `U+00FF` are replaced.
    #[test]
    fn ut_header_field_latin1() {
        let value = latin1_to_string(&[0xe5, 0xbb, 0x6f]);
        assert_eq!(value, "\u{e5}\u{bb}o");
        assert_eq!(octet_len(&value), 3);
        assert_eq!(string_to_latin1(&value).as_ref(), &[0xe5, 0xbb, 0x6f]);
        assert_eq!(HeaderField::new("x", value).size(), 1 + 3 + 32);

        assert_eq!(string_to_latin1("a\u{20ac}").as_ref(), b"a?");
        assert_eq!(latin1_str("a\u{20ac}"), "a?");
        assert!(matches!(latin1_str("caf\u{e9}"), Cow::Borrowed(_)));
    }
}
