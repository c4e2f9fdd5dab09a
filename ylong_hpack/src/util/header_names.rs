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

//! Registry of well known header names.
//!
//! Decoded literal names are looked up here first, so that common names are
//! handed out as `&'static str` and never allocated.

/// Gets the canonical `&'static str` of a known lowercase header name.
///
/// Returns `None` if the name is unknown, or not lowercase.
///
/// # Examples
///
/// ```
/// use ylong_hpack::header_names::intern;
///
/// assert_eq!(intern(b"content-type"), Some("content-type"));
/// assert_eq!(intern(b"Content-Type"), None);
/// assert_eq!(intern(b"x-custom"), None);
/// ```
pub fn intern(bytes: &[u8]) -> Option<&'static str> {
    // Dispatch on length first, names of one length share a bucket.
    let candidates: &[&'static str] = match bytes.len() {
        2 => &["te"],
        3 => &["age", "via"],
        4 => &["date", "etag", "from", "host", "link", "vary"],
        5 => &[":path", "allow", "range"],
        6 => &["accept", "cookie", "expect", "server"],
        7 => &[
            ":method", ":scheme", ":status", "expires", "referer", "refresh", "trailer",
            "upgrade",
        ],
        8 => &["if-match", "if-range", "location"],
        10 => &[":authority", "connection", "keep-alive", "set-cookie", "user-agent"],
        11 => &["retry-after"],
        12 => &["content-type", "max-forwards"],
        13 => &[
            "accept-ranges",
            "authorization",
            "cache-control",
            "content-range",
            "if-none-match",
            "last-modified",
        ],
        14 => &["accept-charset", "content-length"],
        15 => &["accept-encoding", "accept-language"],
        16 => &[
            "content-encoding",
            "content-language",
            "content-location",
            "proxy-connection",
            "www-authenticate",
            "x-amzn-requestid",
            "x-amz-request-id",
        ],
        17 => &["if-modified-since", "transfer-encoding"],
        18 => &["proxy-authenticate"],
        19 => &[
            "content-disposition",
            "if-unmodified-since",
            "proxy-authorization",
        ],
        25 => &["strict-transport-security"],
        27 => &["access-control-allow-origin"],
        _ => &[],
    };
    candidates
        .iter()
        .find(|name| name.as_bytes() == bytes)
        .copied()
}
