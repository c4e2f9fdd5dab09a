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

//! Hex fixtures used by unit tests.

/// Converts a hex string into bytes. Whitespace is ignored so that long
/// fixtures can be split across lines.
pub fn decode(str: &str) -> Option<Vec<u8>> {
    let digits = str
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<Vec<_>>();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16)?;
            let lo = pair[1].to_digit(16)?;
            Some((hi << 4 | lo) as u8)
        })
        .collect()
}

#[cfg(test)]
mod ut_test_util {
    use super::decode;

    /// UT test cases for `decode`.
    ///
    /// # Brief
    /// 1. Decodes valid and invalid hex strings.
    /// 2. Checks the results.
    #[test]
    fn ut_test_util_decode() {
        assert_eq!(decode("82"), Some(vec![0x82]));
        assert_eq!(decode("8286 84"), Some(vec![0x82, 0x86, 0x84]));
        assert_eq!(decode(""), Some(vec![]));
        assert_eq!(decode("8"), None);
        assert_eq!(decode("zz"), None);
    }
}
