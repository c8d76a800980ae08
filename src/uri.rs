//! URI handling: decoding, query parsing, path segmentation.
//!
//! Everything here operates on the raw request-target string exactly as
//! it arrived in the request line; nothing is resolved against a base URI
//! and nothing is validated beyond what's documented below.

use std::collections::HashMap;
use std::fmt;

/// Failure decoding a `%HH` escape: a `%` was not followed by two hex
/// digits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UriDecodeError;

impl fmt::Display for UriDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid percent-encoding in URI")
    }
}

impl std::error::Error for UriDecodeError {}

/// An opaque raw request-target string with derived views over it.
///
/// `Uri` never normalizes or validates its `raw` string at construction
/// time; every operation below recomputes its view from the raw bytes on
/// demand, so it stays cheap to build one per request and correct even if
/// the caller mutates a copy of the input between calls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Uri {
    raw: String,
}

impl Uri {
    pub fn new(raw: impl Into<String>) -> Uri {
        Uri { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The prefix of `raw` before the first `'?'`, or the whole string if
    /// there is none. Not decoded.
    pub fn absolute_path(&self) -> &str {
        match self.raw.find('?') {
            Some(idx) => &self.raw[..idx],
            None => &self.raw,
        }
    }

    /// The absolute path split on `'/'` into segments, in order. Empty
    /// segments (from a leading `/` or `//`) are included, not decoded.
    pub fn segments(&self) -> Vec<&str> {
        self.absolute_path().split('/').collect()
    }

    /// The parent of the absolute path: the segment list with the
    /// trailing element dropped. If the path ends in `/`, the trailing
    /// empty segment that produces is what gets dropped, so
    /// `/foo/bar/`'s parent is `/foo/bar`, and `/foo/bar`'s parent is
    /// `/foo`.
    pub fn parent(&self) -> String {
        let mut segs = self.segments();
        segs.pop();
        segs.join("/")
    }

    /// The query string parsed into a map: split once on the first `'?'`,
    /// then the remainder on `'&'`, then each pair on `'='`. Duplicate
    /// keys overwrite earlier ones. Values are left percent-encoded; this
    /// method performs no decoding.
    pub fn query(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let query = match self.raw.find('?') {
            Some(idx) => &self.raw[idx + 1..],
            None => return map,
        };
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");
            map.insert(key.to_string(), value.to_string());
        }
        map
    }

    /// Decodes `%HH` escapes (case-insensitive hex) to their byte value
    /// and `+` to a literal space. All other bytes pass through
    /// unchanged. Fails if a `%` is not followed by two hex digits.
    pub fn decode(input: &str) -> Result<String, UriDecodeError> {
        let bytes = input.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'%' => {
                    let hi = bytes.get(i + 1).copied().and_then(hex_value);
                    let lo = bytes.get(i + 2).copied().and_then(hex_value);
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => {
                            out.push(hi * 16 + lo);
                            i += 3;
                        }
                        _ => return Err(UriDecodeError),
                    }
                }
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        // The wire format guarantees ASCII/Latin-1 octets here; request
        // target bytes that aren't valid UTF-8 are vanishingly rare in
        // practice and treated as a decode failure rather than silently
        // replaced.
        String::from_utf8(out).map_err(|_| UriDecodeError)
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod test {
    use super::Uri;

    #[test]
    fn absolute_path_stops_at_query() {
        let u = Uri::new("/p?a=1");
        assert_eq!(u.absolute_path(), "/p");
    }

    #[test]
    fn absolute_path_is_whole_string_without_query() {
        let u = Uri::new("/p/q");
        assert_eq!(u.absolute_path(), "/p/q");
    }

    #[test]
    fn query_parsing_overwrites_duplicate_keys() {
        let u = Uri::new("/p?a=1&b=2&a=3");
        let q = u.query();
        assert_eq!(q.get("a").map(String::as_str), Some("3"));
        assert_eq!(q.get("b").map(String::as_str), Some("2"));
        assert_eq!(u.absolute_path(), "/p");
    }

    #[test]
    fn parent_drops_trailing_segment() {
        assert_eq!(Uri::new("/foo/bar").parent(), "/foo");
        assert_eq!(Uri::new("/foo/bar/").parent(), "/foo/bar");
        assert_eq!(Uri::new("/foo").parent(), "");
    }

    #[test]
    fn segments_includes_empty_leading_segment() {
        assert_eq!(Uri::new("/foo/bar").segments(), vec!["", "foo", "bar"]);
    }

    #[test]
    fn decode_handles_percent_and_plus() {
        assert_eq!(Uri::decode("a+b%20c").unwrap(), "a b c");
        assert_eq!(Uri::decode("100%25").unwrap(), "100%");
    }

    #[test]
    fn decode_rejects_incomplete_escape() {
        assert!(Uri::decode("a%2").is_err());
        assert!(Uri::decode("a%2g").is_err());
        assert!(Uri::decode("trailing%").is_err());
    }

    #[test]
    fn decode_identity_on_unreserved_characters() {
        let s = "abcXYZ019-._~";
        assert_eq!(Uri::decode(s).unwrap(), s);
    }
}
