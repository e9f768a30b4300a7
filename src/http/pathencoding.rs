//! Idempotent percent-encoding of request paths.
//!
//! A segment that already contains a valid `%XX` escape is treated as
//! encoded: only characters that can never appear raw are escaped and
//! existing escapes are left alone. Any other segment is fully encoded,
//! including a literal `%`. Either way `encode(encode(p)) == encode(p)`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::{Origin, Url};

/// Characters escaped inside an already-encoded segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'@');

/// Characters escaped inside a raw segment.
const RAW_SEGMENT: &AsciiSet = &SEGMENT.add(b'%');

/// Normalize a request path.
///
/// Absolute URLs with a host become `origin + encoded pathname`; their query
/// and fragment are dropped and a trailing slash survives only if the caller
/// wrote one. Anything else is encoded segment by segment with `?` and `#`
/// left where they are.
pub fn ensure_encoding(path: &str) -> String {
    match Url::parse(path) {
        Ok(url) if matches!(url.origin(), Origin::Tuple(..)) => {
            let pathname = normalize_trailing_slash(path, url.path());
            format!("{}{}", url.origin().ascii_serialization(), encode_path(pathname))
        }
        _ => encode_path(path),
    }
}

/// Strip a trailing slash the URL parser added but the caller did not write.
pub fn normalize_trailing_slash<'a>(original: &str, pathname: &'a str) -> &'a str {
    let original = original.split('?').next().unwrap_or(original);
    let keep_trailing_slash = original.ends_with('/');

    if !keep_trailing_slash && pathname.ends_with('/') {
        &pathname[..pathname.len() - 1]
    } else {
        pathname
    }
}

/// Encode every `/`-separated segment of `path`.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn encode_segment(segment: &str) -> String {
    let set = if has_escapes(segment) {
        SEGMENT
    } else {
        RAW_SEGMENT
    };
    utf8_percent_encode(segment, set).to_string()
}

fn has_escapes(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.windows(3).any(|w| {
        w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit()
    })
}

/// Percent-decode for display, replacing invalid UTF-8.
pub fn decode_for_display(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
