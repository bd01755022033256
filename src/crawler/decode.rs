//! Character set detection for HTML bodies
//!
//! The encoding is picked in this order: byte order mark, `charset` parameter of
//! the Content-Type header, `<meta charset>` in the first kilobyte, then a
//! statistical guess. Undecodable sequences become U+FFFD.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// How far into the body a `<meta charset>` declaration is looked for
const META_SNIFF_LEN: usize = 1024;

/// Decodes an HTML body to a `String`
pub fn decode_html(bytes: &[u8], content_type: &str) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| header_charset(content_type))
        .or_else(|| meta_charset(bytes))
        .unwrap_or_else(|| guess_encoding(bytes));

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Body is not valid {}, replaced malformed sequences", used.name());
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

/// Finds `charset=` inside a `<meta>` tag, covering both the `charset`
/// attribute and the `http-equiv` form
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        rest = &rest[start + "<meta".len()..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];
        let Some(pos) = tag.find("charset=") else {
            continue;
        };

        let value = tag[pos + "charset=".len()..].trim_start_matches(|c| c == '"' || c == '\'');
        let end = value
            .find(|c: char| c == '"' || c == '\'' || c == ';' || c == '/' || c.is_whitespace())
            .unwrap_or(value.len());

        if let Some(encoding) = Encoding::for_label(value[..end].as_bytes()) {
            // A meta tag readable as ASCII cannot really be UTF-16
            if encoding == UTF_16LE || encoding == UTF_16BE {
                return Some(UTF_8);
            }
            return Some(encoding);
        }
    }
    None
}

fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
