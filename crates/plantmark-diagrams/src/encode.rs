//! Diagram source to URL token encoding.
//!
//! The diagram server expects the source compressed with raw deflate and
//! written in a base64 variant whose alphabet is `0-9 A-Z a-z - _`, so the
//! token can be placed in a URL path without percent-escaping.

use std::io::Write;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Length of the zlib header (CMF + FLG).
const ZLIB_HEADER_LEN: usize = 2;

/// Length of the zlib trailer (Adler-32 checksum).
const ZLIB_TRAILER_LEN: usize = 4;

/// Standard base64 alphabet.
const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Diagram server alphabet, position-aligned with [`BASE64_ALPHABET`].
const SERVER_ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Byte-indexed transliteration table. Zero means "not in the alphabet".
static TRANSLATE: [u8; 256] = build_translate_table();

const fn build_translate_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < BASE64_ALPHABET.len() {
        table[BASE64_ALPHABET[i] as usize] = SERVER_ALPHABET[i];
        i += 1;
    }
    table
}

/// Encode diagram source into a URL-safe token.
///
/// Pure and deterministic: the same source always yields the same token.
///
/// # Example
///
/// ```
/// use plantmark_diagrams::encode;
///
/// let token = encode("Bob -> Alice : hello");
/// assert_eq!(token, encode("Bob -> Alice : hello"));
/// assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
/// ```
#[must_use]
pub fn encode(source: &str) -> String {
    let compressed = zlib_compress(source.as_bytes());
    let payload = compressed
        .get(ZLIB_HEADER_LEN..compressed.len().saturating_sub(ZLIB_TRAILER_LEN))
        .unwrap_or_default();
    transliterate(&BASE64_STANDARD.encode(payload))
}

/// Build the request URL for a diagram: `{server}/{d?}{format}/{token}`.
///
/// A trailing slash on `server_url` is ignored.
#[must_use]
pub fn diagram_url(server_url: &str, image_format: &str, dark: bool, source: &str) -> String {
    let server_url = server_url.trim_end_matches('/');
    let dark_prefix = if dark { "d" } else { "" };
    format!("{server_url}/{dark_prefix}{image_format}/{}", encode(source))
}

/// Compress with a zlib container (header + deflate payload + checksum).
fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::default(),
    );
    // Writes into a Vec do not fail
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .unwrap_or_default()
}

/// Map standard base64 output onto the server alphabet.
///
/// Characters outside the standard alphabet (the `=` padding) are dropped.
fn transliterate(base64: &str) -> String {
    base64
        .bytes()
        .filter_map(|b| match TRANSLATE[usize::from(b)] {
            0 => None,
            mapped => Some(char::from(mapped)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    /// Reverse the encoding to recover the source text.
    fn decode(token: &str) -> String {
        let base64: String = token
            .bytes()
            .map(|b| {
                let pos = SERVER_ALPHABET.iter().position(|&c| c == b).unwrap();
                char::from(BASE64_ALPHABET[pos])
            })
            .collect();
        let padded = format!("{base64}{}", "=".repeat((4 - base64.len() % 4) % 4));
        let payload = BASE64_STANDARD.decode(padded).unwrap();
        let mut out = String::new();
        DeflateDecoder::new(payload.as_slice())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode("A"), encode("A"));
        assert_eq!(
            encode("@startuml\nAlice -> Bob\n@enduml"),
            encode("@startuml\nAlice -> Bob\n@enduml")
        );
    }

    #[test]
    fn test_encode_distinguishes_sources() {
        assert_ne!(encode("A"), encode("B"));
    }

    #[test]
    fn test_encode_uses_server_alphabet_only() {
        let token = encode("@startuml\nA -> B: ünïcödé ~ + / =\n@enduml");
        assert!(!token.is_empty());
        assert!(
            token.bytes().all(|b| SERVER_ALPHABET.contains(&b)),
            "unexpected character in {token}"
        );
    }

    #[test]
    fn test_encode_recovers_source() {
        let source = "@startuml\nBob -> Alice : hello\n@enduml";
        assert_eq!(decode(&encode(source)), source);
    }

    #[test]
    fn test_encode_empty_source() {
        assert_eq!(decode(&encode("")), "");
    }

    #[test]
    fn test_transliterate_table() {
        assert_eq!(transliterate("ABCZ"), "012P");
        assert_eq!(transliterate("az09+/"), "Qpqz-_");
        // Padding is dropped
        assert_eq!(transliterate("cwQA=="), "SmG0");
    }

    #[test]
    fn test_diagram_url() {
        let token = encode("A -> B");
        assert_eq!(
            diagram_url("https://www.plantuml.com/plantuml", "svg", false, "A -> B"),
            format!("https://www.plantuml.com/plantuml/svg/{token}")
        );
        assert_eq!(
            diagram_url("http://localhost:8080/", "png", true, "A -> B"),
            format!("http://localhost:8080/dpng/{token}")
        );
    }
}
