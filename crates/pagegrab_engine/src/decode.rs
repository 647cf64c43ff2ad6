use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub encoding: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body is not valid {encoding}")]
    Malformed { encoding: &'static str },
}

/// Decode a response body into UTF-8 text.
///
/// Order: BOM sniff, then the charset declared in the Content-Type header,
/// then a chardetng guess (which falls back to UTF-8 when nothing better
/// fits).
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedBody, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_as(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(declared_charset) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_as(bytes, encoding);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_as(bytes, detector.guess(None, true))
}

fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches(|c| matches!(c, '"' | '\'' | ' ')))
    })
}

fn decode_as(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedBody, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name(),
        });
    }
    Ok(DecodedBody {
        text: text.into_owned(),
        encoding: encoding.name(),
    })
}
