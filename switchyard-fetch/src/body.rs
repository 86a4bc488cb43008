//! Response body decoding by content-type sniffing.

use serde_json::Value;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON.
    Json(Value),
    /// UTF-8 text that is not JSON.
    Text(String),
    /// Anything else.
    Binary(Vec<u8>),
}

impl ResponseBody {
    /// Decodes raw bytes using the `Content-Type` header as a hint.
    ///
    /// JSON is tried first (for JSON, text and unlabelled bodies), then
    /// UTF-8 text. Explicitly binary content types stay binary.
    pub fn sniff(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        let textual = match mime.as_deref() {
            None | Some("") => true,
            Some(m) => {
                m.contains("json")
                    || m.starts_with("text/")
                    || m.contains("xml")
                    || m.contains("javascript")
            }
        };
        if !textual {
            return Self::Binary(bytes);
        }

        if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
            return Self::Json(value);
        }
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Binary(e.into_bytes()),
        }
    }

    /// Returns the JSON value, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_content_type() {
        let body = ResponseBody::sniff(
            Some("application/json; charset=utf-8"),
            br#"{"ok":true}"#.to_vec(),
        );
        assert_eq!(body.as_json().unwrap()["ok"], true);
    }

    #[test]
    fn test_unlabelled_json_is_detected() {
        let body = ResponseBody::sniff(None, b"[1,2]".to_vec());
        assert_eq!(body.kind(), "json");
    }

    #[test]
    fn test_plain_text() {
        let body = ResponseBody::sniff(Some("text/plain"), b"Paris: +18C".to_vec());
        assert_eq!(body.as_text(), Some("Paris: +18C"));
    }

    #[test]
    fn test_binary_content_type_and_invalid_utf8() {
        let png = ResponseBody::sniff(Some("image/png"), b"{}".to_vec());
        assert_eq!(png.kind(), "binary");

        let garbage = ResponseBody::sniff(Some("text/plain"), vec![0xff, 0xfe, 0x00]);
        assert_eq!(garbage, ResponseBody::Binary(vec![0xff, 0xfe, 0x00]));
    }
}
