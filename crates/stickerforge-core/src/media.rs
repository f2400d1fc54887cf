//! Input descriptors and conversion requests.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resolved buffers of this many bytes or fewer are too small to be media.
pub const TOO_SMALL_BYTES: usize = 10;

// ---------------------------------------------------------------------------
// MediaInput
// ---------------------------------------------------------------------------

/// A heterogeneous input descriptor, normalized to bytes by the resolver.
#[derive(Clone, PartialEq, Eq)]
pub enum MediaInput {
    /// Raw bytes already in memory.
    Bytes(Vec<u8>),
    /// A `data:<mime>;base64,<payload>` string.
    DataUri(String),
    /// An `http://` or `https://` URL.
    RemoteUrl(String),
    /// A local filesystem path.
    LocalPath(PathBuf),
    /// An object carrying a `url` field.
    UrlObject {
        /// The URL to fetch.
        url: String,
    },
}

impl MediaInput {
    /// Classify a string descriptor: base64 data URI, remote URL, or local
    /// path. Strings that only look like a data URI are paths.
    pub fn from_descriptor(s: &str) -> Self {
        let trimmed = s.trim();
        if is_base64_data_uri(trimmed) {
            MediaInput::DataUri(trimmed.to_string())
        } else if is_http_url(trimmed) {
            MediaInput::RemoteUrl(trimmed.to_string())
        } else {
            MediaInput::LocalPath(PathBuf::from(trimmed))
        }
    }

    /// Build an input from a JSON value: a string descriptor or an object
    /// exposing a string `url` field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInputKind`] for any other JSON shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Self::from_descriptor(s)),
            serde_json::Value::Object(map) => match map.get("url") {
                Some(serde_json::Value::String(url)) => Ok(MediaInput::UrlObject {
                    url: url.clone(),
                }),
                _ => Err(Error::InvalidInputKind(
                    "object input has no string `url` field".into(),
                )),
            },
            other => Err(Error::InvalidInputKind(format!(
                "unsupported JSON input: {}",
                json_kind(other)
            ))),
        }
    }

    /// Short label for the active variant, used in logs.
    pub fn kind_label(&self) -> &'static str {
        match self {
            MediaInput::Bytes(_) => "bytes",
            MediaInput::DataUri(_) => "data-uri",
            MediaInput::RemoteUrl(_) => "url",
            MediaInput::LocalPath(_) => "path",
            MediaInput::UrlObject { .. } => "url-object",
        }
    }
}

// Keeps multi-megabyte buffers and data URIs out of debug logs.
impl fmt::Debug for MediaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaInput::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            MediaInput::DataUri(s) => write!(f, "DataUri({} chars)", s.len()),
            MediaInput::RemoteUrl(u) => f.debug_tuple("RemoteUrl").field(u).finish(),
            MediaInput::LocalPath(p) => f.debug_tuple("LocalPath").field(p).finish(),
            MediaInput::UrlObject { url } => f.debug_struct("UrlObject").field("url", url).finish(),
        }
    }
}

impl From<Vec<u8>> for MediaInput {
    fn from(bytes: Vec<u8>) -> Self {
        MediaInput::Bytes(bytes)
    }
}

impl From<&str> for MediaInput {
    fn from(s: &str) -> Self {
        MediaInput::from_descriptor(s)
    }
}

/// Whether `s` has the `data:<mime>[;params];base64,<payload>` shape.
///
/// Only the header is checked; the payload is validated when decoded.
pub fn is_base64_data_uri(s: &str) -> bool {
    let Some(rest) = s
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &s[5..])
    else {
        return false;
    };
    let Some((header, _)) = rest.split_once(',') else {
        return false;
    };
    match header.rsplit_once(';') {
        Some((mime, param)) => !mime.is_empty() && param.trim().eq_ignore_ascii_case("base64"),
        None => false,
    }
}

/// Whether `s` starts with an `http://` or `https://` scheme (case-insensitive).
pub fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).map(str::to_ascii_lowercase).unwrap_or_default();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// StickerKind / ConversionRequest
// ---------------------------------------------------------------------------

/// Whether the source is treated as a still frame or a time-based stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerKind {
    Image,
    Video,
}

impl StickerKind {
    /// Video sources are encoded as animated stickers.
    pub fn is_animated(self) -> bool {
        matches!(self, StickerKind::Video)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StickerKind::Image => "image",
            StickerKind::Video => "video",
        }
    }
}

impl fmt::Display for StickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StickerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(StickerKind::Image),
            "video" => Ok(StickerKind::Video),
            _ => Err(Error::UnsupportedKind(s.to_string())),
        }
    }
}

/// Options for one sticker conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub kind: StickerKind,
    /// Stretch to square instead of padding with transparent bars.
    #[serde(default)]
    pub force_square: bool,
    #[serde(default)]
    pub pack_name: String,
    #[serde(default)]
    pub author: String,
}

impl ConversionRequest {
    pub fn new(kind: StickerKind) -> Self {
        Self {
            kind,
            force_square: false,
            pack_name: String::new(),
            author: String::new(),
        }
    }

    /// Parse the kind from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedKind`] unless `kind` is `image` or `video`.
    pub fn parse(kind: &str) -> Result<Self> {
        Ok(Self::new(kind.parse()?))
    }

    pub fn force_square(mut self, force_square: bool) -> Self {
        self.force_square = force_square;
        self
    }

    pub fn pack_name(mut self, name: impl Into<String>) -> Self {
        self.pack_name = name.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Metadata is only embedded when the caller supplied a pack name or author.
    pub fn wants_metadata(&self) -> bool {
        !self.pack_name.is_empty() || !self.author.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_classification() {
        assert!(matches!(
            MediaInput::from_descriptor("data:image/png;base64,AAAA"),
            MediaInput::DataUri(_)
        ));
        assert!(matches!(
            MediaInput::from_descriptor("https://example.com/cat.gif"),
            MediaInput::RemoteUrl(_)
        ));
        assert!(matches!(
            MediaInput::from_descriptor("HTTP://EXAMPLE.COM/cat.gif"),
            MediaInput::RemoteUrl(_)
        ));
        assert!(matches!(
            MediaInput::from_descriptor("/tmp/cat.gif"),
            MediaInput::LocalPath(_)
        ));
        assert!(matches!(
            MediaInput::from_descriptor("httpfoo.png"),
            MediaInput::LocalPath(_)
        ));
    }

    #[test]
    fn data_prefixed_non_base64_strings_are_paths() {
        for path in [
            "data:text",
            "data:text/plain,hello",
            "data:image/png;base64",
            "data:base64,aGVsbG8=",
            "data:;base64,aGVsbG8=",
            "data",
        ] {
            assert_eq!(
                MediaInput::from_descriptor(path),
                MediaInput::LocalPath(PathBuf::from(path)),
                "{path}"
            );
        }
        assert!(matches!(
            MediaInput::from_descriptor("DATA:image/png;name=a.png;base64,AAAA"),
            MediaInput::DataUri(_)
        ));
    }

    #[test]
    fn json_object_with_url() {
        let value = serde_json::json!({ "url": "https://example.com/a.mp4" });
        let input = MediaInput::from_json(&value).unwrap();
        assert_eq!(
            input,
            MediaInput::UrlObject {
                url: "https://example.com/a.mp4".into()
            }
        );
    }

    #[test]
    fn json_rejects_other_shapes() {
        for value in [
            serde_json::json!(42),
            serde_json::json!(null),
            serde_json::json!(["a"]),
            serde_json::json!({ "href": "https://example.com" }),
            serde_json::json!({ "url": 7 }),
        ] {
            let err = MediaInput::from_json(&value).unwrap_err();
            assert!(matches!(err, Error::InvalidInputKind(_)), "{value}");
        }
    }

    #[test]
    fn debug_hides_payload() {
        let input = MediaInput::Bytes(vec![0u8; 4096]);
        assert_eq!(format!("{input:?}"), "Bytes(4096 bytes)");
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("image".parse::<StickerKind>().unwrap(), StickerKind::Image);
        assert_eq!(" Video ".parse::<StickerKind>().unwrap(), StickerKind::Video);
        assert!(matches!(
            "audio".parse::<StickerKind>(),
            Err(Error::UnsupportedKind(_))
        ));
        assert!(StickerKind::Video.is_animated());
        assert!(!StickerKind::Image.is_animated());
    }

    #[test]
    fn request_metadata_gate() {
        let req = ConversionRequest::new(StickerKind::Image);
        assert!(!req.wants_metadata());
        assert!(req.clone().pack_name("Pack").wants_metadata());
        assert!(req.author("Someone").wants_metadata());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: ConversionRequest = serde_json::from_str(r#"{"kind":"video"}"#).unwrap();
        assert_eq!(req.kind, StickerKind::Video);
        assert!(!req.force_square);
        assert!(req.pack_name.is_empty());
    }
}
