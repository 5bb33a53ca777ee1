//! Asset payloads referenced by `{{id}}` placeholder lines.
//!
//! A resolver maps placeholder ids to payloads. CSV payloads arrive
//! base64-encoded and are expanded into tables; images are accepted but
//! not embedded.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An asset payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Asset {
    /// Base64-encoded CSV text
    Csv {
        /// Encoded payload
        data: String,
    },
    /// Base64-encoded image
    Image {
        /// MIME type, e.g. `image/png`
        mime_type: String,
        /// Encoded payload
        data: String,
    },
}

impl Asset {
    /// Create a CSV asset from raw CSV text.
    pub fn csv_from_text(text: &str) -> Self {
        Asset::Csv {
            data: base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
        }
    }

    /// Kind name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Asset::Csv { .. } => "csv",
            Asset::Image { .. } => "image",
        }
    }
}

/// Looks up assets by placeholder id.
pub trait AssetResolver: Send + Sync {
    /// Resolve an id, or `None` if unknown.
    fn resolve(&self, id: &str) -> Option<&Asset>;
}

impl AssetResolver for HashMap<String, Asset> {
    fn resolve(&self, id: &str) -> Option<&Asset> {
        self.get(id)
    }
}

/// In-memory asset store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMap {
    assets: HashMap<String, Asset>,
}

impl AssetMap {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset and return self.
    pub fn with(mut self, id: impl Into<String>, asset: Asset) -> Self {
        self.insert(id, asset);
        self
    }

    /// Insert an asset.
    pub fn insert(&mut self, id: impl Into<String>, asset: Asset) {
        self.assets.insert(id.into(), asset);
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetResolver for AssetMap {
    fn resolve(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }
}

/// Decode a base64 CSV payload into rows of fields.
///
/// Whitespace inside the payload (line-wrapped base64) is ignored.
pub fn decode_csv(payload: &str) -> Result<Vec<Vec<String>>, String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("invalid base64: {}", e))?;
    let content = String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(|field| field.trim().to_string()).collect())
                .map_err(|e| format!("invalid CSV: {}", e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_csv_roundtrip() {
        let asset = Asset::csv_from_text("نام,سن\nعلی,20\n");
        let Asset::Csv { data } = &asset else {
            panic!("expected csv asset");
        };
        let rows = decode_csv(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["نام".to_string(), "سن".to_string()]);
    }

    #[test]
    fn test_decode_csv_ignores_wrapping() {
        let Asset::Csv { data } = Asset::csv_from_text("a,b\nc,d") else {
            unreachable!()
        };
        let wrapped = format!("{}\n{}", &data[..4], &data[4..]);
        assert_eq!(decode_csv(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_csv_errors() {
        assert!(decode_csv("!!!not base64!!!").unwrap_err().contains("base64"));

        let invalid_utf8 = base64::engine::general_purpose::STANDARD.encode([0xff, 0xfe]);
        assert!(decode_csv(&invalid_utf8).unwrap_err().contains("UTF-8"));
    }

    #[test]
    fn test_flexible_rows() {
        let Asset::Csv { data } = Asset::csv_from_text("a,b,c\nd") else {
            unreachable!()
        };
        let rows = decode_csv(&data).unwrap();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_asset_map_resolver() {
        let map = AssetMap::new().with("t1", Asset::csv_from_text("a,b"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("t1").map(Asset::kind), Some("csv"));
        assert!(map.resolve("missing").is_none());

        let mut raw = HashMap::new();
        raw.insert(
            "img".to_string(),
            Asset::Image {
                mime_type: "image/png".into(),
                data: String::new(),
            },
        );
        assert_eq!(raw.resolve("img").map(Asset::kind), Some("image"));
    }
}
