//! Sitemap and SEO panel configuration.
//!
//! Loaded once from `sitemapper.json` and handed to the builder explicitly.
//!
//! ```json
//! {
//!   "base_url": "https://example.com/",
//!   "exclude_classes": ["ErrorPage"],
//!   "objects": {
//!     "BlogPost": { "parent_id": 3, "prefix": "blog" },
//!     "Product": { "parent_id": 0 }
//!   },
//!   "seo": { "title": "Meta Tags and SEO", "image_size_kb": 1024, "image_folder": "Social" }
//! }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "sitemapper.json";
pub const ERROR_PAGE_CLASS: &str = "ErrorPage";

/// An auxiliary content type spliced into the sitemap under `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxiliarySource {
    pub name: String,
    /// `0` means the source is never attached in the HTML tree.
    pub parent_id: i64,
    pub prefix: Option<String>,
}

impl AuxiliarySource {
    pub fn attaches_to(&self, page_id: i64) -> bool {
        self.parent_id != 0 && self.parent_id == page_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoPanelConfig {
    pub title: String,
    pub image_size_kb: u64,
    pub image_folder: String,
}

impl Default for SeoPanelConfig {
    fn default() -> Self {
        Self {
            title: "Meta Tags and SEO".to_string(),
            image_size_kb: 1024,
            image_folder: "Social".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapConfig {
    pub base_url: Option<String>,
    pub exclude_classes: Vec<String>,
    /// Kept in file order.
    pub objects: Vec<AuxiliarySource>,
    pub seo: SeoPanelConfig,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            exclude_classes: vec![ERROR_PAGE_CLASS.to_string()],
            objects: Vec::new(),
            seo: SeoPanelConfig::default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    base_url: Option<String>,
    exclude_classes: Option<Vec<String>>,
    objects: Map<String, Value>,
    seo: SeoPanelConfig,
}

impl SitemapConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content)?;

        let objects = raw
            .objects
            .iter()
            .map(|(name, entry)| parse_source(name, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url: raw.base_url,
            exclude_classes: raw
                .exclude_classes
                .unwrap_or_else(|| vec![ERROR_PAGE_CLASS.to_string()]),
            objects,
            seo: raw.seo,
        })
    }

    pub fn to_json(&self) -> Value {
        let mut objects = Map::new();
        for source in &self.objects {
            let mut entry = Map::new();
            entry.insert("parent_id".to_string(), json!(source.parent_id));
            if let Some(prefix) = &source.prefix {
                entry.insert("prefix".to_string(), json!(prefix));
            }
            objects.insert(source.name.clone(), Value::Object(entry));
        }

        json!({
            "base_url": self.base_url,
            "exclude_classes": self.exclude_classes,
            "objects": objects,
            "seo": self.seo,
        })
    }

    /// The absolute base URL without a trailing slash, or an empty string
    /// when it is unset or unparsable.
    pub fn resolved_base_url(&self) -> String {
        let Some(raw) = self.base_url.as_deref() else {
            warn!("No base_url configured, sitemap links will be relative");
            return String::new();
        };

        match Url::parse(raw.trim()) {
            Ok(url) => url.as_str().trim_end_matches('/').to_string(),
            Err(e) => {
                warn!("Ignoring invalid base_url '{}': {}", raw, e);
                String::new()
            }
        }
    }
}

fn parse_source(name: &str, entry: &Value) -> Result<AuxiliarySource, ConfigError> {
    let Value::Object(fields) = entry else {
        return Err(ConfigError::InvalidValue {
            source_name: name.to_string(),
            key: "entry",
            value: entry.to_string(),
        });
    };

    let parent_id = match fields.get("parent_id") {
        None | Some(Value::Null) => {
            return Err(ConfigError::MissingKey {
                source_name: name.to_string(),
                key: "parent_id",
            });
        }
        Some(value) => parse_parent_id(value).ok_or_else(|| ConfigError::InvalidValue {
            source_name: name.to_string(),
            key: "parent_id",
            value: value.to_string(),
        })?,
    };

    let prefix = match fields.get("prefix") {
        None | Some(Value::Null) => None,
        Some(Value::String(prefix)) => {
            let trimmed = prefix.trim_matches('/');
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(other) => {
            return Err(ConfigError::InvalidValue {
                source_name: name.to_string(),
                key: "prefix",
                value: other.to_string(),
            });
        }
    };

    Ok(AuxiliarySource {
        name: name.to_string(),
        parent_id,
        prefix,
    })
}

fn parse_parent_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id >= 0).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parent_id_accepts_numeric_strings() {
        assert_eq!(parse_parent_id(&json!(3)), Some(3));
        assert_eq!(parse_parent_id(&json!("7")), Some(7));
        assert_eq!(parse_parent_id(&json!(-1)), None);
        assert_eq!(parse_parent_id(&json!(1.5)), None);
        assert_eq!(parse_parent_id(&json!(true)), None);
    }

    #[test]
    fn test_prefix_slashes_are_trimmed() {
        let source = parse_source("BlogPost", &json!({"parent_id": 2, "prefix": "/blog/"})).unwrap();
        assert_eq!(source.prefix.as_deref(), Some("blog"));

        let source = parse_source("BlogPost", &json!({"parent_id": 2, "prefix": "/"})).unwrap();
        assert_eq!(source.prefix, None);
    }

    #[test]
    fn test_attaches_to_ignores_zero() {
        let source = AuxiliarySource {
            name: "Product".to_string(),
            parent_id: 0,
            prefix: None,
        };
        assert!(!source.attaches_to(0));
        assert!(!source.attaches_to(1));
    }
}
