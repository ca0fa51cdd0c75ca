// CMS edit-form contract for the SEO tab. The host form builder renders these
// descriptors; nothing here draws a field.

use crate::config::SeoPanelConfig;
use crate::model::{ChangeFrequency, OG_LOCALES, OgType, Robots, TwitterCard};
use serde::Serialize;

pub const SEO_TAB: &str = "Root.SEO";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Header,
    Preview,
    Text,
    Textarea,
    Numeric,
    Checkbox,
    Dropdown {
        options: Vec<DropdownOption>,
    },
    Upload {
        max_file_size: u64,
        folder: String,
        allowed_categories: Vec<&'static str>,
    },
    RelationGrid {
        relation: &'static str,
        allow_link_existing: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmsField {
    pub name: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl CmsField {
    fn new(name: &str, title: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind,
        }
    }

    fn header(title: &str) -> Self {
        Self::new("", title, FieldKind::Header)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTab {
    pub tab: &'static str,
    pub fields: Vec<CmsField>,
}

/// Kilobyte limit to bytes, as the upload validator expects. Saturates at `u64::MAX`.
pub fn max_upload_bytes(kilobytes: u64) -> u64 {
    kilobytes.saturating_mul(1024)
}

pub fn robots_options() -> Vec<DropdownOption> {
    Robots::ALL
        .iter()
        .map(|r| DropdownOption {
            value: r.as_str(),
            label: r.as_str(),
        })
        .collect()
}

pub fn change_frequency_options() -> Vec<DropdownOption> {
    ChangeFrequency::ALL
        .iter()
        .map(|f| DropdownOption {
            value: f.as_str(),
            label: f.label(),
        })
        .collect()
}

pub fn og_type_options() -> Vec<DropdownOption> {
    OgType::ALL
        .iter()
        .map(|t| DropdownOption {
            value: t.as_str(),
            label: t.label(),
        })
        .collect()
}

pub fn og_locale_options() -> Vec<DropdownOption> {
    OG_LOCALES
        .iter()
        .map(|(value, label)| DropdownOption {
            value: *value,
            label: *label,
        })
        .collect()
}

pub fn twitter_card_options() -> Vec<DropdownOption> {
    TwitterCard::ALL
        .iter()
        .map(|c| DropdownOption {
            value: c.as_str(),
            label: c.label(),
        })
        .collect()
}

/// Fields added to every page's SEO tab, in display order.
pub fn seo_fields(config: &SeoPanelConfig) -> Vec<CmsField> {
    vec![
        CmsField::header(&config.title),
        CmsField::new("Preview", "Preview", FieldKind::Preview),
        CmsField::new("MetaTitle", "Meta Title", FieldKind::Text),
        CmsField::new("MetaDescription", "Meta Description", FieldKind::Textarea),
        CmsField::header("Indexing"),
        CmsField::new("Canonical", "Canonical", FieldKind::Text),
        CmsField::new(
            "Robots",
            "Robots",
            FieldKind::Dropdown {
                options: robots_options(),
            },
        ),
        CmsField::header("Sitemap"),
        CmsField::new("Priority", "Priority", FieldKind::Numeric),
        CmsField::new(
            "ChangeFrequency",
            "Change Frequency",
            FieldKind::Dropdown {
                options: change_frequency_options(),
            },
        ),
        CmsField::header("Social"),
        CmsField::new("HideSocial", "Hide Social Meta?", FieldKind::Checkbox),
        CmsField::new(
            "OGtype",
            "Open Graph Type",
            FieldKind::Dropdown {
                options: og_type_options(),
            },
        ),
        CmsField::new(
            "OGlocale",
            "Open Graph Locale",
            FieldKind::Dropdown {
                options: og_locale_options(),
            },
        ),
        CmsField::new(
            "TwitterCard",
            "Twitter Card",
            FieldKind::Dropdown {
                options: twitter_card_options(),
            },
        ),
        CmsField::new(
            "SocialImage",
            "Social Image",
            FieldKind::Upload {
                max_file_size: max_upload_bytes(config.image_size_kb),
                folder: config.image_folder.clone(),
                allowed_categories: vec!["image"],
            },
        ),
        CmsField::new(
            "HeadTags",
            "Other Meta Tags",
            FieldKind::RelationGrid {
                relation: "HeadTags",
                allow_link_existing: false,
            },
        ),
    ]
}

pub fn seo_tab(config: &SeoPanelConfig) -> FieldTab {
    FieldTab {
        tab: SEO_TAB,
        fields: seo_fields(config),
    }
}
