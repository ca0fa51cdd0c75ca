// Page and page metadata types shared by the store, the sitemap builder and
// the CMS field contract.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseValueError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Robots meta directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Robots {
    IndexFollow,
    NoIndexNoFollow,
    NoIndexFollow,
    IndexNoFollow,
}

impl Robots {
    pub const ALL: [Robots; 4] = [
        Robots::IndexFollow,
        Robots::NoIndexNoFollow,
        Robots::NoIndexFollow,
        Robots::IndexNoFollow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Robots::IndexFollow => "index,follow",
            Robots::NoIndexNoFollow => "noindex,nofollow",
            Robots::NoIndexFollow => "noindex,follow",
            Robots::IndexNoFollow => "index,nofollow",
        }
    }
}

/// Sitemap `<changefreq>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub const ALL: [ChangeFrequency; 7] = [
        ChangeFrequency::Always,
        ChangeFrequency::Hourly,
        ChangeFrequency::Daily,
        ChangeFrequency::Weekly,
        ChangeFrequency::Monthly,
        ChangeFrequency::Yearly,
        ChangeFrequency::Never,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "Always",
            ChangeFrequency::Hourly => "Hourly",
            ChangeFrequency::Daily => "Daily",
            ChangeFrequency::Weekly => "Weekly",
            ChangeFrequency::Monthly => "Monthly",
            ChangeFrequency::Yearly => "Yearly",
            ChangeFrequency::Never => "Never",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OgType {
    Website,
    Article,
    Book,
    Profile,
    Music,
    Video,
}

impl OgType {
    pub const ALL: [OgType; 6] = [
        OgType::Website,
        OgType::Article,
        OgType::Book,
        OgType::Profile,
        OgType::Music,
        OgType::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OgType::Website => "website",
            OgType::Article => "article",
            OgType::Book => "book",
            OgType::Profile => "profile",
            OgType::Music => "music",
            OgType::Video => "video",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OgType::Website => "Website",
            OgType::Article => "Article",
            OgType::Book => "Book",
            OgType::Profile => "Profile",
            OgType::Music => "Music",
            OgType::Video => "Video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwitterCard {
    Summary,
    SummaryLargeImage,
    Photo,
    Gallery,
    App,
    Product,
}

impl TwitterCard {
    pub const ALL: [TwitterCard; 6] = [
        TwitterCard::Summary,
        TwitterCard::SummaryLargeImage,
        TwitterCard::Photo,
        TwitterCard::Gallery,
        TwitterCard::App,
        TwitterCard::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TwitterCard::Summary => "summary",
            TwitterCard::SummaryLargeImage => "summary_large_image",
            TwitterCard::Photo => "photo",
            TwitterCard::Gallery => "gallery",
            TwitterCard::App => "app",
            TwitterCard::Product => "product",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TwitterCard::Summary => "Summary",
            TwitterCard::SummaryLargeImage => "Summary Large Image",
            TwitterCard::Photo => "Photo",
            TwitterCard::Gallery => "Gallery",
            TwitterCard::App => "App",
            TwitterCard::Product => "Product",
        }
    }
}

/// Open Graph locales offered to authors, as `(code, label)`.
pub const OG_LOCALES: [(&str, &str); 30] = [
    ("en_GB", "English - United Kingdom"),
    ("en_US", "English - United States"),
    ("da_DK", "Danish - Denmark"),
    ("nl_NL", "Dutch - Netherlands"),
    ("fr_FR", "French - France"),
    ("de_DE", "German - Germany"),
    ("el_GR", "Greek - Greece"),
    ("hu_HU", "Hungarian - Hungary"),
    ("is_IS", "Icelandic - Iceland"),
    ("id_ID", "Indonesian - Indonesia"),
    ("it_IT", "Italian - Italy"),
    ("ja_JP", "Japanese - Japan"),
    ("ko_KR", "Korean - Korea"),
    ("lv_LV", "Latvian - Latvia"),
    ("lt_LT", "Lithuanian - Lithuania"),
    ("mk_MK", "Macedonian - Macedonia"),
    ("no_NO", "Norwegian - Norway"),
    ("fa_IN", "Persian - India"),
    ("fa_IR", "Persian - Iran"),
    ("pl_PL", "Polish - Poland"),
    ("pt_PT", "Portuguese - Portugal"),
    ("ro_RO", "Romanian - Romania"),
    ("ru_RU", "Russian - Russia"),
    ("sk_SK", "Slovak - Slovakia"),
    ("sl_SI", "Slovenian - Slovenia"),
    ("es_ES", "Spanish - Spain"),
    ("sv_SE", "Swedish - Sweden"),
    ("tr_TR", "Turkish - Turkey"),
    ("uk_UA", "Ukrainian - Ukraine"),
    ("vi_VN", "Vietnamese - Vietnam"),
];

/// An Open Graph locale code from [`OG_LOCALES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OgLocale(&'static str);

impl OgLocale {
    pub fn code(&self) -> &'static str {
        self.0
    }

    pub fn label(&self) -> &'static str {
        OG_LOCALES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, label)| *label)
            .unwrap_or(self.0)
    }
}

/// Sitemap priority, held as hundredths so it always stays within 0.00..=1.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(0);
    pub const MAX: Priority = Priority(100);

    /// Rejects anything outside 0.00..=1.00.
    pub fn new(value: f64) -> Result<Self, ParseValueError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ParseValueError::new("priority", value.to_string()));
        }
        Ok(Priority((value * 100.0).round() as u8))
    }

    /// Pulls out-of-range values back to the nearest bound. NaN becomes the default.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Priority::default();
        }
        Priority((value.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    pub fn from_hundredths(hundredths: i64) -> Result<Self, ParseValueError> {
        if !(0..=100).contains(&hundredths) {
            return Err(ParseValueError::new(
                "priority",
                format!("{} (hundredths)", hundredths),
            ));
        }
        Ok(Priority(hundredths as u8))
    }

    pub fn hundredths(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority(50)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ParseValueError::new("priority", s))?;
        Priority::new(value)
    }
}

macro_rules! string_enum_impls {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseValueError::new($kind, s))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

string_enum_impls!(Robots, "robots directive");
string_enum_impls!(ChangeFrequency, "change frequency");
string_enum_impls!(OgType, "Open Graph type");
string_enum_impls!(TwitterCard, "Twitter card type");

impl fmt::Display for OgLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for OgLocale {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OG_LOCALES
            .iter()
            .find(|(code, _)| *code == s)
            .map(|(code, _)| OgLocale(*code))
            .ok_or_else(|| ParseValueError::new("Open Graph locale", s))
    }
}

impl Serialize for OgLocale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Reference to an uploaded social sharing image, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialImage {
    pub path: String,
}

impl SocialImage {
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url, self.path.trim_start_matches('/'))
    }
}

/// An extra `<meta name=".." content="..">` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadTag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PageMetadata {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<Robots>,
    pub priority: Priority,
    pub change_frequency: ChangeFrequency,
    pub hide_social: bool,
    pub og_type: Option<OgType>,
    pub og_locale: Option<OgLocale>,
    pub twitter_card: Option<TwitterCard>,
    pub social_image: Option<SocialImage>,
    pub head_tags: Vec<HeadTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub class_name: String,
    pub title: String,
    pub url_segment: String,
    pub sort: i64,
    pub last_edited: Option<i64>,
    pub meta: PageMetadata,
}

/// A record of an auxiliary content type spliced into the sitemap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRecord {
    pub id: i64,
    pub title: String,
    pub url_segment: String,
    pub priority: Priority,
    pub change_frequency: ChangeFrequency,
    pub last_edited: Option<i64>,
}
