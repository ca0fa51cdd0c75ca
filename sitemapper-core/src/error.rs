use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Object source '{source_name}' is missing required key '{key}'")]
    MissingKey { source_name: String, key: &'static str },

    #[error("Object source '{source_name}' has invalid {key}: {value}")]
    InvalidValue {
        source_name: String,
        key: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown object source: {0}")]
    UnknownSource(String),

    #[error("Parent page {0} does not exist")]
    MissingParent(i64),

    #[error("Page {0} not found")]
    PageNotFound(i64),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data access error: {0}")]
    Data(#[from] DataError),

    #[error("Page {0} is its own ancestor")]
    Cycle(i64),
}

pub type Result<T> = std::result::Result<T, SitemapError>;
