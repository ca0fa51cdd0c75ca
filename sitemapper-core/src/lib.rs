pub mod config;
pub mod data;
pub mod error;
pub mod fields;
pub mod head;
pub mod markup;
pub mod model;
pub mod sitemap;
pub mod store;

pub use config::{AuxiliarySource, SeoPanelConfig, SitemapConfig};
pub use data::{Database, NewObject, NewPage};
pub use error::{ConfigError, DataError, Result, SitemapError};
pub use model::{Page, PageMetadata, Priority};
pub use sitemap::{SitemapBuilder, SitemapTree};
pub use store::{ContentStore, PageQuery, SourceId};
