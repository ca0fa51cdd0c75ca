pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, DEFAULT_CONFIG_DIR, command_argument_builder};
pub use handlers::{
    SitemapFormat, config_path, database_path, fields_json, init_workspace, load_config,
    object_sources, open_database, render_page_head, render_sitemap, resolve_config_dir,
};
