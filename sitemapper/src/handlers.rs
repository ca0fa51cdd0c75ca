use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitemapper_core::config::{AuxiliarySource, CONFIG_FILE_NAME, SitemapConfig};
use sitemapper_core::data::{Database, NewObject, NewPage};
use sitemapper_core::error::DataError;
use sitemapper_core::fields::seo_tab;
use sitemapper_core::head::render_head;
use sitemapper_core::model::{ChangeFrequency, Priority, Robots};
use sitemapper_core::sitemap::SitemapBuilder;
use sitemapper_core::store::{ContentStore, PageQuery};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DATABASE_FILE_NAME: &str = "sitemapper.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapFormat {
    Html,
    Xml,
}

impl SitemapFormat {
    pub fn from_arg(value: &str) -> Result<Self> {
        match value {
            "html" => Ok(SitemapFormat::Html),
            "xml" => Ok(SitemapFormat::Xml),
            other => bail!("Unknown sitemap format '{}'", other),
        }
    }
}

/// What `init` created or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub database: PathBuf,
    pub config: PathBuf,
    pub database_replaced: bool,
    pub config_written: bool,
}

pub fn resolve_config_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn database_path(config_dir: &Path) -> PathBuf {
    config_dir.join(DATABASE_FILE_NAME)
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

pub fn open_database(config_dir: &Path) -> Result<Database> {
    let path = database_path(config_dir);
    if !Database::exists(&path) {
        bail!(
            "No database at {}, run `sitemapper init` first",
            path.display()
        );
    }
    Database::new(&path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Falls back to the defaults when there is no config file yet.
pub fn load_config(config_dir: &Path) -> Result<SitemapConfig> {
    let path = config_path(config_dir);
    if !path.exists() {
        warn!("No {} in {}, using defaults", CONFIG_FILE_NAME, config_dir.display());
        return Ok(SitemapConfig::default());
    }
    SitemapConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

pub fn init_workspace(config_dir: &Path, force: bool) -> Result<InitOutcome> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let db_path = database_path(config_dir);
    let database_replaced = force && Database::exists(&db_path);
    if database_replaced {
        debug!("Removing existing database {}", db_path.display());
        Database::remove(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }
    Database::new(&db_path)
        .with_context(|| format!("Failed to create database {}", db_path.display()))?;

    let cfg_path = config_path(config_dir);
    let config_written = force || !cfg_path.exists();
    if config_written {
        let content = serde_json::to_string_pretty(&SitemapConfig::default().to_json())?;
        fs::write(&cfg_path, content + "\n")
            .with_context(|| format!("Failed to write {}", cfg_path.display()))?;
    }

    Ok(InitOutcome {
        database: db_path,
        config: cfg_path,
        database_replaced,
        config_written,
    })
}

pub fn parse_priority(value: f64) -> Result<Priority, DataError> {
    Priority::new(value).map_err(|_| DataError::InvalidValue {
        field: "priority",
        value: value.to_string(),
    })
}

fn change_frequency_from(args: &ArgMatches) -> Result<ChangeFrequency> {
    match args.get_one::<String>("change-frequency") {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(ChangeFrequency::default()),
    }
}

fn priority_from(args: &ArgMatches) -> Result<Priority> {
    match args.get_one::<f64>("priority") {
        Some(value) => Ok(parse_priority(*value)?),
        None => Ok(Priority::default()),
    }
}

pub fn page_from_args(args: &ArgMatches) -> Result<NewPage> {
    let title = args.get_one::<String>("title").context("--title is required")?;
    let segment = args
        .get_one::<String>("segment")
        .context("--segment is required")?;

    let mut page = NewPage::new(title, segment);
    page.parent_id = args.get_one::<i64>("parent").copied();
    if let Some(sort) = args.get_one::<i64>("sort") {
        page.sort = *sort;
    }
    if let Some(class_name) = args.get_one::<String>("class") {
        page.class_name = class_name.clone();
    }
    page.meta.robots = args
        .get_one::<String>("robots")
        .map(|raw| raw.parse::<Robots>())
        .transpose()?;
    page.meta.priority = priority_from(args)?;
    page.meta.change_frequency = change_frequency_from(args)?;
    page.meta.meta_title = args.get_one::<String>("meta-title").cloned();
    page.meta.meta_description = args.get_one::<String>("meta-description").cloned();
    Ok(page)
}

pub fn object_from_args(args: &ArgMatches) -> Result<NewObject> {
    let title = args.get_one::<String>("title").context("--title is required")?;
    let segment = args
        .get_one::<String>("segment")
        .context("--segment is required")?;

    let mut object = NewObject::new(title, segment);
    object.priority = priority_from(args)?;
    object.change_frequency = change_frequency_from(args)?;
    Ok(object)
}

pub fn render_sitemap(config_dir: &Path, format: SitemapFormat) -> Result<String> {
    let db = open_database(config_dir)?;
    let config = load_config(config_dir)?;
    let builder = SitemapBuilder::new(&db, &config)?;
    let rendered = match format {
        SitemapFormat::Html => builder.render_html()?,
        SitemapFormat::Xml => builder.render_xml()?,
    };
    Ok(rendered)
}

pub fn render_page_head(config_dir: &Path, page_id: i64) -> Result<String> {
    let db = open_database(config_dir)?;
    let config = load_config(config_dir)?;
    let page = db.get_page(page_id)?;
    let link = db.page_link(page_id)?;
    Ok(render_head(&page, &config.resolved_base_url(), &link))
}

pub fn fields_json(config_dir: &Path) -> Result<String> {
    let config = load_config(config_dir)?;
    Ok(serde_json::to_string_pretty(&seo_tab(&config.seo))?)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

pub fn print_banner() {
    print_divider();
    println!(
        "{} {}",
        "  SITEMAPPER".bright_white().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    print_divider();
    println!();
}

pub fn handle_init(args: &ArgMatches, config_dir: &Path, quiet: bool) -> Result<()> {
    let force = args.get_flag("force");
    let db_path = database_path(config_dir);
    let cfg_path = config_path(config_dir);

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );

    let mut overwrite = force;
    if !force && (Database::exists(&db_path) || cfg_path.exists()) {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Existing installation found:");
        for path in [&db_path, &cfg_path].into_iter().filter(|p| p.exists()) {
            println!("  {} {}", "•".yellow(), path.display().to_string().bright_white());
        }
        println!();

        let response = print_prompt("Overwrite the database and config? [y/N]:")?;
        println!();
        overwrite = response == "y" || response == "yes";
        if !overwrite {
            println!("{} Keeping existing files", "→".blue());
        }
    }

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Initializing {}", config_dir.display()));

    let outcome = init_workspace(config_dir, overwrite);
    spinner.finish_and_clear();
    let outcome = outcome?;

    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!(
        "{} Database: {}{}",
        "✓".green().bold(),
        outcome.database.display().to_string().bright_white(),
        if outcome.database_replaced { " (replaced)" } else { "" }
    );
    let config_note = if outcome.config_written { "" } else { " (kept)" };
    println!(
        "{} Config: {}{}",
        "✓".green().bold(),
        outcome.config.display().to_string().bright_white(),
        config_note
    );
    Ok(())
}

pub fn handle_page_add(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    let db = open_database(config_dir)?;
    let page = page_from_args(args)?;
    let id = db.insert_page(&page)?;
    println!(
        "{} Added page {} {}",
        "✓".green().bold(),
        id.to_string().cyan(),
        db.page_link(id)?.bright_white()
    );
    Ok(())
}

pub fn handle_page_list(config_dir: &Path) -> Result<()> {
    let db = open_database(config_dir)?;
    let pages = db.pages(&PageQuery::new())?;
    if pages.is_empty() {
        println!("{} No pages yet", "ℹ".blue());
        return Ok(());
    }

    for page in pages {
        let parent = page
            .parent_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let robots = page.meta.robots.map(|r| r.as_str()).unwrap_or("");
        println!(
            "{:>4}  parent {:>4}  sort {:>3}  {}  {}  {} {}",
            page.id.to_string().cyan(),
            parent,
            page.sort,
            db.page_link(page.id)?.bright_white(),
            page.title,
            page.meta.priority.to_string().bright_black(),
            robots.yellow()
        );
    }
    Ok(())
}

pub fn handle_object_register(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    let name = args.get_one::<String>("name").context("--name is required")?;
    let db = open_database(config_dir)?;
    let source = db.register_object_type(name)?;
    println!(
        "{} Registered object source {}",
        "✓".green().bold(),
        source.name().bright_white()
    );
    Ok(())
}

/// Registered sources, each paired with its `sitemapper.json` entry if one exists.
pub fn object_sources(config_dir: &Path) -> Result<Vec<(String, Option<AuxiliarySource>)>> {
    let db = open_database(config_dir)?;
    let config = load_config(config_dir)?;
    let names = db.list_object_types()?;
    Ok(names
        .into_iter()
        .map(|name| {
            let configured = config.objects.iter().find(|s| s.name == name).cloned();
            (name, configured)
        })
        .collect())
}

pub fn handle_object_list(config_dir: &Path) -> Result<()> {
    let sources = object_sources(config_dir)?;
    if sources.is_empty() {
        println!("{} No object sources registered", "ℹ".blue());
        return Ok(());
    }

    for (name, configured) in sources {
        let placement = match configured {
            Some(source) if source.parent_id == 0 => "xml only".to_string(),
            Some(source) => format!("under page {}", source.parent_id),
            None => "not configured".bright_black().to_string(),
        };
        println!("  {}  {}", name.bright_white(), placement);
    }
    Ok(())
}

pub fn handle_object_add(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    let name = args.get_one::<String>("source").context("--source is required")?;
    let db = open_database(config_dir)?;
    let source = db.resolve_source(name)?;
    let object = object_from_args(args)?;
    let id = db.insert_object(&source, &object)?;
    println!(
        "{} Added {} record {}",
        "✓".green().bold(),
        source.name().bright_white(),
        id.to_string().cyan()
    );
    Ok(())
}

pub fn handle_sitemap(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    let format = args
        .get_one::<String>("format")
        .map(|raw| SitemapFormat::from_arg(raw))
        .transpose()?
        .unwrap_or(SitemapFormat::Xml);
    let rendered = render_sitemap(config_dir, format)?;

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Sitemap saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub fn handle_fields(config_dir: &Path) -> Result<()> {
    println!("{}", fields_json(config_dir)?);
    Ok(())
}

pub fn handle_head(args: &ArgMatches, config_dir: &Path) -> Result<()> {
    let page_id = *args.get_one::<i64>("page").context("--page is required")?;
    print!("{}", render_page_head(config_dir, page_id)?);
    Ok(())
}
