use clap::ArgMatches;
use colored::Colorize;
use sitemapper::commands::{DEFAULT_CONFIG_DIR, command_argument_builder};
use sitemapper::handlers::*;
use std::path::Path;

fn main() {
    // stdout carries the rendered documents
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Machine-readable output stays clean
    let emits_document = matches!(
        chosen_command.subcommand_name(),
        Some("sitemap") | Some("fields") | Some("head")
    );
    if !quiet && !emits_document {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        return;
    }

    let raw_dir = chosen_command
        .get_one::<String>("config-dir")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_DIR);
    let config_dir = resolve_config_dir(raw_dir);

    if let Err(e) = dispatch(&chosen_command, &config_dir, quiet) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn dispatch(matches: &ArgMatches, config_dir: &Path, quiet: bool) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command, config_dir, quiet),
        Some(("page", primary_command)) => match primary_command.subcommand() {
            Some(("add", secondary_command)) => handle_page_add(secondary_command, config_dir),
            Some(("list", _)) => handle_page_list(config_dir),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("object", primary_command)) => match primary_command.subcommand() {
            Some(("register", secondary_command)) => {
                handle_object_register(secondary_command, config_dir)
            }
            Some(("add", secondary_command)) => handle_object_add(secondary_command, config_dir),
            Some(("list", _)) => handle_object_list(config_dir),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("sitemap", primary_command)) => handle_sitemap(primary_command, config_dir),
        Some(("fields", _)) => handle_fields(config_dir),
        Some(("head", primary_command)) => handle_head(primary_command, config_dir),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
