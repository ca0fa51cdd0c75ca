use clap::{arg, command};
use sitemapper_core::model::{ChangeFrequency, Robots};
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/sitemapper/";

fn priority_arg() -> clap::Arg {
    arg!(--"priority" <PRIORITY>)
        .required(false)
        .help("Sitemap priority between 0.0 and 1.0 (default: 0.5)")
        .value_parser(clap::value_parser!(f64))
}

fn change_frequency_arg() -> clap::Arg {
    arg!(--"change-frequency" <FREQUENCY>)
        .required(false)
        .help("How often the content is likely to change (default: weekly)")
        .value_parser(ChangeFrequency::ALL.map(|f| f.as_str()))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitemapper")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitemapper")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-c --"config-dir" <PATH>)
                .required(false)
                .global(true)
                .help("Directory holding sitemapper.json and the page database")
                .default_value(DEFAULT_CONFIG_DIR),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Creates the config directory, page database and a default sitemapper.json")
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Overwrites any existing database and configuration in the config \
                        directory.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("page")
                .about("Manage pages and their SEO metadata")
                .subcommand_required(true)
                .subcommand(
                    command!("add")
                        .about("Adds a page to the page tree")
                        .arg(arg!(-t --"title" <TITLE>).required(true).help("Page title"))
                        .arg(
                            arg!(-s --"segment" <SEGMENT>)
                                .required(true)
                                .help("URL segment of the page, e.g. 'about'"),
                        )
                        .arg(
                            arg!(-p --"parent" <ID>)
                                .required(false)
                                .help("Id of the parent page (default: root page)")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"sort" <SORT>)
                                .required(false)
                                .help("Position among root pages")
                                .value_parser(clap::value_parser!(i64))
                                .default_value("0"),
                        )
                        .arg(
                            arg!(--"class" <CLASS>)
                                .required(false)
                                .help("Content type of the page")
                                .default_value("Page"),
                        )
                        .arg(
                            arg!(--"robots" <DIRECTIVE>)
                                .required(false)
                                .help("Robots directive")
                                .value_parser(Robots::ALL.map(|r| r.as_str())),
                        )
                        .arg(priority_arg())
                        .arg(change_frequency_arg())
                        .arg(
                            arg!(--"meta-title" <TITLE>)
                                .required(false)
                                .help("Title used in the <title> tag and social previews"),
                        )
                        .arg(
                            arg!(--"meta-description" <DESCRIPTION>)
                                .required(false)
                                .help("Description used by search engines and social previews"),
                        ),
                )
                .subcommand(command!("list").about("Lists all pages")),
        )
        .subcommand(
            command!("object")
                .about("Manage auxiliary content sources")
                .subcommand_required(true)
                .subcommand(
                    command!("register").about("Registers an object source").arg(
                        arg!(-n --"name" <NAME>)
                            .required(true)
                            .help("The name of the source, as used in sitemapper.json"),
                    ),
                )
                .subcommand(
                    command!("add")
                        .about("Adds a record to an object source")
                        .arg(
                            arg!(--"source" <NAME>)
                                .required(true)
                                .help("The registered source to add to"),
                        )
                        .arg(arg!(-t --"title" <TITLE>).required(true).help("Record title"))
                        .arg(
                            arg!(-s --"segment" <SEGMENT>)
                                .required(true)
                                .help("URL segment of the record"),
                        )
                        .arg(priority_arg())
                        .arg(change_frequency_arg()),
                )
                .subcommand(command!("list").about("Lists registered object sources")),
        )
        .subcommand(
            command!("sitemap")
                .about("Renders the sitemap from the page tree and configured object sources")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: html, xml")
                        .value_parser(["html", "xml"])
                        .default_value("xml"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the sitemap to a file (default: print to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(command!("fields").about("Prints the SEO tab field list as JSON"))
        .subcommand(
            command!("head").about("Prints the <head> meta tags of a page").arg(
                arg!(-p --"page" <ID>)
                    .required(true)
                    .help("Id of the page")
                    .value_parser(clap::value_parser!(i64)),
            ),
        )
}
