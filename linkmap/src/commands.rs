use crate::handlers::parse_seed_url;
use clap::{arg, value_parser};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn seed_value(value: &str) -> Result<String, String> {
    parse_seed_url(value).ok_or_else(|| format!("'{}' is not an http(s) URL", value))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkmap")
        .about(
            "Crawl a site into a graph of its links. Press Ctrl-C to stop and print the \
            shortest path between two crawled pages.",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!(<URL>)
                .required(true)
                .help("The seed URL; only pages on its host are crawled")
                .value_parser(seed_value),
        )
        .arg(
            arg!(--"from" <URL>)
                .required(false)
                .help("Start page of the path query (default: the seed URL)"),
        )
        .arg(
            arg!(--"to" <URL>)
                .required(false)
                .help("End page of the path query (default: ask after Ctrl-C)"),
        )
        .arg(
            arg!(-w --"workers" <NUM_WORKERS>)
                .required(false)
                .help("Maximum number of pages fetched at the same time")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(-A --"user-agent" <USER_AGENT>)
                .required(false)
                .help("User-Agent header sent with every request"),
        )
        .arg(
            arg!(--"insecure")
                .required(false)
                .help("Accept invalid or self-signed TLS certificates")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"strict")
                .required(false)
                .help("Stop the crawl on the first page that fails to fetch")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Path report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and per-page progress output").required(false))
        .arg(
            arg!(-v --"verbose" "Log more (repeat for debug output)")
                .required(false)
                .action(clap::ArgAction::Count),
        )
}
