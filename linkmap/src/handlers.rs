use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use linkmap_core::crawl::{CrawlOptions, CrawlProgressCallback, CrawlSummary, execute_crawl};
use linkmap_core::report::{PathReport, ReportFormat, generate_path_report};
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Parse a seed URL, adding http:// when no scheme was given
pub fn parse_seed_url(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let crawlable = |url: &Url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
    };

    // "example.com:8080" parses with "example.com" as its scheme
    let looks_like_host_port = line.split_once(':').is_some_and(|(host, rest)| {
        (host.contains('.') || host.eq_ignore_ascii_case("localhost"))
            && rest.starts_with(|c: char| c.is_ascii_digit())
    });

    // Try to parse as-is
    match Url::parse(line) {
        Ok(url) if crawlable(&url) => return Some(url.to_string()),
        Ok(_) if !looks_like_host_port => return None,
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return None,
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if crawlable(&url) => Some(url.to_string()),
        _ => None,
    }
}

/// Everything the crawl command was asked to do
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub workers: usize,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub insecure: bool,
    pub strict: bool,
    pub format: ReportFormat,
    pub quiet: bool,
}

impl CrawlSettings {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let seed = args
            .get_one::<String>("URL")
            .cloned()
            .ok_or_else(|| anyhow!("URL is missing"))?;
        let format_name = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");
        let format = ReportFormat::from_str(format_name)
            .ok_or_else(|| anyhow!("Unknown report format '{}'", format_name))?;

        Ok(Self {
            seed,
            from: args.get_one::<String>("from").cloned(),
            to: args.get_one::<String>("to").cloned(),
            workers: args.get_one::<u32>("workers").copied().unwrap_or(10) as usize,
            timeout_secs: args.get_one::<u64>("timeout").copied().unwrap_or(10),
            user_agent: args.get_one::<String>("user-agent").cloned(),
            insecure: args.get_flag("insecure"),
            strict: args.get_flag("strict"),
            format,
            quiet: args.get_flag("quiet"),
        })
    }

    pub fn crawl_options(&self, show_progress_bars: bool) -> CrawlOptions {
        let mut options = CrawlOptions::new(self.seed.clone());
        options.workers = self.workers;
        options.timeout_secs = self.timeout_secs;
        options.user_agent = self.user_agent.clone();
        options.insecure = self.insecure;
        options.strict = self.strict;
        options.show_progress_bars = show_progress_bars;
        options
    }
}

pub fn print_banner() {
    println!("{}", "linkmap".bright_cyan().bold());
    println!(
        "{}",
        format!("v{} - press Ctrl-C to stop crawling and find a path", env!("CARGO_PKG_VERSION"))
            .bright_black()
    );
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn read_prompt(msg: &str) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_string())
}

/// Resolves once the user presses Ctrl-C.
async fn wait_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C, crawl can only be killed: {}", e);
        std::future::pending::<()>().await;
    }
}

/// A second Ctrl-C while the path is being worked out exits straight away.
fn exit_on_second_interrupt() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nForce quit requested, exiting immediately...");
            std::process::exit(130);
        }
    });
}

/// Path destination from --to, or ask for one.
async fn resolve_destination(settings: &CrawlSettings) -> Result<Option<String>> {
    if let Some(ref to) = settings.to {
        return Ok(Some(to.clone()));
    }

    let answer = tokio::task::spawn_blocking(|| {
        read_prompt("Find a path to which page? (leave empty to skip):")
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read destination from stdin")?;

    Ok(if answer.is_empty() { None } else { Some(answer) })
}

/// Answer the path query against whatever the crawl found.
pub fn render_path_report(summary: &CrawlSummary, from: &str, to: &str, format: ReportFormat) -> Result<String> {
    let graph = summary
        .graph
        .read()
        .map_err(|_| anyhow!("Link graph lock poisoned"))?;
    let report = PathReport::query(&graph, from, to);
    Ok(generate_path_report(&report, format))
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let settings = CrawlSettings::from_matches(args)?;

    if !settings.quiet {
        println!("{} {}", "Crawling".bright_white().bold(), settings.seed.bright_white());
        println!("Workers: {}", settings.workers);
        println!("Timeout: {}s", settings.timeout_secs);
        if settings.insecure {
            println!("{}", "TLS certificate verification disabled".yellow());
        }
        println!();
    }

    // The spinner lives on stderr; progress lines always go to stdout
    let show_progress_bars = !settings.quiet && io::stderr().is_terminal();
    let progress_callback: Option<CrawlProgressCallback> = if settings.quiet {
        None
    } else {
        Some(Arc::new(|line: String| println!("{}", line)))
    };

    let summary = execute_crawl(
        settings.crawl_options(show_progress_bars),
        progress_callback,
        wait_for_interrupt(),
    )
    .await
    .map_err(|e| anyhow!(e))?;

    exit_on_second_interrupt();

    println!();
    println!("^C received");
    print_divider();
    println!(
        "{} {} pages fetched, {} dispatched",
        "→".blue(),
        summary.pages_fetched,
        summary.pages_dispatched
    );
    print_divider();

    let from = settings.from.clone().unwrap_or_else(|| summary.seed.clone());
    let Some(to) = resolve_destination(&settings).await? else {
        println!("{} No destination given, skipping path query", "→".blue());
        return Ok(());
    };

    let report = render_path_report(&summary, &from, &to, settings.format)?;
    print!("{}", report);
    Ok(())
}
