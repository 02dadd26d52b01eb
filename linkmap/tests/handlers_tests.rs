use clap::error::ErrorKind;
use linkmap::commands::command_argument_builder;
use linkmap::handlers::*;
use linkmap::{CrawlSummary, ReportFormat};
use linkmap_scanner::LinkGraph;

fn settings_from(args: &[&str]) -> CrawlSettings {
    let matches = command_argument_builder()
        .try_get_matches_from(args)
        .unwrap();
    CrawlSettings::from_matches(&matches).unwrap()
}

#[test]
fn test_parse_seed_url_with_scheme() {
    let result = parse_seed_url("https://example.com");
    assert_eq!(result, Some("https://example.com/".to_string()));
}

#[test]
fn test_parse_seed_url_without_scheme() {
    let result = parse_seed_url("example.com");
    assert_eq!(result, Some("http://example.com/".to_string()));
}

#[test]
fn test_parse_seed_url_host_and_port() {
    let result = parse_seed_url("localhost:3000/docs");
    assert_eq!(result, Some("http://localhost:3000/docs".to_string()));
}

#[test]
fn test_parse_seed_url_keeps_path_and_query() {
    let result = parse_seed_url("  https://example.com/a/b?c=d  ");
    assert_eq!(result, Some("https://example.com/a/b?c=d".to_string()));
}

#[test]
fn test_parse_seed_url_invalid() {
    assert_eq!(parse_seed_url("not a valid url!!!"), None);
    assert_eq!(parse_seed_url(""), None);
    assert_eq!(parse_seed_url("   "), None);
}

#[test]
fn test_parse_seed_url_rejects_other_schemes() {
    assert_eq!(parse_seed_url("mailto:someone@example.com"), None);
    assert_eq!(parse_seed_url("ftp://example.com/file"), None);
}

#[test]
fn test_parse_seed_url_scheme_with_digits_is_not_a_port() {
    assert_eq!(parse_seed_url("mailto:12"), None);
    assert_eq!(parse_seed_url("tel:5551234"), None);
    assert_eq!(
        parse_seed_url("example.com:8080"),
        Some("http://example.com:8080/".to_string())
    );
}

#[test]
fn test_missing_url_is_an_error() {
    let err = command_argument_builder()
        .try_get_matches_from(["linkmap"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_invalid_url_is_an_error() {
    let err = command_argument_builder()
        .try_get_matches_from(["linkmap", "mailto:x@y.com"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_zero_workers_is_an_error() {
    let err = command_argument_builder()
        .try_get_matches_from(["linkmap", "https://example.com", "--workers", "0"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_unknown_format_is_an_error() {
    let err = command_argument_builder()
        .try_get_matches_from(["linkmap", "https://example.com", "--format", "csv"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_settings_defaults() {
    let settings = settings_from(&["linkmap", "example.com"]);
    assert_eq!(settings.seed, "http://example.com/");
    assert_eq!(settings.from, None);
    assert_eq!(settings.to, None);
    assert_eq!(settings.workers, 10);
    assert_eq!(settings.timeout_secs, 10);
    assert_eq!(settings.user_agent, None);
    assert!(!settings.insecure);
    assert!(!settings.strict);
    assert!(!settings.quiet);
    assert_eq!(settings.format, ReportFormat::Text);
}

#[test]
fn test_settings_all_flags() {
    let settings = settings_from(&[
        "linkmap",
        "https://example.com/start",
        "--from",
        "https://example.com/a",
        "--to",
        "https://example.com/b",
        "-w",
        "3",
        "--timeout",
        "4",
        "-A",
        "tester/1.0",
        "--insecure",
        "--strict",
        "-f",
        "json",
        "-q",
    ]);
    assert_eq!(settings.seed, "https://example.com/start");
    assert_eq!(settings.from.as_deref(), Some("https://example.com/a"));
    assert_eq!(settings.to.as_deref(), Some("https://example.com/b"));
    assert_eq!(settings.workers, 3);
    assert_eq!(settings.timeout_secs, 4);
    assert_eq!(settings.user_agent.as_deref(), Some("tester/1.0"));
    assert!(settings.insecure);
    assert!(settings.strict);
    assert!(settings.quiet);
    assert_eq!(settings.format, ReportFormat::Json);

    let options = settings.crawl_options(false);
    assert_eq!(options.seed, "https://example.com/start");
    assert_eq!(options.workers, 3);
    assert!(options.insecure);
    assert!(options.strict);
    assert!(!options.show_progress_bars);
}

#[test]
fn test_verbose_is_counted() {
    let matches = command_argument_builder()
        .try_get_matches_from(["linkmap", "https://example.com", "-vv"])
        .unwrap();
    assert_eq!(matches.get_count("verbose"), 2);
}

#[test]
fn test_render_path_report_from_summary() {
    let graph = LinkGraph::shared();
    {
        let mut graph = graph.write().unwrap();
        graph.add_edge("https://example.com/", "https://example.com/about");
        graph.add_edge("https://example.com/about", "https://example.com/team");
    }
    let summary = CrawlSummary {
        seed: "https://example.com/".to_string(),
        graph,
        pages_fetched: 3,
        pages_dispatched: 3,
    };

    let json = render_path_report(
        &summary,
        "https://example.com",
        "https://example.com/team",
        ReportFormat::Json,
    )
    .unwrap();
    assert!(json.contains("\"found\": true"));
    assert!(json.contains("\"hops\": 2"));

    let json = render_path_report(
        &summary,
        "https://example.com/team",
        "https://example.com/",
        ReportFormat::Json,
    )
    .unwrap();
    assert!(json.contains("\"found\": false"));
}
