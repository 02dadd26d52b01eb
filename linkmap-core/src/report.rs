// Shortest-path reports over the crawled link graph

use colored::Colorize;
use linkmap_scanner::normalize::normalize_seed;
use linkmap_scanner::LinkGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathReport {
    pub from: String,
    pub to: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hops: Option<usize>,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub graph_pages: usize,
    pub graph_links: usize,
}

/// Bring a user-typed endpoint into the same form as graph identities.
pub fn endpoint_identity(raw: &str) -> String {
    let raw = raw.trim();
    normalize_seed(raw).unwrap_or_else(|_| raw.to_string())
}

impl PathReport {
    pub fn query(graph: &LinkGraph, from: &str, to: &str) -> Self {
        let from = endpoint_identity(from);
        let to = endpoint_identity(to);

        let (found, path, reason) = match graph.shortest_path(&from, &to) {
            Ok(path) => (true, path, None),
            Err(e) => (false, Vec::new(), Some(e.to_string())),
        };

        Self {
            hops: found.then(|| path.len().saturating_sub(1)),
            from,
            to,
            found,
            path,
            reason,
            graph_pages: graph.vertex_count(),
            graph_links: graph.edge_count(),
        }
    }
}

pub fn generate_path_report(report: &PathReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => generate_text_report(report),
        ReportFormat::Json => generate_json_report(report),
    }
}

fn generate_json_report(report: &PathReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e))
}

fn generate_text_report(report: &PathReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", "━".repeat(52)));
    out.push_str("# Graph:\n");
    out.push_str(&format!("  Pages: {}\n", report.graph_pages));
    out.push_str(&format!("  Links: {}\n\n", report.graph_links));

    out.push_str("# Shortest path:\n");
    out.push_str(&format!("  From: {}\n", report.from.bright_white()));
    out.push_str(&format!("  To:   {}\n\n", report.to.bright_white()));

    if report.found {
        for (step, url) in report.path.iter().enumerate() {
            out.push_str(&format!("  {:>3}. {}\n", step, url.green()));
        }
        let hops = report.hops.unwrap_or_default();
        out.push_str(&format!(
            "\n  {} {} hop{}\n",
            "✓".green().bold(),
            hops,
            if hops == 1 { "" } else { "s" }
        ));
    } else {
        let reason = report.reason.as_deref().unwrap_or("no path");
        out.push_str(&format!("  {} {}\n", "✗".red().bold(), reason.yellow()));
    }

    out.push_str(&format!("\n{}\n", "━".repeat(52)));
    out
}
