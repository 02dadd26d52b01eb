pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{CrawlSettings, handle_crawl, parse_seed_url};

// Re-export crawl functionality from linkmap-core
pub use linkmap_core::crawl::{CrawlOptions, CrawlProgressCallback, CrawlSummary, execute_crawl};
pub use linkmap_core::report::{PathReport, ReportFormat, generate_path_report};
