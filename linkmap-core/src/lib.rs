pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, CrawlSummary, execute_crawl};
pub use report::{PathReport, ReportFormat, generate_path_report};
