use indicatif::{ProgressBar, ProgressStyle};
use linkmap_scanner::crawler::{ClientConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use linkmap_scanner::{Crawler, PageReport, SharedGraph};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: String,
    pub workers: usize,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Accept invalid TLS certificates
    pub insecure: bool,
    /// Abort on the first failed fetch
    pub strict: bool,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            insecure: false,
            strict: false,
            show_progress_bars: false,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.insecure,
            ..ClientConfig::default()
        };
        if let Some(ref user_agent) = self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// State of a crawl at the moment it was stopped
pub struct CrawlSummary {
    pub seed: String,
    pub graph: SharedGraph,
    pub pages_fetched: usize,
    pub pages_dispatched: usize,
}

/// Crawl `options.seed` until `shutdown` resolves.
///
/// Every URL handed to a fetch task is reported as `Crawling... <url>`
/// through `progress_callback`, with the spinner suspended while it runs.
/// Returns the graph built so far once `shutdown` fires, or an error if the
/// crawl could not start or stopped on a failure in strict mode.
pub async fn execute_crawl<S>(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    shutdown: S,
) -> Result<CrawlSummary, String>
where
    S: Future<Output = ()>,
{
    let crawler = Crawler::with_config(&options.client_config())
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?
        .with_workers(options.workers)
        .with_strict(options.strict);

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched = Arc::new(AtomicUsize::new(0));

    let started_cb: linkmap_scanner::ProgressCallback = {
        let pb = progress_bar.clone();
        let progress_callback = progress_callback.clone();
        Arc::new(move |url: String| {
            let Some(ref callback) = progress_callback else {
                return;
            };
            let line = format!("Crawling... {}", url);
            // Keep the spinner from drawing over the caller's output
            match pb {
                Some(ref pb) => pb.suspend(|| callback(line)),
                None => callback(line),
            }
        })
    };

    let finished_cb: linkmap_scanner::ResultCallback = {
        let pb = progress_bar.clone();
        let fetched = fetched.clone();
        Arc::new(move |_report: PageReport| {
            let count = fetched.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb {
                pb.set_message(format!("{} pages fetched", count));
            }
        })
    };

    let crawler = crawler
        .with_progress_callback(started_cb)
        .with_result_callback(finished_cb);

    let outcome = tokio::select! {
        result = crawler.crawl(&options.seed) => Some(result),
        _ = shutdown => None,
    };

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    let summary = CrawlSummary {
        seed: options.seed.clone(),
        graph: crawler.graph(),
        pages_fetched: fetched.load(Ordering::Relaxed),
        pages_dispatched: crawler.visited().len().await,
    };

    match outcome {
        None => {
            info!(
                "Crawl stopped after {} pages ({} dispatched)",
                summary.pages_fetched, summary.pages_dispatched
            );
            Ok(summary)
        }
        Some(Ok(())) => Ok(summary),
        Some(Err(e)) => {
            warn!("Crawl of {} aborted: {}", options.seed, e);
            Err(format!("Crawl of {} failed: {}", options.seed, e))
        }
    }
}
