use crate::error::{Result, ScanError};
use crate::extract::{extract_hrefs, is_html};
use crate::frontier::{Frontier, FrontierHandle, VisitedSet};
use crate::graph::{LinkGraph, SharedGraph};
use crate::normalize::{normalize_link, normalize_seed};
use crate::result::PageReport;
use crate::scope::DomainScope;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(PageReport) + Send + Sync>;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client settings shared by every fetch task.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Accept self-signed and otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("linkmap/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn build_client(&self) -> Result<Client> {
        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .connect_timeout(self.timeout / 2)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;
        Ok(client)
    }
}

/// Everything a fetch task needs, cloned into each spawned task.
#[derive(Clone)]
struct FetchContext {
    client: Client,
    graph: SharedGraph,
    frontier: FrontierHandle,
}

pub struct Crawler {
    client: Client,
    graph: SharedGraph,
    visited: VisitedSet,
    workers: usize,
    strict: bool,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(config.build_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            graph: LinkGraph::shared(),
            visited: VisitedSet::new(),
            workers: DEFAULT_WORKERS,
            strict: false,
            progress_callback: None,
            result_callback: None,
        }
    }

    /// Upper bound on concurrently running fetch tasks. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Stop the crawl on the first fetch failure instead of logging it.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn graph(&self) -> SharedGraph {
        self.graph.clone()
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Crawl everything reachable from `seed` on the seed's host.
    ///
    /// The frontier never closes, so this only returns on a bad seed or, in
    /// strict mode, on the first failed fetch. Callers stop the crawl by
    /// dropping the future, which aborts every in-flight fetch.
    pub async fn crawl(&self, seed: &str) -> Result<()> {
        let seed = normalize_seed(seed).map_err(|e| ScanError::InvalidUrl(e.to_string()))?;
        let scope = DomainScope::from_seed(&seed)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", seed)))?;

        info!(
            "Starting crawl of {} with {} workers (host: {})",
            seed,
            self.workers,
            scope.host()
        );

        let mut frontier = Frontier::new();
        frontier.handle().enqueue(seed);

        let context = FetchContext {
            client: self.client.clone(),
            graph: self.graph.clone(),
            frontier: frontier.handle(),
        };
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(String, Result<PageReport>)> = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    self.finish_task(joined)?;
                }

                url = frontier.dequeue() => {
                    if !self.accept(&scope, &url).await {
                        continue;
                    }

                    let permit = permits
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| ScanError::Other(format!("worker pool closed: {}", e)))?;

                    if let Some(ref callback) = self.progress_callback {
                        callback(url.clone());
                    }

                    let context = context.clone();
                    tasks.spawn(async move {
                        let outcome = fetch_and_expand(&context, &url).await;
                        drop(permit);
                        (url, outcome)
                    });
                }
            }
        }
    }

    /// Dispatch decision for one dequeued URL.
    async fn accept(&self, scope: &DomainScope, url: &str) -> bool {
        if !scope.contains(url) {
            debug!("Rejected {} (out of scope)", url);
            return false;
        }
        if !self.visited.mark(url).await {
            debug!("Rejected {} (already visited)", url);
            return false;
        }

        match self.graph.write() {
            Ok(mut graph) => {
                graph.add_vertex(url);
            }
            Err(e) => {
                warn!("Link graph lock poisoned, not recording {}: {}", url, e);
            }
        }
        true
    }

    fn finish_task(
        &self,
        joined: std::result::Result<(String, Result<PageReport>), JoinError>,
    ) -> Result<()> {
        match joined {
            Ok((url, Ok(report))) => {
                debug!(
                    "Fetched {} ({}, {} links, {} new edges)",
                    url, report.status_code, report.links_found, report.new_edges
                );
                if let Some(ref callback) = self.result_callback {
                    callback(report);
                }
                Ok(())
            }
            Ok((url, Err(e))) => {
                warn!("Crawl error for {}: {}", url, e);
                if self.strict { Err(e) } else { Ok(()) }
            }
            Err(e) => {
                warn!("Fetch task failed: {}", e);
                if self.strict { Err(e.into()) } else { Ok(()) }
            }
        }
    }
}

/// Fetch one page, record its links in the graph and queue their targets.
///
/// The response is owned by this function and released when it returns,
/// whichever path it returns on.
async fn fetch_and_expand(context: &FetchContext, url: &str) -> Result<PageReport> {
    debug!("Fetching {}", url);

    let start = Instant::now();
    let response = context.client.get(url).send().await?;
    let response_time = start.elapsed();

    let status_code = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let content_length = response.content_length();

    let body = response.text().await?;

    let mut report = PageReport::new(url.to_string());
    report.status_code = status_code;
    report.content_type = content_type;
    report.content_length = content_length;
    report.response_time = response_time;

    if !is_html(report.content_type.as_deref()) {
        debug!("Not searching {} for links ({:?})", url, report.content_type);
        return Ok(report);
    }

    let hrefs = extract_hrefs(&body);
    report.links_found = hrefs.len();
    report.new_edges = expand_links(context, url, &hrefs)?;

    Ok(report)
}

/// Resolve every href found on `page`, add the graph edges and enqueue targets.
///
/// Returns how many edges were new.
fn expand_links(context: &FetchContext, page: &str, hrefs: &[String]) -> Result<usize> {
    let mut targets = Vec::with_capacity(hrefs.len());
    for href in hrefs {
        match normalize_link(href, page) {
            Ok(target) => targets.push(target),
            Err(e) => debug!("Skipping link {:?} on {}: {}", href, page, e),
        }
    }

    let new_edges = {
        let mut graph = context
            .graph
            .write()
            .map_err(|e| ScanError::Other(format!("link graph lock poisoned: {}", e)))?;
        targets
            .iter()
            .filter(|target| target.as_str() != page)
            .filter(|target| graph.add_edge(page, target))
            .count()
    };

    // Dedup happens at dispatch time, not here
    for target in targets {
        context.frontier.enqueue(target);
    }

    Ok(new_edges)
}
