use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Unbounded queue of URL identities waiting for a crawl decision.
///
/// The frontier keeps a sender of its own, so `dequeue` waits for more work
/// instead of ever reporting the queue as closed.
pub struct Frontier {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Cloneable producer side of the [`Frontier`].
#[derive(Clone)]
pub struct FrontierHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl Frontier {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> FrontierHandle {
        FrontierHandle {
            tx: self.tx.clone(),
        }
    }

    pub async fn dequeue(&mut self) -> String {
        // recv only yields None once every sender is gone, and we hold one
        match self.rx.recv().await {
            Some(url) => url,
            None => std::future::pending().await,
        }
    }

    pub fn try_dequeue(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontierHandle {
    pub fn enqueue(&self, url: String) {
        // The receiver only goes away when the crawl itself was dropped
        let _ = self.tx.send(url);
    }
}

/// URLs that have already been handed to a fetch task.
#[derive(Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` as submitted. Only the first caller for a URL gets `true`.
    pub async fn mark(&self, url: &str) -> bool {
        let mut visited = self.inner.lock().await;
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
