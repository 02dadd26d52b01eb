use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub response_time: Duration,
    pub links_found: usize,
    pub new_edges: usize,
}

impl PageReport {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            content_type: None,
            content_length: None,
            response_time: Duration::from_secs(0),
            links_found: 0,
            new_edges: 0,
        }
    }
}
