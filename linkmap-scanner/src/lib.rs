pub mod crawler;
pub mod error;
pub mod extract;
pub mod frontier;
pub mod graph;
pub mod normalize;
pub mod result;
pub mod scope;

pub use crawler::{ClientConfig, Crawler, ProgressCallback, ResultCallback};
pub use error::ScanError;
pub use graph::{LinkGraph, PathError, SharedGraph};
pub use normalize::{LinkError, normalize_link};
pub use result::PageReport;
pub use scope::{DomainScope, is_same_domain};
