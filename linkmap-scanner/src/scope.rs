use url::Url;

/// Host and explicit port of a parsed URL, as the parser reports them.
fn host_key(url: &Url) -> Option<(String, Option<u16>)> {
    url.host_str().map(|host| (host.to_string(), url.port()))
}

/// True when `candidate` and `seed` both parse and share the same host.
///
/// Fails closed: anything that can't be parsed, or has no host, is out of scope.
pub fn is_same_domain(candidate: &str, seed: &str) -> bool {
    let (Ok(candidate), Ok(seed)) = (Url::parse(candidate), Url::parse(seed)) else {
        return false;
    };
    match (host_key(&candidate), host_key(&seed)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// The seed's host, parsed once and checked against every dequeued URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    host: String,
    port: Option<u16>,
}

impl DomainScope {
    pub fn new(seed: &Url) -> Option<Self> {
        host_key(seed).map(|(host, port)| Self { host, port })
    }

    pub fn from_seed(seed: &str) -> Option<Self> {
        Url::parse(seed).ok().and_then(|url| Self::new(&url))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn contains(&self, candidate: &str) -> bool {
        Url::parse(candidate)
            .ok()
            .and_then(|url| host_key(&url))
            .is_some_and(|(host, port)| host == self.host && port == self.port)
    }
}
