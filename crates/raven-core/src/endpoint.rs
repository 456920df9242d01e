//! Round-robin endpoint pool.
//!
//! Every outbound call picks the next endpoint, whether the previous call
//! succeeded or not. There is no health tracking: a dead endpoint is simply
//! tried again N calls later, and a retry after a failure lands on a
//! different endpoint. Combined with the operation backoff this is the whole
//! failover story.

use crate::config::ConfigError;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<Url>,
    counter: AtomicUsize,
}

impl EndpointPool {
    /// Create a pool; the list must be non-empty and every URL must be usable
    /// as a base (scheme plus host).
    pub fn new(endpoints: Vec<Url>) -> Result<Self, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::MissingEndpoints);
        }
        for url in &endpoints {
            check_endpoint(url)?;
        }
        Ok(Self {
            endpoints,
            counter: AtomicUsize::new(0),
        })
    }

    /// Start rotation from `counter` instead of zero.
    pub fn starting_at(self, counter: usize) -> Self {
        self.counter.store(counter, Ordering::Relaxed);
        self
    }

    /// Advance the rotation counter and return the selected endpoint.
    pub fn pick(&self) -> &Url {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        &self.endpoints[n % self.endpoints.len()]
    }

    /// Pick an endpoint and build the request URL for `segments` on it.
    ///
    /// Scheme, host and port come from the endpoint; its path, if any, is
    /// kept as a prefix. Segments are percent-encoded.
    pub fn target(&self, segments: &[&str]) -> Url {
        let mut url = self.pick().clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Current value of the rotation counter.
    pub fn position(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

pub(crate) fn check_endpoint(url: &Url) -> Result<(), ConfigError> {
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: "endpoint needs a scheme and a host".to_string(),
        });
    }
    Ok(())
}
