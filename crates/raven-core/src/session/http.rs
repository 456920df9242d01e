//! HTTP+JSON binding of the backend session.
//!
//! Uses the curl crate (libcurl) with one easy handle per request. Every
//! request picks its endpoint from the shared pool, so consecutive calls, and
//! in particular retries after a failure, rotate across endpoints.
//!
//! Routes:
//! - `GET  workers/{worker}/work`       claim (204/404 mean no work)
//! - `GET  flow/{flow}/events/{event}`  fetch
//! - `PUT  workers/{worker}/ack/{ack}`  acknowledge
//! - `POST flow/{flow}/events`          reserve (body is the event id)
//! - `PUT  flow/{flow}/events/{event}`  submit

use super::wire::{parse_event_id, WireAckRequest, WireMessage};
use super::{Connector, Identity, Session, SessionError};
use crate::endpoint::EndpointPool;
use crate::message::{AckRequest, Message};
use crate::reference::{EventId, Reference};
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent sent with every request.
pub fn default_user_agent() -> String {
    format!("raven-worker/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds [`HttpSession`]s. HTTP needs no handshake, so connecting only binds
/// the pool and identity; it never fails.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
    user_agent: String,
}

impl HttpConnector {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_TIMEOUT, default_user_agent())
    }
}

impl Connector for HttpConnector {
    fn connect(
        &self,
        pool: &Arc<EndpointPool>,
        identity: &Identity,
    ) -> Result<Arc<dyn Session>, SessionError> {
        tracing::debug!(
            endpoints = pool.len(),
            flow_id = %identity.flow_id,
            worker_id = %identity.worker_id,
            "http session ready"
        );
        Ok(Arc::new(HttpSession {
            pool: Arc::clone(pool),
            identity: identity.clone(),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Session over the HTTP+JSON backend API.
#[derive(Debug)]
pub struct HttpSession {
    pool: Arc<EndpointPool>,
    identity: Identity,
    timeout: Duration,
    user_agent: String,
}

impl HttpSession {
    /// Perform one request and return the body of a 2xx response.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, SessionError> {
        let url = self.pool.target(segments);
        let timeout = timeout.map_or(self.timeout, |t| ceil_millis(t).min(self.timeout));
        let timeout = timeout.max(Duration::from_millis(1));

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.timeout(timeout)?;
        easy.connect_timeout(timeout)?;
        easy.useragent(&self.user_agent)?;

        match method {
            Method::Get => easy.get(true)?,
            Method::Post | Method::Put => {
                let body = body.unwrap_or_default();
                easy.post(true)?;
                easy.post_field_size(body.len() as u64)?;
                easy.post_fields_copy(&body)?;
                if method == Method::Put {
                    easy.custom_request("PUT")?;
                }
            }
        }

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        // Send bodies right away instead of waiting for 100-continue.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        let mut response = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        tracing::trace!(method = method.as_str(), %url, code, "backend response");
        check_status(method, url.as_str(), code)?;
        Ok(response)
    }
}

/// Round up to whole milliseconds; libcurl truncates, which would end a
/// budget-bounded request just before the budget does.
fn ceil_millis(d: Duration) -> Duration {
    let millis = d.as_nanos().div_ceil(1_000_000);
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

/// Map an HTTP status to the session error taxonomy.
fn check_status(method: Method, url: &str, code: u32) -> Result<(), SessionError> {
    match code {
        204 => Err(SessionError::NoContent),
        404 => Err(SessionError::NotFound),
        500 => Err(SessionError::InternalServerError),
        200..=299 => Ok(()),
        _ => Err(SessionError::Status {
            method: method.as_str(),
            url: url.to_string(),
            code,
        }),
    }
}

impl Session for HttpSession {
    fn claim_work(&self, timeout: Option<Duration>) -> Result<Reference, SessionError> {
        let worker = self.identity.worker_id.as_str();
        let body = match self.request(Method::Get, &["workers", worker, "work"], None, timeout) {
            Ok(body) => body,
            Err(SessionError::NoContent) | Err(SessionError::NotFound) => {
                return Err(SessionError::NoWork)
            }
            Err(e) => return Err(e),
        };
        let reference: Reference = serde_json::from_slice(&body).map_err(SessionError::Decode)?;
        tracing::debug!(ack_id = %reference.ack_id, event_id = %reference.event_id, "claimed work");
        Ok(reference)
    }

    fn fetch_event(&self, event_id: &str) -> Result<Message, SessionError> {
        let flow = self.identity.flow_id.as_str();
        let body = self.request(Method::Get, &["flow", flow, "events", event_id], None, None)?;
        let wire: WireMessage = serde_json::from_slice(&body).map_err(SessionError::Decode)?;
        Ok(wire.into_message())
    }

    fn acknowledge(&self, ack_id: &str, request: &AckRequest) -> Result<(), SessionError> {
        let worker = self.identity.worker_id.as_str();
        let body = serde_json::to_vec(&WireAckRequest::from_request(request)?)
            .map_err(SessionError::Encode)?;
        self.request(Method::Put, &["workers", worker, "ack", ack_id], Some(body), None)?;
        Ok(())
    }

    fn reserve_event(&self) -> Result<EventId, SessionError> {
        let flow = self.identity.flow_id.as_str();
        let body = self.request(Method::Post, &["flow", flow, "events"], None, None)?;
        Ok(EventId::new(parse_event_id(&body)?))
    }

    fn submit_event(&self, event_id: &EventId, message: &Message) -> Result<(), SessionError> {
        let flow = self.identity.flow_id.as_str();
        let body = serde_json::to_vec(&WireMessage::from_message(message)?)
            .map_err(SessionError::Encode)?;
        self.request(
            Method::Put,
            &["flow", flow, "events", event_id.as_str()],
            Some(body),
            None,
        )?;
        Ok(())
    }
}
