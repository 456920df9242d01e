//! In-memory backend whose answers are scripted per operation.
//!
//! Scripted results are consumed front to back. Once a queue is empty the
//! backend behaves like a small working flow: claims report no work, reserved
//! ids are fresh, submitted events are stored and can be fetched back.

use raven_core::{
    AckRequest, Connector, EndpointPool, EventId, Identity, Message, Reference, Session,
    SessionError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One call made against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Claim(Option<Duration>),
    Fetch(String),
    Ack(String, AckRequest),
    Reserve(EventId),
    Submit(EventId, Message),
}

#[derive(Default)]
pub struct Script {
    claims: Mutex<VecDeque<Result<Reference, SessionError>>>,
    fetches: Mutex<VecDeque<Result<Message, SessionError>>>,
    acks: Mutex<VecDeque<Result<(), SessionError>>>,
    submits: Mutex<VecDeque<Result<(), SessionError>>>,
    events: Mutex<HashMap<String, Message>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU32,
    connects: AtomicU32,
    claim_delay: Mutex<Duration>,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn claim(&self, result: Result<Reference, SessionError>) -> &Self {
        self.claims.lock().unwrap().push_back(result);
        self
    }

    /// Make every claim take `delay` before answering.
    pub fn claim_delay(&self, delay: Duration) -> &Self {
        *self.claim_delay.lock().unwrap() = delay;
        self
    }

    pub fn fetch(&self, result: Result<Message, SessionError>) -> &Self {
        self.fetches.lock().unwrap().push_back(result);
        self
    }

    pub fn ack(&self, result: Result<(), SessionError>) -> &Self {
        self.acks.lock().unwrap().push_back(result);
        self
    }

    pub fn submit(&self, result: Result<(), SessionError>) -> &Self {
        self.submits.lock().unwrap().push_back(result);
        self
    }

    /// Store an event so fetches of `event_id` succeed.
    pub fn store(&self, event_id: &str, message: Message) -> &Self {
        self.events
            .lock()
            .unwrap()
            .insert(event_id.to_string(), message);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct ScriptedSession {
    script: Arc<Script>,
}

impl Session for ScriptedSession {
    fn claim_work(&self, timeout: Option<Duration>) -> Result<Reference, SessionError> {
        self.script.record(Call::Claim(timeout));
        let delay = *self.script.claim_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.script
            .claims
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SessionError::NoWork))
    }

    fn fetch_event(&self, event_id: &str) -> Result<Message, SessionError> {
        self.script.record(Call::Fetch(event_id.to_string()));
        if let Some(result) = self.script.fetches.lock().unwrap().pop_front() {
            return result;
        }
        self.script
            .events
            .lock()
            .unwrap()
            .get(event_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    fn acknowledge(&self, ack_id: &str, request: &AckRequest) -> Result<(), SessionError> {
        self.script
            .record(Call::Ack(ack_id.to_string(), request.clone()));
        self.script.acks.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn reserve_event(&self) -> Result<EventId, SessionError> {
        let n = self.script.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = EventId::new(format!("ev-{n}"));
        self.script.record(Call::Reserve(id.clone()));
        Ok(id)
    }

    fn submit_event(&self, event_id: &EventId, message: &Message) -> Result<(), SessionError> {
        self.script
            .record(Call::Submit(event_id.clone(), message.clone()));
        self.script.submits.lock().unwrap().pop_front().unwrap_or(Ok(()))?;
        self.script
            .events
            .lock()
            .unwrap()
            .insert(event_id.to_string(), message.clone());
        Ok(())
    }
}

pub struct ScriptedConnector {
    pub script: Arc<Script>,
}

impl Connector for ScriptedConnector {
    fn connect(
        &self,
        _pool: &Arc<EndpointPool>,
        _identity: &Identity,
    ) -> Result<Arc<dyn Session>, SessionError> {
        self.script.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedSession {
            script: Arc::clone(&self.script),
        }))
    }
}
