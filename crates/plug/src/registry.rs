//! Listener registry
//!
//! Maps a fingerprint of `(selector, event type, listener name)` to the
//! handler. The fingerprint doubles as the correlation token the host sends
//! back with every fired event.
//!
//! The registry has no expiry and no capacity bound: entries live until
//! they are removed explicitly.

use crate::error::{PlugError, Result};
use crate::event::DomEvent;
use crate::sink::Emitter;
use ahash::AHashMap;
use sha2::{Digest, Sha256};
use std::fmt;

/// Error type handlers may return
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of a handler invocation
pub type HandlerResult = std::result::Result<(), HandlerError>;

type Handler = Box<dyn FnMut(&DomEvent, &mut Emitter<'_>) -> HandlerResult + Send>;

/// Deterministic correlation token (hex SHA-256)
pub fn fingerprint(selector: &str, event_type: &str, listener_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(selector.as_bytes());
    hasher.update(event_type.as_bytes());
    hasher.update(listener_name.as_bytes());
    hex::encode(hasher.finalize())
}

/// A named handler
///
/// The name is the handler's identity: two listeners with the same name,
/// selector and event type share a fingerprint.
pub struct Listener {
    name: String,
    handler: Handler,
}

impl Listener {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&DomEvent, &mut Emitter<'_>) -> HandlerResult + Send + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&mut self, event: &DomEvent, emitter: &mut Emitter<'_>) -> HandlerResult {
        (self.handler)(event, emitter)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("name", &self.name).finish()
    }
}

/// Fingerprint -> listener
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: AHashMap<String, Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a listener, silently replacing one with the same fingerprint
    pub fn insert(&mut self, fingerprint: String, listener: Listener) -> Option<Listener> {
        self.listeners.insert(fingerprint, listener)
    }

    /// Remove a listener. Removing an unknown fingerprint is an error.
    pub fn remove(&mut self, fingerprint: &str) -> Result<Listener> {
        self.listeners
            .remove(fingerprint)
            .ok_or_else(|| PlugError::UnknownListener(fingerprint.to_string()))
    }

    pub fn get_mut(&mut self, fingerprint: &str) -> Option<&mut Listener> {
        self.listeners.get_mut(fingerprint)
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.listeners.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &str> {
        self.listeners.keys().map(String::as_str)
    }
}
