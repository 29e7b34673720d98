//! Plug session
//!
//! The high-level API application code talks to: register and remove
//! listeners, request DOM updates, print, and feed inbound messages.
//!
//! Message handling is serialized: each inbound message is decoded, looked
//! up and handled to completion before the call returns. Embedding the
//! session in a concurrent host means putting it behind one lock.

use std::panic::{self, AssertUnwindSafe};

use dom::{DomArena, DomError, NodeId, Query};

use crate::config::PlugConfig;
use crate::error::{PlugError, Result};
use crate::event::DomEvent;
use crate::protocol::{Envelope, InboundEvent};
use crate::registry::{fingerprint, HandlerResult, Listener, ListenerRegistry};
use crate::sink::{Emitter, OutboundSink};

/// Session - owns the listener registry and the outbound sink
pub struct PlugSession<S: OutboundSink> {
    pub config: PlugConfig,
    registry: ListenerRegistry,
    sink: S,
}

impl<S: OutboundSink> PlugSession<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(PlugConfig::default(), sink)
    }

    pub fn with_config(config: PlugConfig, sink: S) -> Self {
        Self {
            config,
            registry: ListenerRegistry::new(),
            sink,
        }
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emitter(&mut self) -> Emitter<'_> {
        Emitter::new(&mut self.sink, &self.config)
    }

    /// Plug a listener into `event_type` on the elements `selector` matches
    ///
    /// Returns the fingerprint the host will send back when the event fires.
    /// Registering the same selector, event type and listener name again
    /// replaces the earlier listener.
    pub fn register(&mut self, selector: &str, event_type: &str, listener: Listener) -> Result<String> {
        let query = Query::parse(selector)?;
        let listener_id = fingerprint(query.raw(), event_type, listener.name());

        self.sink.send(&Envelope::RegisterEvent {
            query: query.into_kind(),
            event_type: event_type.to_string(),
            listener: listener_id.clone(),
        })?;

        if self.registry.insert(listener_id.clone(), listener).is_some() {
            tracing::debug!(selector, event_type, "Replaced existing listener");
        } else {
            tracing::debug!(selector, event_type, "Registered listener");
        }
        Ok(listener_id)
    }

    /// Shorthand for `register` with a closure
    pub fn on<F>(&mut self, selector: &str, event_type: &str, name: &str, handler: F) -> Result<String>
    where
        F: FnMut(&DomEvent, &mut Emitter<'_>) -> HandlerResult + Send + 'static,
    {
        self.register(selector, event_type, Listener::new(name, handler))
    }

    /// Unplug the listener registered under the same selector, event type
    /// and listener name. Fails if there is no such listener.
    pub fn remove(&mut self, selector: &str, event_type: &str, listener_name: &str) -> Result<()> {
        let query = Query::parse(selector)?;
        let listener_id = fingerprint(query.raw(), event_type, listener_name);
        self.registry.remove(&listener_id)?;

        tracing::debug!(selector, event_type, "Removed listener");
        self.sink.send(&Envelope::RemoveEvent {
            query: query.into_kind(),
            event_type: event_type.to_string(),
        })
    }

    /// Ask the host to replace the element(s) `selector` matches with the
    /// subtree at `node_id`
    pub fn update(&mut self, selector: &str, document: &DomArena, node_id: NodeId) -> Result<()> {
        self.emitter().update(selector, document, node_id)
    }

    /// Emit `text` verbatim as a `stdout` envelope
    pub fn write_output(&mut self, text: impl Into<String>) -> Result<()> {
        self.emitter().write_output(text)
    }

    /// Print items joined by the configured separator and terminator
    pub fn print<I, T>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.emitter().print(items)
    }

    /// Handle one inbound message
    ///
    /// Never fails: any problem (bad JSON, missing fields, stale listener,
    /// failing or panicking listener) is reported to the host as exactly one
    /// `error` envelope.
    pub fn receive(&mut self, raw: &str) {
        if let Err(err) = self.dispatch(raw) {
            tracing::warn!(kind = err.kind(), "Dispatch failed: {}", err);
            if let Err(send_err) = self.sink.send(&Envelope::error(&err)) {
                tracing::error!("Failed to report dispatch error: {}", send_err);
            }
        }
    }

    fn dispatch(&mut self, raw: &str) -> Result<()> {
        let inbound = InboundEvent::parse(raw)?;

        let listener = self
            .registry
            .get_mut(&inbound.listener)
            .ok_or_else(|| PlugError::ListenerNotFound(inbound.listener.clone()))?;

        let document = DomArena::from_record(&inbound.target)?;
        if !document.root()?.is_element() {
            return Err(DomError::InvalidRecord("event target is not an element".to_string()).into());
        }
        let event = DomEvent::new(inbound.event_type, document);

        tracing::debug!(event_type = %event.event_type, listener = listener.name(), "Dispatching event");
        let mut emitter = Emitter::new(&mut self.sink, &self.config);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.call(&event, &mut emitter)));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(PlugError::Handler(err.to_string())),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(PlugError::HandlerPanic(msg))
            }
        }
    }
}
