//! Remote DOM plumbing for a scripting process
//!
//! The process has no DOM of its own. It talks to a host that does, one
//! JSON object per line over stdin/stdout:
//!
//! ```text
//! app ──register/remove/update/print──▶ PlugSession ──Envelope──▶ sink ──▶ host
//!                                           ▲
//! host ──{type, target, listener}──▶ receive ┘──▶ ListenerRegistry ──▶ listener(DomEvent)
//! ```
//!
//! Inbound failures never escape [`PlugSession::receive`]; they go back to
//! the host as `error` envelopes.

pub mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod sink;
pub mod transport;

pub use config::PlugConfig;
pub use error::{PlugError, Result};
pub use event::DomEvent;
pub use protocol::{Envelope, ErrorContext, InboundEvent};
pub use registry::{fingerprint, HandlerError, HandlerResult, Listener, ListenerRegistry};
pub use session::PlugSession;
pub use sink::{ChannelSink, Emitter, LineSink, MemorySink, OutboundSink};
