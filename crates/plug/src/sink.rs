//! Outbound sinks
//!
//! Stdout belongs to the protocol, so every user-visible output goes
//! through a sink as a `stdout` envelope. Sinks are injected into the
//! session; nothing writes to stdout behind its back.

use crate::config::PlugConfig;
use crate::error::{PlugError, Result};
use crate::protocol::Envelope;
use dom::{DomArena, NodeId, Query};
use std::io::Write;
use tokio::sync::mpsc;

/// Destination for outbound envelopes
pub trait OutboundSink {
    fn send(&mut self, envelope: &Envelope) -> Result<()>;
}

/// Newline-delimited JSON over any writer (stdout in production)
#[derive(Debug)]
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OutboundSink for LineSink<W> {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        serde_json::to_writer(&mut self.writer, envelope)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Hands envelopes to an async writer task
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutboundSink for ChannelSink {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        self.tx
            .send(envelope.clone())
            .map_err(|_| PlugError::ChannelClosed)
    }
}

/// Keeps every envelope in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    envelopes: Vec<Envelope>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    /// Drain what has been sent so far
    pub fn take(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.envelopes)
    }
}

impl OutboundSink for MemorySink {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        self.envelopes.push(envelope.clone());
        Ok(())
    }
}

/// Output handle given to the session and to listeners while they run
pub struct Emitter<'a> {
    sink: &'a mut dyn OutboundSink,
    config: &'a PlugConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(sink: &'a mut dyn OutboundSink, config: &'a PlugConfig) -> Self {
        Self { sink, config }
    }

    pub fn send(&mut self, envelope: &Envelope) -> Result<()> {
        self.sink.send(envelope)
    }

    /// Emit `text` verbatim as a `stdout` envelope
    pub fn write_output(&mut self, text: impl Into<String>) -> Result<()> {
        self.send(&Envelope::stdout(text))
    }

    /// Join the items with the configured separator, append the terminator
    pub fn print<I, T>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut content = String::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                content.push_str(&self.config.separator);
            }
            content.push_str(item.as_ref());
        }
        content.push_str(&self.config.terminator);
        self.write_output(content)
    }

    /// Ask the host to replace whatever `selector` matches with `node_id`
    pub fn update(&mut self, selector: &str, document: &DomArena, node_id: NodeId) -> Result<()> {
        let query = Query::parse(selector)?;
        let target = document.to_record(node_id)?;
        tracing::debug!(selector, "Sending DOM update");
        self.send(&Envelope::UpdateDom {
            query: query.into_kind(),
            target,
        })
    }
}
