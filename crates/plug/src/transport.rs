//! Line-oriented transport
//!
//! One JSON message per line in each direction. Inbound lines are handled
//! strictly one at a time; the next line is not read until the previous
//! message has been dispatched.

use crate::error::Result;
use crate::protocol::Envelope;
use crate::session::PlugSession;
use crate::sink::OutboundSink;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Feed every inbound line to the session until the reader is exhausted
///
/// Returns the number of messages dispatched.
pub async fn run<R, S>(session: &mut PlugSession<S>, reader: R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: OutboundSink,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if session.config.skip_blank_lines && line.trim().is_empty() {
            continue;
        }
        session.receive(&line);
        handled += 1;
    }

    tracing::info!(handled, "Inbound stream closed");
    Ok(handled)
}

/// `run` over the process's stdin
pub async fn run_stdio<S: OutboundSink>(session: &mut PlugSession<S>) -> std::io::Result<usize> {
    run(session, BufReader::new(tokio::io::stdin())).await
}

/// Drain a `ChannelSink` receiver into a writer, one envelope per line
///
/// Returns the number of envelopes written once every sender is dropped.
pub async fn write_envelopes<W>(mut rx: mpsc::UnboundedReceiver<Envelope>, mut writer: W) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(envelope) = rx.recv().await {
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fingerprint;
    use crate::sink::{ChannelSink, MemorySink};
    use serde_json::json;

    fn click(listener: &str) -> String {
        let mut line = json!({
            "type": "click",
            "target": {"nodeType": 1, "tagName": "button", "childNodes": []},
            "listener": listener,
        })
        .to_string();
        line.push('\n');
        line
    }

    #[tokio::test]
    async fn test_run_dispatches_each_line() {
        let mut session = PlugSession::new(MemorySink::new());
        let id = session
            .on("button", "click", "say", |event, out| {
                out.write_output(format!("got {}", event.event_type))?;
                Ok(())
            })
            .unwrap();
        session.sink_mut().take();

        let reader = tokio_test::io::Builder::new()
            .read(click(&id).as_bytes())
            .read(b"   \n")
            .read(b"garbage\n")
            .build();

        let handled = run(&mut session, BufReader::new(reader)).await.unwrap();
        assert_eq!(handled, 2);

        let sent = session.sink_mut().take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], Envelope::stdout("got click"));
        assert!(matches!(&sent[1], Envelope::Error { context } if context.kind == "DecodeError"));
    }

    #[tokio::test]
    async fn test_blank_lines_reported_when_not_skipped() {
        let mut session = PlugSession::new(MemorySink::new());
        session.config.skip_blank_lines = false;

        let reader = tokio_test::io::Builder::new().read(b"\n").build();
        let handled = run(&mut session, BufReader::new(reader)).await.unwrap();
        assert_eq!(handled, 1);
        assert_eq!(session.sink().envelopes().len(), 1);
    }

    #[tokio::test]
    async fn test_channel_sink_to_writer() {
        let (sink, rx) = ChannelSink::channel();
        let mut session = PlugSession::new(sink);
        session.on("#a", "click", "h", |_, _| Ok(())).unwrap();
        session.print(["hi"]).unwrap();
        drop(session);

        let mut output = Vec::new();
        let written = write_envelopes(rx, &mut output).await.unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({
                    "type": "registerEvent",
                    "query": {"id": "a"},
                    "eventType": "click",
                    "listener": fingerprint("#a", "click", "h"),
                }),
                json!({"type": "stdout", "content": "hi\n"}),
            ]
        );
    }
}
