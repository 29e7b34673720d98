//! Counter wired to a host over stdin/stdout
//!
//! Stdout carries protocol envelopes only, so logs go to stderr.
//! Try: `RUST_LOG=debug cargo run --example stdio_plug`

use dom::DomArena;
use plug::{LineSink, PlugSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut session = PlugSession::new(LineSink::stdout());

    let mut clicks = 0u32;
    session.on("#increment", "click", "increment", move |event, out| {
        clicks += 1;

        let mut counter = DomArena::with_root("span");
        let root = counter.root_id().ok_or("counter has no root")?;
        counter.element_mut(root)?.attributes.set("id", "count");
        counter.set_inner_markup(root, &clicks.to_string())?;
        out.update("#count", &counter, root)?;

        out.print(["clicked", event.event_type.as_str(), "on", event.target()?.tag_name.as_str()])?;
        Ok(())
    })?;

    session.print(["counter ready"])?;

    let handled = plug::transport::run_stdio(&mut session).await?;
    tracing::info!(handled, "Host disconnected");
    Ok(())
}
