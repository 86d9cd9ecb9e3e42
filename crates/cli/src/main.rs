//! Teardown CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — layer defaults, `.teardown/config.toml`, and
//!    `TEARDOWN_*` environment variables, then validate the result.
//! 2. **Wire observability** — install the `tracing-subscriber` stack, with an
//!    OpenTelemetry OTLP exporter when an endpoint is configured.
//! 3. **Construct infrastructure** — load the host snapshot into an
//!    [`host::InMemoryHost`] and register a [`teardown::TeardownListener`]
//!    over it in a [`listener::ListenerRegistry`].
//! 4. **Select trigger mode**:
//!    - `fire --item <NAME>` — deliver one `updated` event for an item taken
//!      from the snapshot.
//!    - `watch` — deliver every newline-delimited JSON event read from stdin.
//!
//! The builds queued along the way are printed to stdout as a JSON array.
//! Event handling never fails the process; only startup errors do.

mod config;
mod observability;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use host::{EnqueuedBuild, InMemoryHost};
use listener::{DeliveryReport, JsonLinesEventSource, ListenerRegistry};
use teardown::{HostPorts, ItemEvent, ItemName, TeardownListener};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "teardown", version, about = "Queue teardown builds for disabled jobs")]
struct Cli {
    /// Configuration file (defaults to .teardown/config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Host snapshot JSON; overrides the configured path.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deliver one update event for an item in the snapshot.
    Fire {
        /// Fully qualified item name.
        #[arg(long)]
        item: String,
    },
    /// Deliver item events read from stdin, one JSON object per line.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(snapshot) = cli.snapshot {
        config.snapshot = snapshot;
    }
    let _telemetry = observability::init(&config.logging)?;

    let host = Arc::new(
        InMemoryHost::load(&config.snapshot)
            .with_context(|| format!("failed to load host snapshot {}", config.snapshot.display()))?,
    );
    let mut registry = ListenerRegistry::new();
    registry.register(Arc::new(TeardownListener::new(HostPorts {
        items: host.clone(),
        libraries: host.clone(),
        queue: host.clone(),
        config: Arc::new(config.teardown.clone()),
    })));

    // Listeners are synchronous; keep them off the runtime's worker threads.
    let command = cli.command;
    let worker_host = host.clone();
    let delivery = tokio::task::spawn_blocking(move || {
        run(command, &worker_host, &registry, io::stdin().lock())
    })
    .await
    .context("event delivery task failed")?;

    // Builds queued before a fatal read error are still reported.
    let enqueued = host.enqueued()?;
    write_builds(io::stdout().lock(), &enqueued)?;

    let summary = delivery?;
    info!(
        events = summary.events,
        skipped_lines = summary.skipped_lines,
        listener_panics = summary.listener_panics,
        builds = enqueued.len(),
        "Event delivery finished"
    );
    Ok(())
}

/// Counts gathered while delivering events.
#[derive(Debug, Default, PartialEq, Eq)]
struct DeliverySummary {
    events: usize,
    skipped_lines: usize,
    listener_panics: usize,
}

impl DeliverySummary {
    fn record(&mut self, report: DeliveryReport) {
        self.events += 1;
        self.listener_panics += report.panicked.len();
    }
}

fn run(
    command: Command,
    host: &InMemoryHost,
    registry: &ListenerRegistry,
    input: impl BufRead,
) -> anyhow::Result<DeliverySummary> {
    let mut summary = DeliverySummary::default();
    match command {
        Command::Fire { item } => {
            let name = ItemName::new(item).ok_or_else(|| anyhow!("--item must not be blank"))?;
            let item = host
                .item(&name)
                .ok_or_else(|| anyhow!("item '{name}' is not in the host snapshot"))?;
            summary.record(registry.deliver(&ItemEvent::updated(item.clone())));
        }
        Command::Watch => {
            for event in JsonLinesEventSource::new(input) {
                match event {
                    Ok(event) => summary.record(registry.deliver(&event)),
                    Err(err) if err.is_recoverable() => {
                        warn!(error = %err, "Skipping undecodable event");
                        summary.skipped_lines += 1;
                    }
                    Err(err) => return Err(err).context("failed to read events from stdin"),
                }
            }
        }
    }
    Ok(summary)
}

/// Writes the queued builds as a pretty-printed JSON array.
fn write_builds(mut out: impl Write, builds: &[EnqueuedBuild]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, builds)?;
    writeln!(out)?;
    Ok(())
}
