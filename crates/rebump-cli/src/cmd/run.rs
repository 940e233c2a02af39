use crate::bridge;
use crate::cmd::bump::{default_bridge_path, make_executor};
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use rebump_core::engine::Engine;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How often the loop sweeps stale entries out of the schedule.
const CLEANUP_INTERVAL_SECS: i64 = 60;

#[derive(Args)]
pub struct RunArgs {
    /// Tick interval in milliseconds
    #[arg(long, default_value = "500")]
    interval_ms: u64,

    /// Stale-entry age threshold for periodic cleanup, in seconds
    #[arg(long, default_value = "300")]
    max_age: u64,

    /// Exit once no commands or workflows remain
    #[arg(long)]
    until_idle: bool,

    /// Log sends instead of writing the outbox
    #[arg(long)]
    dry_run: bool,

    /// File the latest chat text is read from
    #[arg(long)]
    inbox: Option<PathBuf>,

    /// File sends are appended to
    #[arg(long)]
    outbox: Option<PathBuf>,
}

pub fn run(root: &Path, args: RunArgs) -> anyhow::Result<()> {
    let mut engine = Engine::open(root).context("failed to open engine state")?;
    let mut executor = make_executor(root, args.dry_run, args.outbox.clone());
    let mut capture = bridge::InboxCapture::new(
        args.inbox
            .clone()
            .unwrap_or_else(|| default_bridge_path(root, "inbox.txt")),
    );

    tracing::info!(
        pending = engine.list_scheduled().len(),
        "orchestration loop started"
    );

    let mut last_cleanup = Utc::now().timestamp();
    loop {
        let now = Utc::now().timestamp();
        engine.tick(now, &mut *executor, &mut capture)?;

        if now - last_cleanup > CLEANUP_INTERVAL_SECS {
            engine.evict_stale(now, args.max_age as i64)?;
            last_cleanup = now;
        }

        if args.until_idle
            && engine.list_scheduled().is_empty()
            && engine.list_workflows().is_empty()
        {
            tracing::info!("nothing left to run, exiting");
            return Ok(());
        }

        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }
}
