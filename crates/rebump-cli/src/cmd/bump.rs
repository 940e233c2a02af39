use crate::bridge;
use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use rebump_core::engine::Engine;
use rebump_core::types::{TargetCommand, WorkflowStatus};
use rebump_core::workflow::DEFAULT_TRIGGER_COMMAND;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args)]
pub struct BumpArgs {
    /// Status-request command to send
    #[arg(long, default_value = DEFAULT_TRIGGER_COMMAND)]
    trigger: String,

    /// Delay before the trigger goes out, in seconds
    #[arg(long, default_value = "5")]
    delay: u64,

    /// Follow-up commands to reschedule from the parsed reply
    #[arg(long, default_value = "up,bump,like", value_delimiter = ',')]
    targets: Vec<String>,

    /// Send a second confirmation action after each send
    #[arg(long)]
    repeat_enter: bool,

    /// Apply punctuation-spacing post-processing before sending
    #[arg(long)]
    double_space: bool,

    /// Keep ticking until every spawned command has fired
    #[arg(long)]
    wait: bool,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "250")]
    interval_ms: u64,

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

pub fn run(root: &Path, args: BumpArgs, json: bool) -> anyhow::Result<()> {
    let targets = parse_targets(&args.targets)?;

    let mut engine = Engine::open(root).context("failed to open engine state")?;
    let workflow_id = engine.add_bump_workflow(
        Utc::now().timestamp(),
        &args.trigger,
        args.delay,
        &targets,
        args.repeat_enter,
        args.double_space,
    )?;

    let mut executor = make_executor(root, args.dry_run, args.outbox.clone());
    let mut capture = bridge::InboxCapture::new(
        args.inbox
            .clone()
            .unwrap_or_else(|| default_bridge_path(root, "inbox.txt")),
    );

    let mut outcome: Option<(WorkflowStatus, usize)> = None;
    loop {
        let now = Utc::now().timestamp();
        engine.tick(now, &mut *executor, &mut capture)?;

        if outcome.is_none() {
            match engine
                .list_workflows()
                .iter()
                .find(|w| w.id == workflow_id)
            {
                Some(wf) if wf.is_terminal() => {
                    outcome = Some((wf.status, wf.spawned_command_ids.len()));
                }
                Some(_) => {}
                None => outcome = Some((WorkflowStatus::Failed, 0)),
            }
        }

        if let Some((status, _)) = outcome {
            let drained = engine.list_scheduled().is_empty();
            if status == WorkflowStatus::Failed || !args.wait || drained {
                break;
            }
        }

        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }

    let (status, spawned) = outcome.unwrap_or((WorkflowStatus::Failed, 0));
    if json {
        print_json(&serde_json::json!({
            "workflow_id": workflow_id,
            "status": status,
            "spawned": spawned,
            "scheduled": engine.list_scheduled(),
        }))?;
    } else {
        println!("Workflow #{workflow_id}: {status} ({spawned} commands scheduled)");
    }

    if status == WorkflowStatus::Failed {
        anyhow::bail!("bump workflow failed");
    }
    Ok(())
}

fn parse_targets(raw: &[String]) -> anyhow::Result<Vec<TargetCommand>> {
    raw.iter()
        .map(|s| {
            s.parse::<TargetCommand>()
                .with_context(|| format!("unknown target '{s}' (expected up, bump or like)"))
        })
        .collect()
}

pub fn make_executor(
    root: &Path,
    dry_run: bool,
    outbox: Option<PathBuf>,
) -> Box<dyn rebump_core::capability::ActionExecutor> {
    if dry_run {
        Box::new(bridge::DryRunExecutor)
    } else {
        Box::new(bridge::OutboxExecutor::new(
            outbox.unwrap_or_else(|| default_bridge_path(root, "outbox.txt")),
        ))
    }
}

pub fn default_bridge_path(root: &Path, file: &str) -> PathBuf {
    rebump_core::paths::data_dir(root).join(file)
}
