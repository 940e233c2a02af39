use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use rebump_core::duration;
use rebump_core::engine::Engine;
use std::path::Path;

#[derive(Subcommand)]
pub enum ScheduleSubcommand {
    /// Schedule a one-shot command
    Add {
        #[arg(required = true)]
        command: Vec<String>,
        /// Delay before execution, in seconds
        #[arg(long, default_value = "60")]
        delay: u64,
        /// Send a second confirmation action after the first
        #[arg(long)]
        repeat_enter: bool,
        /// Apply punctuation-spacing post-processing before sending
        #[arg(long)]
        double_space: bool,
    },
    /// List pending scheduled commands
    List,
    /// Cancel a pending command by id
    Cancel { id: String },
    /// Remove entries whose fire time is older than --max-age seconds
    Clean {
        #[arg(long, default_value = "300")]
        max_age: u64,
    },
}

pub fn run(root: &Path, subcmd: ScheduleSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ScheduleSubcommand::Add {
            command,
            delay,
            repeat_enter,
            double_space,
        } => add(root, &command.join(" "), delay, repeat_enter, double_space, json),
        ScheduleSubcommand::List => list(root, json),
        ScheduleSubcommand::Cancel { id } => cancel(root, &id, json),
        ScheduleSubcommand::Clean { max_age } => clean(root, max_age, json),
    }
}

fn add(
    root: &Path,
    command: &str,
    delay: u64,
    repeat_enter: bool,
    double_space: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut engine = Engine::open(root).context("failed to open engine state")?;
    let now = Utc::now().timestamp();
    let id = engine
        .add_one_shot(now, command, delay, repeat_enter, double_space)
        .context("failed to schedule command")?;

    if json {
        print_json(&serde_json::json!({
            "id": id,
            "command": command,
            "fire_at": now + delay as i64,
        }))?;
    } else {
        println!(
            "Scheduled '{command}' in {} [{id}]",
            duration::format_seconds(delay)
        );
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root).context("failed to open engine state")?;

    if json {
        print_json(&engine.list_scheduled())?;
        return Ok(());
    }

    if engine.list_scheduled().is_empty() {
        println!("No scheduled commands.");
        return Ok(());
    }

    let now = Utc::now().timestamp();
    let rows: Vec<Vec<String>> = engine
        .list_scheduled()
        .iter()
        .map(|c| {
            let remaining = (c.fire_at - now).max(0) as u64;
            vec![
                c.id.clone(),
                fmt_time(c.fire_at),
                duration::format_seconds(remaining),
                c.command_text.clone(),
                c.status.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "FIRES AT", "IN", "COMMAND", "STATUS"], rows);
    Ok(())
}

fn cancel(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut engine = Engine::open(root).context("failed to open engine state")?;
    engine
        .cancel_command(id)
        .with_context(|| format!("command '{id}' not found"))?;

    if json {
        print_json(&serde_json::json!({ "id": id, "cancelled": true }))?;
    } else {
        println!("Cancelled [{id}]");
    }
    Ok(())
}

fn clean(root: &Path, max_age: u64, json: bool) -> anyhow::Result<()> {
    let mut engine = Engine::open(root).context("failed to open engine state")?;
    let now = Utc::now().timestamp();
    let removed = engine
        .evict_stale(now, max_age as i64)
        .context("failed to clean schedule")?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else {
        println!("Removed {removed} stale entries.");
    }
    Ok(())
}

fn fmt_time(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
