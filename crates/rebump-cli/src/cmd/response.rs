use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use rebump_core::engine::Engine;
use std::path::Path;

#[derive(Subcommand)]
pub enum ResponseSubcommand {
    /// List stored response templates
    List,
    /// Store a response template for a command
    Set {
        key: String,
        #[arg(required = true)]
        value: Vec<String>,
    },
}

pub fn run(root: &Path, subcmd: ResponseSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ResponseSubcommand::List => list(root, json),
        ResponseSubcommand::Set { key, value } => set(root, &key, &value.join(" "), json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = Engine::open(root).context("failed to open engine state")?;

    if json {
        print_json(engine.responses())?;
        return Ok(());
    }

    if engine.responses().is_empty() {
        println!("No response templates.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = engine
        .responses()
        .iter()
        .map(|(k, v)| vec![k.clone(), v.clone()])
        .collect();
    print_table(&["KEY", "RESPONSE"], rows);
    Ok(())
}

fn set(root: &Path, key: &str, value: &str, json: bool) -> anyhow::Result<()> {
    let mut engine = Engine::open(root).context("failed to open engine state")?;
    engine
        .set_response(key, value)
        .context("failed to save response templates")?;

    if json {
        print_json(&serde_json::json!({ "key": key, "value": value }))?;
    } else {
        println!("Stored template for '{key}'");
    }
    Ok(())
}
