use crate::capability::{ActionExecutor, UiCapture};
use crate::duration;
use crate::error::{RebumpError, Result};
use crate::io;
use crate::message::{self, ParseResult};
use crate::paths;
use crate::schedule::{self, Schedule, ScheduledCommand};
use crate::types::{TargetCommand, WorkflowStatus};
use crate::workflow::{BumpWorkflow, COOLDOWN_BUFFER_SECS, RESPONSE_WAIT_SECS};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns both active collections (one-shot commands and bump workflows) plus
/// the operator's response-template map. All mutation goes through this
/// struct from the driver's tick loop; hosts that add concurrent producers
/// must wrap the whole engine in one lock, because a workflow's scheduling
/// step writes into the command collection.
pub struct Engine {
    root: PathBuf,
    schedule: Schedule,
    workflows: Vec<BumpWorkflow>,
    next_workflow_id: u64,
    responses: BTreeMap<String, String>,
}

impl Engine {
    /// Load persisted state from `root/.rebump/`. Missing files start empty;
    /// corrupt schedule records are dropped and the file corrected on the
    /// spot.
    pub fn open(root: &Path) -> Result<Self> {
        io::ensure_dir(&paths::data_dir(root))?;
        let schedule = Schedule::load(root)?;
        if !schedule.is_empty() {
            tracing::info!(count = schedule.len(), "restored scheduled commands");
        }
        let responses = load_responses(root);
        Ok(Self {
            root: root.to_path_buf(),
            schedule,
            workflows: Vec::new(),
            next_workflow_id: 0,
            responses,
        })
    }

    // ---------------------------------------------------------------------------
    // Driver surface
    // ---------------------------------------------------------------------------

    /// Schedule a single command `delay_secs` from `now`. The updated
    /// collection is persisted before the id is returned.
    pub fn add_one_shot(
        &mut self,
        now: i64,
        command: &str,
        delay_secs: u64,
        repeat_enter: bool,
        double_space: bool,
    ) -> Result<String> {
        schedule::validate_command_text(command)?;
        let fire_at = now + delay_secs as i64;
        let id = self.schedule.push(ScheduledCommand::new(
            command,
            fire_at,
            repeat_enter,
            double_space,
            None,
        ));
        self.schedule.save(&self.root)?;
        tracing::info!(command, fire_at, "scheduled one-shot command");
        Ok(id)
    }

    /// Create a bump cycle that fires its trigger `delay_secs` from `now` and
    /// reschedules `targets` from the parsed reply. Duplicate targets are
    /// collapsed, first occurrence wins.
    pub fn add_bump_workflow(
        &mut self,
        now: i64,
        trigger_command: &str,
        delay_secs: u64,
        targets: &[TargetCommand],
        repeat_enter: bool,
        double_space: bool,
    ) -> Result<u64> {
        schedule::validate_command_text(trigger_command)?;
        let mut deduped: Vec<TargetCommand> = Vec::new();
        for &t in targets {
            if !deduped.contains(&t) {
                deduped.push(t);
            }
        }
        if deduped.is_empty() {
            return Err(RebumpError::NoTargets);
        }

        let id = self.next_workflow_id;
        self.next_workflow_id += 1;
        self.workflows.push(BumpWorkflow::new(
            id,
            trigger_command,
            now + delay_secs as i64,
            deduped,
            repeat_enter,
            double_space,
        ));
        tracing::info!(id, trigger_command, "created bump workflow");
        Ok(id)
    }

    pub fn list_scheduled(&self) -> &[ScheduledCommand] {
        self.schedule.commands()
    }

    pub fn list_workflows(&self) -> &[BumpWorkflow] {
        &self.workflows
    }

    /// Operator cancellation of a pending one-shot command.
    pub fn cancel_command(&mut self, id: &str) -> Result<()> {
        self.schedule.cancel(id)?;
        self.schedule.save(&self.root)
    }

    /// Operator cancellation of a workflow, valid in any state.
    pub fn cancel_workflow(&mut self, id: u64) -> Result<()> {
        let before = self.workflows.len();
        self.workflows.retain(|w| w.id != id);
        if self.workflows.len() == before {
            return Err(RebumpError::WorkflowNotFound(id));
        }
        Ok(())
    }

    /// Exercise the extraction pipeline against arbitrary text; the CLI feeds
    /// it `message::SELF_TEST_SAMPLE` by default.
    pub fn run_self_test(sample_text: &str) -> ParseResult {
        message::parse_commands(sample_text)
    }

    /// Drop schedule entries older than `max_age`, persisting if anything
    /// went.
    pub fn evict_stale(&mut self, now: i64, max_age: i64) -> Result<usize> {
        let removed = self.schedule.evict_stale(now, max_age);
        if removed > 0 {
            self.schedule.save(&self.root)?;
        }
        Ok(removed)
    }

    // ---------------------------------------------------------------------------
    // Response templates (stored verbatim, never interpreted here)
    // ---------------------------------------------------------------------------

    pub fn responses(&self) -> &BTreeMap<String, String> {
        &self.responses
    }

    pub fn set_response(&mut self, key: &str, value: &str) -> Result<()> {
        self.responses.insert(key.to_string(), value.to_string());
        let data = serde_json::to_string_pretty(&self.responses)?;
        io::atomic_write(&paths::responses_path(&self.root), data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------------

    /// One non-blocking pass: fire due one-shot commands, then advance every
    /// active workflow by at most one state step. Workflows that reached a
    /// terminal state on an earlier tick are purged first. Failures stay
    /// confined to the entity they occurred in.
    pub fn tick(
        &mut self,
        now: i64,
        executor: &mut dyn ActionExecutor,
        capture: &mut dyn UiCapture,
    ) -> Result<()> {
        let fired = self.schedule.tick(now, executor);

        self.workflows.retain(|w| {
            if w.is_terminal() {
                tracing::info!(id = w.id, status = %w.status, "retiring workflow");
            }
            !w.is_terminal()
        });

        let mut schedule_dirty = fired > 0;
        {
            let schedule = &mut self.schedule;
            for wf in &mut self.workflows {
                if step_workflow(wf, schedule, now, executor, capture) {
                    schedule_dirty = true;
                }
            }
        }

        if schedule_dirty {
            self.schedule.save(&self.root)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Workflow stepping
// ---------------------------------------------------------------------------

/// Advance one workflow by one state step. Returns true when the one-shot
/// collection changed and needs persisting.
fn step_workflow(
    wf: &mut BumpWorkflow,
    schedule: &mut Schedule,
    now: i64,
    executor: &mut dyn ActionExecutor,
    capture: &mut dyn UiCapture,
) -> bool {
    match wf.status {
        WorkflowStatus::Waiting => {
            if now >= wf.start_at {
                tracing::info!(id = wf.id, "starting bump workflow");
                wf.status = WorkflowStatus::Sending;
            }
            false
        }

        WorkflowStatus::Sending => {
            if executor.send(&wf.trigger_command, wf.repeat_enter, wf.double_space) {
                wf.status = WorkflowStatus::WaitingResponse;
                wf.response_deadline = Some(now + RESPONSE_WAIT_SECS);
                tracing::debug!(id = wf.id, "trigger sent, waiting for reply");
            } else {
                wf.status = WorkflowStatus::Failed;
                tracing::error!(id = wf.id, "trigger command failed to send");
            }
            false
        }

        WorkflowStatus::WaitingResponse => {
            if now >= wf.response_deadline.unwrap_or(0) {
                wf.status = WorkflowStatus::Reading;
            }
            false
        }

        WorkflowStatus::Reading => {
            match capture.capture_latest() {
                Some(text) if !text.trim().is_empty() => {
                    wf.captured_text = Some(text);
                    wf.status = WorkflowStatus::Parsing;
                }
                _ => {
                    wf.status = WorkflowStatus::Failed;
                    tracing::error!(id = wf.id, "capture returned no text");
                }
            }
            false
        }

        WorkflowStatus::Parsing => {
            let parsed = message::parse_commands(wf.captured_text.as_deref().unwrap_or(""));
            if parsed.success {
                wf.parsed = Some(parsed);
                wf.status = WorkflowStatus::Scheduling;
            } else {
                wf.status = WorkflowStatus::Failed;
                tracing::error!(id = wf.id, "no cooldowns parsed from captured text");
            }
            false
        }

        WorkflowStatus::Scheduling => {
            let parsed = wf.parsed.clone().unwrap_or_default();
            let mut dirty = false;
            for &target in &wf.targets {
                let Some(secs) = parsed.get(target) else {
                    // Partial success: the parsing gate already guaranteed at
                    // least one target resolved.
                    tracing::warn!(id = wf.id, target = %target, "no parsed cooldown, skipping");
                    continue;
                };
                let Ok(secs) = i64::try_from(secs) else {
                    tracing::warn!(id = wf.id, target = %target, "cooldown out of range, skipping");
                    continue;
                };
                let fire_at = now.saturating_add(secs).saturating_add(COOLDOWN_BUFFER_SECS);
                let id = schedule.push(ScheduledCommand::new(
                    target.as_str(),
                    fire_at,
                    wf.repeat_enter,
                    wf.double_space,
                    Some(wf.id),
                ));
                tracing::info!(
                    workflow = wf.id,
                    target = %target,
                    due_in = %duration::format_seconds(fire_at.saturating_sub(now) as u64),
                    "scheduled follow-up command"
                );
                wf.spawned_command_ids.push(id);
                dirty = true;
            }
            wf.status = WorkflowStatus::Completed;
            tracing::info!(
                id = wf.id,
                spawned = wf.spawned_command_ids.len(),
                "bump workflow completed"
            );
            dirty
        }

        WorkflowStatus::Completed | WorkflowStatus::Failed => false,
    }
}

// ---------------------------------------------------------------------------
// Response template persistence
// ---------------------------------------------------------------------------

fn load_responses(root: &Path) -> BTreeMap<String, String> {
    let path = paths::responses_path(root);
    if !path.exists() {
        return BTreeMap::new();
    }
    match std::fs::read_to_string(&path)
        .map_err(RebumpError::from)
        .and_then(|data| Ok(serde_json::from_str(&data)?))
    {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "responses file unreadable, starting empty");
            BTreeMap::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
