use crate::capability::ActionExecutor;
use crate::error::{RebumpError, Result};
use crate::io;
use crate::paths;
use crate::types::CommandStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ScheduledCommand
// ---------------------------------------------------------------------------

/// One timed command. Serde renames match the persisted record format, which
/// predates this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub id: String,
    #[serde(rename = "time")]
    pub fire_at: i64,
    #[serde(rename = "command")]
    pub command_text: String,
    #[serde(rename = "double_enter")]
    pub repeat_enter: bool,
    #[serde(default)]
    pub double_space: bool,
    pub status: CommandStatus,
    #[serde(default)]
    pub source_task_id: Option<String>,
    pub created_at: String,
}

impl ScheduledCommand {
    pub fn new(
        command_text: impl Into<String>,
        fire_at: i64,
        repeat_enter: bool,
        double_space: bool,
        source_workflow_id: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fire_at,
            command_text: command_text.into(),
            repeat_enter,
            double_space,
            status: CommandStatus::Pending,
            source_task_id: source_workflow_id.map(|id| id.to_string()),
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Command text must be sendable as a single chat message.
pub fn validate_command_text(text: &str) -> Result<()> {
    if text.trim().is_empty() || text.contains('\n') {
        return Err(RebumpError::InvalidCommand(text.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// The active one-shot collection. Only `pending` entries survive a tick;
/// anything else is retired at the end of the tick that observes it.
#[derive(Debug, Default)]
pub struct Schedule {
    commands: Vec<ScheduledCommand>,
}

impl Schedule {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the persisted collection, silently dropping malformed records and
    /// records whose command text fails validation. If anything was dropped
    /// the corrected collection is re-persisted before returning.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::schedule_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(&path)?;
        let records: Vec<serde_json::Value> = match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "schedule file unreadable, starting empty");
                let schedule = Self::default();
                schedule.save(root)?;
                return Ok(schedule);
            }
        };

        let total = records.len();
        let mut commands = Vec::new();
        for record in records {
            match serde_json::from_value::<ScheduledCommand>(record) {
                Ok(cmd) if validate_command_text(&cmd.command_text).is_ok() => commands.push(cmd),
                Ok(cmd) => {
                    tracing::warn!(id = %cmd.id, "dropping record with invalid command text")
                }
                Err(e) => tracing::warn!(error = %e, "dropping malformed schedule record"),
            }
        }

        let schedule = Self { commands };
        if schedule.commands.len() != total {
            tracing::info!(
                kept = schedule.commands.len(),
                dropped = total - schedule.commands.len(),
                "re-persisting corrected schedule"
            );
            schedule.save(root)?;
        }
        Ok(schedule)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.commands)?;
        io::atomic_write(&paths::schedule_path(root), data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Collection operations
    // ---------------------------------------------------------------------------

    pub fn push(&mut self, command: ScheduledCommand) -> String {
        let id = command.id.clone();
        self.commands.push(command);
        id
    }

    pub fn commands(&self) -> &[ScheduledCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Operator cancellation; valid at any point before execution.
    pub fn cancel(&mut self, id: &str) -> Result<()> {
        let before = self.commands.len();
        self.commands.retain(|c| c.id != id);
        if self.commands.len() == before {
            return Err(RebumpError::CommandNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Execute every pending entry that is due at `now` and retire it,
    /// whatever the executor outcome. Works off a snapshot of ids taken at
    /// tick start, so entries pushed while the tick runs wait for the next
    /// one. Returns the number of entries fired.
    pub fn tick(&mut self, now: i64, executor: &mut dyn ActionExecutor) -> usize {
        let due: Vec<String> = self
            .commands
            .iter()
            .filter(|c| c.status == CommandStatus::Pending && c.fire_at <= now)
            .map(|c| c.id.clone())
            .collect();

        for id in &due {
            let Some(cmd) = self.commands.iter_mut().find(|c| &c.id == id) else {
                continue;
            };
            tracing::info!(command = %cmd.command_text, "executing scheduled command");
            if executor.send(&cmd.command_text, cmd.repeat_enter, cmd.double_space) {
                cmd.status = CommandStatus::Executed;
            } else {
                cmd.status = CommandStatus::Error;
                tracing::error!(command = %cmd.command_text, "scheduled command failed to send");
            }
        }

        self.commands.retain(|c| c.status == CommandStatus::Pending);
        due.len()
    }

    /// Drop every entry older than `max_age`, regardless of status. Bounds
    /// the collection against entries that were never retired.
    pub fn evict_stale(&mut self, now: i64, max_age: i64) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| c.fire_at >= now - max_age);
        let removed = before - self.commands.len();
        if removed > 0 {
            tracing::info!(removed, "evicted stale schedule entries");
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct RecordingExecutor {
        sent: Vec<String>,
        succeed: bool,
    }

    impl RecordingExecutor {
        fn new(succeed: bool) -> Self {
            Self {
                sent: Vec::new(),
                succeed,
            }
        }
    }

    impl ActionExecutor for RecordingExecutor {
        fn send(&mut self, command: &str, _repeat_enter: bool, _double_space: bool) -> bool {
            self.sent.push(command.to_string());
            self.succeed
        }
    }

    #[test]
    fn due_command_fires_once_and_is_retired() {
        let mut schedule = Schedule::default();
        schedule.push(ScheduledCommand::new("/up", 100, false, false, None));

        let mut exec = RecordingExecutor::new(true);
        assert_eq!(schedule.tick(100, &mut exec), 1);
        assert_eq!(exec.sent, ["/up"]);
        assert!(schedule.is_empty());

        // Nothing left to fire on a later tick.
        assert_eq!(schedule.tick(200, &mut exec), 0);
        assert_eq!(exec.sent.len(), 1);
    }

    #[test]
    fn failed_send_still_retires_the_entry() {
        let mut schedule = Schedule::default();
        schedule.push(ScheduledCommand::new("/bump", 50, false, false, None));

        let mut exec = RecordingExecutor::new(false);
        assert_eq!(schedule.tick(60, &mut exec), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn future_commands_are_untouched() {
        let mut schedule = Schedule::default();
        schedule.push(ScheduledCommand::new("/like", 1000, false, false, None));

        let mut exec = RecordingExecutor::new(true);
        assert_eq!(schedule.tick(999, &mut exec), 0);
        assert!(exec.sent.is_empty());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.commands()[0].status, CommandStatus::Pending);
    }

    #[test]
    fn evict_stale_boundaries() {
        let mut schedule = Schedule::default();
        schedule.push(ScheduledCommand::new("old", 100, false, false, None));
        schedule.push(ScheduledCommand::new("edge", 700, false, false, None));
        schedule.push(ScheduledCommand::new("fresh", 900, false, false, None));

        // now - max_age = 700: only fire_at < 700 goes.
        assert_eq!(schedule.evict_stale(1000, 300), 1);
        let remaining: Vec<&str> = schedule
            .commands()
            .iter()
            .map(|c| c.command_text.as_str())
            .collect();
        assert_eq!(remaining, ["edge", "fresh"]);
    }

    #[test]
    fn evict_stale_removes_lingering_non_pending() {
        let mut schedule = Schedule::default();
        let mut cmd = ScheduledCommand::new("/up", 100, false, false, None);
        cmd.status = CommandStatus::Error;
        schedule.push(cmd);

        assert_eq!(schedule.evict_stale(1000, 300), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn cancel_removes_only_the_target() {
        let mut schedule = Schedule::default();
        let id = schedule.push(ScheduledCommand::new("/up", 100, false, false, None));
        schedule.push(ScheduledCommand::new("/bump", 200, false, false, None));

        schedule.cancel(&id).unwrap();
        assert_eq!(schedule.len(), 1);
        assert!(schedule.cancel("no-such-id").is_err());
    }

    #[test]
    fn roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let mut schedule = Schedule::default();
        schedule.push(ScheduledCommand::new("/up", 123, true, false, Some(7)));
        schedule.save(dir.path()).unwrap();

        let loaded = Schedule::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        let cmd = &loaded.commands()[0];
        assert_eq!(cmd.command_text, "/up");
        assert_eq!(cmd.fire_at, 123);
        assert!(cmd.repeat_enter);
        assert_eq!(cmd.source_task_id.as_deref(), Some("7"));
    }

    #[test]
    fn load_drops_malformed_record_and_repersists() {
        let dir = TempDir::new().unwrap();
        let good = serde_json::to_value(ScheduledCommand::new("/up", 42, false, false, None)).unwrap();
        let data = serde_json::to_string(&[good, serde_json::json!({"not": "a record"})]).unwrap();
        io::atomic_write(&paths::schedule_path(dir.path()), data.as_bytes()).unwrap();

        let loaded = Schedule::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);

        // The corrected file contains only the surviving record.
        let on_disk = std::fs::read_to_string(paths::schedule_path(dir.path())).unwrap();
        let records: Vec<serde_json::Value> = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["command"], "/up");
    }

    #[test]
    fn load_drops_record_with_empty_command() {
        let dir = TempDir::new().unwrap();
        let mut bad = serde_json::to_value(ScheduledCommand::new("x", 42, false, false, None)).unwrap();
        bad["command"] = serde_json::json!("   ");
        let data = serde_json::to_string(&[bad]).unwrap();
        io::atomic_write(&paths::schedule_path(dir.path()), data.as_bytes()).unwrap();

        let loaded = Schedule::load(dir.path()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn missing_file_is_an_empty_schedule() {
        let dir = TempDir::new().unwrap();
        assert!(Schedule::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn wire_field_names() {
        let cmd = ScheduledCommand::new("/up", 9, true, false, None);
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["time"], 9);
        assert_eq!(value["command"], "/up");
        assert_eq!(value["double_enter"], true);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["source_task_id"], serde_json::Value::Null);
    }

    #[test]
    fn command_text_validation() {
        assert!(validate_command_text("/up").is_ok());
        assert!(validate_command_text("").is_err());
        assert!(validate_command_text("  ").is_err());
        assert!(validate_command_text("/up\n/bump").is_err());
    }
}
