use crate::message::ParseResult;
use crate::types::{TargetCommand, WorkflowStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Engine constants
// ---------------------------------------------------------------------------

/// Slack between sending the trigger and reading the reply; the status bot
/// needs a moment to answer.
pub const RESPONSE_WAIT_SECS: i64 = 5;

/// Buffer added on top of every parsed cooldown so the follow-up never lands
/// a hair early.
pub const COOLDOWN_BUFFER_SECS: i64 = 10;

/// Status-request command sent when the operator does not override it.
pub const DEFAULT_TRIGGER_COMMAND: &str = "/getbump";

// ---------------------------------------------------------------------------
// BumpWorkflow
// ---------------------------------------------------------------------------

/// One bump cycle: trigger → capture → parse → reschedule. Advanced one state
/// step per tick by the engine; never persisted (a restart starts fresh
/// cycles, only the one-shot schedule survives).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpWorkflow {
    pub id: u64,
    pub trigger_command: String,
    pub start_at: i64,
    pub targets: Vec<TargetCommand>,
    pub repeat_enter: bool,
    pub double_space: bool,
    pub status: WorkflowStatus,
    pub response_deadline: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParseResult>,
    pub spawned_command_ids: Vec<String>,
    pub created_at: String,
}

impl BumpWorkflow {
    pub fn new(
        id: u64,
        trigger_command: impl Into<String>,
        start_at: i64,
        targets: Vec<TargetCommand>,
        repeat_enter: bool,
        double_space: bool,
    ) -> Self {
        Self {
            id,
            trigger_command: trigger_command.into(),
            start_at,
            targets,
            repeat_enter,
            double_space,
            status: WorkflowStatus::Waiting,
            response_deadline: None,
            captured_text: None,
            parsed: None,
            spawned_command_ids: Vec::new(),
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
