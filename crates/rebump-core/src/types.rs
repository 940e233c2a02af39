use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TargetCommand
// ---------------------------------------------------------------------------

/// The three follow-up commands whose cooldowns the bump bot reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCommand {
    Up,
    Bump,
    Like,
}

impl TargetCommand {
    pub fn all() -> &'static [TargetCommand] {
        &[TargetCommand::Up, TargetCommand::Bump, TargetCommand::Like]
    }

    /// The slash-command text as it appears in chat.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetCommand::Up => "/up",
            TargetCommand::Bump => "/bump",
            TargetCommand::Like => "/like",
        }
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetCommand {
    type Err = crate::error::RebumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/') {
            "up" => Ok(TargetCommand::Up),
            "bump" => Ok(TargetCommand::Bump),
            "like" => Ok(TargetCommand::Like),
            _ => Err(crate::error::RebumpError::InvalidTarget(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Executed,
    Error,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Executed => "executed",
            CommandStatus::Error => "error",
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommandStatus {
    type Err = crate::error::RebumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommandStatus::Pending),
            "executed" => Ok(CommandStatus::Executed),
            "error" => Ok(CommandStatus::Error),
            _ => Err(crate::error::RebumpError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowStatus
// ---------------------------------------------------------------------------

/// State of a bump workflow. Exactly one step is taken per tick; `Completed`
/// and `Failed` are terminal and the workflow is purged on the tick that
/// observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Waiting,
    Sending,
    WaitingResponse,
    Reading,
    Parsing,
    Scheduling,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Waiting => "waiting",
            WorkflowStatus::Sending => "sending",
            WorkflowStatus::WaitingResponse => "waiting_response",
            WorkflowStatus::Reading => "reading",
            WorkflowStatus::Parsing => "parsing",
            WorkflowStatus::Scheduling => "scheduling",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = crate::error::RebumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(WorkflowStatus::Waiting),
            "sending" => Ok(WorkflowStatus::Sending),
            "waiting_response" => Ok(WorkflowStatus::WaitingResponse),
            "reading" => Ok(WorkflowStatus::Reading),
            "parsing" => Ok(WorkflowStatus::Parsing),
            "scheduling" => Ok(WorkflowStatus::Scheduling),
            "completed" => Ok(WorkflowStatus::Completed),
            "failed" => Ok(WorkflowStatus::Failed),
            _ => Err(crate::error::RebumpError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn target_roundtrip() {
        for target in TargetCommand::all() {
            let parsed = TargetCommand::from_str(target.as_str()).unwrap();
            assert_eq!(*target, parsed);
        }
    }

    #[test]
    fn target_accepts_bare_name() {
        assert_eq!(TargetCommand::from_str("bump").unwrap(), TargetCommand::Bump);
        assert!(TargetCommand::from_str("/nudge").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(!WorkflowStatus::Scheduling.is_terminal());
        assert!(!WorkflowStatus::Waiting.is_terminal());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            WorkflowStatus::Waiting,
            WorkflowStatus::WaitingResponse,
            WorkflowStatus::Completed,
        ] {
            assert_eq!(WorkflowStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(WorkflowStatus::from_str("paused").is_err());
    }

    #[test]
    fn status_serde_names() {
        let s = serde_json::to_string(&WorkflowStatus::WaitingResponse).unwrap();
        assert_eq!(s, "\"waiting_response\"");
        let s = serde_json::to_string(&CommandStatus::Executed).unwrap();
        assert_eq!(s, "\"executed\"");
    }
}
