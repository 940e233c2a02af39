//! File-backed implementations of the engine's collaborator traits, so the
//! orchestration loop can run headlessly: sends append to an outbox file the
//! host-side automation drains, captures read an inbox file the host keeps
//! current with the latest chat text.

use rebump_core::capability::{ActionExecutor, UiCapture};
use std::io::Write;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// OutboxExecutor
// ---------------------------------------------------------------------------

pub struct OutboxExecutor {
    path: PathBuf,
}

impl OutboxExecutor {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActionExecutor for OutboxExecutor {
    fn send(&mut self, command: &str, repeat_enter: bool, double_space: bool) -> bool {
        let text = if double_space {
            respace(command)
        } else {
            command.to_string()
        };
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            writeln!(f, "{text}")?;
            if repeat_enter {
                // Second confirmation line, mirroring a repeated Enter press.
                writeln!(f)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                tracing::info!(command, "wrote command to outbox");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, path = %self.path.display(), "outbox write failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DryRunExecutor
// ---------------------------------------------------------------------------

/// Logs every send instead of delivering it. Always succeeds.
pub struct DryRunExecutor;

impl ActionExecutor for DryRunExecutor {
    fn send(&mut self, command: &str, repeat_enter: bool, double_space: bool) -> bool {
        tracing::info!(command, repeat_enter, double_space, "dry-run send");
        true
    }
}

// ---------------------------------------------------------------------------
// InboxCapture
// ---------------------------------------------------------------------------

pub struct InboxCapture {
    path: PathBuf,
}

impl InboxCapture {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UiCapture for InboxCapture {
    fn capture_latest(&mut self) -> Option<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .filter(|text| !text.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Text post-processing
// ---------------------------------------------------------------------------

/// Punctuation-spacing pass applied when a command was created with
/// `double_space`: an extra space after sentence punctuation, for clients
/// that swallow single separators.
fn respace(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        out.push(c);
        if matches!(c, '.' | ',' | '!' | '?' | ':' | ';') {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn respace_adds_space_after_punctuation() {
        assert_eq!(respace("hi,there"), "hi, there");
        assert_eq!(respace("/up"), "/up");
        assert_eq!(respace("a.b!c"), "a. b! c");
    }

    #[test]
    fn outbox_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbox.txt");
        let mut exec = OutboxExecutor::new(path.clone());
        assert!(exec.send("/up", false, false));
        assert!(exec.send("/bump", true, false));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "/up\n/bump\n\n");
    }

    #[test]
    fn inbox_capture_filters_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inbox.txt");
        let mut capture = InboxCapture::new(path.clone());
        assert_eq!(capture.capture_latest(), None);

        std::fs::write(&path, "   \n").unwrap();
        assert_eq!(capture.capture_latest(), None);

        std::fs::write(&path, "/up: 5m\n").unwrap();
        assert_eq!(capture.capture_latest().as_deref(), Some("/up: 5m\n"));
    }
}
