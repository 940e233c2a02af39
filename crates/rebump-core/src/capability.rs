//! Collaborator interfaces the engine is driven through. The core never
//! touches the chat client directly; hosts inject implementations of these
//! traits, and tests inject canned fixtures.

/// Delivers command text to the target application.
pub trait ActionExecutor {
    /// Send `command`. `repeat_enter` asks for a second confirmation action
    /// after the first; `double_space` asks for punctuation-spacing
    /// post-processing of the text before it goes out. Returns `false` when
    /// delivery failed; the engine marks the owning entity as failed and
    /// never retries.
    fn send(&mut self, command: &str, repeat_enter: bool, double_space: bool) -> bool;
}

/// Best-effort read of the newest visible message text.
pub trait UiCapture {
    /// `None` (or empty text) is treated as a capture failure by the engine.
    fn capture_latest(&mut self) -> Option<String>;
}
