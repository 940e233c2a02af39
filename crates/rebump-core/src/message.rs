use crate::duration;
use crate::types::TargetCommand;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

static COMMAND_WITH_DIGIT_RE: OnceLock<Regex> = OnceLock::new();
static COMMAND_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// A command token followed somewhere later on the same line by a digit.
fn command_with_digit_re() -> &'static Regex {
    COMMAND_WITH_DIGIT_RE
        .get_or_init(|| Regex::new(r"(?i)(?:/up|/bump|/like).*?\d").unwrap())
}

fn command_token_re() -> &'static Regex {
    COMMAND_TOKEN_RE.get_or_init(|| Regex::new(r"(?i)/up|/bump|/like").unwrap())
}

/// Characters stripped around a cooldown phrase after the command token.
const TOKEN_SEPARATORS: &[char] = &[' ', ':', '‑', '–', '—', ',', '.', ';', '|', '#'];

/// How many trailing candidate lines are kept; the freshest status reply is
/// always at the bottom of the captured text.
const CANDIDATE_LINES: usize = 5;

// ---------------------------------------------------------------------------
// ParseResult
// ---------------------------------------------------------------------------

/// Per-command cooldowns extracted from one status reply. `success` is true
/// iff at least one command resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub up: Option<u64>,
    pub bump: Option<u64>,
    pub like: Option<u64>,
    pub success: bool,
}

impl ParseResult {
    pub fn get(&self, target: TargetCommand) -> Option<u64> {
        match target {
            TargetCommand::Up => self.up,
            TargetCommand::Bump => self.bump,
            TargetCommand::Like => self.like,
        }
    }

    fn set(&mut self, target: TargetCommand, seconds: u64) {
        match target {
            TargetCommand::Up => self.up = Some(seconds),
            TargetCommand::Bump => self.bump = Some(seconds),
            TargetCommand::Like => self.like = Some(seconds),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// True iff `text` contains a command token with a digit somewhere after it.
pub fn is_bump_line(text: &str) -> bool {
    command_with_digit_re().is_match(text)
}

/// Pull the candidate lines out of a raw capture: non-empty lines matching
/// the command+digit pattern, last five in original order, joined by newline.
pub fn candidate_block(full_text: &str) -> Option<String> {
    let hits: Vec<&str> = full_text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| command_with_digit_re().is_match(line))
        .collect();

    if hits.is_empty() {
        return None;
    }
    let start = hits.len().saturating_sub(CANDIDATE_LINES);
    Some(hits[start..].join("\n"))
}

/// Run the full extraction pipeline over a captured text blob.
///
/// For each target command the first candidate line containing its token wins,
/// whether or not the cooldown on that line parses.
pub fn parse_commands(message_text: &str) -> ParseResult {
    let Some(block) = candidate_block(message_text) else {
        tracing::debug!("no candidate command lines in captured text");
        return ParseResult::default();
    };

    let mut result = ParseResult::default();
    for &target in TargetCommand::all() {
        for line in block.lines() {
            let Some(token_end) = find_token(line, target) else {
                continue;
            };
            match seconds_after_token(line, token_end) {
                Some(seconds) => {
                    tracing::debug!(
                        target = %target,
                        cooldown = %duration::format_seconds(seconds),
                        "parsed cooldown"
                    );
                    result.set(target, seconds);
                }
                None => tracing::warn!(target = %target, line, "cooldown did not parse"),
            }
            break;
        }
    }

    result.success = result.up.is_some() || result.bump.is_some() || result.like.is_some();
    result
}

/// Byte offset just past the first occurrence of `target`'s token in `line`.
fn find_token(line: &str, target: TargetCommand) -> Option<usize> {
    command_token_re()
        .find_iter(line)
        .find(|m| m.as_str().eq_ignore_ascii_case(target.as_str()))
        .map(|m| m.end())
}

fn seconds_after_token(line: &str, token_end: usize) -> Option<u64> {
    let rest = line[token_end..].trim_matches(TOKEN_SEPARATORS);
    let rest = rest.split(',').next().unwrap_or("");
    duration::parse_seconds(rest)
}

// ---------------------------------------------------------------------------
// Self-test fixture
// ---------------------------------------------------------------------------

/// Canonical status reply used by `selftest`; covers all three commands with
/// Russian unit words and trailing timestamps.
pub const SELF_TEST_SAMPLE: &str = "\
Времени до
:SDC: /up: 25 минут и 15 секунд, 17:24:25
:ServerMonitoring: /bump: 2 часа 36 минут и 35 секунд, 19:35:44
:DSMonitoring: /like: 3 часа 39 минут и 12 секунд, 20:38:22

Сообщения будут высылаться в канал: up-like";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
