use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Locale tables
// ---------------------------------------------------------------------------

/// First character of a unit word decides the multiplier. Covers the English
/// and Russian vocabularies ("hours"/"часа", "min"/"минут", "sec"/"секунд").
const UNIT_TABLE: &[(&[char], u64)] = &[
    (&['h', 'ч'], 3600),
    (&['m', 'м'], 60),
    (&['s', 'с'], 1),
];

/// Connective words stripped before scanning. The lone Latin "c" shows up in
/// the wild as a mistyped Cyrillic "с".
const STOP_WORDS: &[&str] = &[
    "и", "в", "на", "с", "со", "c", "and", "in", "on", "at", "with",
];

const PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '(', ')', '[', ']', '«', '»', '-', '–', '—', '|', '#', '!', '?',
];

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

static VALUE_UNIT_RE: OnceLock<Regex> = OnceLock::new();
static INTEGER_RE: OnceLock<Regex> = OnceLock::new();
static STOP_WORD_RE: OnceLock<Regex> = OnceLock::new();

fn value_unit_re() -> &'static Regex {
    VALUE_UNIT_RE.get_or_init(|| Regex::new(r"(\d+)\s*([a-zа-яё]+)").unwrap())
}

fn integer_re() -> &'static Regex {
    INTEGER_RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

fn stop_word_re() -> &'static Regex {
    STOP_WORD_RE.get_or_init(|| {
        let alternatives = STOP_WORDS.join("|");
        Regex::new(&format!(r"\b(?:{alternatives})\b")).unwrap()
    })
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Convert a free-form bilingual duration expression into whole seconds.
///
/// Tolerates arbitrary separators and mixed scripts: `"2h 5m"`,
/// `"25 минут и 15 секунд"`, `"02:05:30"` and `"90"` all parse. Text after
/// the first comma is discarded (trailing timestamps). Returns `None` when no
/// strictly positive total can be extracted; malformed input never errors.
pub fn parse_seconds(text: &str) -> Option<u64> {
    let text = text.split(',').next().unwrap_or("");
    let lowered = text.to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    let cleaned = stop_word_re().replace_all(&spaced, " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut total: u64 = 0;
    for caps in value_unit_re().captures_iter(&cleaned) {
        let Ok(value) = caps[1].parse::<u64>() else {
            continue;
        };
        let word = &caps[2];
        match unit_multiplier(word) {
            Some(mult) => total = total.checked_add(value.checked_mul(mult)?)?,
            None => tracing::debug!(unit = word, "skipping unrecognized duration unit"),
        }
    }

    // Nothing tagged with a unit: fall back to positional bare integers
    // (H M S / M S / S).
    if total == 0 {
        let values: Vec<u64> = integer_re()
            .find_iter(&cleaned)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        total = match values.as_slice() {
            [h, m, s, ..] => h
                .checked_mul(3600)?
                .checked_add(m.checked_mul(60)?)?
                .checked_add(*s)?,
            [m, s] => m.checked_mul(60)?.checked_add(*s)?,
            [s] => *s,
            [] => 0,
        };
    }

    (total > 0).then_some(total)
}

fn unit_multiplier(word: &str) -> Option<u64> {
    let first = word.chars().next()?;
    UNIT_TABLE
        .iter()
        .find(|(initials, _)| initials.contains(&first))
        .map(|(_, mult)| *mult)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render seconds as `"2h 36m 35s"` for schedule and workflow listings.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
