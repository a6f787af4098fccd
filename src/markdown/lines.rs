//! Line-level block scanning shared by source rewrites.
//!
//! The source is rewritten before any renderer sees it, so fenced code and
//! container markers have to be recognized on raw lines.

use regex::Regex;
use std::sync::LazyLock;

static CONTAINER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*(?:>[ \t]?|[-*+][ \t]+|\d{1,9}[.)][ \t]+))*")
        .expect("container prefix regex")
});

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?P<run>`{3,}|~{3,})(?P<info>[^\n]*)").expect("fence regex")
});

/// Length of the leading blockquote and list markers of `line`.
pub fn container_prefix_len(line: &str) -> usize {
    CONTAINER_PREFIX.find(line).map_or(0, |m| m.end())
}

/// Tracks fenced code blocks across consecutive lines.
///
/// A fence opens on a run of at least three backticks or tildes and closes
/// on a run of the same character at least as long with nothing after it.
#[derive(Debug, Default, Clone)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line.
    ///
    /// Returns whether the line belongs to fenced code, fence lines included.
    pub fn is_code(&mut self, line: &str) -> bool {
        let body = &line[container_prefix_len(line)..];
        let fence = FENCE.captures(body).and_then(|caps| {
            let run = caps.name("run")?.as_str();
            let info = caps.name("info").map_or("", |m| m.as_str());
            let marker = run.chars().next()?;
            Some((marker, run.len(), info.trim()))
        });

        match (self.open, fence) {
            (None, Some((marker, len, info))) => {
                // Backtick fences cannot carry backticks in the info string.
                if marker == '`' && info.contains('`') {
                    return false;
                }
                self.open = Some((marker, len));
                true
            }
            (Some((open, open_len)), Some((marker, len, info)))
                if marker == open && len >= open_len && info.is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}
