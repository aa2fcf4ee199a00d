//! Keyword tables driving the extraction engine.
//!
//! Tables are ordered lists of `(tag, words)` pairs. Lookups walk them in
//! declaration order, so the first (or highest-scoring, ties going to the
//! earlier entry) tag wins.

use crate::task::{Category, Priority};

/// A numeric-plus-unit duration phrase, e.g. "2 hours".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationRule {
    /// Accepted unit spellings (matched case-insensitively).
    pub units: Vec<String>,
    /// Minutes per unit.
    pub multiplier: i64,
}

impl DurationRule {
    pub fn new(units: &[&str], multiplier: i64) -> Self {
        Self {
            units: owned(units),
            multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTables {
    /// High, Medium, Low. Medium words are only stripped from titles.
    pub priority: Vec<(Priority, Vec<String>)>,
    /// Energy levels 1..=5, checked in ascending order.
    pub energy: Vec<(u8, Vec<String>)>,
    /// Matched against whole tokens, not substrings.
    pub category: Vec<(Category, Vec<String>)>,
    /// Evaluated in order; the first rule matching anywhere wins.
    pub durations: Vec<DurationRule>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            priority: vec![
                (
                    Priority::High,
                    owned(&["urgent", "asap", "immediately", "important", "critical", "high priority"]),
                ),
                (Priority::Medium, owned(&["should", "moderate", "medium priority"])),
                (
                    Priority::Low,
                    owned(&["whenever", "not urgent", "low priority", "someday"]),
                ),
            ],
            energy: vec![
                (1, owned(&["simple", "quick", "easy", "light", "small"])),
                (2, owned(&["moderate", "medium", "average"])),
                (3, owned(&["standard", "normal", "regular"])),
                (4, owned(&["challenging", "complex", "difficult", "hard"])),
                (5, owned(&["intense", "exhausting", "demanding", "tough"])),
            ],
            category: vec![
                (
                    Category::Work,
                    owned(&["work", "job", "meeting", "email", "report", "project", "presentation"]),
                ),
                (
                    Category::Study,
                    owned(&["study", "homework", "assignment", "read", "learn", "research", "exam", "quiz"]),
                ),
                (
                    Category::Personal,
                    owned(&["call", "buy", "shop", "clean", "organize", "family", "friend"]),
                ),
                (
                    Category::Health,
                    owned(&["gym", "workout", "run", "exercise", "yoga", "meditate", "doctor"]),
                ),
            ],
            durations: vec![
                DurationRule::new(&["minute", "minutes", "min", "mins"], 1),
                DurationRule::new(&["hour", "hours", "hr", "hrs"], 60),
                DurationRule::new(&["day", "days"], 1440),
            ],
        }
    }
}

impl KeywordTables {
    pub fn priority_words(&self, priority: Priority) -> &[String] {
        self.priority
            .iter()
            .find(|(p, _)| *p == priority)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }

    /// Every priority and energy word; these are removed from titles.
    pub fn metadata_words(&self) -> Vec<&str> {
        self.priority
            .iter()
            .flat_map(|(_, words)| words.iter())
            .chain(self.energy.iter().flat_map(|(_, words)| words.iter()))
            .map(|w| w.as_str())
            .filter(|w| !w.trim().is_empty())
            .collect()
    }
}
