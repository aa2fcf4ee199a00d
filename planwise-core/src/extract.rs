//! Extraction engine: free text -> `ParsedTask`.
//!
//! Each step is total. Worst case the result is the defaults plus the raw
//! (trimmed) text as title.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

use crate::keywords::KeywordTables;
use crate::task::{Category, DEFAULT_DURATION_MINUTES, DEFAULT_ENERGY_LEVEL, ParsedTask, Priority};

#[derive(Debug, Clone)]
pub struct TaskParser {
    tables: KeywordTables,
    /// (pattern, minutes per unit), in table order.
    durations: Vec<(Regex, i64)>,
    /// Word-bounded alternation of every priority/energy word.
    metadata: Option<Regex>,
    separators: Regex,
    relative_date: Regex,
}

/// Longest spelling first so "minutes" is preferred over "min".
fn alternation(words: &[&str]) -> String {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    sorted
        .iter()
        .map(|w| regex::escape(w.trim()).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

impl TaskParser {
    pub fn new() -> Result<Self> {
        Self::with_tables(KeywordTables::default())
    }

    pub fn with_tables(tables: KeywordTables) -> Result<Self> {
        let mut durations = Vec::with_capacity(tables.durations.len());
        for rule in &tables.durations {
            let units: Vec<&str> = rule.units.iter().map(|u| u.as_str()).collect();
            if units.is_empty() {
                continue;
            }
            let pattern = format!(r"(?i)(\d+)\s*(?:{})\b", alternation(&units));
            let re = Regex::new(&pattern)
                .with_context(|| format!("compile duration pattern {pattern}"))?;
            durations.push((re, rule.multiplier));
        }

        let words = tables.metadata_words();
        let metadata = if words.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})\b", alternation(&words));
            Some(Regex::new(&pattern).context("compile metadata keyword pattern")?)
        };

        Ok(Self {
            tables,
            durations,
            metadata,
            separators: Regex::new(r"[\s,;]+")?,
            relative_date: Regex::new(r"(?i)\b(tomorrow|today|next\s+week)\b")?,
        })
    }

    /// Turn a free-text task description into a structured task.
    ///
    /// `now` anchors relative dates ("tomorrow" = `now` + 1 day).
    pub fn parse(&self, text: &str, now: NaiveDateTime) -> ParsedTask {
        let lower = text.to_lowercase();

        let parsed = ParsedTask {
            title: self.clean_title(text),
            description: String::new(),
            category: self.classify_category(&lower),
            priority: self.extract_priority(&lower),
            energy_level: self.extract_energy(&lower),
            estimated_duration: self.extract_duration(text),
            due_date: self.resolve_due_date(text, now),
        };

        debug!(
            title = %parsed.title,
            category = parsed.category.as_str(),
            priority = parsed.priority.as_u8(),
            energy = parsed.energy_level,
            minutes = parsed.estimated_duration,
            due = ?parsed.due_date,
            "parsed task text"
        );
        parsed
    }

    /// Minutes from the first duration rule that matches anywhere in `text`.
    pub fn extract_duration(&self, text: &str) -> i64 {
        for (re, multiplier) in &self.durations {
            for caps in re.captures_iter(text) {
                let value = caps[1].parse::<i64>().ok();
                if let Some(minutes) = value.and_then(|v| v.checked_mul(*multiplier)) {
                    return minutes;
                }
            }
        }
        DEFAULT_DURATION_MINUTES
    }

    /// High words beat low words; neither means medium.
    pub fn extract_priority(&self, text: &str) -> Priority {
        let lower = text.to_lowercase();
        for candidate in [Priority::High, Priority::Low] {
            if self
                .tables
                .priority_words(candidate)
                .iter()
                .any(|w| lower.contains(w.as_str()))
            {
                return candidate;
            }
        }
        Priority::Medium
    }

    /// First energy level (ascending) with a substring hit.
    pub fn extract_energy(&self, text: &str) -> u8 {
        let lower = text.to_lowercase();
        self.tables
            .energy
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
            .map(|(level, _)| *level)
            .unwrap_or(DEFAULT_ENERGY_LEVEL)
    }

    /// Whole-token keyword scoring. Ties go to the earlier category.
    pub fn classify_category(&self, text: &str) -> Category {
        let tokens = tokenize(text);
        let mut best: Option<(Category, usize)> = None;

        for (category, words) in &self.tables.category {
            let score = tokens
                .iter()
                .filter(|t| words.iter().any(|w| w == *t))
                .count();
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ if score == 0 => {}
                _ => best = Some((*category, score)),
            }
        }

        best.map(|(c, _)| c).unwrap_or(Category::Other)
    }

    /// "today", "tomorrow" or "next week"; the earliest phrase in the text wins.
    pub fn resolve_due_date(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
        let caps = self.relative_date.captures(text)?;
        let phrase = caps[1].to_lowercase();
        let today = now.date();
        if phrase == "tomorrow" {
            today.checked_add_days(Days::new(1))
        } else if phrase == "today" {
            Some(today)
        } else {
            today.checked_add_days(Days::new(7))
        }
    }

    /// Strip metadata words and duration phrases. Idempotent.
    pub fn clean_title(&self, text: &str) -> String {
        let original = text.trim();
        let mut current = original.to_string();
        loop {
            let next = self.strip_once(&current);
            if next == current {
                break;
            }
            current = next;
        }

        if current.is_empty() {
            original.to_string()
        } else {
            current
        }
    }

    fn strip_once(&self, text: &str) -> String {
        let mut out = match &self.metadata {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        };
        for (re, _) in &self.durations {
            out = re.replace_all(&out, "").into_owned();
        }
        let out = self.separators.replace_all(&out, " ");
        out.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '.' | '-'))
            .to_string()
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
