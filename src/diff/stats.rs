use super::types::{ChangeKind, DiffPart, DiffResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    /// Characters inserted into the compare document
    pub additions: usize,
    /// Characters removed from the base document
    pub deletions: usize,
    /// Adjacent removed-then-added part pairs
    pub modifications: usize,
    /// Parts that are either added or removed
    pub changed_parts: usize,
    /// Percentage of unchanged characters across both documents, unclamped
    pub similarity: f64,
}

impl Stats {
    pub fn similarity_label(&self) -> String {
        format!("{:.2}", self.similarity)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} changes (+{} / -{} chars, {} modified), similarity {}%",
            self.changed_parts,
            self.additions,
            self.deletions,
            self.modifications,
            self.similarity_label()
        )
    }
}

/// Calculate character-level statistics for a comparison
pub fn compute_stats(result: &DiffResult) -> Stats {
    let total_chars = result.base_text().chars().count() + result.compare_text().chars().count();
    stats_for_parts(result.parts(), total_chars)
}

pub fn stats_for_parts(parts: &[DiffPart], total_chars: usize) -> Stats {
    let mut stats = Stats::default();

    for part in parts {
        match part.kind {
            ChangeKind::Added => {
                stats.additions += part.char_len();
                stats.changed_parts += 1;
            }
            ChangeKind::Removed => {
                stats.deletions += part.char_len();
                stats.changed_parts += 1;
            }
            ChangeKind::Equal => {}
        }
    }

    stats.modifications = parts
        .windows(2)
        .filter(|pair| pair[0].removed() && pair[1].added())
        .count();

    stats.similarity = if total_chars > 0 {
        (total_chars as f64 - stats.additions as f64 - stats.deletions as f64) / total_chars as f64
            * 100.0
    } else {
        100.0
    };

    stats
}
