use crate::tokenizer::Token;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Equal,
    Added,
    Removed,
}

impl ChangeKind {
    /// Added or removed
    pub fn is_significant(self) -> bool {
        !matches!(self, ChangeKind::Equal)
    }
}

/// Contiguous run of tokens as returned by a differ
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRun<'a> {
    pub kind: ChangeKind,
    pub tokens: &'a [Token],
}

/// Classified run of concatenated token text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffPart {
    pub kind: ChangeKind,
    pub value: String,
}

impl DiffPart {
    pub fn new(kind: ChangeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn added(&self) -> bool {
        self.kind == ChangeKind::Added
    }

    pub fn removed(&self) -> bool {
        self.kind == ChangeKind::Removed
    }

    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Output of one completed comparison
#[derive(Debug, Clone)]
pub struct DiffResult {
    parts: Vec<DiffPart>,
    base_text: String,
    compare_text: String,
    base_tokens: Vec<Token>,
    compare_tokens: Vec<Token>,
    compared_at: DateTime<Utc>,
}

impl DiffResult {
    pub(crate) fn new(
        parts: Vec<DiffPart>,
        base_text: String,
        compare_text: String,
        base_tokens: Vec<Token>,
        compare_tokens: Vec<Token>,
    ) -> Self {
        Self {
            parts,
            base_text,
            compare_text,
            base_tokens,
            compare_tokens,
            compared_at: Utc::now(),
        }
    }

    pub fn parts(&self) -> &[DiffPart] {
        &self.parts
    }

    pub fn base_text(&self) -> &str {
        &self.base_text
    }

    pub fn compare_text(&self) -> &str {
        &self.compare_text
    }

    pub fn base_tokens(&self) -> &[Token] {
        &self.base_tokens
    }

    pub fn compare_tokens(&self) -> &[Token] {
        &self.compare_tokens
    }

    pub fn compared_at(&self) -> DateTime<Utc> {
        self.compared_at
    }

    /// Base text rebuilt from every part that is not an insertion
    pub fn reconstruct_base(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.added())
            .map(|p| p.value.as_str())
            .collect()
    }

    /// Compare text rebuilt from every part that is not a deletion
    pub fn reconstruct_compare(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.removed())
            .map(|p| p.value.as_str())
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.parts.iter().any(|p| p.kind.is_significant())
    }
}
