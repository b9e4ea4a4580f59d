use super::types::{ChangeKind, DiffPart, TokenRun};
use crate::tokenizer::{Token, join_tokens};
use similar::{Algorithm, DiffTag, capture_diff_slices};
use std::ops::Range;

/// Computes an edit script between two token sequences.
///
/// Implementations must return maximal runs (no two neighbours share a kind),
/// never return empty runs, and be deterministic. Dropping added runs must
/// give back `base`, dropping removed runs must give back `compare`.
pub trait SequenceDiffer {
    fn diff_tokens<'a>(&self, base: &'a [Token], compare: &'a [Token]) -> Vec<TokenRun<'a>>;
}

/// Array diff backed by the `similar` crate
#[derive(Debug, Clone, Copy)]
pub struct SimilarDiffer {
    algorithm: Algorithm,
}

impl SimilarDiffer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// Build a differ from a configured algorithm name
    pub fn from_name(name: &str) -> Option<Self> {
        parse_algorithm(name).map(Self::new)
    }
}

impl Default for SimilarDiffer {
    fn default() -> Self {
        Self::new(Algorithm::Myers)
    }
}

impl SequenceDiffer for SimilarDiffer {
    fn diff_tokens<'a>(&self, base: &'a [Token], compare: &'a [Token]) -> Vec<TokenRun<'a>> {
        let ops = capture_diff_slices(self.algorithm, base, compare);
        let mut spans: Vec<(ChangeKind, Range<usize>)> = Vec::new();

        for op in &ops {
            let (tag, old, new) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => push_span(&mut spans, ChangeKind::Equal, old),
                DiffTag::Delete => push_span(&mut spans, ChangeKind::Removed, old),
                DiffTag::Insert => push_span(&mut spans, ChangeKind::Added, new),
                DiffTag::Replace => {
                    push_span(&mut spans, ChangeKind::Removed, old);
                    push_span(&mut spans, ChangeKind::Added, new);
                }
            }
        }

        spans
            .into_iter()
            .map(|(kind, range)| {
                let source = if kind == ChangeKind::Added { compare } else { base };
                TokenRun {
                    kind,
                    tokens: &source[range],
                }
            })
            .collect()
    }
}

/// Append a span, extending the previous one when it has the same kind
fn push_span(spans: &mut Vec<(ChangeKind, Range<usize>)>, kind: ChangeKind, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    if let Some((last_kind, last_range)) = spans.last_mut()
        && *last_kind == kind
        && last_range.end == range.start
    {
        last_range.end = range.end;
        return;
    }
    spans.push((kind, range));
}

pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name.trim().to_ascii_lowercase().as_str() {
        "myers" => Some(Algorithm::Myers),
        "patience" => Some(Algorithm::Patience),
        "lcs" => Some(Algorithm::Lcs),
        _ => None,
    }
}

/// Project token runs to text parts
pub fn flatten_runs(runs: &[TokenRun<'_>]) -> Vec<DiffPart> {
    runs.iter()
        .map(|run| DiffPart::new(run.kind, join_tokens(run.tokens)))
        .collect()
}
