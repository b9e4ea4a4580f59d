//! Token-level comparison pipeline: tokenize, diff, post-process.

mod differ;
mod optimize;
mod stats;
mod types;

use crate::tokenizer::tokenize;
use tracing::debug;

pub use differ::{SequenceDiffer, SimilarDiffer, flatten_runs, parse_algorithm};
pub use optimize::optimize;
pub use stats::{Stats, compute_stats, stats_for_parts};
pub use types::{ChangeKind, DiffPart, DiffResult, TokenRun};

/// Compare two texts and produce a complete, post-processed result
pub fn compare_texts(
    differ: &dyn SequenceDiffer,
    base: &str,
    compare: &str,
    max_continuous_changes: usize,
) -> DiffResult {
    let base_tokens = tokenize(base);
    let compare_tokens = tokenize(compare);
    debug!(
        "Tokenized {} base and {} compare tokens",
        base_tokens.len(),
        compare_tokens.len()
    );

    let parts = {
        let runs = differ.diff_tokens(&base_tokens, &compare_tokens);
        flatten_runs(&runs)
    };
    let parts = optimize(parts, max_continuous_changes);

    DiffResult::new(
        parts,
        base.to_string(),
        compare.to_string(),
        base_tokens,
        compare_tokens,
    )
}
