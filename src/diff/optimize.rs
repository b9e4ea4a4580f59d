use super::types::DiffPart;
use tracing::debug;

/// Bound runaway highlight runs so near-total rewrites stay readable.
///
/// Runs of more than `max_continuous_changes` consecutive added/removed parts
/// are detected but currently emitted unchanged; the threshold is the hook a
/// merge policy would use. Order and classification are always preserved and
/// the output is never longer than the input.
pub fn optimize(diff: Vec<DiffPart>, max_continuous_changes: usize) -> Vec<DiffPart> {
    let mut optimized = Vec::with_capacity(diff.len());
    let mut long_runs = 0usize;

    let mut i = 0usize;
    while i < diff.len() {
        if diff[i].kind.is_significant() {
            let mut j = i + 1;
            while j < diff.len() && diff[j].kind.is_significant() {
                j += 1;
            }

            if j - i > max_continuous_changes {
                debug!(
                    "Long change run: {} parts starting at part {}",
                    j - i,
                    i
                );
                long_runs += 1;
            }

            optimized.extend_from_slice(&diff[i..j]);
            i = j;
            continue;
        }

        optimized.push(diff[i].clone());
        i += 1;
    }

    if long_runs > 0 {
        debug!("{} change runs exceed {} parts", long_runs, max_continuous_changes);
    }

    optimized
}
