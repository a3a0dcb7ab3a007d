//! Shared score normalization, adapted from `ScoreNorm::MinMax` in the fusion toolkit
//! this pipeline's hybrid-search ancestor used — kept to min-max since that is all the
//! spec's per-source normalization and fusion steps require.
use law_core::DocId;

const EPSILON: f32 = 1e-6;

/// Min-max normalize scores to `[0, 1]`; all-equal inputs map to `0.0` (denominator
/// floored at `epsilon`, matching the teacher implementation's convention).
pub fn minmax(scores: &[(DocId, f32)]) -> Vec<(DocId, f32)> {
    if scores.is_empty() {
        return Vec::new();
    }
    let mut min_v = f32::INFINITY;
    let mut max_v = f32::NEG_INFINITY;
    for (_, s) in scores {
        min_v = min_v.min(*s);
        max_v = max_v.max(*s);
    }
    let denom = (max_v - min_v).max(EPSILON);
    scores
        .iter()
        .map(|(id, s)| (id.clone(), ((*s - min_v) / denom).clamp(0.0, 1.0)))
        .collect()
}
