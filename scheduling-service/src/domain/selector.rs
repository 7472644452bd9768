use rayon::prelude::*;

use crate::domain::candidate::{BuildContext, Candidate, build_candidate};
use crate::domain::fitness;

/// Gap between the seeds of consecutive candidates.
pub const SEED_STRIDE: u64 = 12_345;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: i64,
}

/// Seed of the `index`-th candidate derived from `base_seed`.
pub fn candidate_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(SEED_STRIDE.wrapping_mul(index as u64))
}

/// Builds `candidate_count` candidates in parallel and keeps the best.
///
/// Returns `None` only when there is nothing to build.
#[tracing::instrument(skip(ctx), fields(staff_count = ctx.staff.len()))]
pub fn select_best(ctx: &BuildContext<'_>, base_seed: u64) -> Option<ScoredCandidate> {
    let count = ctx.config.candidate_count.max(1) as usize;
    let max_consecutive = ctx.config.max_consecutive_days;

    let scored: Vec<ScoredCandidate> = (0..count)
        .into_par_iter()
        .map(|index| {
            let candidate = build_candidate(ctx, candidate_seed(base_seed, index));
            let score = fitness::score(&candidate, max_consecutive);
            ScoredCandidate { candidate, score }
        })
        .collect();

    for (index, entry) in scored.iter().enumerate() {
        tracing::debug!(index, seed = entry.candidate.seed, score = entry.score, "Candidate scored");
    }

    pick_best(scored)
}

/// Highest score wins; the earliest candidate keeps a tie.
pub fn pick_best(scored: Vec<ScoredCandidate>) -> Option<ScoredCandidate> {
    scored.into_iter().reduce(|best, next| {
        if next.score > best.score {
            next
        } else {
            best
        }
    })
}
