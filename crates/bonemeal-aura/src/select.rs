//! Candidate selection around the player.

use crate::math::{BlockPos, Vec3};

struct Candidate {
    pos: BlockPos,
    distance_sq: f64,
}

/// Cells within `range` of `eye` that satisfy `qualifies`, farthest first.
///
/// Plants grow as they are fertilized and start hiding the ones behind them,
/// so the far ones go first.
pub fn select_candidates<F>(eye: Vec3, range: f64, qualifies: F) -> Vec<BlockPos>
where
    F: Fn(BlockPos) -> bool,
{
    let range_sq = range * range;
    let radius = range.ceil() as i32;

    let mut candidates: Vec<Candidate> = BlockPos::containing(eye)
        .cube(radius)
        .filter_map(|pos| {
            let distance_sq = pos.distance_sq_to(eye);
            (distance_sq <= range_sq).then_some(Candidate { pos, distance_sq })
        })
        .filter(|candidate| qualifies(candidate.pos))
        .collect();

    candidates.sort_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
    candidates.into_iter().map(|c| c.pos).collect()
}
