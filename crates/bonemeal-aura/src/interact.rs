//! Per-block interaction attempts.

use tracing::debug;

use crate::math::{BlockPos, Face, Vec3};
use crate::player::{Interaction, PlayerControl};
use crate::world::BlockView;

/// Squared reach for fast mode (6 blocks).
pub const FAST_REACH_SQ: f64 = 36.0;

/// Squared reach for legit mode (4.25 blocks).
pub const LEGIT_REACH_SQ: f64 = 18.0625;

/// Right click cooldown applied after a legit interaction.
pub const LEGIT_COOLDOWN_TICKS: u32 = 4;

/// Faces of `pos` within `reach_sq` that point towards `eye`, in [`Face::ALL`] order.
fn front_faces(eye: Vec3, pos: BlockPos, reach_sq: f64) -> impl Iterator<Item = (Face, Vec3)> {
    let center_sq = eye.distance_sq(pos.center());

    Face::ALL.into_iter().filter_map(move |face| {
        let hit = face.midpoint(pos);
        let hit_sq = eye.distance_sq(hit);
        (hit_sq <= reach_sq && hit_sq < center_sq).then_some((face, hit))
    })
}

/// Right clicks `pos` on the first front face within 6 blocks.
///
/// Neither turns the player nor swings; the caller swings once for the batch.
pub fn attempt_fast<P>(player: &mut P, eye: Vec3, pos: BlockPos) -> bool
where
    P: PlayerControl + ?Sized,
{
    let Some((face, hit)) = front_faces(eye, pos, FAST_REACH_SQ).next() else {
        return false;
    };

    debug!(?pos, ?face, "bone meal (fast)");
    player.use_item_on(Interaction { pos, face, hit });
    true
}

/// Faces, right clicks and swings at the first visible front face of `pos`
/// within 4.25 blocks, then starts the right click cooldown.
pub fn attempt_precise<W, P>(world: &W, player: &mut P, eye: Vec3, pos: BlockPos) -> bool
where
    W: BlockView + ?Sized,
    P: PlayerControl + ?Sized,
{
    let Some((face, hit)) =
        front_faces(eye, pos, LEGIT_REACH_SQ).find(|&(_, hit)| world.line_of_sight(eye, hit))
    else {
        return false;
    };

    debug!(?pos, ?face, "bone meal (legit)");
    player.face_toward(hit);
    player.use_item_on(Interaction { pos, face, hit });
    player.swing_hand();
    player.set_item_use_cooldown(LEGIT_COOLDOWN_TICKS);
    true
}
