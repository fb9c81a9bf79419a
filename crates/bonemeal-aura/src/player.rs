//! The player-side surface the aura drives.

use crate::math::{BlockPos, Face, Vec3};

/// A right click on one face of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub pos: BlockPos,
    pub face: Face,
    /// World-space point on the face that was clicked.
    pub hit: Vec3,
}

/// Host-owned player state and actions.
///
/// Everything here runs on the tick thread. Implementations are free to send
/// packets immediately or to queue them until the tick ends.
pub trait PlayerControl {
    fn eye_position(&self) -> Vec3;

    /// Ticks until the next right click is allowed.
    fn item_use_cooldown(&self) -> u32;

    fn set_item_use_cooldown(&mut self, ticks: u32);

    /// Whether bone meal is in either hand.
    fn is_holding_bone_meal(&self) -> bool;

    /// Brings bone meal into the main hand, searching inventory slots `0..scope`.
    ///
    /// Hotbar slots (`< 9`) are selected directly, anything further in is
    /// swapped into the selected hotbar slot. A scope of 0 does nothing.
    fn select_item(&mut self, scope: usize);

    /// Turns the player to look at `target`.
    fn face_toward(&mut self, target: Vec3);

    fn use_item_on(&mut self, interaction: Interaction);

    fn swing_hand(&mut self);
}
