//! Read-only view of the world the aura targets.

use line_drawing::{VoxelOrigin, WalkVoxels};
use serde::{Deserialize, Serialize};

use crate::math::{BlockPos, Vec3};

/// Concrete plant families that accept bone meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    /// Grass blocks. Accepts bone meal but only spreads foliage.
    GroundCover,
    Sapling,
    /// Wheat, carrots, potatoes, beetroots.
    Crop,
    /// Pumpkin and melon stems.
    Stem,
    Cocoa,
    Mushroom,
    Flower,
    TallGrass,
    BambooSapling,
    SweetBerryBush,
    Kelp,
    Moss,
    Azalea,
    /// Mangrove propagules. Counted as saplings.
    Propagule,
    /// Anything else that implements the growth capability.
    Other,
}

/// A fertilizable occupant together with its live readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub kind: PlantKind,
    /// `false` once fully grown or when growth is otherwise blocked.
    pub can_grow: bool,
}

impl Plant {
    #[must_use]
    pub const fn new(kind: PlantKind, can_grow: bool) -> Self {
        Self { kind, can_grow }
    }
}

/// Host-owned world state.
pub trait BlockView {
    /// The fertilizable occupant at `pos`, if there is one.
    fn plant_at(&self, pos: BlockPos) -> Option<Plant>;

    /// Whether `pos` holds solid geometry that blocks sight.
    fn is_solid(&self, pos: BlockPos) -> bool;

    /// Whether nothing solid lies between `from` and `to`.
    ///
    /// The cell `to` lies on is never tested, so a ray ending on the face of a
    /// block is not blocked by that block.
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        // Stop just short of the target so boundary points resolve to the near cell.
        let end = to.lerp(from, 1e-7);

        let clear = WalkVoxels::<f64, i64>::new(
            (from.x, from.y, from.z),
            (end.x, end.y, end.z),
            &VoxelOrigin::Corner,
        )
        .all(|(x, y, z)| !self.is_solid(BlockPos::new(x as i32, y as i32, z as i32)));

        clear && !self.is_solid(BlockPos::containing(end))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Default)]
    struct Walls(HashSet<BlockPos>);

    impl BlockView for Walls {
        fn plant_at(&self, _pos: BlockPos) -> Option<Plant> {
            None
        }

        fn is_solid(&self, pos: BlockPos) -> bool {
            self.0.contains(&pos)
        }
    }

    const EYE: Vec3 = Vec3::new(0.5, 1.62, 0.5);

    #[test]
    fn open_air_is_visible() {
        let world = Walls::default();
        assert!(world.line_of_sight(EYE, Vec3::new(0.5, 1.5, 3.0)));
    }

    #[test]
    fn wall_between_blocks_sight() {
        let mut world = Walls::default();
        world.0.insert(BlockPos::new(0, 1, 1));
        assert!(!world.line_of_sight(EYE, Vec3::new(0.5, 1.5, 3.0)));
    }

    #[test]
    fn cell_in_front_of_the_face_blocks_sight() {
        let mut world = Walls::default();
        world.0.insert(BlockPos::new(0, 1, 2));
        assert!(!world.line_of_sight(EYE, Vec3::new(0.5, 1.5, 3.0)));
    }

    #[test]
    fn target_block_does_not_block_its_own_face() {
        let mut world = Walls::default();
        world.0.insert(BlockPos::new(0, 1, 3));
        assert!(world.line_of_sight(EYE, Vec3::new(0.5, 1.5, 3.0)));
    }

    #[test]
    fn wall_off_the_ray_is_ignored() {
        let mut world = Walls::default();
        world.0.insert(BlockPos::new(2, 1, 2));
        world.0.insert(BlockPos::new(0, 3, 2));
        assert!(world.line_of_sight(EYE, Vec3::new(0.5, 1.5, 3.0)));
    }
}
