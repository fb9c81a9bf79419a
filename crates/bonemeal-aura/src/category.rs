//! Which plants the aura is allowed to fertilize.

use serde::{Deserialize, Serialize};

use crate::math::BlockPos;
use crate::world::{BlockView, PlantKind};

/// User-facing plant buckets, one toggle each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sapling,
    Crop,
    Stem,
    Cocoa,
    Other,
}

impl Category {
    /// Buckets a plant kind. First match wins, `Other` catches the rest.
    #[must_use]
    pub const fn of(kind: PlantKind) -> Self {
        match kind {
            PlantKind::Sapling | PlantKind::Propagule => Self::Sapling,
            PlantKind::Crop => Self::Crop,
            PlantKind::Stem => Self::Stem,
            PlantKind::Cocoa => Self::Cocoa,
            _ => Self::Other,
        }
    }
}

/// Per-category enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub saplings: bool,
    /// Wheat, carrots, potatoes and beetroots.
    pub crops: bool,
    /// Pumpkins and melons.
    pub stems: bool,
    pub cocoa: bool,
    pub other: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            saplings: true,
            crops: true,
            stems: true,
            cocoa: true,
            other: false,
        }
    }
}

impl CategoryToggles {
    #[must_use]
    pub const fn allows(self, category: Category) -> bool {
        match category {
            Category::Sapling => self.saplings,
            Category::Crop => self.crops,
            Category::Stem => self.stems,
            Category::Cocoa => self.cocoa,
            Category::Other => self.other,
        }
    }
}

/// Whether bone meal should be used on `pos`.
pub fn is_correct_block<W: BlockView + ?Sized>(
    world: &W,
    toggles: CategoryToggles,
    pos: BlockPos,
) -> bool {
    let Some(plant) = world.plant_at(pos) else {
        return false;
    };

    if !plant.can_grow || plant.kind == PlantKind::GroundCover {
        return false;
    }

    toggles.allows(Category::of(plant.kind))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::world::Plant;

    struct Plants(HashMap<BlockPos, Plant>);

    impl BlockView for Plants {
        fn plant_at(&self, pos: BlockPos) -> Option<Plant> {
            self.0.get(&pos).copied()
        }

        fn is_solid(&self, _pos: BlockPos) -> bool {
            false
        }
    }

    fn single(kind: PlantKind, can_grow: bool) -> Plants {
        Plants(HashMap::from([(BlockPos::default(), Plant::new(kind, can_grow))]))
    }

    const ALL_ON: CategoryToggles = CategoryToggles {
        saplings: true,
        crops: true,
        stems: true,
        cocoa: true,
        other: true,
    };

    #[test]
    fn classification_is_total() {
        assert_eq!(Category::of(PlantKind::Sapling), Category::Sapling);
        assert_eq!(Category::of(PlantKind::Propagule), Category::Sapling);
        assert_eq!(Category::of(PlantKind::Crop), Category::Crop);
        assert_eq!(Category::of(PlantKind::Stem), Category::Stem);
        assert_eq!(Category::of(PlantKind::Cocoa), Category::Cocoa);
        for kind in [
            PlantKind::Mushroom,
            PlantKind::Flower,
            PlantKind::TallGrass,
            PlantKind::BambooSapling,
            PlantKind::SweetBerryBush,
            PlantKind::Kelp,
            PlantKind::Moss,
            PlantKind::Azalea,
            PlantKind::Other,
        ] {
            assert_eq!(Category::of(kind), Category::Other, "{kind:?}");
        }
    }

    #[test]
    fn ground_cover_is_never_targeted() {
        let world = single(PlantKind::GroundCover, true);
        assert!(!is_correct_block(&world, ALL_ON, BlockPos::default()));
    }

    #[test]
    fn grown_plants_are_skipped() {
        let world = single(PlantKind::Crop, false);
        assert!(!is_correct_block(&world, ALL_ON, BlockPos::default()));
    }

    #[test]
    fn empty_cells_are_skipped() {
        let world = Plants(HashMap::new());
        assert!(!is_correct_block(&world, ALL_ON, BlockPos::default()));
    }

    #[test]
    fn exactly_one_toggle_decides() {
        let world = single(PlantKind::Stem, true);
        let pos = BlockPos::default();

        let only_stems = CategoryToggles {
            saplings: false,
            crops: false,
            stems: true,
            cocoa: false,
            other: false,
        };
        assert!(is_correct_block(&world, only_stems, pos));

        let all_but_stems = CategoryToggles {
            stems: false,
            ..ALL_ON
        };
        assert!(!is_correct_block(&world, all_but_stems, pos));
    }

    #[test]
    fn propagules_follow_the_sapling_toggle() {
        let world = single(PlantKind::Propagule, true);
        let pos = BlockPos::default();

        assert!(is_correct_block(&world, CategoryToggles::default(), pos));

        let no_saplings = CategoryToggles {
            saplings: false,
            ..ALL_ON
        };
        assert!(!is_correct_block(&world, no_saplings, pos));
    }

    #[test]
    fn other_is_off_by_default() {
        let world = single(PlantKind::Flower, true);
        assert!(!is_correct_block(
            &world,
            CategoryToggles::default(),
            BlockPos::default()
        ));
    }
}
