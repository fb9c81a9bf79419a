//! Tick-level scenarios against an in-memory host.

use std::collections::{HashMap, HashSet};

use bonemeal_aura::{
    AuraConfig, AutomationLevel, BlockPos, BlockView, BonemealAura, CategoryToggles, Face,
    Interaction, LEGIT_COOLDOWN_TICKS, Mode, Plant, PlantKind, PlayerControl, TickOutcome, Vec3,
    attempt_precise,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct TestWorld {
    plants: HashMap<BlockPos, Plant>,
    solid: HashSet<BlockPos>,
    /// Blocks every line of sight.
    blind: bool,
}

impl TestWorld {
    fn with_plant(mut self, pos: BlockPos, kind: PlantKind) -> Self {
        self.plants.insert(pos, Plant::new(kind, true));
        self
    }

    fn with_solid(mut self, pos: BlockPos) -> Self {
        self.solid.insert(pos);
        self
    }
}

impl BlockView for TestWorld {
    fn plant_at(&self, pos: BlockPos) -> Option<Plant> {
        self.plants.get(&pos).copied()
    }

    fn is_solid(&self, pos: BlockPos) -> bool {
        self.solid.contains(&pos)
    }

    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        if self.blind {
            return false;
        }
        // Fall back to the voxel walk.
        struct Solids<'a>(&'a HashSet<BlockPos>);
        impl BlockView for Solids<'_> {
            fn plant_at(&self, _pos: BlockPos) -> Option<Plant> {
                None
            }
            fn is_solid(&self, pos: BlockPos) -> bool {
                self.0.contains(&pos)
            }
        }
        Solids(&self.solid).line_of_sight(from, to)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Select(usize),
    Face(Vec3),
    Use(Interaction),
    Swing,
    Cooldown(u32),
}

struct TestPlayer {
    eye: Vec3,
    cooldown: u32,
    holding: bool,
    calls: Vec<Call>,
}

impl TestPlayer {
    fn at(eye: Vec3) -> Self {
        Self {
            eye,
            cooldown: 0,
            holding: true,
            calls: Vec::new(),
        }
    }

    fn standing() -> Self {
        Self::at(Vec3::new(0.5, 1.62, 0.5))
    }

    fn uses(&self) -> Vec<Interaction> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Use(interaction) => Some(*interaction),
                _ => None,
            })
            .collect()
    }

    fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl PlayerControl for TestPlayer {
    fn eye_position(&self) -> Vec3 {
        self.eye
    }

    fn item_use_cooldown(&self) -> u32 {
        self.cooldown
    }

    fn set_item_use_cooldown(&mut self, ticks: u32) {
        self.cooldown = ticks;
        self.calls.push(Call::Cooldown(ticks));
    }

    fn is_holding_bone_meal(&self) -> bool {
        self.holding
    }

    fn select_item(&mut self, scope: usize) {
        self.calls.push(Call::Select(scope));
    }

    fn face_toward(&mut self, target: Vec3) {
        self.calls.push(Call::Face(target));
    }

    fn use_item_on(&mut self, interaction: Interaction) {
        self.calls.push(Call::Use(interaction));
    }

    fn swing_hand(&mut self) {
        self.calls.push(Call::Swing);
    }
}

fn aura(mode: Mode) -> BonemealAura {
    let mut aura = BonemealAura::new(AuraConfig {
        mode,
        ..AuraConfig::default()
    });
    aura.enable();
    aura
}

fn three_crops() -> TestWorld {
    TestWorld::default()
        .with_plant(BlockPos::new(0, 0, 2), PlantKind::Crop)
        .with_plant(BlockPos::new(2, 0, 0), PlantKind::Crop)
        .with_plant(BlockPos::new(-2, 0, -1), PlantKind::Crop)
}

#[test]
fn precise_attempt_faces_then_clicks() {
    let sapling = BlockPos::new(1, -2, 2);
    let world = TestWorld::default().with_plant(sapling, PlantKind::Sapling);
    let mut player = TestPlayer::at(Vec3::ZERO);

    assert!(attempt_precise(&world, &mut player, Vec3::ZERO, sapling));

    let hit = Face::Up.midpoint(sapling);
    assert_eq!(
        player.calls,
        vec![
            Call::Face(hit),
            Call::Use(Interaction {
                pos: sapling,
                face: Face::Up,
                hit,
            }),
            Call::Swing,
            Call::Cooldown(LEGIT_COOLDOWN_TICKS),
        ]
    );
}

#[test]
fn precise_attempt_needs_line_of_sight() {
    let sapling = BlockPos::new(1, -2, 2);
    let mut world = TestWorld::default().with_plant(sapling, PlantKind::Sapling);
    world.blind = true;
    let mut player = TestPlayer::at(Vec3::ZERO);

    assert!(!attempt_precise(&world, &mut player, Vec3::ZERO, sapling));
    assert!(player.calls.is_empty());
}

#[test]
fn fast_mode_clicks_everything_and_swings_once() {
    let world = three_crops();
    let mut player = TestPlayer::standing();

    let outcome = aura(Mode::Fast).on_update(&world, &mut player, &false);

    assert_eq!(outcome, TickOutcome::Used { interactions: 3 });
    assert_eq!(player.uses().len(), 3);
    assert_eq!(player.count(&Call::Swing), 1);
    assert!(!player.calls.iter().any(|call| matches!(call, Call::Face(_))));
    assert_eq!(player.calls.last(), Some(&Call::Swing));
}

#[test]
fn fast_mode_goes_farthest_first() {
    let world = three_crops();
    let mut player = TestPlayer::standing();

    aura(Mode::Fast).on_update(&world, &mut player, &false);

    let eye = player.eye;
    let distances: Vec<f64> = player
        .uses()
        .iter()
        .map(|interaction| interaction.pos.distance_sq_to(eye))
        .collect();
    assert!(distances.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn legit_mode_uses_a_single_plant() {
    let world = three_crops();
    let mut player = TestPlayer::standing();

    let outcome = aura(Mode::Legit).on_update(&world, &mut player, &false);

    assert_eq!(outcome, TickOutcome::Used { interactions: 1 });
    assert_eq!(player.uses().len(), 1);
    assert_eq!(player.count(&Call::Swing), 1);
    assert_eq!(player.cooldown, LEGIT_COOLDOWN_TICKS);
}

#[test]
fn legit_mode_prefers_the_farthest_visible_plant() {
    let far = BlockPos::new(0, 0, 4);
    let near = BlockPos::new(1, 0, 1);
    let open = TestWorld::default()
        .with_plant(far, PlantKind::Crop)
        .with_plant(near, PlantKind::Crop);

    let mut player = TestPlayer::standing();
    aura(Mode::Legit).on_update(&open, &mut player, &false);
    assert_eq!(player.uses()[0].pos, far);

    let walled = TestWorld::default()
        .with_plant(far, PlantKind::Crop)
        .with_plant(near, PlantKind::Crop)
        .with_solid(BlockPos::new(0, 1, 2));

    let mut player = TestPlayer::standing();
    aura(Mode::Legit).on_update(&walled, &mut player, &false);
    assert_eq!(player.uses().len(), 1);
    assert_eq!(player.uses()[0].pos, near);
}

#[test]
fn legit_mode_with_nothing_visible() {
    let mut world = three_crops();
    world.blind = true;
    let mut player = TestPlayer::standing();

    let outcome = aura(Mode::Legit).on_update(&world, &mut player, &false);

    assert_eq!(outcome, TickOutcome::NothingInReach);
    assert!(player.calls.is_empty());
}

#[test]
fn selects_bone_meal_instead_of_clicking() {
    let world = three_crops();
    let mut aura = BonemealAura::new(AuraConfig {
        automation: AutomationLevel::Hotbar,
        ..AuraConfig::default()
    });
    aura.enable();

    let mut player = TestPlayer::standing();
    player.holding = false;

    let outcome = aura.on_update(&world, &mut player, &false);

    assert_eq!(outcome, TickOutcome::SelectingItem);
    assert_eq!(player.calls, vec![Call::Select(9)]);
}

#[test]
fn right_click_level_selects_nothing() {
    let world = three_crops();
    let mut player = TestPlayer::standing();
    player.holding = false;

    aura(Mode::Fast).on_update(&world, &mut player, &false);

    assert_eq!(player.calls, vec![Call::Select(0)]);
}

#[test]
fn guards_stop_the_tick() {
    let world = three_crops();

    let mut player = TestPlayer::standing();
    player.cooldown = 2;
    assert_eq!(
        aura(Mode::Fast).on_update(&world, &mut player, &false),
        TickOutcome::Cooldown
    );

    let mut player = TestPlayer::standing();
    assert_eq!(
        aura(Mode::Fast).on_update(&world, &mut player, &true),
        TickOutcome::Busy
    );

    let mut player = TestPlayer::standing();
    assert_eq!(
        aura(Mode::Fast).on_update(&TestWorld::default(), &mut player, &false),
        TickOutcome::NoTargets
    );

    let mut player = TestPlayer::standing();
    assert_eq!(
        BonemealAura::default().on_update(&world, &mut player, &false),
        TickOutcome::Disabled
    );

    assert!(player.calls.is_empty());
}

#[test]
fn ground_cover_is_never_a_candidate() {
    let world = three_crops().with_plant(BlockPos::new(0, -1, 0), PlantKind::GroundCover);
    let mut aura = BonemealAura::new(AuraConfig {
        categories: CategoryToggles {
            saplings: true,
            crops: true,
            stems: true,
            cocoa: true,
            other: true,
        },
        ..AuraConfig::default()
    });
    aura.enable();

    let player = TestPlayer::standing();
    let blocks = aura.valid_blocks(&world, &player);

    assert_eq!(blocks.len(), 3);
    assert!(!blocks.contains(&BlockPos::new(0, -1, 0)));
}

#[test]
fn disabled_categories_are_skipped() {
    let world = three_crops().with_plant(BlockPos::new(1, 0, 1), PlantKind::Sapling);
    let mut aura = BonemealAura::new(AuraConfig {
        categories: CategoryToggles {
            crops: false,
            ..CategoryToggles::default()
        },
        ..AuraConfig::default()
    });
    aura.enable();

    let player = TestPlayer::standing();
    assert_eq!(
        aura.valid_blocks(&world, &player),
        vec![BlockPos::new(1, 0, 1)]
    );
}
