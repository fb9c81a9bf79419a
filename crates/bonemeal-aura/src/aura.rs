//! Per-tick driver.

use tracing::{info, trace};

use crate::category::is_correct_block;
use crate::config::{AuraConfig, Mode};
use crate::interact::{attempt_fast, attempt_precise};
use crate::math::BlockPos;
use crate::player::PlayerControl;
use crate::select::select_candidates;
use crate::world::BlockView;

/// Reports whether a cooperating automation currently owns the player's inputs.
pub trait BusySignal {
    fn is_busy(&self) -> bool;
}

impl BusySignal for bool {
    fn is_busy(&self) -> bool {
        *self
    }
}

impl<T: BusySignal + ?Sized> BusySignal for &T {
    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }
}

/// What a single tick ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Disabled,
    /// Waiting for the right click cooldown.
    Cooldown,
    NoTargets,
    /// Another automation is using the player.
    Busy,
    /// Bone meal was not in hand; selection was requested instead.
    SelectingItem,
    /// Candidates existed but none had a usable face.
    NothingInReach,
    Used { interactions: usize },
}

/// Automatically uses bone meal on nearby plants.
#[derive(Debug, Default)]
pub struct BonemealAura {
    config: AuraConfig,
    enabled: bool,
}

impl BonemealAura {
    #[must_use]
    pub fn new(config: AuraConfig) -> Self {
        Self {
            config,
            enabled: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuraConfig {
        &self.config
    }

    /// Replaces the settings; picked up on the next tick.
    pub fn set_config(&mut self, config: AuraConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            self.enabled = true;
            info!(mode = ?self.config.mode, range = self.config.range, "BonemealAura enabled");
        }
    }

    pub fn disable(&mut self) {
        if self.enabled {
            self.enabled = false;
            info!("BonemealAura disabled");
        }
    }

    pub fn toggle(&mut self) {
        if self.enabled {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Candidates for this tick, farthest first.
    pub fn valid_blocks<W, P>(&self, world: &W, player: &P) -> Vec<BlockPos>
    where
        W: BlockView + ?Sized,
        P: PlayerControl + ?Sized,
    {
        let categories = self.config.categories;
        select_candidates(player.eye_position(), self.config.range, |pos| {
            is_correct_block(world, categories, pos)
        })
    }

    /// Runs one tick. Call once per client tick.
    pub fn on_update<W, P, B>(&mut self, world: &W, player: &mut P, coordinator: &B) -> TickOutcome
    where
        W: BlockView + ?Sized,
        P: PlayerControl + ?Sized,
        B: BusySignal + ?Sized,
    {
        let outcome = self.tick(world, player, coordinator);
        trace!(?outcome, "BonemealAura tick");
        outcome
    }

    fn tick<W, P, B>(&self, world: &W, player: &mut P, coordinator: &B) -> TickOutcome
    where
        W: BlockView + ?Sized,
        P: PlayerControl + ?Sized,
        B: BusySignal + ?Sized,
    {
        if !self.enabled {
            return TickOutcome::Disabled;
        }

        if player.item_use_cooldown() > 0 {
            return TickOutcome::Cooldown;
        }

        let valid_blocks = self.valid_blocks(world, player);
        if valid_blocks.is_empty() {
            return TickOutcome::NoTargets;
        }

        if coordinator.is_busy() {
            return TickOutcome::Busy;
        }

        if !player.is_holding_bone_meal() {
            player.select_item(self.config.automation.scope());
            return TickOutcome::SelectingItem;
        }

        let eye = player.eye_position();
        let interactions = match self.config.mode {
            Mode::Legit => valid_blocks
                .iter()
                .any(|&pos| attempt_precise(world, player, eye, pos))
                .into(),
            Mode::Fast => {
                let used = valid_blocks
                    .iter()
                    .filter(|&&pos| attempt_fast(player, eye, pos))
                    .count();
                if used > 0 {
                    player.swing_hand();
                }
                used
            }
        };

        if interactions == 0 {
            TickOutcome::NothingInReach
        } else {
            TickOutcome::Used { interactions }
        }
    }
}
