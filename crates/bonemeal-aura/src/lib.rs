//! Bonemeal Aura
//!
//! Uses bone meal on every growable plant around the player.
//!
//! # Tick flow
//!
//! ```text
//! cooldown? ─▶ candidates (farthest first) ─▶ other automation busy?
//!     ─▶ bone meal in hand? (else select it and wait)
//!     ─▶ Legit: face + click the first visible plant
//!        Fast:  click every reachable plant, swing once
//! ```
//!
//! The host supplies the world through [`BlockView`] and the player through
//! [`PlayerControl`]; nothing here touches the network directly.
//!
//! # Example
//!
//! ```ignore
//! let mut aura = BonemealAura::new(AuraConfig::default());
//! aura.enable();
//!
//! // every client tick
//! aura.on_update(&world, &mut player, &auto_farm_busy);
//! ```

mod aura;
mod category;
mod config;
mod interact;
mod math;
mod player;
mod select;
mod world;

pub use aura::{BonemealAura, BusySignal, TickOutcome};
pub use category::{Category, CategoryToggles, is_correct_block};
pub use config::{AuraConfig, AutomationLevel, ConfigError, DEFAULT_RANGE, MAX_RANGE, MIN_RANGE, Mode};
pub use interact::{
    FAST_REACH_SQ, LEGIT_COOLDOWN_TICKS, LEGIT_REACH_SQ, attempt_fast, attempt_precise,
};
pub use math::{BlockPos, Face, Rotation, Vec3, wrap_degrees};
pub use player::{Interaction, PlayerControl};
pub use select::select_candidates;
pub use world::{BlockView, Plant, PlantKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AuraConfig, BlockPos, BlockView, BonemealAura, BusySignal, Face, Interaction, Plant,
        PlantKind, PlayerControl, TickOutcome, Vec3,
    };
}
