//! Bot configuration file.
//!
//! Block state and item ids depend on the server version, so they come from
//! the file rather than being compiled in. The server's data generator
//! (`--reports`) lists both.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;

use bonemeal_aura::{AuraConfig, Plant, PlantKind};
use eyre::WrapErr as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Start with the aura switched on.
    pub enabled: bool,
    /// Chunk radius requested from the server.
    pub view_distance: i8,
    /// Bottom of the world; the first chunk section starts here.
    pub min_y: i32,
    /// Item id of bone meal.
    pub bone_meal_item: Option<i32>,
    pub aura: AuraConfig,
    pub plants: Vec<PlantStates>,
    pub solid: Vec<StateRange>,
    /// Outbound packet names (e.g. `"Swing"`) to drop before they are sent.
    pub suppress_packets: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            view_distance: 2,
            min_y: -64,
            bone_meal_item: None,
            aura: AuraConfig::default(),
            plants: Vec::new(),
            solid: Vec::new(),
            suppress_packets: Vec::new(),
        }
    }
}

/// Inclusive range of block state ids. `to` defaults to `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StateRange {
    pub from: u32,
    pub to: Option<u32>,
}

/// Widest range accepted; the game has fewer block states than this.
const MAX_RANGE_STATES: u32 = 1 << 16;

impl StateRange {
    pub fn states(self) -> RangeInclusive<u32> {
        self.from..=self.to.unwrap_or(self.from)
    }

    fn validate(self) -> eyre::Result<()> {
        let states = self.states();
        if states.is_empty() {
            eyre::bail!("state range {}..={} is empty", states.start(), states.end());
        }
        if states.end() - states.start() >= MAX_RANGE_STATES {
            eyre::bail!(
                "state range {}..={} spans more than {MAX_RANGE_STATES} states",
                states.start(),
                states.end()
            );
        }
        Ok(())
    }
}

/// Block states that are a plant of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlantStates {
    #[serde(flatten)]
    pub states: StateRange,
    pub kind: PlantKind,
    /// Whether bone meal still has an effect in these states.
    #[serde(default = "default_can_grow")]
    pub can_grow: bool,
}

const fn default_can_grow() -> bool {
    true
}

impl BotConfig {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        Self::parse(&text).wrap_err_with(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.aura.validate()?;
        if config.view_distance < 2 {
            eyre::bail!("view_distance must be at least 2");
        }
        let plant_ranges = config.plants.iter().map(|plant| plant.states);
        for range in plant_ranges.chain(config.solid.iter().copied()) {
            range.validate()?;
        }
        Ok(config)
    }

    pub fn palette(&self) -> BlockPalette {
        let mut plants = HashMap::new();
        for entry in &self.plants {
            for state in entry.states.states() {
                plants.insert(state, Plant::new(entry.kind, entry.can_grow));
            }
        }

        BlockPalette {
            plants,
            solid: self.solid.iter().map(|range| range.states()).collect(),
        }
    }
}

/// What the aura needs to know about each block state.
#[derive(Debug, Clone, Default)]
pub struct BlockPalette {
    plants: HashMap<u32, Plant>,
    solid: Vec<RangeInclusive<u32>>,
}

impl BlockPalette {
    pub fn plant(&self, state: u32) -> Option<Plant> {
        self.plants.get(&state).copied()
    }

    /// States not listed as solid are treated as see-through.
    pub fn is_solid(&self, state: u32) -> bool {
        self.solid.iter().any(|range| range.contains(&state))
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}
