//! Block states of the chunks around the bot.

use std::collections::HashMap;

use bonemeal_aura::{BlockPos, BlockView, Plant};
use mc_protocol::Position;
use mc_protocol::clientbound::{BlockStates, LevelChunkWithLight, SECTION_VOLUME, section_index};
use tracing::debug;

use crate::config::BlockPalette;

enum Section {
    Uniform(u32),
    Mixed(Box<[u32]>),
}

impl Section {
    fn from_states(states: BlockStates) -> Self {
        match states {
            BlockStates::Single(state) => Self::Uniform(state as u32),
            BlockStates::Entries(states) => {
                Self::Mixed(states.into_iter().map(|state| state as u32).collect())
            }
        }
    }

    fn get(&self, index: usize) -> u32 {
        match self {
            Self::Uniform(state) => *state,
            Self::Mixed(states) => states.get(index).copied().unwrap_or_default(),
        }
    }

    fn set(&mut self, index: usize, state: u32) {
        match self {
            Self::Uniform(current) if *current == state => {}
            Self::Uniform(current) => {
                let mut states = vec![*current; SECTION_VOLUME].into_boxed_slice();
                states[index] = state;
                *self = Self::Mixed(states);
            }
            Self::Mixed(states) => {
                if let Some(slot) = states.get_mut(index) {
                    *slot = state;
                }
            }
        }
    }
}

/// Loaded chunks, keyed by chunk x/z, with each state classified through a
/// [`BlockPalette`].
pub struct BlockMap {
    min_y: i32,
    chunks: HashMap<(i32, i32), Vec<Section>>,
    palette: BlockPalette,
}

impl BlockMap {
    pub fn new(min_y: i32, palette: BlockPalette) -> Self {
        Self {
            min_y,
            chunks: HashMap::new(),
            palette,
        }
    }

    pub fn load_chunk(&mut self, chunk: LevelChunkWithLight) {
        debug!(x = chunk.x, z = chunk.z, sections = chunk.sections.len(), "chunk loaded");
        let sections = chunk.sections.into_iter().map(Section::from_states).collect();
        self.chunks.insert((chunk.x, chunk.z), sections);
    }

    pub fn unload_chunk(&mut self, x: i32, z: i32) {
        self.chunks.remove(&(x, z));
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk key, section number and index inside the section.
    fn locate(&self, x: i32, y: i32, z: i32) -> Option<((i32, i32), usize, usize)> {
        let section = usize::try_from((y - self.min_y) >> 4).ok()?;
        let index = section_index((x & 15) as u8, ((y - self.min_y) & 15) as u8, (z & 15) as u8);
        Some(((x >> 4, z >> 4), section, index))
    }

    pub fn state_at(&self, pos: BlockPos) -> Option<u32> {
        let (key, section, index) = self.locate(pos.x, pos.y, pos.z)?;
        Some(self.chunks.get(&key)?.get(section)?.get(index))
    }

    /// Apply a block change. Changes in unloaded chunks are dropped.
    pub fn set_block(&mut self, position: Position, state: i32) {
        let Some((key, section, index)) = self.locate(position.x, position.y, position.z) else {
            return;
        };
        if let Some(section) = self
            .chunks
            .get_mut(&key)
            .and_then(|sections| sections.get_mut(section))
        {
            section.set(index, state as u32);
        }
    }
}

impl BlockView for BlockMap {
    fn plant_at(&self, pos: BlockPos) -> Option<Plant> {
        self.palette.plant(self.state_at(pos)?)
    }

    fn is_solid(&self, pos: BlockPos) -> bool {
        self.state_at(pos)
            .is_some_and(|state| self.palette.is_solid(state))
    }
}
