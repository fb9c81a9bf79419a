//! Play-state packets the bot reads.
//!
//! Only the packets needed to track nearby blocks, the player's inventory and
//! the player's position are modelled; [`Clientbound::decode`] returns
//! `Ok(None)` for everything else.

use std::io::{Cursor, Read};

use crate::{
    Decode, Packet, Position, ProtocolError, Result, Slot, read_len, read_varint, read_varlong,
};

/// Blocks per chunk section.
pub const SECTION_VOLUME: usize = 16 * 16 * 16;

/// Index of a block inside a section's state array.
#[must_use]
pub const fn section_index(x: u8, y: u8, z: u8) -> usize {
    ((y as usize & 15) << 8) | ((z as usize & 15) << 4) | (x as usize & 15)
}

macro_rules! packet_ids {
    ($($ty:ident = $id:literal;)*) => {
        $(
            impl Packet for $ty {
                const ID: i32 = $id;
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockUpdate {
    pub position: Position,
    pub state: i32,
}

/// One entry of a [`SectionBlocksUpdate`], in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChange {
    pub position: Position,
    pub state: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlocksUpdate {
    pub changes: Vec<BlockChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSetContent {
    pub window_id: i32,
    pub state_id: i32,
    /// Leading slots that could be read. Shorter than the container when a
    /// slot carried data components.
    pub slots: Vec<Slot>,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSetSlot {
    pub window_id: i32,
    pub state_id: i32,
    pub slot: i16,
    pub item: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgetLevelChunk {
    pub x: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub id: i64,
}

/// Block states of one 16x16x16 section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStates {
    Single(i32),
    /// [`SECTION_VOLUME`] entries, indexed by [`section_index`].
    Entries(Vec<i32>),
}

impl BlockStates {
    #[must_use]
    pub fn get(&self, index: usize) -> i32 {
        match self {
            Self::Single(state) => *state,
            Self::Entries(states) => states.get(index).copied().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChunkWithLight {
    pub x: i32,
    pub z: i32,
    /// Sections from the bottom of the world upwards.
    pub sections: Vec<BlockStates>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPosition {
    pub teleport_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub relative: RelativeFlags,
}

/// Which [`PlayerPosition`] fields are offsets from the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelativeFlags(pub i32);

impl RelativeFlags {
    pub const X: i32 = 1;
    pub const Y: i32 = 1 << 1;
    pub const Z: i32 = 1 << 2;
    pub const YAW: i32 = 1 << 3;
    pub const PITCH: i32 = 1 << 4;

    #[must_use]
    pub const fn contains(self, flag: i32) -> bool {
        self.0 & flag != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeldSlot {
    pub slot: i32,
}

/// A slot of the player's own inventory, by inventory index
/// (0..9 hotbar, 9..36 main, 36..40 armor, 40 offhand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPlayerInventory {
    pub slot: i32,
    pub item: Slot,
}

packet_ids! {
    BlockUpdate = 8;
    ContainerSetContent = 18;
    ContainerSetSlot = 20;
    ForgetLevelChunk = 37;
    KeepAlive = 43;
    LevelChunkWithLight = 44;
    PlayerPosition = 70;
    SectionBlocksUpdate = 82;
    SetHeldSlot = 103;
    SetPlayerInventory = 106;
}

impl Decode for BlockUpdate {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            position: Position::decode(reader)?,
            state: read_varint(reader)?,
        })
    }
}

impl Decode for SectionBlocksUpdate {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        // x: 22 bits, z: 22 bits, y: 20 bits
        let section = i64::decode(reader)?;
        let base_x = ((section >> 42) as i32) << 4;
        let base_y = ((section << 44 >> 44) as i32) << 4;
        let base_z = ((section << 22 >> 42) as i32) << 4;

        let count = read_len(reader)?;
        let mut changes = Vec::with_capacity(count.min(SECTION_VOLUME));
        for _ in 0..count {
            let entry = read_varlong(reader)?;
            let offset = entry & 0xFFF;
            changes.push(BlockChange {
                position: Position::new(
                    base_x + ((offset >> 8) & 15) as i32,
                    base_y + (offset & 15) as i32,
                    base_z + ((offset >> 4) & 15) as i32,
                ),
                state: (entry >> 12) as i32,
            });
        }
        Ok(Self { changes })
    }
}

impl Decode for ContainerSetContent {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let window_id = read_varint(reader)?;
        let state_id = read_varint(reader)?;
        let count = read_len(reader)?;

        let mut slots = Vec::with_capacity(count.min(64));
        let mut complete = true;
        for _ in 0..count {
            let slot = Slot::decode(reader)?;
            slots.push(slot);
            if matches!(slot, Slot::WithComponents(_)) {
                complete = false;
                break;
            }
        }

        Ok(Self {
            window_id,
            state_id,
            slots,
            complete,
        })
    }
}

impl Decode for ContainerSetSlot {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            window_id: read_varint(reader)?,
            state_id: read_varint(reader)?,
            slot: i16::decode(reader)?,
            item: Slot::decode(reader)?,
        })
    }
}

impl Decode for ForgetLevelChunk {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let z = i32::decode(reader)?;
        let x = i32::decode(reader)?;
        Ok(Self { x, z })
    }
}

impl Decode for KeepAlive {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            id: i64::decode(reader)?,
        })
    }
}

impl Decode for LevelChunkWithLight {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let x = i32::decode(reader)?;
        let z = i32::decode(reader)?;

        let heightmaps = read_len(reader)?;
        for _ in 0..heightmaps {
            read_varint(reader)?;
            let longs = read_len(reader)?;
            skip_longs(reader, longs)?;
        }

        let mut data = vec![0u8; read_len(reader)?];
        reader.read_exact(&mut data)?;

        let mut cursor = Cursor::new(data.as_slice());
        let mut sections = Vec::new();
        while (cursor.position() as usize) < data.len() {
            // Non-air block count.
            i16::decode(&mut cursor)?;
            sections.push(read_block_states(&mut cursor)?);
            skip_biomes(&mut cursor)?;
        }

        // Block entities and light follow; nothing here needs them.
        Ok(Self { x, z, sections })
    }
}

impl Decode for PlayerPosition {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let teleport_id = read_varint(reader)?;
        let x = f64::decode(reader)?;
        let y = f64::decode(reader)?;
        let z = f64::decode(reader)?;
        // Velocity.
        for _ in 0..3 {
            f64::decode(reader)?;
        }
        let yaw = f32::decode(reader)?;
        let pitch = f32::decode(reader)?;
        let relative = RelativeFlags(i32::decode(reader)?);

        Ok(Self {
            teleport_id,
            x,
            y,
            z,
            yaw,
            pitch,
            relative,
        })
    }
}

impl Decode for SetHeldSlot {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            slot: read_varint(reader)?,
        })
    }
}

impl Decode for SetPlayerInventory {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            slot: read_varint(reader)?,
            item: Slot::decode(reader)?,
        })
    }
}

fn skip_longs<R: Read>(reader: &mut R, count: usize) -> Result<()> {
    for _ in 0..count {
        i64::decode(reader)?;
    }
    Ok(())
}

/// Longs needed to pack `entries` values of `bits` each; entries never span
/// two longs.
const fn packed_len(entries: usize, bits: u8) -> usize {
    let per_long = 64 / bits as usize;
    entries.div_ceil(per_long)
}

fn read_block_states<R: Read>(reader: &mut R) -> Result<BlockStates> {
    let bits = u8::decode(reader)?;

    let (palette, bits) = match bits {
        0 => return Ok(BlockStates::Single(read_varint(reader)?)),
        1..=8 => {
            let len = read_len(reader)?;
            let mut palette = Vec::with_capacity(len.min(256));
            for _ in 0..len {
                palette.push(read_varint(reader)?);
            }
            (Some(palette), bits.max(4))
        }
        9..=31 => (None, bits),
        _ => return Err(ProtocolError::InvalidBitsPerEntry(bits)),
    };

    let per_long = 64 / bits as usize;
    let mask = (1u64 << bits) - 1;
    let mut states = Vec::with_capacity(SECTION_VOLUME);

    'longs: for _ in 0..packed_len(SECTION_VOLUME, bits) {
        let long = i64::decode(reader)? as u64;
        for i in 0..per_long {
            if states.len() == SECTION_VOLUME {
                continue 'longs;
            }
            let value = (long >> (i * bits as usize)) & mask;
            let state = match &palette {
                Some(palette) => *palette
                    .get(value as usize)
                    .ok_or(ProtocolError::InvalidPaletteIndex(value))?,
                None => value as i32,
            };
            states.push(state);
        }
    }

    Ok(BlockStates::Entries(states))
}

fn skip_biomes<R: Read>(reader: &mut R) -> Result<()> {
    const BIOME_ENTRIES: usize = 4 * 4 * 4;

    let bits = u8::decode(reader)?;
    match bits {
        0 => {
            read_varint(reader)?;
            return Ok(());
        }
        1..=3 => {
            for _ in 0..read_len(reader)? {
                read_varint(reader)?;
            }
        }
        4..=31 => {}
        _ => return Err(ProtocolError::InvalidBitsPerEntry(bits)),
    }
    skip_longs(reader, packed_len(BIOME_ENTRIES, bits))
}

/// Every play-state packet the bot understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Clientbound {
    BlockUpdate(BlockUpdate),
    ContainerSetContent(ContainerSetContent),
    ContainerSetSlot(ContainerSetSlot),
    ForgetLevelChunk(ForgetLevelChunk),
    KeepAlive(KeepAlive),
    LevelChunkWithLight(LevelChunkWithLight),
    PlayerPosition(PlayerPosition),
    SectionBlocksUpdate(SectionBlocksUpdate),
    SetHeldSlot(SetHeldSlot),
    SetPlayerInventory(SetPlayerInventory),
}

macro_rules! decode_by_id {
    ($id:expr, $reader:expr, [$($ty:ident),*]) => {
        match $id {
            $(
                id if id == <$ty as Packet>::ID => {
                    Some(Clientbound::$ty(<$ty as Decode>::decode($reader)?))
                }
            )*
            _ => None,
        }
    };
}

impl Clientbound {
    /// Decode the body of packet `id`. Unknown ids yield `Ok(None)`.
    pub fn decode<R: Read>(id: i32, reader: &mut R) -> Result<Option<Self>> {
        Ok(decode_by_id!(
            id,
            reader,
            [
                BlockUpdate,
                ContainerSetContent,
                ContainerSetSlot,
                ForgetLevelChunk,
                KeepAlive,
                LevelChunkWithLight,
                PlayerPosition,
                SectionBlocksUpdate,
                SetHeldSlot,
                SetPlayerInventory
            ]
        ))
    }
}
