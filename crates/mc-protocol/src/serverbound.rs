//! Play-state packets the bot sends.

use std::io::Write;

use crate::{Encode, Packet, Position, Result, VarInt, write_varint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Hand {
    #[default]
    MainHand = 0,
    OffHand = 1,
}

impl Encode for Hand {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_varint(writer, *self as i32)
    }
}

/// Container click modes the bot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ClickMode {
    /// Swap with the hotbar slot given as the button.
    Swap = 2,
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
pub struct AcceptTeleportation {
    pub teleport_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkBatchReceived {
    pub chunks_per_tick: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerClick {
    pub window_id: i32,
    pub state_id: i32,
    pub slot: i16,
    pub button: i8,
    pub mode: ClickMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlayerPosRot {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlayerRot {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCarriedItem {
    pub slot: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swing {
    pub hand: Hand,
}

/// Right click on a block face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UseItemOn {
    pub hand: Hand,
    pub position: Position,
    /// Face id, 0..=5 in down, up, north, south, west, east order.
    pub face: i32,
    /// Click point relative to the block's minimum corner.
    pub cursor: [f32; 3],
    pub inside_block: bool,
    pub world_border_hit: bool,
    pub sequence: i32,
}

packet_ids! {
    AcceptTeleportation = 0;
    ChunkBatchReceived = 10;
    ContainerClick = 17;
    KeepAlive = 27;
    MovePlayerPosRot = 30;
    MovePlayerRot = 31;
    SetCarriedItem = 52;
    Swing = 60;
    UseItemOn = 63;
}

impl Encode for AcceptTeleportation {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_varint(writer, self.teleport_id)
    }
}

impl Encode for ChunkBatchReceived {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.chunks_per_tick.encode(writer)
    }
}

impl Encode for ContainerClick {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_varint(writer, self.window_id)?;
        write_varint(writer, self.state_id)?;
        self.slot.encode(writer)?;
        self.button.encode(writer)?;
        write_varint(writer, self.mode as i32)?;
        // No predicted slot changes, empty cursor.
        write_varint(writer, 0)?;
        false.encode(writer)
    }
}

impl Encode for KeepAlive {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.id.encode(writer)
    }
}

impl Encode for MovePlayerPosRot {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.x.encode(writer)?;
        self.y.encode(writer)?;
        self.z.encode(writer)?;
        self.yaw.encode(writer)?;
        self.pitch.encode(writer)?;
        u8::from(self.on_ground).encode(writer)
    }
}

impl Encode for MovePlayerRot {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.yaw.encode(writer)?;
        self.pitch.encode(writer)?;
        u8::from(self.on_ground).encode(writer)
    }
}

impl Encode for SetCarriedItem {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.slot.encode(writer)
    }
}

impl Encode for Swing {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.hand.encode(writer)
    }
}

impl Encode for UseItemOn {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.hand.encode(writer)?;
        self.position.encode(writer)?;
        write_varint(writer, self.face)?;
        for axis in self.cursor {
            axis.encode(writer)?;
        }
        self.inside_block.encode(writer)?;
        self.world_border_hit.encode(writer)?;
        VarInt(self.sequence).encode(writer)
    }
}

/// Every play-state packet the bot can send.
#[derive(Debug, Clone, PartialEq)]
pub enum Serverbound {
    AcceptTeleportation(AcceptTeleportation),
    ChunkBatchReceived(ChunkBatchReceived),
    ContainerClick(ContainerClick),
    KeepAlive(KeepAlive),
    MovePlayerPosRot(MovePlayerPosRot),
    MovePlayerRot(MovePlayerRot),
    SetCarriedItem(SetCarriedItem),
    Swing(Swing),
    UseItemOn(UseItemOn),
}

macro_rules! dispatch {
    ($self:ident, $packet:ident => $body:expr) => {
        match $self {
            Serverbound::AcceptTeleportation($packet) => $body,
            Serverbound::ChunkBatchReceived($packet) => $body,
            Serverbound::ContainerClick($packet) => $body,
            Serverbound::KeepAlive($packet) => $body,
            Serverbound::MovePlayerPosRot($packet) => $body,
            Serverbound::MovePlayerRot($packet) => $body,
            Serverbound::SetCarriedItem($packet) => $body,
            Serverbound::Swing($packet) => $body,
            Serverbound::UseItemOn($packet) => $body,
        }
    };
}

impl Serverbound {
    #[must_use]
    pub fn id(&self) -> i32 {
        fn id_of<P: Packet>(_: &P) -> i32 {
            P::ID
        }
        dispatch!(self, p => id_of(p))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        fn name_of<P: Packet>(_: &P) -> &'static str {
            P::NAME
        }
        dispatch!(self, p => name_of(p))
    }

    /// Packet body without length or id prefix.
    pub fn body(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.encode(&mut body)?;
        Ok(body)
    }
}

impl Encode for Serverbound {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        dispatch!(self, p => p.encode(writer))
    }
}

macro_rules! from_packet {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Serverbound {
                fn from(packet: $ty) -> Self {
                    Self::$ty(packet)
                }
            }
        )*
    };
}

from_packet!(
    AcceptTeleportation,
    ChunkBatchReceived,
    ContainerClick,
    KeepAlive,
    MovePlayerPosRot,
    MovePlayerRot,
    SetCarriedItem,
    Swing,
    UseItemOn
);
