use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

pub mod clientbound;
pub mod serverbound;

/// Protocol version sent in the handshake.
pub const PROTOCOL_VERSION: i32 = 1073742105;
/// Game version matching [`PROTOCOL_VERSION`].
pub const PROTOCOL_NAME: &str = "1.21.11-pre3";

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("VarInt too large")]
    VarIntTooLarge,
    #[error("Negative length: {0}")]
    NegativeLength(i32),
    #[error("Invalid bits per entry: {0}")]
    InvalidBitsPerEntry(u8),
    #[error("Palette index {0} out of range")]
    InvalidPaletteIndex(u64),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Trait for all packets - provides ID and name
pub trait Packet {
    /// The packet ID in the play state
    const ID: i32;
    /// The packet name (e.g., "UseItemOn")
    const NAME: &'static str;
}

pub trait Encode {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;
}

pub trait Decode: Sized {
    fn decode<R: Read>(reader: &mut R) -> Result<Self>;
}

// VarInt encoding/decoding
pub fn read_varint<R: Read>(reader: &mut R) -> Result<i32> {
    let mut result = 0i32;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8()?;
        result |= ((byte & 0x7F) as i32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 32 {
            return Err(ProtocolError::VarIntTooLarge);
        }
    }
}

pub fn write_varint<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            writer.write_u8(value as u8)?;
            return Ok(());
        }
        writer.write_u8((value & 0x7F) as u8 | 0x80)?;
        value >>= 7;
    }
}

pub fn read_varlong<R: Read>(reader: &mut R) -> Result<i64> {
    let mut result = 0i64;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8()?;
        result |= ((byte & 0x7F) as i64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(ProtocolError::VarIntTooLarge);
        }
    }
}

/// Reads a VarInt length prefix.
pub fn read_len<R: Read>(reader: &mut R) -> Result<usize> {
    let len = read_varint(reader)?;
    usize::try_from(len).map_err(|_| ProtocolError::NegativeLength(len))
}

macro_rules! big_endian {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl Encode for $ty {
                fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
                    writer.$write::<BigEndian>(*self)?;
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode<R: Read>(reader: &mut R) -> Result<Self> {
                    Ok(reader.$read::<BigEndian>()?)
                }
            }
        )*
    };
}

big_endian! {
    i16 => read_i16, write_i16;
    u16 => read_u16, write_u16;
    i32 => read_i32, write_i32;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
}

impl Encode for bool {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(u8::from(*self))?;
        Ok(())
    }
}

impl Decode for bool {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()? != 0)
    }
}

impl Encode for u8 {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)?;
        Ok(())
    }
}

impl Decode for u8 {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}

impl Encode for i8 {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i8(*self)?;
        Ok(())
    }
}

// VarInt wrapper type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarInt(pub i32);

impl Encode for VarInt {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_varint(writer, self.0)
    }
}

impl Decode for VarInt {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(VarInt(read_varint(reader)?))
    }
}

// String encoding (length-prefixed with VarInt)
impl Encode for str {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.as_bytes();
        write_varint(writer, bytes.len() as i32)?;
        writer.write_all(bytes)?;
        Ok(())
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.as_str().encode(writer)
    }
}

impl Decode for String {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = vec![0u8; read_len(reader)?];
        reader.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub u128);

impl Encode for Uuid {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<BigEndian>((self.0 >> 64) as u64)?;
        writer.write_u64::<BigEndian>(self.0 as u64)?;
        Ok(())
    }
}

impl Decode for Uuid {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let high = reader.read_u64::<BigEndian>()? as u128;
        let low = reader.read_u64::<BigEndian>()? as u128;
        Ok(Uuid((high << 64) | low))
    }
}

/// Block position packed into a single long (x: 26 bits, z: 26 bits, y: 12 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn pack(self) -> i64 {
        ((self.x as i64 & 0x3FF_FFFF) << 38)
            | ((self.z as i64 & 0x3FF_FFFF) << 12)
            | (self.y as i64 & 0xFFF)
    }

    #[must_use]
    pub const fn unpack(packed: i64) -> Self {
        Self {
            x: (packed >> 38) as i32,
            y: (packed << 52 >> 52) as i32,
            z: (packed << 26 >> 38) as i32,
        }
    }
}

impl Encode for Position {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.pack().encode(writer)
    }
}

impl Decode for Position {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::unpack(i64::decode(reader)?))
    }
}

/// The start of an item stack as it appears in slot data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    pub item: i32,
    pub count: i32,
}

/// What could be read of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Empty,
    /// Fully consumed; the reader is positioned after the slot.
    Plain(ItemStack),
    /// Carries data components whose payloads were not consumed, so anything
    /// after this slot in the stream cannot be located.
    WithComponents(ItemStack),
}

impl Slot {
    #[must_use]
    pub const fn stack(self) -> Option<ItemStack> {
        match self {
            Self::Empty => None,
            Self::Plain(stack) | Self::WithComponents(stack) => Some(stack),
        }
    }
}

impl Decode for Slot {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let count = read_varint(reader)?;
        if count <= 0 {
            return Ok(Self::Empty);
        }

        let stack = ItemStack {
            item: read_varint(reader)?,
            count,
        };

        let added = read_varint(reader)?;
        let removed = read_len(reader)?;
        if added != 0 {
            return Ok(Self::WithComponents(stack));
        }

        // Removed components are bare type ids.
        for _ in 0..removed {
            read_varint(reader)?;
        }
        Ok(Self::Plain(stack))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn varint_bytes(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, value).unwrap();
        buf
    }

    #[test]
    fn varint_known_encodings() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(127), vec![0x7F]);
        assert_eq!(varint_bytes(128), vec![0x80, 0x01]);
        assert_eq!(varint_bytes(25565), vec![0xDD, 0xC7, 0x01]);
        assert_eq!(varint_bytes(-1), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn varint_rejects_overlong() {
        let mut cursor = Cursor::new(vec![0xFF; 6]);
        assert!(matches!(
            read_varint(&mut cursor),
            Err(ProtocolError::VarIntTooLarge)
        ));
    }

    #[test]
    fn position_packing_handles_negatives() {
        let pos = Position::new(-30_000, -64, 1_234_567);
        assert_eq!(Position::unpack(pos.pack()), pos);
        // Sample from the protocol documentation.
        assert_eq!(
            Position::unpack(0b01000110000001110110001100_10110000010101101101001000_001100111111),
            Position::new(18_357_644, 831, -20_882_616)
        );
    }

    #[test]
    fn plain_slot_is_fully_consumed() {
        // count 64, item 982, no components, trailing byte 0xAA
        let mut data = Vec::new();
        write_varint(&mut data, 64).unwrap();
        write_varint(&mut data, 982).unwrap();
        data.extend([0, 0, 0xAA]);

        let mut cursor = Cursor::new(data);
        let slot = Slot::decode(&mut cursor).unwrap();
        assert_eq!(slot, Slot::Plain(ItemStack { item: 982, count: 64 }));
        assert_eq!(u8::decode(&mut cursor).unwrap(), 0xAA);
    }

    #[test]
    fn slot_with_components_is_flagged() {
        let mut cursor = Cursor::new(vec![1, 5, 1, 0]);
        assert_eq!(
            Slot::decode(&mut cursor).unwrap(),
            Slot::WithComponents(ItemStack { item: 5, count: 1 })
        );
    }

    #[test]
    fn empty_slot() {
        let mut cursor = Cursor::new(vec![0]);
        assert_eq!(Slot::decode(&mut cursor).unwrap(), Slot::Empty);
    }
}
