//! Item tooltip payload, embedded in dialog look-at replies.

use crate::{NetReader, NetWriter, ProtocolError};

/// How rare an item is. Unknown values are kept as-is so a newer server
/// does not break older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rareness {
    Common,
    Uncommon,
    Rare,
    Artifact,
    Other(u8),
}

impl From<u8> for Rareness {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Common,
            1 => Self::Uncommon,
            2 => Self::Rare,
            3 => Self::Artifact,
            other => Self::Other(other),
        }
    }
}

impl From<Rareness> for u8 {
    fn from(value: Rareness) -> Self {
        match value {
            Rareness::Common => 0,
            Rareness::Uncommon => 1,
            Rareness::Rare => 2,
            Rareness::Artifact => 3,
            Rareness::Other(other) => other,
        }
    }
}

/// Gem socket levels, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GemLevels {
    pub diamond: u8,
    pub emerald: u8,
    pub ruby: u8,
    pub sapphire: u8,
    pub amethyst: u8,
    pub obsidian: u8,
    pub topaz: u8,
}

/// Everything the item tooltip widget shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub name: String,
    pub rareness: Rareness,
    pub description: String,
    pub crafted_by: String,
    pub item_type: String,
    pub level: u16,
    pub usable: bool,
    pub weight: u16,
    pub worth: u32,
    pub quality_text: String,
    pub durability_text: String,
    pub durability: u8,
    pub gems: GemLevels,
    pub bonus: u8,
}

impl Tooltip {
    pub fn decode(reader: &mut NetReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: reader.read_string()?,
            rareness: Rareness::from(reader.read_u8()?),
            description: reader.read_string()?,
            crafted_by: reader.read_string()?,
            item_type: reader.read_string()?,
            level: reader.read_u16()?,
            usable: reader.read_bool()?,
            weight: reader.read_u16()?,
            worth: reader.read_u32()?,
            quality_text: reader.read_string()?,
            durability_text: reader.read_string()?,
            durability: reader.read_u8()?,
            gems: GemLevels {
                diamond: reader.read_u8()?,
                emerald: reader.read_u8()?,
                ruby: reader.read_u8()?,
                sapphire: reader.read_u8()?,
                amethyst: reader.read_u8()?,
                obsidian: reader.read_u8()?,
                topaz: reader.read_u8()?,
            },
            bonus: reader.read_u8()?,
        })
    }

    pub fn encode(&self, writer: &mut NetWriter) -> Result<(), ProtocolError> {
        writer.write_string(&self.name)?;
        writer.write_u8(self.rareness.into());
        writer.write_string(&self.description)?;
        writer.write_string(&self.crafted_by)?;
        writer.write_string(&self.item_type)?;
        writer.write_u16(self.level);
        writer.write_bool(self.usable);
        writer.write_u16(self.weight);
        writer.write_u32(self.worth);
        writer.write_string(&self.quality_text)?;
        writer.write_string(&self.durability_text)?;
        writer.write_u8(self.durability);
        for level in [
            self.gems.diamond,
            self.gems.emerald,
            self.gems.ruby,
            self.gems.sapphire,
            self.gems.amethyst,
            self.gems.obsidian,
            self.gems.topaz,
        ] {
            writer.write_u8(level);
        }
        writer.write_u8(self.bonus);
        Ok(())
    }

    /// Bytes this tooltip occupies on the wire.
    pub fn wire_size(&self) -> usize {
        let text = |s: &String| 2 + s.len();
        text(&self.name)
            + 1
            + text(&self.description)
            + text(&self.crafted_by)
            + text(&self.item_type)
            + 2
            + 1
            + 2
            + 4
            + text(&self.quality_text)
            + text(&self.durability_text)
            + 1
            + 7
            + 1
    }
}
