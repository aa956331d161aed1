//! Primitive value types embedded in many messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The numeric tag that opens every frame.
pub type CommandId = u8;

/// Identifies a character (player, NPC or monster) in the game world.
///
/// Encoded as an unsigned 32-bit integer. `#[serde(transparent)]` keeps
/// it a plain number when written to logs or config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl CharacterId {
    /// Bytes occupied on the wire.
    pub const WIRE_SIZE: usize = 4;
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A position in the game world: tile column, tile row and level.
///
/// Each coordinate is a signed 16-bit value on the wire, so a location is
/// always exactly [`Location::WIRE_SIZE`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Location {
    /// Bytes occupied on the wire.
    pub const WIRE_SIZE: usize = 6;

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Tile distance on the same plane, ignoring the level.
    ///
    /// This is the Chebyshev distance: diagonal steps count as one, which
    /// matches how characters walk.
    pub fn plane_distance(&self, other: &Location) -> i32 {
        let dx = (i32::from(self.x) - i32::from(other.x)).abs();
        let dy = (i32::from(self.y) - i32::from(other.y)).abs();
        dx.max(dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_display() {
        assert_eq!(CharacterId(17).to_string(), "C-17");
    }

    #[test]
    fn test_character_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CharacterId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_location_deserializes_from_fields() {
        let loc: Location = serde_json::from_str(r#"{"x":1,"y":2,"z":-3}"#).unwrap();
        assert_eq!(loc, Location::new(1, 2, -3));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(-3, 12, 0).to_string(), "(-3, 12, 0)");
    }

    #[test]
    fn test_plane_distance_counts_diagonals_once() {
        let a = Location::new(0, 0, 0);
        assert_eq!(a.plane_distance(&Location::new(3, 3, 0)), 3);
        assert_eq!(a.plane_distance(&Location::new(-2, 5, 1)), 5);
        assert_eq!(a.plane_distance(&a), 0);
    }
}
