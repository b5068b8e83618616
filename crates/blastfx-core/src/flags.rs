//! Environment flags gating which spawn kinds fire

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A bitmask classifying where an explosion occurred
///
/// Spawn kinds declare the environments they fire in; at explosion time the
/// derived flags are intersected against each spawn kind's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpawnFlags(u32);

impl SpawnFlags {
    pub const NONE: SpawnFlags = SpawnFlags(0);
    pub const GROUND: SpawnFlags = SpawnFlags(1 << 0);
    pub const WATER: SpawnFlags = SpawnFlags(1 << 1);
    pub const AIR: SpawnFlags = SpawnFlags(1 << 2);
    pub const UNDERWATER: SpawnFlags = SpawnFlags(1 << 3);
    pub const UNIT: SpawnFlags = SpawnFlags(1 << 4);
    pub const NO_UNIT: SpawnFlags = SpawnFlags(1 << 5);

    /// Raw bit value
    pub fn bits(self) -> u32 {
        self.0
    }

    /// True if no bits are set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`
    pub fn contains(self, other: SpawnFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set in `self`
    pub fn intersects(self, other: SpawnFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Classify an explosion by world height and altitude above ground
    ///
    /// The ranges do not overlap, so at most one bit is set, although
    /// downstream consumers never assume exclusivity.
    pub fn from_height(height: f32, altitude: f32) -> SpawnFlags {
        if height > 0.0 && altitude >= 20.0 {
            SpawnFlags::AIR
        } else if height > 0.0 && altitude >= -1.0 {
            SpawnFlags::GROUND
        } else if height > -5.0 && altitude >= -1.0 {
            SpawnFlags::WATER
        } else if height <= -5.0 && altitude >= -1.0 {
            SpawnFlags::UNDERWATER
        } else {
            SpawnFlags::NONE
        }
    }
}

impl BitOr for SpawnFlags {
    type Output = SpawnFlags;

    fn bitor(self, rhs: SpawnFlags) -> SpawnFlags {
        SpawnFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SpawnFlags {
    fn bitor_assign(&mut self, rhs: SpawnFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SpawnFlags {
    type Output = SpawnFlags;

    fn bitand(self, rhs: SpawnFlags) -> SpawnFlags {
        SpawnFlags(self.0 & rhs.0)
    }
}

impl fmt::Display for SpawnFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (SpawnFlags::GROUND, "ground"),
            (SpawnFlags::WATER, "water"),
            (SpawnFlags::AIR, "air"),
            (SpawnFlags::UNDERWATER, "underwater"),
            (SpawnFlags::UNIT, "unit"),
            (SpawnFlags::NO_UNIT, "nounit"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}
