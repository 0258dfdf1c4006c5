//! Storage tier identifiers.

use std::fmt;

use crate::common::Error;

/// The storage strategy backing a grid.
///
/// Tiers are ordered from lightest to heaviest. When a tier cannot be
/// allocated, initialization moves on to the next one in [`Tier::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// One contiguous buffer holding every element.
    InMemory,
    /// Fixed-capacity chunks of 4 MB each.
    Paged,
    /// A persisted raster plus one resident cache window.
    Disk,
}

impl Tier {
    /// All tiers in fallback order.
    pub const ORDER: [Tier; 3] = [Tier::InMemory, Tier::Paged, Tier::Disk];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::InMemory => "InMemory",
            Tier::Paged => "Paged",
            Tier::Disk => "Disk",
        };
        f.write_str(name)
    }
}

/// Tier requested at construction: automatic or forced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierMode {
    /// Pick by size.
    #[default]
    Auto,
    /// Force a specific tier regardless of size.
    Forced(Tier),
}

impl TierMode {
    pub const IN_MEMORY: TierMode = TierMode::Forced(Tier::InMemory);
    pub const PAGED: TierMode = TierMode::Forced(Tier::Paged);
    pub const DISK: TierMode = TierMode::Forced(Tier::Disk);
}

/// Legacy integer codes: `-1` auto, `0` in-memory, `1` paged, `2` disk.
impl TryFrom<i32> for TierMode {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(TierMode::Auto),
            0 => Ok(TierMode::IN_MEMORY),
            1 => Ok(TierMode::PAGED),
            2 => Ok(TierMode::DISK),
            other => Err(Error::InvalidTier(other)),
        }
    }
}

impl From<Tier> for TierMode {
    fn from(tier: Tier) -> Self {
        TierMode::Forced(tier)
    }
}
