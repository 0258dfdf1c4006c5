//! Tier selection by size.

use crate::common::config::{DISK_MIN_MB, IN_MEMORY_MAX_MB, MB_BYTES};
use crate::common::{Tier, TierMode};

/// Pick the first tier to try for a grid of `bytes` bytes.
///
/// A forced mode wins regardless of size. Otherwise:
/// - `bytes < 100 MB` → [`Tier::InMemory`]
/// - `100 MB ≤ bytes < 300 MB` → [`Tier::Paged`]
/// - `bytes ≥ 300 MB` → [`Tier::Disk`]
pub fn select_tier(bytes: usize, mode: TierMode) -> Tier {
    match mode {
        TierMode::Forced(tier) => tier,
        TierMode::Auto if bytes < IN_MEMORY_MAX_MB * MB_BYTES => Tier::InMemory,
        TierMode::Auto if bytes < DISK_MIN_MB * MB_BYTES => Tier::Paged,
        TierMode::Auto => Tier::Disk,
    }
}
