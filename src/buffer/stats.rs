//! Cache window statistics tracking.

use std::fmt;

/// Counters kept by a disk-tier grid.
///
/// The engine is single-threaded, so these are plain counters updated
/// through `&mut self`. Memory tiers report all zeros.
///
/// # Example
/// ```
/// use rastercache::WindowStats;
///
/// let stats = WindowStats::default();
/// assert_eq!(stats.hit_rate(), 0.0);
/// println!("{}", stats);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Cell accesses served by the resident window.
    pub hits: u64,

    /// Cell accesses that moved the window (first load included).
    pub refits: u64,

    /// Windows flushed back to the raster before eviction or on `flush`.
    pub write_backs: u64,

    /// Cells read from the raster.
    pub cells_read: u64,

    /// Cells written to the raster.
    pub cells_written: u64,
}

impl WindowStats {
    /// Fraction of cell accesses served without a refit (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.refits;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for WindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, refits: {}, write_backs: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.refits,
            self.write_backs,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = WindowStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.refits, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = WindowStats {
            hits: 7,
            refits: 3,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = WindowStats {
            hits: 100,
            cells_read: 5,
            ..Default::default()
        };
        stats.reset();
        assert_eq!(stats, WindowStats::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = WindowStats {
            hits: 80,
            refits: 20,
            write_backs: 5,
            ..Default::default()
        };
        let display = format!("{}", stats);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("refits: 20"));
        assert!(display.contains("80.00%"));
    }
}
