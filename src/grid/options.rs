//! Construction options for a grid.

use std::path::{Path, PathBuf};

use crate::common::{Element, Result, TierMode};

/// Everything needed to build a [`GridManager`](crate::GridManager).
///
/// # Example
/// ```
/// use rastercache::{GridConfig, TierMode};
///
/// let config = GridConfig::<f32>::new(512, 1024)
///     .need_sync(true)
///     .init_value(-9999.0)
///     .tier(TierMode::DISK);
/// assert_eq!(config.element_count(), Some(512 * 1024));
/// ```
#[derive(Debug, Clone)]
pub struct GridConfig<T> {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) need_sync: bool,
    pub(crate) init_value: T,
    pub(crate) tier: TierMode,
    pub(crate) backing_dir: Option<PathBuf>,
    pub(crate) max_allocation: Option<usize>,
}

impl<T: Element> GridConfig<T> {
    /// A `rows × cols` grid with sync off, zero fill, and automatic tier.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            need_sync: false,
            init_value: T::default(),
            tier: TierMode::Auto,
            backing_dir: None,
            max_allocation: None,
        }
    }

    /// Write the disk-tier window back before it is evicted.
    pub fn need_sync(mut self, on: bool) -> Self {
        self.need_sync = on;
        self
    }

    /// Value every element starts with.
    pub fn init_value(mut self, value: T) -> Self {
        self.init_value = value;
        self
    }

    /// Force a tier, or request automatic selection.
    pub fn tier(mut self, tier: impl Into<TierMode>) -> Self {
        self.tier = tier.into();
        self
    }

    /// Set the tier from a legacy integer code (`-1` auto, `0..=2` forced).
    ///
    /// # Errors
    /// Returns `Error::InvalidTier` for any other code.
    pub fn tier_code(self, code: i32) -> Result<Self> {
        Ok(self.tier(TierMode::try_from(code)?))
    }

    /// Directory for a generated backing raster (default: working directory).
    pub fn backing_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.backing_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Cap, in bytes, on any single contiguous allocation.
    ///
    /// An allocation over the cap fails like an allocator refusal would,
    /// sending initialization on to the next heavier tier. The cap applies
    /// to the whole in-memory buffer, to each paged chunk, to the disk
    /// tier's fill row, and to its cache window.
    pub fn max_allocation(mut self, bytes: usize) -> Self {
        self.max_allocation = Some(bytes);
        self
    }

    /// `rows × cols`, or `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Total size in bytes, or `None` on overflow.
    pub fn byte_size(&self) -> Option<usize> {
        self.element_count()?.checked_mul(T::SIZE)
    }
}
