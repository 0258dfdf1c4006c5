//! Grid Manager - the uniform access layer over all tiers.
//!
//! The [`GridManager`] provides:
//! - Tier selection by size, with fallback on allocation failure
//! - Linear-index and `(row, col)` element access
//! - Whole-grid and rectangular bulk get/set
//! - Disk-tier sync control and explicit flush

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::buffer::{DiskBackend, LinearBuffer, PagedStore, WindowRect, WindowStats};
use crate::common::{Element, Error, Result, Tier};
use crate::grid::{select_tier, GridConfig};

/// The active tier's storage.
#[derive(Debug)]
enum Storage<T> {
    InMemory(LinearBuffer<T>),
    Paged(PagedStore<T>),
    Disk(DiskBackend<T>),
}

impl<T> Storage<T> {
    fn tier(&self) -> Tier {
        match self {
            Storage::InMemory(_) => Tier::InMemory,
            Storage::Paged(_) => Tier::Paged,
            Storage::Disk(_) => Tier::Disk,
        }
    }
}

/// A fixed-shape 2D grid stored in whichever tier fits.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                        GridManager                          │
/// │   get / set / get_mut / to_vec / set_all / get_rect / ...   │
/// ├───────────────────┬───────────────────┬─────────────────────┤
/// │   LinearBuffer    │    PagedStore     │     DiskBackend     │
/// │   (< 100 MB)      │  (100..300 MB)    │     (≥ 300 MB)      │
/// │                   │  4 MB chunks      │ RasterFile + window │
/// └───────────────────┴───────────────────┴─────────────────────┘
/// ```
///
/// The tier is chosen once at construction. If a tier cannot be allocated,
/// construction starts over at the next heavier one; only a failing disk
/// tier is reported to the caller.
///
/// # Element references
/// [`GridManager::get_mut`] hands out a reference into the active storage.
/// On the disk tier that storage is the cache window, which the next access
/// may move; the `&mut self` borrow guarantees the reference is gone by then.
///
/// # Thread Safety
/// `GridManager` is **single-threaded**. Wrap it in a lock to share it.
///
/// # Example
/// ```
/// use rastercache::{GridConfig, GridManager, Tier, TierMode};
///
/// let mut grid = GridManager::new(
///     GridConfig::<i32>::new(10, 10).init_value(5).tier(TierMode::IN_MEMORY),
/// )?;
/// assert_eq!(grid.tier(), Tier::InMemory);
///
/// grid.set_at(3, 3, 42)?;
/// let all = grid.to_vec()?;
/// assert_eq!(all[33], 42);
/// assert_eq!(all.iter().filter(|&&v| v == 5).count(), 99);
///
/// // Rectangles that leave the grid yield nothing.
/// assert!(grid.get_rect(0, 0, 11, 11)?.is_none());
/// # Ok::<(), rastercache::Error>(())
/// ```
#[derive(Debug)]
pub struct GridManager<T: Element> {
    storage: Storage<T>,
    rows: usize,
    cols: usize,
    need_sync: bool,
}

impl<T: Element> GridManager<T> {
    /// Build a grid from `config`.
    ///
    /// # Errors
    /// - `Error::AllocationFailed` if every tier from the selected one up to
    ///   disk failed to allocate
    /// - I/O errors from creating the disk-tier backing raster
    pub fn new(config: GridConfig<T>) -> Result<Self> {
        let (rows, cols) = (config.rows, config.cols);
        let bytes = config.byte_size().ok_or(Error::AllocationFailed {
            tier: Tier::Disk,
            bytes: usize::MAX,
        })?;

        let storage = if rows == 0 || cols == 0 {
            debug!(rows, cols, "empty grid, nothing to allocate");
            Storage::InMemory(LinearBuffer::new(rows, cols, config.init_value, None)?)
        } else {
            let first = select_tier(bytes, config.tier);
            Self::init_storage(&config, first)?
        };

        info!(rows, cols, bytes, tier = %storage.tier(), "grid initialized");
        Ok(Self {
            storage,
            rows,
            cols,
            need_sync: config.need_sync,
        })
    }

    /// Attach a disk-tier grid to an existing persisted raster.
    ///
    /// The shape comes from the file, and the file is left in place when
    /// the grid drops.
    ///
    /// # Errors
    /// I/O, header, or type-mismatch errors from opening the raster.
    pub fn open_disk<P: AsRef<Path>>(path: P, need_sync: bool) -> Result<Self> {
        let backend = DiskBackend::open(path.as_ref(), None)?;
        let (rows, cols) = (backend.rows(), backend.cols());
        info!(rows, cols, path = %path.as_ref().display(), "grid attached to raster");
        Ok(Self {
            storage: Storage::Disk(backend),
            rows,
            cols,
            need_sync,
        })
    }

    /// Try each tier from `first` upward until one allocates.
    fn init_storage(config: &GridConfig<T>, first: Tier) -> Result<Storage<T>> {
        let mut last_failure = None;

        for tier in Tier::ORDER.into_iter().filter(|&t| t >= first) {
            let attempt = match tier {
                Tier::InMemory => LinearBuffer::new(
                    config.rows,
                    config.cols,
                    config.init_value,
                    config.max_allocation,
                )
                .map(Storage::InMemory),
                Tier::Paged => PagedStore::new(
                    config.rows,
                    config.cols,
                    config.init_value,
                    config.max_allocation,
                )
                .map(Storage::Paged),
                Tier::Disk => {
                    let dir = config
                        .backing_dir
                        .clone()
                        .unwrap_or_else(|| PathBuf::from("."));
                    DiskBackend::create(
                        &dir,
                        config.rows,
                        config.cols,
                        config.init_value,
                        config.max_allocation,
                    )
                    .map(Storage::Disk)
                }
            };

            match attempt {
                Ok(storage) => return Ok(storage),
                Err(Error::AllocationFailed { tier, bytes }) => {
                    warn!(%tier, bytes, "tier allocation failed");
                    last_failure = Some(Error::AllocationFailed { tier, bytes });
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_failure.unwrap_or(Error::AllocationFailed {
            tier: first,
            bytes: 0,
        }))
    }

    // ========================================================================
    // Shape and state
    // ========================================================================

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The tier chosen at construction.
    #[inline]
    pub fn tier(&self) -> Tier {
        self.storage.tier()
    }

    #[inline]
    pub fn need_sync(&self) -> bool {
        self.need_sync
    }

    /// Turn disk-tier write-back on eviction on or off.
    #[inline]
    pub fn set_need_sync(&mut self, on: bool) {
        self.need_sync = on;
    }

    /// Path of the persisted raster (disk tier only).
    pub fn backing_path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Disk(disk) => Some(disk.path()),
            _ => None,
        }
    }

    /// Placement of the resident cache window (disk tier, after first access).
    pub fn window(&self) -> Option<WindowRect> {
        match &self.storage {
            Storage::Disk(disk) => disk.window_rect(),
            _ => None,
        }
    }

    /// Cache window counters; all zero for memory tiers.
    pub fn stats(&self) -> WindowStats {
        match &self.storage {
            Storage::Disk(disk) => disk.stats(),
            _ => WindowStats::default(),
        }
    }

    // ========================================================================
    // Element access
    // ========================================================================

    /// Mutable reference to element `index`.
    ///
    /// On the disk tier this may refit the cache window first.
    ///
    /// # Errors
    /// - `Error::IndexOutOfRange` if `index >= len()`
    /// - Disk tier: I/O errors from refit, or `Error::AllocationFailed` for
    ///   the first window
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        match &mut self.storage {
            Storage::InMemory(buf) => Ok(buf.get_mut(index)),
            Storage::Paged(store) => Ok(store.get_mut(index)),
            Storage::Disk(disk) => {
                disk.cell_mut(index / self.cols, index % self.cols, self.need_sync)
            }
        }
    }

    /// Value of element `index`.
    pub fn get(&mut self, index: usize) -> Result<T> {
        self.get_mut(index).map(|v| *v)
    }

    /// Overwrite element `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Value at `(row, col)`.
    pub fn get_at(&mut self, row: usize, col: usize) -> Result<T> {
        let index = self.index_of(row, col)?;
        self.get(index)
    }

    /// Overwrite `(row, col)`.
    pub fn set_at(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let index = self.index_of(row, col)?;
        self.set(index, value)
    }

    // ========================================================================
    // Bulk access
    // ========================================================================

    /// Independent copy of every element, row-major.
    ///
    /// On the disk tier this reads the raster directly; window edits not yet
    /// written back are not included.
    pub fn to_vec(&mut self) -> Result<Vec<T>> {
        match &mut self.storage {
            Storage::InMemory(buf) => buf.to_vec(),
            Storage::Paged(store) => store.to_vec(),
            Storage::Disk(disk) => disk.to_vec(),
        }
    }

    /// Overwrite every element from `src`.
    ///
    /// # Errors
    /// `Error::LengthMismatch` if `src.len() != len()`; nothing is written.
    pub fn set_all(&mut self, src: &[T]) -> Result<()> {
        if src.len() != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: src.len(),
            });
        }
        match &mut self.storage {
            Storage::InMemory(buf) => buf.copy_from(src),
            Storage::Paged(store) => store.copy_from(src),
            Storage::Disk(disk) => disk.write_all(src)?,
        }
        Ok(())
    }

    /// Copy of the `row_count × col_count` rectangle at `(brow, bcol)`.
    ///
    /// Returns `Ok(None)` if the rectangle does not fit inside the grid.
    /// On the disk tier the raster is read directly and the window is left
    /// untouched.
    pub fn get_rect(
        &mut self,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Option<Vec<T>>> {
        if !self.rect_fits(brow, bcol, row_count, col_count) {
            return Ok(None);
        }
        let rect = match &mut self.storage {
            Storage::InMemory(buf) => buf.read_rect(brow, bcol, row_count, col_count)?,
            Storage::Paged(store) => store.read_rect(brow, bcol, row_count, col_count)?,
            Storage::Disk(disk) => disk.read_rect(brow, bcol, row_count, col_count)?,
        };
        Ok(Some(rect))
    }

    /// Overwrite the `row_count × col_count` rectangle at `(brow, bcol)`.
    ///
    /// The paged and disk tiers write element by element; on the disk tier
    /// this goes through the cache window and its refit rules.
    ///
    /// # Errors
    /// - `Error::RectOutOfBounds` if the rectangle leaves the grid
    /// - `Error::LengthMismatch` if `src` is not `row_count × col_count` long
    pub fn set_rect(
        &mut self,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
        src: &[T],
    ) -> Result<()> {
        if !self.rect_fits(brow, bcol, row_count, col_count) {
            return Err(Error::RectOutOfBounds {
                brow,
                bcol,
                row_count,
                col_count,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let expected = row_count * col_count;
        if src.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: src.len(),
            });
        }
        if src.is_empty() {
            return Ok(());
        }

        match &mut self.storage {
            Storage::InMemory(buf) => buf.write_rect(brow, bcol, col_count, src),
            Storage::Paged(store) => store.write_rect(brow, bcol, col_count, src),
            Storage::Disk(disk) => {
                for (i, row) in src.chunks_exact(col_count).enumerate() {
                    for (j, &value) in row.iter().enumerate() {
                        *disk.cell_mut(brow + i, bcol + j, self.need_sync)? = value;
                    }
                }
            }
        }
        Ok(())
    }

    /// Overwrite whole rows starting at `brow`; `src` holds complete rows.
    /// An empty `src` writes nothing.
    ///
    /// # Errors
    /// - `Error::LengthMismatch` if `src.len()` is not a multiple of `cols()`
    /// - `Error::RectOutOfBounds` if the rows run past the grid
    pub fn set_rows(&mut self, brow: usize, src: &[T]) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if self.cols == 0 {
            return Err(Error::LengthMismatch {
                expected: 0,
                actual: src.len(),
            });
        }
        if src.len() % self.cols != 0 {
            return Err(Error::LengthMismatch {
                expected: src.len().div_ceil(self.cols) * self.cols,
                actual: src.len(),
            });
        }
        let row_count = src.len() / self.cols;
        self.set_rect(brow, 0, row_count, self.cols, src)
    }

    /// Write the disk-tier window back regardless of the sync flag and make
    /// the raster durable. No-op for memory tiers.
    pub fn flush(&mut self) -> Result<()> {
        match &mut self.storage {
            Storage::Disk(disk) => disk.flush(),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfRange {
                index: row.saturating_mul(self.cols).saturating_add(col),
                len: self.len(),
            });
        }
        Ok(row * self.cols + col)
    }

    fn rect_fits(&self, brow: usize, bcol: usize, row_count: usize, col_count: usize) -> bool {
        let rows_fit = brow.checked_add(row_count).is_some_and(|end| end <= self.rows);
        let cols_fit = bcol.checked_add(col_count).is_some_and(|end| end <= self.cols);
        rows_fit && cols_fit
    }
}
