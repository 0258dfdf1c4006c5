//! Disk Backend - the disk tier's persisted raster and its cache window.
//!
//! The [`DiskBackend`] provides:
//! - Creation of a self-owned backing raster, or attach to an existing one
//! - A single movable [`CacheWindow`] refit around each accessed cell
//! - Write-back of the evicted window when sync is enabled
//! - Direct raster reads/writes for bulk and rectangular access

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace, warn};

use crate::buffer::{CacheWindow, WindowRect, WindowStats};
use crate::common::alloc::{byte_len, check_budget, try_filled_vec};
use crate::common::config::{RASTER_EXTENSION, WINDOW_DIVISOR};
use crate::common::{Element, Error, Result, Tier};
use crate::storage::RasterFile;

/// Give up on name collisions after this many suffixed attempts.
const MAX_NAME_ATTEMPTS: usize = 64;

/// Path of the backing raster; removes the file on drop if we created it.
#[derive(Debug)]
struct BackingFile {
    path: PathBuf,
    owned: bool,
}

impl Drop for BackingFile {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed backing raster"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove backing raster"
            ),
        }
    }
}

/// Disk-tier storage: a persisted raster plus one resident window.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │                     DiskBackend                      │
/// │  ┌──────────────┐   refit    ┌────────────────────┐  │
/// │  │ CacheWindow  │◀───────────│     RasterFile     │  │
/// │  │ (rows/4 ×    │───────────▶│  (whole grid on    │  │
/// │  │  cols/4)     │ write-back │   disk)            │  │
/// │  └──────────────┘            └────────────────────┘  │
/// └──────────────────────────────────────────────────────┘
/// ```
///
/// # Refit
/// When an accessed cell is outside the window (or there is no window yet)
/// the window is re-centered on that cell, clamped to stay inside the grid:
/// `brow = clamp(row - win_rows/2, 0, rows - win_rows)`, likewise for
/// columns. With sync enabled the old contents are written back first;
/// otherwise in-window changes since the last refit are discarded.
///
/// # Bulk access
/// Rectangular and whole-grid reads go straight to the raster and never
/// touch the window, so unflushed window edits are not visible to them.
#[derive(Debug)]
pub struct DiskBackend<T> {
    raster: RasterFile,
    window: Option<CacheWindow<T>>,
    rows: usize,
    cols: usize,
    win_rows: usize,
    win_cols: usize,
    budget: Option<usize>,
    stats: WindowStats,
    // Declared last: the raster handle closes before the file is removed.
    backing: BackingFile,
}

impl<T: Element> DiskBackend<T> {
    /// Create a new raster named `<unix-seconds>.grd` in `dir` and fill
    /// every row with `fill`.
    ///
    /// If the name is taken, `<unix-seconds>-<n>.grd` is tried instead.
    /// The file belongs to this backend and is removed when it drops.
    ///
    /// # Errors
    /// I/O errors from the raster, or `Error::AllocationFailed` if the fill
    /// row cannot be allocated or exceeds `budget`.
    pub fn create(
        dir: &Path,
        rows: usize,
        cols: usize,
        fill: T,
        budget: Option<usize>,
    ) -> Result<Self> {
        let (raster, path) = create_unique_raster::<T>(dir, rows, cols)?;
        let mut backend = Self::from_raster(raster, path, true, budget);

        // Any failure from here on drops `backend`, which removes the file.
        check_budget(byte_len::<T>(cols, Tier::Disk)?, budget, Tier::Disk)?;
        let row = try_filled_vec(cols, fill, Tier::Disk)?;
        for r in 0..rows {
            backend.raster.write_rect(&row, r, 0, 1, cols)?;
        }
        Ok(backend)
    }

    /// Attach to an existing raster. The file is never removed by this backend.
    ///
    /// # Errors
    /// - I/O or header errors from [`RasterFile::open`]
    /// - `Error::TypeMismatch` if the raster does not store `T`
    pub fn open(path: &Path, budget: Option<usize>) -> Result<Self> {
        let raster = RasterFile::open(path)?;
        if raster.data_type() != T::DATA_TYPE {
            return Err(Error::TypeMismatch {
                expected: T::DATA_TYPE,
                found: raster.data_type(),
            });
        }
        Ok(Self::from_raster(raster, path.to_path_buf(), false, budget))
    }

    fn from_raster(raster: RasterFile, path: PathBuf, owned: bool, budget: Option<usize>) -> Self {
        let rows = raster.rows();
        let cols = raster.cols();
        Self {
            raster,
            window: None,
            rows,
            cols,
            win_rows: window_extent(rows),
            win_cols: window_extent(cols),
            budget,
            stats: WindowStats::default(),
            backing: BackingFile { path, owned },
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.backing.path
    }

    /// Placement of the resident window, if one has been loaded.
    pub fn window_rect(&self) -> Option<WindowRect> {
        self.window.as_ref().map(CacheWindow::rect)
    }

    #[inline]
    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// Origin of a window centered on `(row, col)`, clamped inside the grid.
    fn fit_origin(&self, row: usize, col: usize) -> (usize, usize) {
        let brow = row
            .saturating_sub(self.win_rows / 2)
            .min(self.rows - self.win_rows);
        let bcol = col
            .saturating_sub(self.win_cols / 2)
            .min(self.cols - self.win_cols);
        (brow, bcol)
    }

    /// Mutable reference to cell `(row, col)`, refitting the window if needed.
    ///
    /// The reference lives in the window buffer; the borrow on `self` keeps
    /// it from outliving the next access, which may move the window.
    ///
    /// # Errors
    /// I/O errors from write-back or reload, or `Error::AllocationFailed` if
    /// the first window cannot be allocated.
    pub fn cell_mut(&mut self, row: usize, col: usize, sync: bool) -> Result<&mut T> {
        let window = match self.window.take() {
            Some(w) if w.contains(row, col) => {
                self.stats.hits += 1;
                w
            }
            previous => self.refit(previous, row, col, sync)?,
        };
        Ok(self.window.insert(window).cell_mut(row, col))
    }

    /// Move the window onto `(row, col)` and reload it.
    ///
    /// On a write-back failure the previous window stays resident. On a
    /// reload failure no window is resident afterwards.
    fn refit(
        &mut self,
        previous: Option<CacheWindow<T>>,
        row: usize,
        col: usize,
        sync: bool,
    ) -> Result<CacheWindow<T>> {
        let (brow, bcol) = self.fit_origin(row, col);

        let mut window = match previous {
            Some(old) => {
                if sync {
                    if let Err(e) = write_back(&mut self.raster, &mut self.stats, &old) {
                        self.window = Some(old);
                        return Err(e);
                    }
                }
                old
            }
            None => {
                debug!(
                    rows = self.win_rows,
                    cols = self.win_cols,
                    "allocating cache window"
                );
                CacheWindow::new(self.win_rows, self.win_cols, self.budget)?
            }
        };

        trace!(row, col, brow, bcol, "refitting cache window");
        window.set_origin(brow, bcol);
        self.raster
            .read_rect(window.data_mut(), brow, bcol, self.win_rows, self.win_cols)?;

        self.stats.refits += 1;
        self.stats.cells_read += (self.win_rows * self.win_cols) as u64;
        Ok(window)
    }

    /// Write the resident window back (if any) and sync the raster.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(window) = self.window.as_ref() {
            write_back(&mut self.raster, &mut self.stats, window)?;
        }
        self.raster.sync()
    }

    /// Drop the resident window without writing it back.
    pub fn discard_window(&mut self) {
        if self.window.take().is_some() {
            debug!("discarded cache window");
        }
    }

    /// Read a rectangle straight from the raster.
    pub fn read_rect(
        &mut self,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<T>> {
        let mut out = try_filled_vec(row_count * col_count, T::default(), Tier::Disk)?;
        self.raster
            .read_rect(&mut out, brow, bcol, row_count, col_count)?;
        self.stats.cells_read += out.len() as u64;
        Ok(out)
    }

    /// Read the whole grid straight from the raster.
    pub fn to_vec(&mut self) -> Result<Vec<T>> {
        self.read_rect(0, 0, self.rows, self.cols)
    }

    /// Overwrite the whole raster and drop the now-stale window.
    pub fn write_all(&mut self, src: &[T]) -> Result<()> {
        self.raster.write_rect(src, 0, 0, self.rows, self.cols)?;
        self.stats.cells_written += src.len() as u64;
        self.discard_window();
        Ok(())
    }
}

/// Window extent for a grid dimension: a quarter, but at least one cell.
#[inline]
fn window_extent(dim: usize) -> usize {
    (dim / WINDOW_DIVISOR).max(1).min(dim)
}

fn write_back<T: Element>(
    raster: &mut RasterFile,
    stats: &mut WindowStats,
    window: &CacheWindow<T>,
) -> Result<()> {
    let rect = window.rect();
    trace!(window = %rect, "writing back cache window");
    raster.write_rect(window.data(), rect.brow, rect.bcol, rect.rows, rect.cols)?;
    stats.write_backs += 1;
    stats.cells_written += window.data().len() as u64;
    Ok(())
}

fn create_unique_raster<T: Element>(
    dir: &Path,
    rows: usize,
    cols: usize,
) -> Result<(RasterFile, PathBuf)> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.{}", stamp, RASTER_EXTENSION)
        } else {
            format!("{}-{}.{}", stamp, attempt, RASTER_EXTENSION)
        };
        let path = dir.join(name);

        match RasterFile::create(&path, cols, rows, T::DATA_TYPE) {
            Ok(raster) => return Ok((raster, path)),
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(Error::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free backing raster name for timestamp {} in {}",
            stamp,
            dir.display()
        ),
    )))
}
