//! CacheWindow - the resident slice of a disk-backed grid.
//!
//! A [`CacheWindow`] holds one rectangle of cells plus its placement:
//! - Origin `(brow, bcol)` in grid coordinates
//! - Extent `rows × cols`, fixed for the window's lifetime
//! - Row-major cell buffer

use std::fmt;

use crate::common::alloc::{byte_len, check_budget, try_filled_vec};
use crate::common::{Element, Result, Tier};

/// Origin and extent of a rectangle in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowRect {
    pub brow: usize,
    pub bcol: usize,
    pub rows: usize,
    pub cols: usize,
}

impl WindowRect {
    /// Whether `(row, col)` lies inside this rectangle.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.brow
            && row < self.brow + self.rows
            && col >= self.bcol
            && col < self.bcol + self.cols
    }
}

impl fmt::Display for WindowRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@({}, {})", self.rows, self.cols, self.brow, self.bcol)
    }
}

/// The single resident window of a disk-tier grid.
///
/// The window never moves its own contents; the disk backend re-points the
/// origin and reloads the buffer on every refit.
#[derive(Debug)]
pub struct CacheWindow<T> {
    rect: WindowRect,
    data: Box<[T]>,
}

impl<T: Element> CacheWindow<T> {
    /// Allocate a `rows × cols` window at the origin.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailed` if the buffer cannot be allocated or
    /// exceeds `budget`.
    pub fn new(rows: usize, cols: usize, budget: Option<usize>) -> Result<Self> {
        let len = rows * cols;
        check_budget(byte_len::<T>(len, Tier::Disk)?, budget, Tier::Disk)?;
        let data = try_filled_vec(len, T::default(), Tier::Disk)?.into_boxed_slice();
        Ok(Self {
            rect: WindowRect {
                brow: 0,
                bcol: 0,
                rows,
                cols,
            },
            data,
        })
    }

    #[inline]
    pub fn rect(&self) -> WindowRect {
        self.rect
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rect.contains(row, col)
    }

    /// Move the window. Contents are stale until reloaded.
    #[inline]
    pub fn set_origin(&mut self, brow: usize, bcol: usize) {
        self.rect.brow = brow;
        self.rect.bcol = bcol;
    }

    /// Mutable reference to grid cell `(row, col)`.
    ///
    /// # Panics
    /// Panics if the cell is outside the window.
    #[inline]
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut T {
        assert!(self.contains(row, col), "cell ({}, {}) outside window {}", row, col, self.rect);
        let offset = (row - self.rect.brow) * self.rect.cols + (col - self.rect.bcol);
        &mut self.data[offset]
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
