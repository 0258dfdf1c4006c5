//! LinearBuffer - one contiguous buffer for the whole grid.

use crate::common::alloc::{byte_len, check_budget, try_copy_vec, try_filled_vec};
use crate::common::{Element, Result, Tier};

/// Every element of the grid in a single row-major allocation.
///
/// Index `i` is simply offset `i` in the buffer.
#[derive(Debug)]
pub struct LinearBuffer<T> {
    data: Box<[T]>,
    cols: usize,
}

impl<T: Element> LinearBuffer<T> {
    /// Allocate `rows × cols` elements set to `fill`.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailed` if the buffer cannot be allocated or
    /// exceeds `budget`.
    pub fn new(rows: usize, cols: usize, fill: T, budget: Option<usize>) -> Result<Self> {
        let len = rows * cols;
        check_budget(byte_len::<T>(len, Tier::InMemory)?, budget, Tier::InMemory)?;
        let data = try_filled_vec(len, fill, Tier::InMemory)?.into_boxed_slice();
        Ok(Self { data, cols })
    }

    /// Mutable reference to element `index`.
    ///
    /// # Panics
    /// Panics if `index` is past the end; the grid checks bounds first.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }

    /// Independent copy of every element.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        try_copy_vec(&self.data, Tier::InMemory)
    }

    /// Overwrite every element. `src.len()` must equal `len()`.
    pub fn copy_from(&mut self, src: &[T]) {
        self.data.copy_from_slice(src);
    }

    /// Copy a rectangle out row by row.
    pub fn read_rect(
        &self,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<T>> {
        let mut out = try_filled_vec(row_count * col_count, T::default(), Tier::InMemory)?;
        if col_count == 0 {
            return Ok(out);
        }
        for (i, dst) in out.chunks_exact_mut(col_count).enumerate() {
            let start = (brow + i) * self.cols + bcol;
            dst.copy_from_slice(&self.data[start..start + col_count]);
        }
        Ok(out)
    }

    /// Copy a rectangle in row by row.
    pub fn write_rect(&mut self, brow: usize, bcol: usize, col_count: usize, src: &[T]) {
        if col_count == 0 {
            return;
        }
        for (i, row) in src.chunks_exact(col_count).enumerate() {
            let start = (brow + i) * self.cols + bcol;
            self.data[start..start + col_count].copy_from_slice(row);
        }
    }
}
