//! PagedStore - the grid split into fixed-capacity chunks.
//!
//! Each chunk holds [`chunk_capacity`] elements (4 MB worth). Linear index
//! `i` lives in chunk `i / C` at offset `i % C`:
//!
//! ```text
//!  index:  0 ........ C-1 │ C ........ 2C-1 │ 2C ... len-1 ┊ unused
//!          └── chunk 0 ───┘ └── chunk 1 ────┘ └── chunk 2 ──┴───────┘
//! ```
//!
//! Every chunk, the last included, is allocated at full capacity.

use crate::common::alloc::{byte_len, check_budget, try_filled_vec};
use crate::common::config::chunk_capacity;
use crate::common::{Element, Error, Result, Tier};

#[derive(Debug)]
pub struct PagedStore<T> {
    chunks: Vec<Box<[T]>>,
    capacity: usize,
    len: usize,
    cols: usize,
}

impl<T: Element> PagedStore<T> {
    /// Allocate `rows × cols` elements in 4 MB chunks, all set to `fill`.
    ///
    /// # Errors
    /// Returns `Error::AllocationFailed` if any chunk cannot be allocated or
    /// one chunk exceeds `budget`. Chunks allocated before the failure are
    /// released.
    pub fn new(rows: usize, cols: usize, fill: T, budget: Option<usize>) -> Result<Self> {
        Self::with_chunk_capacity(rows, cols, fill, budget, chunk_capacity(T::SIZE))
    }

    pub(crate) fn with_chunk_capacity(
        rows: usize,
        cols: usize,
        fill: T,
        budget: Option<usize>,
        capacity: usize,
    ) -> Result<Self> {
        let len = rows * cols;
        let chunk_count = len.div_ceil(capacity);

        check_budget(byte_len::<T>(capacity, Tier::Paged)?, budget, Tier::Paged)?;
        let total_bytes = chunk_count
            .checked_mul(capacity)
            .and_then(|n| n.checked_mul(std::mem::size_of::<T>()))
            .ok_or(Error::AllocationFailed {
                tier: Tier::Paged,
                bytes: usize::MAX,
            })?;

        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(chunk_count)
            .map_err(|_| Error::AllocationFailed {
                tier: Tier::Paged,
                bytes: total_bytes,
            })?;
        for _ in 0..chunk_count {
            chunks.push(try_filled_vec(capacity, fill, Tier::Paged)?.into_boxed_slice());
        }

        Ok(Self {
            chunks,
            capacity,
            len,
            cols,
        })
    }

    /// Chunk index and offset holding linear index `index`.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.capacity, index % self.capacity)
    }

    /// # Panics
    /// Panics if `index` is past the end; the grid checks bounds first.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        debug_assert!(index < self.len);
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk][offset]
    }

    /// # Panics
    /// Panics if `index` is past the end; the grid checks bounds first.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        let (chunk, offset) = self.locate(index);
        &mut self.chunks[chunk][offset]
    }

    /// Logical length of chunk `i`: full capacity except for the tail.
    fn used_len(&self, i: usize) -> usize {
        if i + 1 == self.chunks.len() {
            self.len - i * self.capacity
        } else {
            self.capacity
        }
    }

    /// Independent copy of every element, chunk by chunk.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.len)
            .map_err(|_| Error::AllocationFailed {
                tier: Tier::Paged,
                bytes: self.len * std::mem::size_of::<T>(),
            })?;
        for (i, chunk) in self.chunks.iter().enumerate() {
            out.extend_from_slice(&chunk[..self.used_len(i)]);
        }
        Ok(out)
    }

    /// Overwrite every element, chunk by chunk. `src.len()` must equal `len()`.
    pub fn copy_from(&mut self, src: &[T]) {
        debug_assert_eq!(src.len(), self.len);
        let capacity = self.capacity;
        for (i, part) in src.chunks(capacity).enumerate() {
            self.chunks[i][..part.len()].copy_from_slice(part);
        }
    }

    /// Copy a rectangle out through per-element indexing.
    pub fn read_rect(
        &self,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<T>> {
        let mut out = try_filled_vec(row_count * col_count, T::default(), Tier::Paged)?;
        for i in 0..row_count {
            for j in 0..col_count {
                out[i * col_count + j] = self.get((brow + i) * self.cols + bcol + j);
            }
        }
        Ok(out)
    }

    /// Copy a rectangle in through per-element indexing.
    pub fn write_rect(&mut self, brow: usize, bcol: usize, col_count: usize, src: &[T]) {
        if col_count == 0 {
            return;
        }
        for (i, row) in src.chunks_exact(col_count).enumerate() {
            for (j, &value) in row.iter().enumerate() {
                *self.get_mut((brow + i) * self.cols + bcol + j) = value;
            }
        }
    }
}
