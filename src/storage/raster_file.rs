//! Raster File - low-level file I/O for persisted rasters.
//!
//! The [`RasterFile`] handles all direct file operations:
//! - Creating and opening raster files
//! - Reading and writing rectangular regions
//! - Validating shape and element type

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::common::alloc::try_filled_vec;
use crate::common::config::IO_BATCH_BYTES;
use crate::common::{decode_into, encode_into, DataType, Element, Error, Result, Tier};
use crate::storage::RasterHeader;

/// A persisted 2D raster on disk.
///
/// # File Layout
/// ```text
/// ┌──────────┬──────────────┬──────────────┬─────┬──────────────┐
/// │ Header   │ Row 0        │ Row 1        │ ... │ Row N-1      │
/// │ (32B)    │ cols × size  │ cols × size  │     │ cols × size  │
/// └──────────┴──────────────┴──────────────┴─────┴──────────────┘
/// ```
///
/// Cell `(r, c)` is located at offset `32 + (r × cols + c) × size`.
///
/// # Thread Safety
/// `RasterFile` is **single-threaded**. The owning grid serializes access.
///
/// # Durability
/// Writes are not fsynced individually; call [`RasterFile::sync`] to make
/// them durable.
#[derive(Debug)]
pub struct RasterFile {
    file: File,
    header: RasterHeader,
}

impl RasterFile {
    /// Create a new raster file of the given shape and type.
    ///
    /// Cells start out zeroed. If the header or the file length cannot be
    /// written, the partially created file is removed again.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        cols: usize,
        rows: usize,
        data_type: DataType,
    ) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        let header = RasterHeader::new(data_type, rows, cols);
        let init = file
            .write_all(&header.to_bytes())
            .and_then(|()| file.set_len(header.file_len()));
        if let Err(e) = init {
            drop(file);
            if let Err(remove) = fs::remove_file(path.as_ref()) {
                warn!(
                    path = %path.as_ref().display(),
                    error = %remove,
                    "failed to remove partially created raster"
                );
            }
            return Err(e.into());
        }

        debug!(
            path = %path.as_ref().display(),
            rows,
            cols,
            ?data_type,
            "created raster file"
        );
        Ok(Self { file, header })
    }

    /// Open an existing raster file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, its header is corrupt, or
    /// it is shorter than its header claims.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;

        let mut raw = [0u8; RasterHeader::SIZE];
        file.read_exact(&mut raw)?;
        let header = RasterHeader::from_bytes(&raw)?;

        let actual = file.metadata()?.len();
        if actual < header.file_len() {
            return Err(Error::CorruptHeader(format!(
                "file holds {} bytes, header requires {}",
                actual,
                header.file_len()
            )));
        }

        Ok(Self { file, header })
    }

    /// Read a rectangular region into `buf` (row-major, `row_count × col_count`).
    ///
    /// # Errors
    /// - `Error::TypeMismatch` if `T` is not the stored type
    /// - `Error::RectOutOfBounds` if the region leaves the raster
    /// - `Error::LengthMismatch` if `buf` has the wrong length
    /// - `Error::AllocationFailed` if the staging buffer cannot be allocated
    pub fn read_rect<T: Element>(
        &mut self,
        buf: &mut [T],
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<()> {
        self.check_region::<T>(buf.len(), brow, bcol, row_count, col_count)?;
        if buf.is_empty() {
            return Ok(());
        }

        let batch = self.rows_per_io::<T>(bcol, col_count);
        let staged = batch.min(row_count) * col_count * T::SIZE;
        let mut bytes = try_filled_vec(staged, 0u8, Tier::Disk)?;
        for (i, band) in buf.chunks_mut(batch * col_count).enumerate() {
            let len = band.len() * T::SIZE;
            self.file
                .seek(SeekFrom::Start(self.offset_of::<T>(brow + i * batch, bcol)))?;
            self.file.read_exact(&mut bytes[..len])?;
            decode_into(&bytes[..len], band);
        }
        Ok(())
    }

    /// Write `buf` (row-major, `row_count × col_count`) into a rectangular region.
    ///
    /// # Errors
    /// Same conditions as [`RasterFile::read_rect`].
    pub fn write_rect<T: Element>(
        &mut self,
        buf: &[T],
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<()> {
        self.check_region::<T>(buf.len(), brow, bcol, row_count, col_count)?;
        if buf.is_empty() {
            return Ok(());
        }

        let batch = self.rows_per_io::<T>(bcol, col_count);
        let staged = batch.min(row_count) * col_count * T::SIZE;
        let mut bytes = try_filled_vec(staged, 0u8, Tier::Disk)?;
        for (i, band) in buf.chunks(batch * col_count).enumerate() {
            let len = band.len() * T::SIZE;
            encode_into(band, &mut bytes[..len]);
            self.file
                .seek(SeekFrom::Start(self.offset_of::<T>(brow + i * batch, bcol)))?;
            self.file.write_all(&bytes[..len])?;
        }
        Ok(())
    }

    /// Flush written cells to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.header.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.header.cols
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.header.data_type
    }

    /// Rows moved per seek. A full-width band is contiguous on disk, so it
    /// goes in batches of up to `IO_BATCH_BYTES`; anything narrower goes
    /// one row at a time.
    fn rows_per_io<T: Element>(&self, bcol: usize, col_count: usize) -> usize {
        if bcol == 0 && col_count == self.header.cols {
            (IO_BATCH_BYTES / (col_count * T::SIZE)).max(1)
        } else {
            1
        }
    }

    fn offset_of<T: Element>(&self, row: usize, col: usize) -> u64 {
        RasterHeader::data_offset()
            + ((row as u64) * (self.header.cols as u64) + col as u64) * T::SIZE as u64
    }

    fn check_region<T: Element>(
        &self,
        buf_len: usize,
        brow: usize,
        bcol: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<()> {
        if T::DATA_TYPE != self.header.data_type {
            return Err(Error::TypeMismatch {
                expected: T::DATA_TYPE,
                found: self.header.data_type,
            });
        }

        let fits_rows = brow
            .checked_add(row_count)
            .is_some_and(|end| end <= self.header.rows);
        let fits_cols = bcol
            .checked_add(col_count)
            .is_some_and(|end| end <= self.header.cols);
        if !fits_rows || !fits_cols {
            return Err(Error::RectOutOfBounds {
                brow,
                bcol,
                row_count,
                col_count,
                rows: self.header.rows,
                cols: self.header.cols,
            });
        }

        let expected = row_count * col_count;
        if buf_len != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: buf_len,
            });
        }
        Ok(())
    }
}
