//! Configuration constants for rastercache.

/// One megabyte, the unit every size threshold is expressed in.
pub const MB_BYTES: usize = 1024 * 1024;

/// Grids smaller than this (in MB) are kept in a single buffer.
///
/// # Tier thresholds
/// ```text
///        0 MB            100 MB             300 MB
///  ───────┼────────────────┼──────────────────┼──────────▶ bytes
///         │   InMemory     │      Paged       │   Disk
/// ```
pub const IN_MEMORY_MAX_MB: usize = 100;

/// Grids of at least this size (in MB) go to disk.
pub const DISK_MIN_MB: usize = 300;

/// Size of one paged-tier chunk in MB.
pub const CHUNK_MB: usize = 4;

/// Upper bound on the staging buffer for one contiguous raster transfer.
pub const IO_BATCH_BYTES: usize = CHUNK_MB * MB_BYTES;

/// Each window extent is the grid extent divided by this.
pub const WINDOW_DIVISOR: usize = 4;

/// File extension used for generated backing rasters.
pub const RASTER_EXTENSION: &str = "grd";

/// Number of elements of `size` bytes that fit in one chunk.
///
/// Zero-sized elements still get a non-empty chunk.
#[inline]
pub const fn chunk_capacity(elem_size: usize) -> usize {
    if elem_size == 0 {
        1
    } else {
        CHUNK_MB * MB_BYTES / elem_size
    }
}
