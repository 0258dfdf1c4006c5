//! Persisted raster header.
//!
//! Every raster file starts with a fixed [`RasterHeader`]:
//! - magic and format version
//! - [`DataType`] of the cells
//! - grid shape
//! - CRC32 checksum for integrity

use crate::common::{DataType, Error, Result};

/// Metadata stored at the beginning of every raster file.
///
/// # Layout (32 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     magic "RGRD"
/// 4       2     version (little-endian)
/// 6       1     data_type (DataType as u8)
/// 7       1     reserved (0)
/// 8       8     rows (little-endian)
/// 16      8     cols (little-endian)
/// 24      4     checksum (CRC32 of bytes 0..24, little-endian)
/// 28      4     reserved (0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterHeader {
    pub data_type: DataType,
    pub rows: usize,
    pub cols: usize,
}

impl RasterHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 32;

    pub const MAGIC: [u8; 4] = *b"RGRD";
    pub const VERSION: u16 = 1;

    const OFFSET_VERSION: usize = 4;
    const OFFSET_DATA_TYPE: usize = 6;
    const OFFSET_ROWS: usize = 8;
    const OFFSET_COLS: usize = 16;
    const OFFSET_CHECKSUM: usize = 24;

    pub fn new(data_type: DataType, rows: usize, cols: usize) -> Self {
        Self {
            data_type,
            rows,
            cols,
        }
    }

    /// Byte offset of cell data within the file.
    #[inline]
    pub const fn data_offset() -> u64 {
        Self::SIZE as u64
    }

    /// Total file length implied by this header.
    pub fn file_len(&self) -> u64 {
        (self.rows as u64)
            .saturating_mul(self.cols as u64)
            .saturating_mul(self.data_type.size() as u64)
            .saturating_add(Self::data_offset())
    }

    /// Serialize, computing the checksum.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[..4].copy_from_slice(&Self::MAGIC);
        buf[Self::OFFSET_VERSION..Self::OFFSET_VERSION + 2]
            .copy_from_slice(&Self::VERSION.to_le_bytes());
        buf[Self::OFFSET_DATA_TYPE] = self.data_type as u8;
        buf[Self::OFFSET_ROWS..Self::OFFSET_ROWS + 8]
            .copy_from_slice(&(self.rows as u64).to_le_bytes());
        buf[Self::OFFSET_COLS..Self::OFFSET_COLS + 8]
            .copy_from_slice(&(self.cols as u64).to_le_bytes());

        let checksum = Self::compute_checksum(&buf);
        buf[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Parse and validate a header.
    ///
    /// # Errors
    /// Returns `Error::CorruptHeader` on bad magic, unknown version or data
    /// type, checksum mismatch, or a shape that does not fit in memory
    /// addressing.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::CorruptHeader(format!(
                "expected {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }
        if data[..4] != Self::MAGIC {
            return Err(Error::CorruptHeader("bad magic".into()));
        }

        let stored = read_u32(data, Self::OFFSET_CHECKSUM);
        let computed = Self::compute_checksum(data);
        if stored != computed {
            return Err(Error::CorruptHeader(format!(
                "checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored, computed
            )));
        }

        let version = u16::from_le_bytes([
            data[Self::OFFSET_VERSION],
            data[Self::OFFSET_VERSION + 1],
        ]);
        if version != Self::VERSION {
            return Err(Error::CorruptHeader(format!("unsupported version {}", version)));
        }

        let code = data[Self::OFFSET_DATA_TYPE];
        let data_type = DataType::from_u8(code)
            .ok_or_else(|| Error::CorruptHeader(format!("unknown data type {}", code)))?;

        let rows = to_usize(read_u64(data, Self::OFFSET_ROWS))?;
        let cols = to_usize(read_u64(data, Self::OFFSET_COLS))?;
        rows.checked_mul(cols)
            .ok_or_else(|| Error::CorruptHeader(format!("shape {}x{} overflows", rows, cols)))?;

        Ok(Self {
            data_type,
            rows,
            cols,
        })
    }

    /// CRC32 over the header fields preceding the checksum.
    pub fn compute_checksum(data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&data[..Self::OFFSET_CHECKSUM]);
        hasher.finalize()
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::CorruptHeader(format!("dimension {} too large", value)))
}
