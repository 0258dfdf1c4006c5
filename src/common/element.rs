//! Element types storable in a grid.

use std::fmt;

/// On-disk type code of a persisted raster.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation in the raster
/// header. Codes follow the common raster numbering (byte = 1 ... float64 = 7).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    UInt8 = 1,
    UInt16 = 2,
    Int16 = 3,
    UInt32 = 4,
    Int32 = 5,
    Float32 = 6,
    Float64 = 7,
}

impl DataType {
    /// Convert from u8, returning `None` for unknown codes.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(DataType::UInt8),
            2 => Some(DataType::UInt16),
            3 => Some(DataType::Int16),
            4 => Some(DataType::UInt32),
            5 => Some(DataType::Int32),
            6 => Some(DataType::Float32),
            7 => Some(DataType::Float64),
            _ => None,
        }
    }

    /// Size of one cell in bytes.
    pub fn size(self) -> usize {
        match self {
            DataType::UInt8 => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::Float64 => 8,
        }
    }
}

/// A scalar that can live in a grid and in a persisted raster.
///
/// `Default` must be the type's zero; it is the fill value when none is given.
///
/// # Example
/// ```
/// use rastercache::{DataType, Element};
///
/// assert_eq!(<i32 as Element>::DATA_TYPE, DataType::Int32);
///
/// let mut buf = [0u8; 4];
/// 42i32.write_le(&mut buf);
/// assert_eq!(i32::read_le(&buf), 42);
/// ```
pub trait Element: Copy + PartialEq + Default + fmt::Debug + Send + 'static {
    /// Type code recorded in the persisted raster.
    const DATA_TYPE: DataType;

    /// Encoded size in bytes; always `DATA_TYPE.size()`.
    const SIZE: usize;

    /// Encode into exactly `SIZE` little-endian bytes.
    fn write_le(self, out: &mut [u8]);

    /// Decode from exactly `SIZE` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $code:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DATA_TYPE: DataType = DataType::$code;
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element! {
    u8 => UInt8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    f32 => Float32,
    f64 => Float64,
}

/// Encode a slice of elements into a byte buffer of `src.len() * T::SIZE`.
pub(crate) fn encode_into<T: Element>(src: &[T], out: &mut [u8]) {
    for (value, chunk) in src.iter().zip(out.chunks_exact_mut(T::SIZE)) {
        value.write_le(chunk);
    }
}

/// Decode a byte buffer into a slice of elements.
pub(crate) fn decode_into<T: Element>(bytes: &[u8], dst: &mut [T]) {
    for (slot, chunk) in dst.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
        *slot = T::read_le(chunk);
    }
}
