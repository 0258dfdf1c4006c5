//! Fallible buffer allocation.
//!
//! Every tier allocates through [`try_filled_vec`] so that an allocator
//! refusal surfaces as [`Error::AllocationFailed`] instead of aborting the
//! process. An optional byte budget makes the same failure reproducible.

use crate::common::{Error, Result, Tier};

/// Bytes needed for `len` elements of `T`, failing on overflow.
pub(crate) fn byte_len<T>(len: usize, tier: Tier) -> Result<usize> {
    len.checked_mul(std::mem::size_of::<T>())
        .ok_or(Error::AllocationFailed {
            tier,
            bytes: usize::MAX,
        })
}

/// Reject `bytes` if it exceeds the configured budget.
pub(crate) fn check_budget(bytes: usize, budget: Option<usize>, tier: Tier) -> Result<()> {
    match budget {
        Some(limit) if bytes > limit => Err(Error::AllocationFailed { tier, bytes }),
        _ => Ok(()),
    }
}

/// Allocate exactly `len` elements, all set to `value`.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T, tier: Tier) -> Result<Vec<T>> {
    let bytes = byte_len::<T>(len, tier)?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed { tier, bytes })?;
    buf.resize(len, value);
    Ok(buf)
}

/// Allocate an owned copy of `src`.
pub(crate) fn try_copy_vec<T: Clone>(src: &[T], tier: Tier) -> Result<Vec<T>> {
    let bytes = byte_len::<T>(src.len(), tier)?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| Error::AllocationFailed { tier, bytes })?;
    buf.extend_from_slice(src);
    Ok(buf)
}
