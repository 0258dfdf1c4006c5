//! Tier storage backends.
//!
//! Each tier keeps the grid's elements in a different place:
//!
//! # Components
//! - [`LinearBuffer`] - In-memory tier: one contiguous buffer
//! - [`PagedStore`] - Paged tier: fixed-capacity 4 MB chunks
//! - [`DiskBackend`] - Disk tier: persisted raster plus a [`CacheWindow`]
//! - [`WindowStats`] - Disk-tier cache statistics

mod disk_backend;
mod linear;
mod paged;
mod stats;
mod window;

pub use disk_backend::DiskBackend;
pub use linear::LinearBuffer;
pub use paged::PagedStore;
pub use stats::WindowStats;
pub use window::{CacheWindow, WindowRect};
