//! rastercache - tiered storage for large fixed-shape 2D rasters.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          rastercache                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Grid Layer (grid/)                       │   │
//! │  │   GridManager: tier selection, fallback, uniform API     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Tier Backends (buffer/)                  │   │
//! │  │   ┌─────────────┐  ┌─────────────┐  ┌────────────────┐   │   │
//! │  │   │LinearBuffer │  │ PagedStore  │  │  DiskBackend   │   │   │
//! │  │   │  < 100 MB   │  │ 100..300 MB │  │ + CacheWindow  │   │   │
//! │  │   └─────────────┘  └─────────────┘  └────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │          RasterFile + RasterHeader (persisted raster)    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Error, Element, Tier, config)
//! - [`grid`] - The grid manager and its configuration
//! - `buffer` - Per-tier storage backends and the cache window (internal)
//! - [`storage`] - The persisted raster file
//!
//! # Quick Start
//! ```no_run
//! use rastercache::{GridConfig, GridManager, TierMode};
//!
//! // A disk-backed grid whose window is written back on eviction.
//! let mut grid = GridManager::new(
//!     GridConfig::<f32>::new(20_000, 20_000)
//!         .need_sync(true)
//!         .tier(TierMode::DISK),
//! )?;
//!
//! grid.set_at(19_999, 19_999, 1.5)?;
//! grid.flush()?;
//! # Ok::<(), rastercache::Error>(())
//! ```

pub(crate) mod buffer;
pub mod common;
pub mod grid;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::{DataType, Element, Error, Result, Tier, TierMode};

pub use buffer::{WindowRect, WindowStats};
pub use grid::{GridConfig, GridManager};
pub use storage::RasterFile;
