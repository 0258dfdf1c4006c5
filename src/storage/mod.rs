//! Storage layer - the persisted raster.
//!
//! This module handles persistent storage:
//! - [`RasterFile`] - Low-level file I/O for rectangular regions
//! - [`RasterHeader`] - On-disk header layout

mod raster_file;
mod raster_header;

pub use raster_file::RasterFile;
pub use raster_header::RasterHeader;
