//! Grid layer - tier selection and the uniform access API.
//!
//! # Components
//! - [`GridManager`] - The grid itself, dispatching to the active tier
//! - [`GridConfig`] - Construction options
//! - [`select_tier`] - Size-based tier choice

mod manager;
mod options;
mod selector;

pub use manager::GridManager;
pub use options::GridConfig;
pub use selector::select_tier;
