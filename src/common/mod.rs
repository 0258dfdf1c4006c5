//! Common types and utilities shared across rastercache.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - Element types and their on-disk codes
//! - Tier identifiers

pub(crate) mod alloc;
pub mod config;
mod element;
pub mod error;
mod tier;

pub(crate) use element::{decode_into, encode_into};
pub use element::{DataType, Element};
pub use error::{Error, Result};
pub use tier::{Tier, TierMode};
