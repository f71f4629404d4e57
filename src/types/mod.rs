//! Common types used across the provider adapters.

pub mod common;
pub mod serde_helpers;

pub use common::*;
