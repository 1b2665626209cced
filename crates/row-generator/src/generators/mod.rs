//! Individual value generators used to fill lookup tables.
//!
//! Each generator draws from the caller's RNG so that a context built from
//! the same seed always holds the same tables.

pub mod bounded;
pub mod ip;
pub mod strings;
pub mod timestamp;
pub mod uuid;
