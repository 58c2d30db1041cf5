//! Database models for persistent storage.

mod restriction;

pub use restriction::*;
