//! # Utilities

pub mod serialization;
