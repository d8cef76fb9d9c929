//! # Neural Network Layer Modules

// --- Re-export Layer Implementations ---
pub mod reversal;
pub use reversal::FeatureReversalNoise;
