//! # Feature Reversal Noise
//!
//! A single stochastic regularization layer: during training it randomly
//! flips the sign of input features with a target probability, and at
//! inference it is the identity. The crate also carries the small
//! module/tensor seam the layer plugs into and the registry used to rebuild
//! it from a saved configuration.
//!
//! Based on the feature-reversing input noise idea from the Numerai forums:
//! <https://forum.numer.ai/t/feature-reversing-input-noise/1416>

pub mod nn;
pub mod tensor;
pub mod utils;

// Re-export key components for easier use
pub use nn::{FeatureReversalNoise, LayerError, Mode, Module};
pub use tensor::{Tensor, TensorData, TensorError};
pub use utils::serialization::{ConfigValue, LayerConfig, LayerRegistry, SerializationError};
