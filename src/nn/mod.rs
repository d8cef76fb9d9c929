//! # Neural Network Module (`nn`)
//!
//! The `Module` trait layers implement, the execution `Mode` passed into
//! every forward call, and the layer-level error type.

use crate::tensor::{Tensor, TensorError};
use crate::utils::serialization::LayerConfig;
use std::fmt::Debug;

// --- Submodules ---
pub mod modules;

pub use modules::FeatureReversalNoise;

/// Execution mode supplied by the enclosing model for a forward pass.
///
/// Stochastic layers are only active in `Train` mode. Callers that do not
/// track a mode get the default, `Eval`, and see pure inference behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Train,
    #[default]
    Eval,
}

#[derive(thiserror::Error, Debug)]
pub enum LayerError {
    /// Construction was given a parameter outside its valid range. The
    /// message names the parameter and carries the offending value.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// Base trait for all neural network modules (layers, containers, etc.).
///
/// `'static` plus `Send + Sync` so modules can be stored behind
/// `Arc<dyn Module>` and shared across threads.
pub trait Module: Debug + Send + Sync + 'static {
    /// Performs the forward pass for the given execution mode.
    fn forward(&self, input: &Tensor, mode: Mode) -> Result<Tensor, LayerError>;

    /// Stable type name used to look the layer up in a
    /// [`LayerRegistry`](crate::utils::serialization::LayerRegistry) when a
    /// saved model is reloaded.
    fn class_name(&self) -> &'static str;

    /// Serializable configuration, exactly sufficient to reconstruct an
    /// equivalent layer.
    fn get_config(&self) -> LayerConfig;
}
