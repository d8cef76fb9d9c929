//! # Tensor Module
//!
//! Defines the thin `Tensor` used at the layer boundary: a dense
//! `ndarray`-backed array plus the operations the layers need. There is no
//! gradient tracking here; the layer this crate exists for has no trainable
//! parameters.

use ndarray::{ArrayD, IxDyn};

// --- Submodules ---
pub mod ops;

// --- Error Handling ---
#[derive(thiserror::Error, Debug)]
pub enum TensorError {
    #[error("incompatible shapes for operation {op}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        op: String,
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },
    #[error("ndarray error: {0}")]
    Ndarray(#[from] ndarray::ShapeError),
}

/// Underlying element type for all tensors.
pub type TensorData = f32;

/// The core data structure layers consume and produce.
///
/// Wraps an `ndarray::ArrayD` for storage; shape and dimensionality queries
/// delegate to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: ArrayD<TensorData>,
}

impl Tensor {
    /// Creates a new Tensor from an `ndarray::ArrayD`.
    pub fn new(data: ArrayD<TensorData>) -> Self {
        Tensor { data }
    }

    /// Creates a Tensor with the given shape from a flat row-major vector.
    pub fn from_vec(shape: &[usize], data: Vec<TensorData>) -> Result<Self, TensorError> {
        Ok(Tensor::new(ArrayD::from_shape_vec(IxDyn(shape), data)?))
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Returns the total number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Read-only access to the underlying data.
    pub fn data(&self) -> &ArrayD<TensorData> {
        &self.data
    }
}
