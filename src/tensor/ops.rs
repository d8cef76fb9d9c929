//! # Tensor Operations

use super::{Tensor, TensorError};

/// Element-wise multiplication of two tensors.
///
/// When the shapes differ, the right-hand side is broadcast to the left-hand
/// shape following ndarray's broadcasting rules. A `(1, n)` mask against a
/// `(batch, n)` input therefore multiplies every batch row by the same mask
/// row.
pub fn mul(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorError> {
    if a.shape() == b.shape() {
        return Ok(Tensor::new(a.data() * b.data()));
    }
    let rhs = b
        .data()
        .broadcast(a.data().raw_dim())
        .ok_or_else(|| TensorError::IncompatibleShapes {
            op: "mul".to_string(),
            shape1: a.shape().to_vec(),
            shape2: b.shape().to_vec(),
        })?;
    Ok(Tensor::new(a.data() * &rhs))
}
