//! Activation functions

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// ReLU activation function
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReLU;

impl ReLU {
    /// Create a new ReLU layer
    pub fn new() -> Self {
        Self
    }

    /// Forward pass
    pub fn forward(&self, input: &Array3<f32>) -> Array3<f32> {
        input.mapv(|x| x.max(0.0))
    }

    /// Forward pass for 2D input
    pub fn forward_2d(&self, input: &Array2<f32>) -> Array2<f32> {
        input.mapv(|x| x.max(0.0))
    }
}

/// Softmax over the class axis with the max-subtraction trick
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut probs = logits.clone();

    for mut row in probs.rows_mut() {
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp_sum: f32 = row.iter().map(|&x| (x - max).exp()).sum();

        for val in row.iter_mut() {
            *val = (*val - max).exp() / exp_sum;
        }
    }

    probs
}
