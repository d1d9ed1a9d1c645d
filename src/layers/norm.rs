//! Batch normalization over channel lanes

use ndarray::{s, Array1, Array3};
use serde::{Deserialize, Serialize};

/// Batch Normalization 1D
///
/// Normalizes each channel over the batch and temporal axes. Batch
/// statistics are used in training mode, running statistics in eval mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm1d {
    /// Number of features (channels)
    pub num_features: usize,
    /// Scale parameter (gamma)
    pub weight: Array1<f32>,
    /// Shift parameter (beta)
    pub bias: Array1<f32>,
    /// Running mean
    pub running_mean: Array1<f32>,
    /// Running variance
    pub running_var: Array1<f32>,
    /// Small constant for numerical stability
    pub eps: f32,
    /// Momentum for running stats
    pub momentum: f32,
    /// Training mode
    pub training: bool,
}

impl BatchNorm1d {
    /// Create a new BatchNorm1d layer in eval mode
    pub fn new(num_features: usize) -> Self {
        Self {
            num_features,
            weight: Array1::ones(num_features),
            bias: Array1::zeros(num_features),
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            eps: 1e-5,
            momentum: 0.1,
            training: false,
        }
    }

    /// Forward pass
    ///
    /// Input shape: [batch, channels, length]
    pub fn forward(&self, input: &Array3<f32>) -> Array3<f32> {
        assert_eq!(input.shape()[1], self.num_features, "channel count mismatch");

        let mut output = input.clone();

        for c in 0..self.num_features {
            let (mean, var) = if self.training {
                let lane = input.slice(s![.., c, ..]);
                let mean = lane.mean().unwrap_or(0.0);
                let var = lane
                    .mapv(|v| {
                        let d = v - mean;
                        d * d
                    })
                    .mean()
                    .unwrap_or(0.0);
                (mean, var)
            } else {
                (self.running_mean[c], self.running_var[c])
            };

            let std = (var + self.eps).sqrt();
            let w = self.weight[c];
            let b = self.bias[c];

            output
                .slice_mut(s![.., c, ..])
                .mapv_inplace(|v| w * (v - mean) / std + b);
        }

        output
    }

    /// Set training mode
    pub fn set_training(&mut self, mode: bool) {
        self.training = mode;
    }
}
