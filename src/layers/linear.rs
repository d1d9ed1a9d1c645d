//! Fully connected and dropout layers

use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Linear (Fully Connected) layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linear {
    /// Weight matrix [out_features, in_features]
    pub weight: Array2<f32>,
    /// Bias vector [out_features]
    pub bias: Option<Array1<f32>>,
    /// Input features
    pub in_features: usize,
    /// Output features
    pub out_features: usize,
}

impl Linear {
    /// Create a new Linear layer with random initialization
    pub fn new(in_features: usize, out_features: usize, bias: bool) -> Self {
        let mut rng = rand::thread_rng();
        let std = (1.0 / in_features as f32).sqrt();
        let normal = Normal::new(0.0, std).unwrap();

        let weight = Array2::from_shape_fn((out_features, in_features), |_| rng.sample(normal));

        let bias_arr = if bias {
            Some(Array1::zeros(out_features))
        } else {
            None
        };

        Self {
            weight,
            bias: bias_arr,
            in_features,
            out_features,
        }
    }

    /// Forward pass
    ///
    /// Input shape: [batch, in_features]
    /// Output shape: [batch, out_features]
    pub fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        assert_eq!(input.shape()[1], self.in_features, "feature count mismatch");

        let mut output = input.dot(&self.weight.t());

        if let Some(ref bias) = self.bias {
            for mut row in output.axis_iter_mut(Axis(0)) {
                row += bias;
            }
        }

        output
    }

    /// Get number of parameters
    pub fn num_params(&self) -> usize {
        let weight_params = self.in_features * self.out_features;
        let bias_params = if self.bias.is_some() {
            self.out_features
        } else {
            0
        };
        weight_params + bias_params
    }
}

/// Inverted dropout; identity in eval mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    /// Drop probability
    pub p: f32,
    /// Training mode
    pub training: bool,
}

impl Dropout {
    /// Create a new Dropout layer in eval mode
    pub fn new(p: f32) -> Self {
        Self { p, training: false }
    }

    /// Forward pass
    ///
    /// In training mode surviving activations are scaled by 1 / (1 - p)
    /// so the expected activation is unchanged.
    pub fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        if !self.training || self.p <= 0.0 {
            return input.clone();
        }

        let mut rng = rand::thread_rng();
        let scale = 1.0 / (1.0 - self.p);

        input.mapv(|x| {
            if rng.gen::<f32>() > self.p {
                x * scale
            } else {
                0.0
            }
        })
    }

    /// Set training mode
    pub fn set_training(&mut self, mode: bool) {
        self.training = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_shape() {
        let linear = Linear::new(10, 5, true);
        let input = Array2::ones((2, 10));
        let output = linear.forward(&input);
        assert_eq!(output.shape(), &[2, 5]);
    }

    #[test]
    fn test_linear_known_values() {
        let mut linear = Linear::new(2, 1, true);
        linear.weight = Array2::from_shape_vec((1, 2), vec![2.0, -1.0]).unwrap();
        linear.bias = Some(Array1::from_elem(1, 0.5));

        let input = Array2::from_shape_vec((1, 2), vec![3.0, 4.0]).unwrap();
        let output = linear.forward(&input);

        assert_relative_eq!(output[[0, 0]], 2.5); // 6 - 4 + 0.5
    }

    #[test]
    fn test_dropout_eval_is_identity() {
        let dropout = Dropout::new(0.5);
        let input = Array2::from_elem((2, 4), 3.0);
        let output = dropout.forward(&input);
        assert_eq!(input, output);
    }

    #[test]
    fn test_dropout_training_zeroes_or_scales() {
        let mut dropout = Dropout::new(0.5);
        dropout.set_training(true);

        let input = Array2::from_elem((4, 16), 1.0);
        let output = dropout.forward(&input);

        assert_eq!(output.shape(), &[4, 16]);
        for &v in output.iter() {
            assert!(v == 0.0 || (v - 2.0).abs() < 1e-6);
        }
    }
}
