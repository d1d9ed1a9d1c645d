//! Plain 1-D CNN for sequence classification

use super::config::CnnConfig;
use super::resnet::argmax_rows;
use crate::error::{Error, Result};
use crate::layers::{conv_output_len, softmax, Conv1d, Dropout, Linear, MaxPool1d, Padding, ReLU};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Three-stage valid-convolution CNN with a dropout head
///
/// The input length is fixed at construction: the flatten width of the
/// last conv stage depends on it, so the head dimensions do too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cnn {
    conv1: Conv1d,
    conv2: Conv1d,
    conv3: Conv1d,
    pool2: MaxPool1d,
    pool3: MaxPool1d,
    relu: ReLU,
    fc1: Linear,
    dropout: Dropout,
    fc2: Linear,
    flatten_len: usize,
    /// Model configuration
    pub config: CnnConfig,
}

impl Cnn {
    const CHANNELS: [usize; 4] = [1, 10, 50, 100];
    const KERNEL_SIZE: usize = 3;
    const POOL_SIZE: usize = 3;
    const HIDDEN: usize = 100;

    /// Create a model for sequences of `input_dim` timesteps
    pub fn new(input_dim: usize, num_classes: usize) -> Result<Self> {
        Self::from_config(CnnConfig::new(input_dim, num_classes))
    }

    /// Create a model from a configuration
    ///
    /// Fails when `input_dim` is too short to survive the conv/pool chain.
    pub fn from_config(config: CnnConfig) -> Result<Self> {
        config.validate()?;

        let tail_len = Self::tail_len(config.input_dim)
            .ok_or(Error::SequenceTooShort { input_dim: config.input_dim })?;
        let flatten_len = Self::CHANNELS[3] * tail_len;

        let conv1 = Conv1d::new(Self::CHANNELS[0], Self::CHANNELS[1], Self::KERNEL_SIZE, 1, Padding::Valid, true);
        let conv2 = Conv1d::new(Self::CHANNELS[1], Self::CHANNELS[2], Self::KERNEL_SIZE, 1, Padding::Valid, true);
        let conv3 = Conv1d::new(Self::CHANNELS[2], Self::CHANNELS[3], Self::KERNEL_SIZE, 1, Padding::Valid, true);

        let fc1 = Linear::new(flatten_len, Self::HIDDEN, true);
        let fc2 = Linear::new(Self::HIDDEN, config.num_classes, true);

        debug!(
            input_dim = config.input_dim,
            tail_len,
            flatten_len,
            num_classes = config.num_classes,
            "built plain cnn"
        );

        Ok(Self {
            conv1,
            conv2,
            conv3,
            pool2: MaxPool1d::new(Self::POOL_SIZE),
            pool3: MaxPool1d::new(Self::POOL_SIZE),
            relu: ReLU::new(),
            fc1,
            dropout: Dropout::new(config.dropout),
            fc2,
            flatten_len,
            config,
        })
    }

    /// Sequence length left after the conv/pool chain
    ///
    /// Two valid convolutions, pool, valid convolution, pool; `None` when
    /// the sequence collapses before the end.
    fn tail_len(input_dim: usize) -> Option<usize> {
        conv_output_len(input_dim, Self::KERNEL_SIZE, 1)
            .and_then(|l| conv_output_len(l, Self::KERNEL_SIZE, 1))
            .and_then(|l| conv_output_len(l, Self::POOL_SIZE, Self::POOL_SIZE))
            .and_then(|l| conv_output_len(l, Self::KERNEL_SIZE, 1))
            .and_then(|l| conv_output_len(l, Self::POOL_SIZE, Self::POOL_SIZE))
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch, 1, input_dim]
    ///
    /// # Returns
    ///
    /// Class probabilities of shape [batch, num_classes]; rows sum to 1
    pub fn forward(&self, x: &Array3<f32>) -> Array2<f32> {
        assert_eq!(x.shape()[1], Self::CHANNELS[0], "input channels mismatch");
        assert_eq!(
            x.shape()[2],
            self.config.input_dim,
            "sequence length does not match the configured input_dim"
        );

        let out = self.relu.forward(&self.conv1.forward(x));
        let out = self.relu.forward(&self.pool2.forward(&self.conv2.forward(&out)));
        let out = self.relu.forward(&self.pool3.forward(&self.conv3.forward(&out)));

        let batch_size = out.shape()[0];
        let flat = out
            .into_shape_with_order((batch_size, self.flatten_len))
            .unwrap();

        let hidden = self.relu.forward_2d(&self.dropout.forward(&self.fc1.forward(&flat)));
        softmax(&self.fc2.forward(&hidden))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array3<f32>) -> Vec<usize> {
        argmax_rows(&self.forward(x))
    }

    /// Get total number of parameters
    pub fn num_params(&self) -> usize {
        self.conv1.num_params()
            + self.conv2.num_params()
            + self.conv3.num_params()
            + self.fc1.num_params()
            + self.fc2.num_params()
    }

    /// Set training mode on the dropout layer
    pub fn set_training(&mut self, mode: bool) {
        self.dropout.set_training(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tail_len_for_default_input() {
        // 500 -> 498 -> 496 -> 165 -> 163 -> 54
        assert_eq!(Cnn::tail_len(500), Some(54));
    }

    #[test]
    fn test_flatten_width_for_default_input() {
        let model = Cnn::new(500, 2).unwrap();
        assert_eq!(model.flatten_len, 5400);
    }

    #[test]
    fn test_forward_emits_probabilities() {
        let model = Cnn::new(500, 2).unwrap();
        let input = Array3::ones((2, 1, 500));
        let output = model.forward(&input);

        assert_eq!(output.shape(), &[2, 2]);
        for row in output.rows() {
            let sum: f32 = row.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_shortest_viable_input() {
        // 19 -> 17 -> 15 -> 5 -> 3 -> 1 survives; 18 collapses in the last pool
        assert!(Cnn::new(19, 2).is_ok());
        assert!(matches!(
            Cnn::new(18, 2),
            Err(Error::SequenceTooShort { input_dim: 18 })
        ));
    }

    #[test]
    fn test_predict_len_matches_batch() {
        let model = Cnn::new(100, 3).unwrap();
        let input = Array3::ones((5, 1, 100));
        let predictions = model.predict(&input);
        assert_eq!(predictions.len(), 5);
        assert!(predictions.iter().all(|&p| p < 3));
    }

    #[test]
    fn test_param_count_positive() {
        let model = Cnn::new(500, 2).unwrap();
        assert!(model.num_params() > 0);
    }
}
