//! LSTM classifier for sequence data

use super::config::LstmConfig;
use super::resnet::argmax_rows;
use crate::error::Result;
use crate::layers::{softmax, Linear, Lstm};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stacked LSTM with a linear head over the final hidden state
///
/// Unlike the convolutional models this classifier emits raw logits;
/// callers wanting probabilities go through [`LstmClassifier::predict_proba`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmClassifier {
    lstm: Lstm,
    fc: Linear,
    /// Model configuration
    pub config: LstmConfig,
}

impl LstmClassifier {
    /// Create a model with the default topology for `num_classes` outputs
    pub fn new(num_classes: usize) -> Result<Self> {
        Self::from_config(LstmConfig::new(num_classes))
    }

    /// Create a model from a configuration
    pub fn from_config(config: LstmConfig) -> Result<Self> {
        config.validate()?;

        let lstm = Lstm::new(config.input_size, config.hidden_size, config.num_layers);
        let fc = Linear::new(config.hidden_size, config.num_classes, true);

        debug!(
            input_size = config.input_size,
            hidden_size = config.hidden_size,
            num_layers = config.num_layers,
            num_classes = config.num_classes,
            "built lstm classifier"
        );

        Ok(Self { lstm, fc, config })
    }

    /// Forward pass
    ///
    /// Accepts either channels-first input `[batch, input_size, seq_len]`
    /// (the layout the convolutional models use) or batch-first input
    /// `[batch, seq_len, input_size]`; channels-first is transposed before
    /// stepping.
    ///
    /// # Returns
    ///
    /// Raw logits of shape [batch, num_classes]
    pub fn forward(&self, x: &Array3<f32>) -> Array2<f32> {
        let input_size = self.config.input_size;

        let hidden = if x.shape()[2] == input_size {
            self.lstm.forward(x)
        } else {
            assert_eq!(
                x.shape()[1],
                input_size,
                "neither axis of the input matches input_size"
            );
            let seq = x.clone().permuted_axes([0, 2, 1]);
            self.lstm.forward(&seq)
        };

        self.fc.forward(&hidden)
    }

    /// Predict class probabilities
    pub fn predict_proba(&self, x: &Array3<f32>) -> Array2<f32> {
        softmax(&self.forward(x))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array3<f32>) -> Vec<usize> {
        argmax_rows(&self.forward(x))
    }

    /// Get total number of parameters
    pub fn num_params(&self) -> usize {
        self.lstm.num_params() + self.fc.num_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    #[test]
    fn test_forward_shape_batch_first() {
        let model = LstmClassifier::new(3).unwrap();
        let input = Array3::zeros((2, 30, 1));
        let output = model.forward(&input);
        assert_eq!(output.shape(), &[2, 3]);
    }

    #[test]
    fn test_channels_first_matches_batch_first() {
        let model = LstmClassifier::new(2).unwrap();

        let channels_first =
            Array3::from_shape_fn((2, 1, 20), |(b, _, t)| (b * 20 + t) as f32 * 0.01);
        let batch_first = channels_first.clone().permuted_axes([0, 2, 1]).to_owned();

        let out_cf = model.forward(&channels_first);
        let out_bf = model.forward(&batch_first);

        for (a, b) in out_cf.iter().zip(out_bf.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let model = LstmClassifier::new(4).unwrap();
        let input = Array3::ones((3, 1, 15));
        let probs = model.predict_proba(&input);

        assert_eq!(probs.shape(), &[3, 4]);
        for row in probs.rows() {
            let sum: f32 = row.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_multivariate_input() {
        let config = LstmConfig::new(2).with_input_size(4).with_hidden_size(16);
        let model = LstmClassifier::from_config(config).unwrap();

        let input = Array3::zeros((1, 10, 4));
        let output = model.forward(&input);
        assert_eq!(output.shape(), &[1, 2]);
    }

    #[test]
    fn test_param_count() {
        let model = LstmClassifier::new(2).unwrap();
        // 2 layers of 4-gate cells plus the linear head
        let cell0 = 4 * (25 * 1 + 25 * 25 + 25);
        let cell1 = 4 * (25 * 25 + 25 * 25 + 25);
        assert_eq!(model.num_params(), cell0 + cell1 + (25 * 2 + 2));
    }
}
