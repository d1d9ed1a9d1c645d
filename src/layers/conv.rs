//! 1D convolution with valid, explicit and "same" padding

use ndarray::{s, Array1, Array3};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Padding mode for [`Conv1d`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    /// No padding
    Valid,
    /// Symmetric zero padding on both ends
    Explicit(usize),
    /// TensorFlow-style "same" padding. At stride 1 the output keeps the
    /// input length for any kernel size and dilation. When the required
    /// padding total is odd, the extra zero goes on the right.
    Same,
}

/// 1D convolutional layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv1d {
    /// Weight tensor [out_channels, in_channels, kernel_size]
    pub weight: Array3<f32>,
    /// Bias vector [out_channels]
    pub bias: Option<Array1<f32>>,
    /// Input channels
    pub in_channels: usize,
    /// Output channels
    pub out_channels: usize,
    /// Kernel size
    pub kernel_size: usize,
    /// Stride
    pub stride: usize,
    /// Dilation factor
    pub dilation: usize,
    /// Padding mode
    pub padding: Padding,
}

impl Conv1d {
    /// Create a new Conv1d layer with He initialization
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        bias: bool,
    ) -> Self {
        let mut rng = rand::thread_rng();
        let std = (2.0 / (in_channels * kernel_size) as f32).sqrt();
        let normal = Normal::new(0.0, std).unwrap();

        let weight = Array3::from_shape_fn((out_channels, in_channels, kernel_size), |_| {
            rng.sample(normal)
        });

        let bias_arr = if bias {
            Some(Array1::zeros(out_channels))
        } else {
            None
        };

        Self {
            weight,
            bias: bias_arr,
            in_channels,
            out_channels,
            kernel_size,
            stride,
            dilation: 1,
            padding,
        }
    }

    /// Set the dilation factor
    pub fn with_dilation(mut self, dilation: usize) -> Self {
        self.dilation = dilation;
        self
    }

    /// Span of the dilated kernel over the input
    fn kernel_span(&self) -> usize {
        self.dilation * (self.kernel_size - 1) + 1
    }

    /// Zero padding added to the (left, right) ends of the sequence
    fn pad_amounts(&self, input_len: usize) -> (usize, usize) {
        match self.padding {
            Padding::Valid => (0, 0),
            Padding::Explicit(p) => (p, p),
            Padding::Same => {
                // total = (l - 1) * stride - l + dilation * (k - 1) + 1,
                // with an odd remainder padded on the right
                let needed = input_len.saturating_sub(1) * self.stride + self.kernel_span();
                let total = needed.saturating_sub(input_len);
                (total / 2, total - total / 2)
            }
        }
    }

    /// Output length for a given input length
    pub fn output_len(&self, input_len: usize) -> usize {
        let (left, right) = self.pad_amounts(input_len);
        let padded = input_len + left + right;
        assert!(
            padded >= self.kernel_span(),
            "input of length {} is shorter than the dilated kernel span {}",
            input_len,
            self.kernel_span()
        );
        (padded - self.kernel_span()) / self.stride + 1
    }

    /// Forward pass
    ///
    /// Input shape: [batch, in_channels, length]
    /// Output shape: [batch, out_channels, output_len]
    pub fn forward(&self, input: &Array3<f32>) -> Array3<f32> {
        let (batch_size, in_channels, input_len) = input.dim();
        assert_eq!(in_channels, self.in_channels, "input channels mismatch");

        let (left, right) = self.pad_amounts(input_len);
        let out_len = self.output_len(input_len);

        // Materialize the padded input once, then convolve without bounds checks
        let mut padded = Array3::zeros((batch_size, in_channels, input_len + left + right));
        padded
            .slice_mut(s![.., .., left..left + input_len])
            .assign(input);

        let mut output = Array3::zeros((batch_size, self.out_channels, out_len));

        for b in 0..batch_size {
            for oc in 0..self.out_channels {
                for ol in 0..out_len {
                    let start = ol * self.stride;
                    let mut acc = match &self.bias {
                        Some(bias) => bias[oc],
                        None => 0.0,
                    };

                    for ic in 0..self.in_channels {
                        for k in 0..self.kernel_size {
                            acc += padded[[b, ic, start + k * self.dilation]]
                                * self.weight[[oc, ic, k]];
                        }
                    }

                    output[[b, oc, ol]] = acc;
                }
            }
        }

        output
    }

    /// Get number of parameters
    pub fn num_params(&self) -> usize {
        let weight_params = self.out_channels * self.in_channels * self.kernel_size;
        let bias_params = if self.bias.is_some() {
            self.out_channels
        } else {
            0
        };
        weight_params + bias_params
    }
}

/// Output length of an unpadded, undilated convolution or pooling step.
///
/// Returns `None` when the input is shorter than the kernel.
pub fn conv_output_len(input_len: usize, kernel_size: usize, stride: usize) -> Option<usize> {
    let reduced = input_len.checked_sub(kernel_size)?;
    Some(reduced / stride + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_conv_shape() {
        let conv = Conv1d::new(2, 4, 3, 1, Padding::Valid, true);
        let input = Array3::ones((1, 2, 10));
        let output = conv.forward(&input);
        assert_eq!(output.shape(), &[1, 4, 8]);
    }

    #[test]
    fn test_explicit_padding_shape() {
        let conv = Conv1d::new(2, 4, 3, 1, Padding::Explicit(1), true);
        let input = Array3::ones((1, 2, 10));
        let output = conv.forward(&input);
        assert_eq!(output.shape(), &[1, 4, 10]);
    }

    #[test]
    fn test_same_padding_preserves_length() {
        for kernel_size in [1, 3, 5, 7] {
            let conv = Conv1d::new(1, 2, kernel_size, 1, Padding::Same, true);
            let input = Array3::ones((1, 1, 17));
            let output = conv.forward(&input);
            assert_eq!(output.shape(), &[1, 2, 17], "kernel {}", kernel_size);
        }
    }

    #[test]
    fn test_same_padding_with_dilation() {
        let conv = Conv1d::new(1, 1, 3, 1, Padding::Same, true).with_dilation(4);
        let input = Array3::ones((1, 1, 20));
        let output = conv.forward(&input);
        assert_eq!(output.shape(), &[1, 1, 20]);
    }

    #[test]
    fn test_same_padding_odd_total_pads_right() {
        // Kernel 2 at stride 1 needs one padding zero; it must land on the right
        let mut conv = Conv1d::new(1, 1, 2, 1, Padding::Same, false);
        conv.weight = Array3::ones((1, 1, 2));

        let input = Array3::from_shape_vec((1, 1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let output = conv.forward(&input);

        assert_eq!(output.shape(), &[1, 1, 3]);
        assert_eq!(output[[0, 0, 0]], 3.0); // 1 + 2
        assert_eq!(output[[0, 0, 1]], 5.0); // 2 + 3
        assert_eq!(output[[0, 0, 2]], 3.0); // 3 + right zero
    }

    #[test]
    fn test_known_convolution_values() {
        let mut conv = Conv1d::new(1, 1, 1, 1, Padding::Valid, false);
        conv.weight = Array3::from_elem((1, 1, 1), 2.0);

        let input = Array3::from_shape_vec((1, 1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let output = conv.forward(&input);

        assert_eq!(output[[0, 0, 0]], 2.0);
        assert_eq!(output[[0, 0, 1]], 4.0);
        assert_eq!(output[[0, 0, 2]], 6.0);
    }

    #[test]
    fn test_conv_output_len() {
        assert_eq!(conv_output_len(500, 3, 1), Some(498));
        assert_eq!(conv_output_len(496, 3, 3), Some(165));
        assert_eq!(conv_output_len(5, 3, 3), Some(1));
        assert_eq!(conv_output_len(3, 3, 1), Some(1));
        assert_eq!(conv_output_len(2, 3, 1), None);
    }
}
