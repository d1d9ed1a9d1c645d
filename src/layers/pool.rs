//! Pooling layers

use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

/// Max Pooling 1D
///
/// A bare kernel size pools with stride equal to the kernel, matching the
/// usual framework default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPool1d {
    /// Kernel size
    pub kernel_size: usize,
    /// Stride
    pub stride: usize,
    /// Padding
    pub padding: usize,
}

impl MaxPool1d {
    /// Create a new MaxPool1d with stride equal to the kernel size
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel_size,
            stride: kernel_size,
            padding: 0,
        }
    }

    /// Set the stride
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Set the padding
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Forward pass
    ///
    /// Input shape: [batch, channels, length]
    pub fn forward(&self, input: &Array3<f32>) -> Array3<f32> {
        let (batch_size, channels, in_len) = input.dim();
        assert!(
            in_len + 2 * self.padding >= self.kernel_size,
            "input of length {} is shorter than the pooling kernel {}",
            in_len,
            self.kernel_size
        );

        let out_len = (in_len + 2 * self.padding - self.kernel_size) / self.stride + 1;
        let mut output = Array3::from_elem((batch_size, channels, out_len), f32::NEG_INFINITY);

        for b in 0..batch_size {
            for c in 0..channels {
                for ol in 0..out_len {
                    let start = ol * self.stride;

                    for k in 0..self.kernel_size {
                        let idx = (start + k) as i64 - self.padding as i64;
                        if idx >= 0 && (idx as usize) < in_len {
                            output[[b, c, ol]] =
                                output[[b, c, ol]].max(input[[b, c, idx as usize]]);
                        }
                    }
                }
            }
        }

        output
    }
}

/// Global average pooling over the temporal axis, [batch, c, l] -> [batch, c]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GlobalAvgPool1d;

impl GlobalAvgPool1d {
    /// Create a new GlobalAvgPool1d layer
    pub fn new() -> Self {
        Self
    }

    /// Forward pass
    pub fn forward(&self, input: &Array3<f32>) -> Array2<f32> {
        assert!(input.shape()[2] > 0, "cannot average an empty sequence");
        input.mean_axis(Axis(2)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_maxpool_shape_and_values() {
        let pool = MaxPool1d::new(3);
        let input =
            Array3::from_shape_vec((1, 1, 9), (0..9).map(|v| v as f32).collect()).unwrap();
        let output = pool.forward(&input);

        assert_eq!(output.shape(), &[1, 1, 3]);
        assert_eq!(output[[0, 0, 0]], 2.0);
        assert_eq!(output[[0, 0, 1]], 5.0);
        assert_eq!(output[[0, 0, 2]], 8.0);
    }

    #[test]
    fn test_maxpool_custom_stride() {
        let pool = MaxPool1d::new(2).with_stride(1);
        let input = Array3::ones((1, 2, 10));
        let output = pool.forward(&input);
        assert_eq!(output.shape(), &[1, 2, 9]);
    }

    #[test]
    fn test_global_avg_pool() {
        let pool = GlobalAvgPool1d::new();
        let input =
            Array3::from_shape_vec((1, 2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let output = pool.forward(&input);

        assert_eq!(output.shape(), &[1, 2]);
        assert_relative_eq!(output[[0, 0]], 2.0);
        assert_relative_eq!(output[[0, 1]], 5.0);
    }
}
