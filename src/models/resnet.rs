//! Residual 1-D convolutional network for sequence classification

use super::config::ResNetConfig;
use crate::error::Result;
use crate::layers::{softmax, BatchNorm1d, Conv1d, GlobalAvgPool1d, Linear, Padding, ReLU};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Residual block of three same-padded convolutions
///
/// Kernel sizes 5, 3 and 1, each followed by batch norm and ReLU. When the
/// channel count changes, a 1-kernel projection shortcut is added to the
/// stack output; with matching channels the stack output is returned alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualBlock {
    stages: Vec<(Conv1d, BatchNorm1d)>,
    shortcut: Option<(Conv1d, BatchNorm1d)>,
    relu: ReLU,
    /// Number of input channels
    pub in_channels: usize,
    /// Number of output channels
    pub out_channels: usize,
}

impl ResidualBlock {
    const KERNEL_SIZES: [usize; 3] = [5, 3, 1];

    /// Create a new residual block
    pub fn new(in_channels: usize, out_channels: usize) -> Self {
        let channels = [in_channels, out_channels, out_channels, out_channels];

        let stages = Self::KERNEL_SIZES
            .iter()
            .enumerate()
            .map(|(i, &kernel_size)| {
                (
                    Conv1d::new(channels[i], channels[i + 1], kernel_size, 1, Padding::Same, true),
                    BatchNorm1d::new(channels[i + 1]),
                )
            })
            .collect();

        let shortcut = (in_channels != out_channels).then(|| {
            (
                Conv1d::new(in_channels, out_channels, 1, 1, Padding::Same, true),
                BatchNorm1d::new(out_channels),
            )
        });

        Self {
            stages,
            shortcut,
            relu: ReLU::new(),
            in_channels,
            out_channels,
        }
    }

    /// Forward pass, [batch, in_channels, length] -> [batch, out_channels, length]
    pub fn forward(&self, x: &Array3<f32>) -> Array3<f32> {
        let mut out = x.clone();
        for (conv, bn) in &self.stages {
            out = self.relu.forward(&bn.forward(&conv.forward(&out)));
        }

        match &self.shortcut {
            Some((conv, bn)) => &out + &bn.forward(&conv.forward(x)),
            None => out,
        }
    }

    /// Get number of parameters
    pub fn num_params(&self) -> usize {
        let mut params: usize = self
            .stages
            .iter()
            .map(|(conv, bn)| conv.num_params() + bn.num_features * 2)
            .sum();

        if let Some((conv, bn)) = &self.shortcut {
            params += conv.num_params() + bn.num_features * 2;
        }

        params
    }

    /// Set training mode on the batch norm layers
    pub fn set_training(&mut self, mode: bool) {
        for (_, bn) in &mut self.stages {
            bn.set_training(mode);
        }
        if let Some((_, bn)) = &mut self.shortcut {
            bn.set_training(mode);
        }
    }
}

/// Residual CNN classifier
///
/// Three residual blocks widening from `in_channels` to twice the base
/// width, global average pooling over time, and a softmax head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResNet {
    blocks: Vec<ResidualBlock>,
    avgpool: GlobalAvgPool1d,
    fc: Linear,
    /// Model configuration
    pub config: ResNetConfig,
}

impl ResNet {
    /// Create a model with the default topology for `num_classes` outputs
    pub fn new(num_classes: usize) -> Result<Self> {
        Self::from_config(ResNetConfig::new(num_classes))
    }

    /// Create a model from a configuration
    pub fn from_config(config: ResNetConfig) -> Result<Self> {
        config.validate()?;

        let mid = config.mid_channels;
        let blocks = vec![
            ResidualBlock::new(config.in_channels, mid),
            ResidualBlock::new(mid, mid * 2),
            ResidualBlock::new(mid * 2, mid * 2),
        ];

        let fc = Linear::new(mid * 2, config.num_classes, true);

        debug!(
            in_channels = config.in_channels,
            mid_channels = mid,
            num_classes = config.num_classes,
            "built residual cnn"
        );

        Ok(Self {
            blocks,
            avgpool: GlobalAvgPool1d::new(),
            fc,
            config,
        })
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch, in_channels, length]
    ///
    /// # Returns
    ///
    /// Class probabilities of shape [batch, num_classes]; rows sum to 1
    pub fn forward(&self, x: &Array3<f32>) -> Array2<f32> {
        assert_eq!(x.shape()[1], self.config.in_channels, "input channels mismatch");

        let mut out = x.clone();
        for block in &self.blocks {
            out = block.forward(&out);
        }

        let pooled = self.avgpool.forward(&out);
        softmax(&self.fc.forward(&pooled))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array3<f32>) -> Vec<usize> {
        argmax_rows(&self.forward(x))
    }

    /// Get total number of parameters
    pub fn num_params(&self) -> usize {
        self.blocks.iter().map(|b| b.num_params()).sum::<usize>() + self.fc.num_params()
    }

    /// Set training mode
    pub fn set_training(&mut self, mode: bool) {
        for block in &mut self.blocks {
            block.set_training(mode);
        }
    }
}

/// Per-row argmax over a [batch, classes] array
pub(crate) fn argmax_rows(probs: &Array2<f32>) -> Vec<usize> {
    probs
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
        .collect()
}
