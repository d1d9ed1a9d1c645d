//! Model configurations

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the residual 1-D CNN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResNetConfig {
    /// Number of input channels
    pub in_channels: usize,
    /// Channel width of the first block; later blocks use twice this
    pub mid_channels: usize,
    /// Number of output classes
    pub num_classes: usize,
}

impl ResNetConfig {
    /// Create a configuration with the default univariate topology
    pub fn new(num_classes: usize) -> Self {
        Self {
            in_channels: 1,
            mid_channels: 10,
            num_classes,
        }
    }

    /// Set the number of input channels
    pub fn with_in_channels(mut self, in_channels: usize) -> Self {
        self.in_channels = in_channels;
        self
    }

    /// Set the base channel width
    pub fn with_mid_channels(mut self, mid_channels: usize) -> Self {
        self.mid_channels = mid_channels;
        self
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.in_channels == 0 {
            return Err(Error::Config("in_channels must be non-zero".into()));
        }
        if self.mid_channels == 0 {
            return Err(Error::Config("mid_channels must be non-zero".into()));
        }
        if self.num_classes == 0 {
            return Err(Error::Config("num_classes must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for ResNetConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Configuration for the plain 1-D CNN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CnnConfig {
    /// Fixed input sequence length; the flatten width is derived from it
    pub input_dim: usize,
    /// Number of output classes
    pub num_classes: usize,
    /// Drop probability in the fully connected head
    pub dropout: f32,
}

impl CnnConfig {
    /// Create a configuration for a given input length
    pub fn new(input_dim: usize, num_classes: usize) -> Self {
        Self {
            input_dim,
            num_classes,
            dropout: 0.5,
        }
    }

    /// Set the head dropout probability
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.input_dim == 0 {
            return Err(Error::Config("input_dim must be non-zero".into()));
        }
        if self.num_classes == 0 {
            return Err(Error::Config("num_classes must be non-zero".into()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(Error::Config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self::new(500, 2)
    }
}

/// Configuration for the LSTM classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmConfig {
    /// Number of input features per timestep
    pub input_size: usize,
    /// Hidden state size
    pub hidden_size: usize,
    /// Number of stacked LSTM layers
    pub num_layers: usize,
    /// Number of output classes
    pub num_classes: usize,
}

impl LstmConfig {
    /// Create a configuration with the default univariate topology
    pub fn new(num_classes: usize) -> Self {
        Self {
            input_size: 1,
            hidden_size: 25,
            num_layers: 2,
            num_classes,
        }
    }

    /// Set the number of input features per timestep
    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size;
        self
    }

    /// Set the hidden state size
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// Set the number of stacked layers
    pub fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::Config("input_size must be non-zero".into()));
        }
        if self.hidden_size == 0 {
            return Err(Error::Config("hidden_size must be non-zero".into()));
        }
        if self.num_layers == 0 {
            return Err(Error::Config("num_layers must be non-zero".into()));
        }
        if self.num_classes == 0 {
            return Err(Error::Config("num_classes must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resnet_config_builder() {
        let config = ResNetConfig::new(3)
            .with_in_channels(4)
            .with_mid_channels(16);

        assert_eq!(config.in_channels, 4);
        assert_eq!(config.mid_channels, 16);
        assert_eq!(config.num_classes, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cnn_config_defaults() {
        let config = CnnConfig::default();
        assert_eq!(config.input_dim, 500);
        assert_eq!(config.num_classes, 2);
        assert_eq!(config.dropout, 0.5);
    }

    #[test]
    fn test_lstm_config_defaults() {
        let config = LstmConfig::default();
        assert_eq!(config.input_size, 1);
        assert_eq!(config.hidden_size, 25);
        assert_eq!(config.num_layers, 2);
    }

    #[test]
    fn test_validation_rejects_zero_classes() {
        assert!(ResNetConfig::new(0).validate().is_err());
        assert!(CnnConfig::new(500, 0).validate().is_err());
        assert!(LstmConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_dropout() {
        assert!(CnnConfig::new(500, 2).with_dropout(1.0).validate().is_err());
        assert!(CnnConfig::new(500, 2).with_dropout(-0.1).validate().is_err());
        assert!(CnnConfig::new(500, 2).with_dropout(0.0).validate().is_ok());
    }
}
