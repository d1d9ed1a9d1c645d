//! # ts-models
//!
//! A small zoo of neural-network architectures for 1-D sequence and
//! time-series classification: a residual convolutional network, a plain
//! CNN, and an LSTM classifier, all built on an `ndarray`-backed layer
//! substrate.
//!
//! All models consume channels-first input `[batch, channels, length]`
//! and produce per-class scores `[batch, num_classes]`.
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array3;
//! use ts_models::{ResNet, ResNetConfig};
//!
//! let model = ResNet::from_config(ResNetConfig::new(3))?;
//! let input = Array3::<f32>::zeros((1, 1, 120));
//! let probs = model.forward(&input);
//! assert_eq!(probs.shape(), &[1, 3]);
//! # Ok::<(), ts_models::Error>(())
//! ```

pub mod error;
pub mod layers;
pub mod models;

pub use error::{Error, Result};
pub use models::{Cnn, CnnConfig, LstmClassifier, LstmConfig, ResNet, ResNetConfig};
