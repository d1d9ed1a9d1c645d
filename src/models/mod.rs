//! Model architectures

mod cnn;
mod config;
mod lstm;
mod resnet;

pub use cnn::Cnn;
pub use config::{CnnConfig, LstmConfig, ResNetConfig};
pub use lstm::LstmClassifier;
pub use resnet::{ResNet, ResidualBlock};
