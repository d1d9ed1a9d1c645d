//! ndarray-backed layer substrate shared by the model architectures

mod activation;
mod conv;
mod linear;
mod norm;
mod pool;
mod recurrent;

pub use activation::{softmax, ReLU};
pub use conv::{conv_output_len, Conv1d, Padding};
pub use linear::{Dropout, Linear};
pub use norm::BatchNorm1d;
pub use pool::{GlobalAvgPool1d, MaxPool1d};
pub use recurrent::{Lstm, LstmCell};
