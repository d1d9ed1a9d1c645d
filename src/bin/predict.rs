//! Run a forward pass through one of the sequence classifiers
//!
//! Usage:
//!     cargo run --bin predict -- --arch resnet --classes 3 --seq-len 256

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ndarray::Array3;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ts_models::{Cnn, CnnConfig, LstmClassifier, LstmConfig, ResNet, ResNetConfig};

/// Architecture to build
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Arch {
    Resnet,
    Cnn,
    Lstm,
}

/// Build a classifier and run it on random input
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Architecture
    #[arg(short, long, value_enum, default_value_t = Arch::Resnet)]
    arch: Arch,

    /// Number of output classes
    #[arg(short, long, default_value_t = 2)]
    classes: usize,

    /// Sequence length of the generated input
    #[arg(short, long, default_value_t = 500)]
    seq_len: usize,

    /// Batch size
    #[arg(short, long, default_value_t = 1)]
    batch: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let input = Array3::random((args.batch, 1, args.seq_len), Uniform::new(-1.0f32, 1.0));

    let scores = match args.arch {
        Arch::Resnet => {
            let model = ResNet::from_config(ResNetConfig::new(args.classes))?;
            info!(params = model.num_params(), "built residual cnn");
            model.forward(&input)
        }
        Arch::Cnn => {
            let model = Cnn::from_config(CnnConfig::new(args.seq_len, args.classes))?;
            info!(params = model.num_params(), "built plain cnn");
            model.forward(&input)
        }
        Arch::Lstm => {
            let model = LstmClassifier::from_config(LstmConfig::new(args.classes))?;
            info!(params = model.num_params(), "built lstm classifier");
            model.predict_proba(&input)
        }
    };

    for (i, row) in scores.rows().into_iter().enumerate() {
        let formatted: Vec<String> = row.iter().map(|p| format!("{:.4}", p)).collect();
        println!("sample {}: [{}]", i, formatted.join(", "));
    }

    Ok(())
}
