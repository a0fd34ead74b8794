use clap::Parser;
use std::{error::Error, path::PathBuf};

mod condition;
mod config;
mod error;
mod model;
mod sampler;
mod show;

use condition::{ConditionDistribution, DistributionKind};
use config::{
    SampleConfig, DEFAULT_COLS, DEFAULT_CONDITION_DIM, DEFAULT_NOISE_DIM, DEFAULT_NOISE_RANGE,
    DEFAULT_ROWS,
};
use model::{GeneratorConfig, ModelLayout};
use sampler::ConditionalSampler;

/// Sample images from the generative component of a cGAN learned on the LFW/LFWcrop dataset.
#[derive(Parser)]
#[clap(
    name = "lfw-cgan-samples",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
struct Entry {
    /// Model path
    model_path: PathBuf,
    /// Provided model path is a generator only, not a full cGAN
    #[clap(short = 'g', long)]
    model_is_generator_only: bool,
    /// Strategy for drawing condition vectors
    #[clap(
        short = 's',
        long,
        default_value = "fix_random",
        possible_values = &["fix_random", "fix_embeddings"],
    )]
    conditional_sampler: ConditionalSampler,
    /// Embedding table (.npz, array `arr_0`) used by fix_embeddings
    #[clap(short, long)]
    embedding_file: Option<PathBuf>,
    /// Half-width of the uniform noise added to condition vectors
    #[clap(long, default_value_t = DEFAULT_NOISE_RANGE)]
    noise_range: f32,
    /// Base samples, one per grid row
    #[clap(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,
    /// Noisy variants per base sample, one per grid column
    #[clap(long, default_value_t = DEFAULT_COLS)]
    cols: usize,
    /// Generator latent noise size
    #[clap(long, default_value_t = DEFAULT_NOISE_DIM)]
    noise_dim: i64,
    /// Generator condition size
    #[clap(long, default_value_t = DEFAULT_CONDITION_DIM)]
    condition_dim: i64,
    /// Distribution fix_random draws base conditions from
    #[clap(
        long,
        default_value = "uniform",
        possible_values = &["uniform", "gaussian"],
    )]
    condition_distribution: DistributionKind,
    /// Random seed, drawn from the OS when absent
    #[clap(long)]
    seed: Option<u64>,
    /// Output image path
    #[clap(short, long, default_value = "samples.png")]
    output: PathBuf,
    /// Number of grids to render
    #[clap(long, default_value_t = 1)]
    grids: usize,
}

impl From<Entry> for SampleConfig {
    fn from(args: Entry) -> Self {
        let layout = if args.model_is_generator_only {
            ModelLayout::GeneratorOnly
        } else {
            ModelLayout::Full
        };
        Self {
            model_path: args.model_path,
            layout,
            generator: GeneratorConfig {
                noise_dim: args.noise_dim,
                condition_dim: args.condition_dim,
            },
            sampler: args.conditional_sampler,
            distribution: ConditionDistribution::new(
                args.condition_distribution,
                args.condition_dim.max(0) as usize,
            ),
            embedding_file: args.embedding_file,
            noise_range: args.noise_range,
            rows: args.rows,
            cols: args.cols,
            seed: args.seed,
            output: args.output,
            grids: args.grids,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();
    let config = SampleConfig::from(Entry::parse());
    show::show(&config)?;
    Ok(())
}
