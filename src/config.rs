use crate::condition::ConditionDistribution;
use crate::error::{invalid_parameter, Error, Result};
use crate::model::{GeneratorConfig, ModelLayout};
use crate::sampler::ConditionalSampler;
use std::path::PathBuf;

pub const DEFAULT_ROWS: usize = 4;
pub const DEFAULT_COLS: usize = 5;
pub const DEFAULT_NOISE_RANGE: f32 = 1.;
pub const DEFAULT_NOISE_DIM: i64 = 100;
/// Width of the LFW attribute embeddings.
pub const DEFAULT_CONDITION_DIM: i64 = 30;

/// Everything one sampling run needs.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub model_path: PathBuf,
    pub layout: ModelLayout,
    pub generator: GeneratorConfig,
    pub sampler: ConditionalSampler,
    pub distribution: ConditionDistribution,
    pub embedding_file: Option<PathBuf>,
    pub noise_range: f32,
    /// Base samples, one per grid row.
    pub rows: usize,
    /// Variants per base sample, one per grid column.
    pub cols: usize,
    pub seed: Option<u64>,
    pub output: PathBuf,
    pub grids: usize,
}

impl SampleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(invalid_parameter("rows", &self.rows, "must be positive"));
        }
        if self.cols == 0 {
            return Err(invalid_parameter("cols", &self.cols, "must be positive"));
        }
        if self.grids == 0 {
            return Err(invalid_parameter("grids", &self.grids, "must be positive"));
        }
        if !self.noise_range.is_finite() || self.noise_range < 0. {
            return Err(invalid_parameter(
                "noise_range",
                &self.noise_range,
                "must be finite and non-negative",
            ));
        }
        if self.generator.noise_dim <= 0 {
            return Err(invalid_parameter(
                "noise_dim",
                &self.generator.noise_dim,
                "must be positive",
            ));
        }
        if self.generator.condition_dim <= 0 {
            return Err(invalid_parameter(
                "condition_dim",
                &self.generator.condition_dim,
                "must be positive",
            ));
        }
        if self.sampler.needs_embeddings() && self.embedding_file.is_none() {
            return Err(Error::MissingEmbeddingFile);
        }
        Ok(())
    }

    /// Destination of grid `index`; numbered only when several grids are rendered.
    pub fn output_path(&self, index: usize) -> PathBuf {
        if self.grids == 1 {
            return self.output.clone();
        }
        let stem = self.output.file_stem().unwrap_or_default().to_string_lossy();
        let name = match self.output.extension() {
            Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
            None => format!("{}_{}", stem, index),
        };
        self.output.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SampleConfig {
        SampleConfig {
            model_path: PathBuf::from("cgan.pt"),
            layout: ModelLayout::Full,
            generator: GeneratorConfig {
                noise_dim: DEFAULT_NOISE_DIM,
                condition_dim: DEFAULT_CONDITION_DIM,
            },
            sampler: ConditionalSampler::FixRandom,
            distribution: ConditionDistribution::Uniform {
                dim: DEFAULT_CONDITION_DIM as usize,
            },
            embedding_file: None,
            noise_range: DEFAULT_NOISE_RANGE,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: None,
            output: PathBuf::from("out/samples.png"),
            grids: 1,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn embeddings_require_file() {
        let mut config = config();
        config.sampler = ConditionalSampler::FixEmbeddings;
        assert!(matches!(config.validate(), Err(Error::MissingEmbeddingFile)));
        config.embedding_file = Some(PathBuf::from("attributes.npz"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_degenerate_grid() {
        let mut config = config();
        config.cols = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { parameter: "cols", .. })
        ));
        let mut config = self::config();
        config.noise_range = -1.;
        assert!(config.validate().is_err());
    }

    #[test]
    fn numbered_outputs() {
        let mut config = config();
        assert_eq!(config.output_path(0), PathBuf::from("out/samples.png"));
        config.grids = 3;
        assert_eq!(config.output_path(2), PathBuf::from("out/samples_2.png"));
        config.output = PathBuf::from("grid");
        assert_eq!(config.output_path(1), PathBuf::from("grid_1"));
    }
}
