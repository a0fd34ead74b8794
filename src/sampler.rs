//! Strategies for building the conditioning batch fed to the generator.
//!
//! Both strategies return `m * n` rows grouped by base sample: row `i * n + j`
//! is the `j`-th variant of base vector `i`.
use crate::condition::{matrix, uniform_noise, ConditionDistribution};
use crate::error::{invalid_parameter, Error, Result};
use rand::{seq::SliceRandom, Rng};
use std::{path::Path, str::FromStr};
use tch::{Kind, Tensor};

/// Archive entry holding the table, as written by `numpy.savez`.
const EMBEDDING_KEY: &str = "arr_0";

/// Population of real conditioning vectors, `[population, dim]`.
#[derive(Debug)]
pub struct EmbeddingTable {
    values: Tensor,
}

impl EmbeddingTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries = Tensor::read_npz(path).map_err(|source| Error::EmbeddingLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |reason: String| Error::InvalidEmbeddingTable {
            path: path.to_path_buf(),
            reason,
        };
        let (_, values) = entries
            .into_iter()
            .find(|(name, _)| name.trim_end_matches(".npy") == EMBEDDING_KEY)
            .ok_or_else(|| invalid(format!("missing array '{}'", EMBEDDING_KEY)))?;
        Self::from_tensor(values).map_err(invalid)
    }

    pub fn from_tensor(values: Tensor) -> std::result::Result<Self, String> {
        match values.size().as_slice() {
            [_, _] => Ok(Self {
                values: values.to_kind(Kind::Float),
            }),
            shape => Err(format!("expected a 2-D array, got shape {:?}", shape)),
        }
    }

    pub fn population(&self) -> usize {
        self.values.size()[0] as usize
    }

    pub fn dim(&self) -> usize {
        self.values.size()[1] as usize
    }

    pub fn values(&self) -> &Tensor {
        &self.values
    }
}

/// Draw `m` vectors from `distribution` and perturb `n` copies of each.
///
/// Every copy receives independent uniform noise in `[-noise_range, noise_range)`,
/// so no row of the output equals its base draw unless `noise_range` is zero.
pub fn sample_conditional_fix_random<R: Rng + ?Sized>(
    distribution: &ConditionDistribution,
    m: usize,
    n: usize,
    noise_range: f32,
    rng: &mut R,
) -> Tensor {
    let dim = distribution.dim();
    let copies = distribution
        .sample(m, rng)
        .unsqueeze(1)
        .repeat(&[1, n as i64, 1]);
    let noise = matrix(&uniform_noise(m * n * dim, noise_range, rng), &[m, n, dim]);
    (copies + noise).view([(m * n) as i64, dim as i64])
}

/// Pick `m` random rows of `table`; each group starts with the row itself
/// followed by `n - 1` perturbed copies.
pub fn sample_conditional_fix_embeddings<R: Rng + ?Sized>(
    table: &EmbeddingTable,
    m: usize,
    n: usize,
    noise_range: f32,
    rng: &mut R,
) -> Result<Tensor> {
    if n == 0 {
        return Err(invalid_parameter(
            "n",
            &n,
            "each group needs its unperturbed row",
        ));
    }
    let population = table.population();
    if m > population {
        return Err(Error::InsufficientEmbeddings {
            requested: m,
            population,
        });
    }
    let dim = table.dim();

    let mut order = (0..population as i64).collect::<Vec<_>>();
    order.shuffle(rng);
    order.truncate(m);
    let source = table
        .values()
        .index_select(0, &Tensor::of_slice(&order))
        .unsqueeze(1);

    let variants = n - 1;
    let noise = matrix(
        &uniform_noise(m * variants * dim, noise_range, rng),
        &[m, variants, dim],
    );
    let noisy = source.repeat(&[1, variants as i64, 1]) + noise;
    Ok(Tensor::cat(&[source, noisy], 1)
        .view([(m * n) as i64, dim as i64])
        .to_kind(Kind::Float))
}

/// Named conditioning strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalSampler {
    FixRandom,
    FixEmbeddings,
}

pub const CONDITIONAL_SAMPLERS: [(&str, ConditionalSampler); 2] = [
    ("fix_random", ConditionalSampler::FixRandom),
    ("fix_embeddings", ConditionalSampler::FixEmbeddings),
];

/// What a strategy may draw from.
pub struct ConditionSource<'a> {
    pub distribution: &'a ConditionDistribution,
    pub embeddings: Option<&'a EmbeddingTable>,
}

impl ConditionalSampler {
    pub fn name(self) -> &'static str {
        match self {
            Self::FixRandom => "fix_random",
            Self::FixEmbeddings => "fix_embeddings",
        }
    }

    pub fn needs_embeddings(self) -> bool {
        self == Self::FixEmbeddings
    }

    pub fn sample<R: Rng + ?Sized>(
        self,
        source: &ConditionSource<'_>,
        m: usize,
        n: usize,
        noise_range: f32,
        rng: &mut R,
    ) -> Result<Tensor> {
        match self {
            Self::FixRandom => Ok(sample_conditional_fix_random(
                source.distribution,
                m,
                n,
                noise_range,
                rng,
            )),
            Self::FixEmbeddings => {
                let table = source.embeddings.ok_or(Error::MissingEmbeddingFile)?;
                sample_conditional_fix_embeddings(table, m, n, noise_range, rng)
            }
        }
    }
}

impl FromStr for ConditionalSampler {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CONDITIONAL_SAMPLERS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, sampler)| sampler)
            .ok_or_else(|| format!("unknown conditional sampler: {}", s))
    }
}
