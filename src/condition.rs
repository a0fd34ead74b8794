use rand::Rng;
use rand_distr::StandardNormal;
use std::str::FromStr;
use tch::Tensor;

/// Distribution a conditional generator draws attribute vectors from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionDistribution {
    /// Independent coordinates in `[-1, 1)`.
    Uniform { dim: usize },
    /// Independent standard normal coordinates.
    Gaussian { dim: usize },
}

impl ConditionDistribution {
    pub fn new(kind: DistributionKind, dim: usize) -> Self {
        match kind {
            DistributionKind::Uniform => Self::Uniform { dim },
            DistributionKind::Gaussian => Self::Gaussian { dim },
        }
    }

    pub fn dim(&self) -> usize {
        match *self {
            Self::Uniform { dim } | Self::Gaussian { dim } => dim,
        }
    }

    /// Draw `m` independent vectors as an `[m, dim]` tensor.
    pub fn sample<R: Rng + ?Sized>(&self, m: usize, rng: &mut R) -> Tensor {
        let len = m * self.dim();
        let data = match self {
            Self::Uniform { .. } => uniform_noise(len, 1., rng),
            Self::Gaussian { .. } => (0..len).map(|_| rng.sample(StandardNormal)).collect(),
        };
        matrix(&data, &[m, self.dim()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    Uniform,
    Gaussian,
}

impl FromStr for DistributionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "gaussian" => Ok(Self::Gaussian),
            _ => Err(format!("unknown condition distribution: {}", s)),
        }
    }
}

/// `len` values of `noise_range * (u * 2 - 1)` with `u` uniform in `[0, 1)`.
pub fn uniform_noise<R: Rng + ?Sized>(len: usize, noise_range: f32, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| noise_range * (rng.gen::<f32>() * 2. - 1.))
        .collect()
}

/// Float tensor with the given shape backed by `data`.
pub fn matrix(data: &[f32], shape: &[usize]) -> Tensor {
    let shape = shape.iter().map(|&s| s as i64).collect::<Vec<_>>();
    Tensor::of_slice(data).view(shape.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn uniform_noise_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = uniform_noise(1000, 0.25, &mut rng);
        assert_eq!(noise.len(), 1000);
        assert!(noise.iter().all(|x| (-0.25f32..0.25).contains(x)));
    }

    #[test]
    fn zero_noise_range_is_all_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(uniform_noise(64, 0., &mut rng).iter().all(|&x| x == 0.));
    }

    #[test]
    fn distribution_sample_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        for kind in [DistributionKind::Uniform, DistributionKind::Gaussian] {
            let dist = ConditionDistribution::new(kind, 30);
            assert_eq!(dist.sample(4, &mut rng).size(), [4, 30]);
        }
    }

    #[test]
    fn parse_distribution_kind() {
        assert_eq!(
            "gaussian".parse::<DistributionKind>(),
            Ok(DistributionKind::Gaussian)
        );
        assert!("beta".parse::<DistributionKind>().is_err());
    }
}
