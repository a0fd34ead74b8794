use crate::condition::{matrix, uniform_noise};
use crate::error::{invalid_parameter, Error, Result};
use rand::Rng;
use std::path::Path;
use tch::{nn, Device, Kind, Tensor};

pub const IMG_SIZE: i64 = 32;
pub const CHANNELS: i64 = 3;

/// Variable prefix of the generator inside a full cGAN checkpoint.
const GENERATOR_PREFIX: &str = "generator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub noise_dim: i64,
    pub condition_dim: i64,
}

/// Where the generator variables live in a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelLayout {
    /// Full cGAN: generator under `generator.`, discriminator alongside.
    Full,
    /// Generator variables at the root.
    GeneratorOnly,
}

fn tr2d(p: nn::Path, c_in: i64, c_out: i64, padding: i64, stride: i64) -> nn::ConvTranspose2D {
    let cfg = nn::ConvTransposeConfig {
        stride,
        padding,
        bias: false,
        ..Default::default()
    };
    nn::conv_transpose2d(p, c_in, c_out, 4, cfg)
}

// [N, noise + condition, 1, 1] -> [N, 3, 32, 32]
fn network(p: &nn::Path, config: GeneratorConfig) -> nn::SequentialT {
    nn::seq_t()
        .add(tr2d(p / "tr1", config.noise_dim + config.condition_dim, 512, 0, 1))
        .add(nn::batch_norm2d(p / "bn1", 512, Default::default()))
        .add_fn(Tensor::relu)
        .add(tr2d(p / "tr2", 512, 256, 1, 2))
        .add(nn::batch_norm2d(p / "bn2", 256, Default::default()))
        .add_fn(Tensor::relu)
        .add(tr2d(p / "tr3", 256, 128, 1, 2))
        .add(nn::batch_norm2d(p / "bn3", 128, Default::default()))
        .add_fn(Tensor::relu)
        .add(tr2d(p / "tr4", 128, CHANNELS, 1, 2))
        .add_fn(Tensor::tanh)
}

/// Frozen conditional generator loaded from a checkpoint.
pub struct Generator {
    vs: nn::VarStore,
    net: nn::SequentialT,
    config: GeneratorConfig,
}

impl Generator {
    pub fn load<P: AsRef<Path>>(
        path: P,
        layout: ModelLayout,
        config: GeneratorConfig,
        device: Device,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut vs = nn::VarStore::new(device);
        let net = {
            let root = vs.root();
            match layout {
                ModelLayout::Full => network(&(&root / GENERATOR_PREFIX), config),
                ModelLayout::GeneratorOnly => network(&root, config),
            }
        };
        vs.load(path).map_err(|source| Error::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
        vs.freeze();
        Ok(Self { vs, net, config })
    }

    pub fn config(&self) -> GeneratorConfig {
        self.config
    }

    /// Generate one image per condition row, drawing latent noise in `[-1, 1)` from `rng`.
    ///
    /// Returns `[batch, 3, IMG_SIZE, IMG_SIZE]` on the CPU.
    pub fn sample<R: Rng + ?Sized>(&self, conditions: &Tensor, rng: &mut R) -> Result<Tensor> {
        let batch = match conditions.size().as_slice() {
            &[batch, dim] if dim == self.config.condition_dim => batch,
            shape => {
                return Err(invalid_parameter(
                    "conditions",
                    &format!("{:?}", shape),
                    "expected [batch, condition_dim]",
                ))
            }
        };
        let noise_dim = self.config.noise_dim;
        let device = self.vs.device();
        let noise = matrix(
            &uniform_noise((batch * noise_dim) as usize, 1., rng),
            &[batch as usize, noise_dim as usize],
        );
        let input = Tensor::cat(&[noise, conditions.to_kind(Kind::Float)], 1)
            .to_device(device)
            .view([batch, noise_dim + self.config.condition_dim, 1, 1]);
        let imgs = tch::no_grad(|| input.apply_t(&self.net, false));
        Ok(imgs
            .view([-1, CHANNELS, IMG_SIZE, IMG_SIZE])
            .to_device(Device::Cpu))
    }
}

/// Scale by the global maximum absolute value; an all-zero batch is returned unchanged.
pub fn normalize(imgs: &Tensor) -> Tensor {
    let scale = imgs.abs().max().double_value(&[]);
    if scale > 0. {
        imgs / scale
    } else {
        imgs.shallow_clone()
    }
}

// Generate a 2D matrix of images from a tensor with multiple images,
// sample `i * cols + j` landing in row `i`, column `j`.
pub fn image_matrix(imgs: &Tensor, rows: i64, cols: i64) -> Tensor {
    let imgs = ((imgs + 1.) * 127.5).clamp(0., 255.).to_kind(Kind::Uint8);
    let mut ys = Vec::new();
    for i in 0..rows {
        ys.push(Tensor::cat(
            &(0..cols)
                .map(|j| imgs.narrow(0, cols * i + j, 1))
                .collect::<Vec<_>>(),
            3,
        ));
    }
    Tensor::cat(&ys, 2).squeeze_dim(0)
}

/// Write a freshly initialized checkpoint in the given layout.
#[cfg(test)]
pub(crate) fn save_untrained(path: &Path, layout: ModelLayout, config: GeneratorConfig) {
    let vs = nn::VarStore::new(Device::Cpu);
    let root = vs.root();
    match layout {
        ModelLayout::Full => {
            network(&(&root / GENERATOR_PREFIX), config);
            (&root / "discriminator").zeros("weight", &[4, 4]);
        }
        ModelLayout::GeneratorOnly => {
            network(&root, config);
        }
    }
    vs.save(path).unwrap();
}
