use crate::config::SampleConfig;
use crate::error::{invalid_parameter, Result};
use crate::model::{self, Generator};
use crate::sampler::{ConditionSource, EmbeddingTable};
use rand::{rngs::StdRng, SeedableRng};
use std::fs::create_dir_all;
use tch::{Device, Tensor};
use tracing::info;

pub fn show(config: &SampleConfig) -> Result<()> {
    config.validate()?;
    let device = Device::cuda_if_available();

    info!(
        model = %config.model_path.display(),
        layout = ?config.layout,
        ?device,
        "loading generator"
    );
    let generator = Generator::load(&config.model_path, config.layout, config.generator, device)?;

    let embeddings = match &config.embedding_file {
        Some(path) if config.sampler.needs_embeddings() => {
            let table = EmbeddingTable::load(path)?;
            info!(
                path = %path.display(),
                population = table.population(),
                dim = table.dim(),
                "loaded embedding table"
            );
            if table.dim() as i64 != generator.config().condition_dim {
                return Err(invalid_parameter(
                    "embedding_file",
                    &path.display(),
                    "embedding width differs from the generator condition size",
                ));
            }
            Some(table)
        }
        _ => None,
    };
    let source = ConditionSource {
        distribution: &config.distribution,
        embeddings: embeddings.as_ref(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            create_dir_all(parent)?;
        }
    }

    let pb = if config.grids > 1 {
        indicatif::ProgressBar::new(config.grids as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };
    for index in 0..config.grids {
        pb.set_position(index as u64);
        let conditions = config.sampler.sample(
            &source,
            config.rows,
            config.cols,
            config.noise_range,
            &mut rng,
        )?;
        let samples = generator.sample(&conditions, &mut rng)?;
        log_samples(&samples);
        let matrix = model::image_matrix(
            &model::normalize(&samples),
            config.rows as i64,
            config.cols as i64,
        );
        let path = config.output_path(index);
        tch::vision::image::save(&matrix, &path)?;
        info!(
            path = %path.display(),
            sampler = config.sampler.name(),
            "saved sample grid"
        );
    }
    pb.finish();
    Ok(())
}

fn log_samples(samples: &Tensor) {
    let batch_shape = samples.size();
    for index in 0..batch_shape[0] {
        let sample = samples.get(index);
        info!(
            index,
            ?batch_shape,
            shape = ?sample.size(),
            min = sample.min().double_value(&[]),
            max = sample.max().double_value(&[]),
            "sample"
        );
    }
}
