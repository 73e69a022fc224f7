//! End-to-end steps shared by the command-line tools.

use arshow_aruco::{DictionaryEncoder, EncoderUnavailable};
use arshow_core::{
    generate_markers, load_assets, GenerateConfig, GenerateError, GenerateReport, LoadError,
    LoadedAssets, MarkerEncoder, Registry, RegistryError, ResolveConfig, StartupError,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Encoder(#[from] EncoderUnavailable),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Output of [`run_generation`].
#[derive(Debug)]
pub struct GenerationRun {
    pub registry: Registry,
    pub report: GenerateReport,
}

/// Scan the input folder, write one marker per image and save the map file.
///
/// The dictionary is resolved first so that a missing family fails before
/// anything is written. The map file is written last and always holds the
/// complete registry, including entries whose marker was skipped.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn run_generation(cfg: &GenerateConfig) -> Result<GenerationRun, PipelineError> {
    let encoder = DictionaryEncoder::from_name(&cfg.dictionary)?;
    let registry = Registry::build(&cfg.input_dir, &cfg.extension_filter())?;
    if registry.len() > encoder.capacity() {
        log::warn!(
            "{} images but {} only holds {} markers; the rest will be skipped",
            registry.len(),
            encoder.family(),
            encoder.capacity()
        );
    }

    let report = generate_markers(&registry, &cfg.output_dir, cfg.style, &encoder)?;
    registry.persist(&cfg.map_file)?;
    Ok(GenerationRun { registry, report })
}

/// Everything the resolver needs before the camera is opened.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn prepare_resolution(cfg: &ResolveConfig) -> Result<LoadedAssets, PipelineError> {
    cfg.preflight()?;
    let registry = Registry::load(&cfg.map_file)?;
    log::info!(
        "loaded map '{}' with {} entries",
        cfg.map_file.display(),
        registry.len()
    );
    Ok(load_assets(&registry, &cfg.image_dir)?)
}
