//! Library API for aas2puml.
//!
//! The functions here return proper `Result` types instead of printing and
//! exiting like the CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use aas2puml::aas2puml;
//! use std::path::Path;
//!
//! let puml = aas2puml(Path::new("venv/lib/aas_core_meta"), "aas_core_meta")?;
//! println!("{}", puml);
//! # Ok::<(), aas2puml::Aas2PumlError>(())
//! ```

use crate::config::{Config, ConfigError};
use crate::generator::{AasPumlGenerator, DiagramOptions, GeneratorSettings};
use crate::parser::{CollectError, PythonCollector};
use crate::transform::TransformError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during aas2puml operations.
#[derive(Debug, Error)]
pub enum Aas2PumlError {
    /// The package could not be read or parsed.
    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    /// A pipeline pass rejected the domain.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error while writing diagrams.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Diagram of every item in the package, with default settings.
pub fn aas2puml(path: &Path, module: &str) -> Result<String, Aas2PumlError> {
    let generator = AasPumlGenerator::new(GeneratorSettings::new(path, module), &PythonCollector)?;
    generator.generate_puml(&DiagramOptions::default())
}

/// Build a generator for `path`, honoring the package's `.aas2puml.toml`.
pub fn generator_for(path: &Path, module: &str) -> Result<AasPumlGenerator, Aas2PumlError> {
    let config = Config::load(path)?;
    let settings = GeneratorSettings::new(path, module)
        .with_submodules(config.submodules.clone())
        .with_references(config.references.clone());
    AasPumlGenerator::new(settings, &PythonCollector)
}
