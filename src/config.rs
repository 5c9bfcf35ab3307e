use crate::transform::ReferenceSettings;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".aas2puml.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub submodules: Vec<String>,
    pub include_parent_members: bool,
    pub sort_members: bool,
    pub references: ReferenceSettings,
    pub batch: BatchSettings,
    /// Class lists of the numbered batch diagrams.
    pub diagrams: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    /// Number of the first numbered diagram.
    pub first_index: usize,
    /// One diagram per item, parent members flattened in.
    pub per_class: bool,
    pub all_classes: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    submodules: Option<Vec<String>>,
    include_parent_members: Option<bool>,
    sort_members: Option<bool>,
    references: Option<RawReferences>,
    batch: Option<RawBatch>,
    diagrams: Option<Vec<RawDiagram>>,
}

#[derive(Debug, Deserialize)]
struct RawReferences {
    referable_class: Option<String>,
    key_types_enum: Option<String>,
    invariant_decorator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    first_index: Option<usize>,
    per_class: Option<bool>,
    all_classes: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawDiagram {
    classes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submodules: Vec::new(),
            include_parent_members: false,
            sort_members: false,
            references: ReferenceSettings::default(),
            batch: BatchSettings::default(),
            diagrams: Vec::new(),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            first_index: 12,
            per_class: true,
            all_classes: true,
        }
    }
}

impl Config {
    /// Read `.aas2puml.toml` from `project_path`, or defaults when absent.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = ReferenceSettings::default();
        let batch_defaults = BatchSettings::default();

        let references = match raw.references {
            Some(r) => ReferenceSettings {
                referable_class: r.referable_class.unwrap_or(defaults.referable_class),
                key_types_enum: r.key_types_enum.unwrap_or(defaults.key_types_enum),
                invariant_decorator: r
                    .invariant_decorator
                    .unwrap_or(defaults.invariant_decorator),
            },
            None => defaults,
        };

        let batch = match raw.batch {
            Some(b) => BatchSettings {
                first_index: b.first_index.unwrap_or(batch_defaults.first_index),
                per_class: b.per_class.unwrap_or(batch_defaults.per_class),
                all_classes: b.all_classes.unwrap_or(batch_defaults.all_classes),
            },
            None => batch_defaults,
        };

        let diagrams: Vec<Vec<String>> = raw
            .diagrams
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.classes)
            .collect();
        if let Some(pos) = diagrams.iter().position(Vec::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "diagram #{} lists no classes",
                pos + 1
            )));
        }

        Ok(Self {
            submodules: raw.submodules.unwrap_or_default(),
            include_parent_members: raw.include_parent_members.unwrap_or(false),
            sort_members: raw.sort_members.unwrap_or(false),
            references,
            batch,
            diagrams,
        })
    }
}
