//! Generator configuration loaded from TOML.
//!
//! Keeps the per-API knobs (source location, service config, source
//! options, documentation fixes) in a file next to the API definition
//! instead of on the command line.
//!
//! # File format
//!
//! ```toml
//! # gapic-gen.toml
//! [general]
//! specification-format = "protobuf"
//! specification-source = "google/cloud/secretmanager/v1"
//! service-config = "googleapis/google/cloud/secretmanager/v1/secretmanager_v1.yaml"
//!
//! # Flat option map handed to the parser and override passes.
//! [source]
//! googleapis-root = "googleapis"
//! skipped-ids = ".google.cloud.secretmanager.v1.Internal"
//!
//! [[documentation-overrides]]
//! id = ".google.cloud.secretmanager.v1.Secret"
//! matches = "[Secret]"
//! replace = "Secret"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use gapic_gen_model::{DocumentationOverride, ModelConfig, SpecificationFormat};
use serde::Deserialize;

/// Contents of a `gapic-gen.toml` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Source format and locations.
    pub general: GeneralConfig,

    /// Source options (`googleapis-root`, `skipped-ids`, ...).
    pub source: BTreeMap<String, String>,

    /// Documentation fixes applied after assembly.
    pub documentation_overrides: Vec<DocumentationOverride>,
}

/// The `[general]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneralConfig {
    /// `discovery`, `openapi` or `protobuf`.
    pub specification_format: Option<SpecificationFormat>,

    /// Specification file, or `.proto` directory.
    pub specification_source: Option<PathBuf>,

    /// Optional `google.api.Service` YAML file.
    pub service_config: Option<PathBuf>,
}

/// Values given on the command line; each one replaces the file's value.
#[derive(Debug, Default)]
pub struct Overrides {
    pub specification_format: Option<SpecificationFormat>,
    pub specification_source: Option<PathBuf>,
    pub service_config: Option<PathBuf>,
    pub source: Vec<(String, String)>,
}

impl GeneratorConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parse TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge command-line overrides and build the model config.
    pub fn into_model_config(self, overrides: Overrides) -> anyhow::Result<ModelConfig> {
        let Some(format) = overrides
            .specification_format
            .or(self.general.specification_format)
        else {
            bail!("No specification format. Set `general.specification-format` or pass --specification-format");
        };
        let Some(source) = overrides
            .specification_source
            .or(self.general.specification_source)
        else {
            bail!("No specification source. Set `general.specification-source` or pass --specification-source");
        };

        let mut config = ModelConfig::new(format, source);
        if let Some(path) = overrides.service_config.or(self.general.service_config) {
            config = config.service_config(path);
        }
        let mut options = self.source;
        options.extend(overrides.source);
        for (key, value) in &options {
            config = config.source(key, value);
        }
        for item in self.documentation_overrides {
            config = config.documentation_override(item);
        }
        Ok(config)
    }
}
