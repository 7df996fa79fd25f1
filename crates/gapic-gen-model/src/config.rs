//! Inputs to [`create_model`](crate::create_model).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Source option: replace the API name.
pub const NAME_OVERRIDE: &str = "name-override";
/// Source option: replace the API title.
pub const TITLE_OVERRIDE: &str = "title-override";
/// Source option: replace the API description.
pub const DESCRIPTION_OVERRIDE: &str = "description-override";
/// Source option: replace the API package name.
pub const PACKAGE_NAME_OVERRIDE: &str = "package-name-override";
/// Source option: `googleapis` checkout used as a `protoc` include path.
pub const GOOGLEAPIS_ROOT: &str = "googleapis-root";
/// Source option: additional `protoc` include path.
pub const EXTRA_PROTOS_ROOT: &str = "extra-protos-root";
/// Source option: comma-separated `.proto` files to generate.
pub const INCLUDE_LIST: &str = "include-list";
/// Source option: comma-separated IDs to drop; `.*` suffix drops a prefix.
pub const SKIPPED_IDS: &str = "skipped-ids";
/// Source option: comma-separated IDs to keep; everything else is dropped.
pub const INCLUDED_IDS: &str = "included-ids";

/// Format of the specification source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecificationFormat {
    /// Google Discovery JSON.
    Discovery,
    /// OpenAPI 3.0 JSON.
    OpenApi,
    /// Protobuf: a descriptor set or a directory of `.proto` files.
    Protobuf,
}

impl fmt::Display for SpecificationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discovery => "discovery",
            Self::OpenApi => "openapi",
            Self::Protobuf => "protobuf",
        })
    }
}

impl FromStr for SpecificationFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(Self::Discovery),
            "openapi" => Ok(Self::OpenApi),
            "protobuf" => Ok(Self::Protobuf),
            other => Err(Error::Config(format!(
                "unknown specification format {other:?}, expected discovery, openapi or protobuf"
            ))),
        }
    }
}

/// Replace the first occurrence of `matches` in an element's documentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationOverride {
    /// Element ID, e.g. `.google.cloud.secretmanager.v1.Secret.name`.
    pub id: String,
    /// Text that must occur in the current documentation.
    pub matches: String,
    /// Replacement text.
    pub replace: String,
}

/// Everything needed to build one model.
///
/// # Examples
///
/// ```ignore
/// let config = ModelConfig::new(SpecificationFormat::Protobuf, "googleapis/google/cloud/secretmanager/v1")
///     .service_config("googleapis/google/cloud/secretmanager/v1/secretmanager_v1.yaml")
///     .source("googleapis-root", "googleapis")
///     .source("skipped-ids", ".google.cloud.secretmanager.v1.Internal.*");
/// let api = gapic_gen_model::create_model(&config)?;
/// ```
#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub(crate) specification_format: SpecificationFormat,
    pub(crate) specification_source: PathBuf,
    pub(crate) service_config: Option<PathBuf>,
    pub(crate) source: BTreeMap<String, String>,
    pub(crate) documentation_overrides: Vec<DocumentationOverride>,
}

impl ModelConfig {
    /// Create a config for `source` in the given format.
    #[must_use]
    pub fn new(format: SpecificationFormat, source: impl Into<PathBuf>) -> Self {
        Self {
            specification_format: format,
            specification_source: source.into(),
            service_config: None,
            source: BTreeMap::new(),
            documentation_overrides: Vec::new(),
        }
    }

    /// Use a service config YAML file.
    #[must_use]
    pub fn service_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.service_config = Some(path.into());
        self
    }

    /// Set one source option (see the `*_OVERRIDE`, `*_ROOT` and `*_IDS` constants).
    #[must_use]
    pub fn source(mut self, key: &str, value: &str) -> Self {
        self.source.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a documentation override.
    #[must_use]
    pub fn documentation_override(mut self, item: DocumentationOverride) -> Self {
        self.documentation_overrides.push(item);
        self
    }

    /// The specification format.
    #[must_use]
    pub fn specification_format(&self) -> SpecificationFormat {
        self.specification_format
    }

    /// The specification source path.
    #[must_use]
    pub fn specification_source(&self) -> &Path {
        &self.specification_source
    }

    /// The service config path, if any.
    #[must_use]
    pub fn service_config_path(&self) -> Option<&Path> {
        self.service_config.as_deref()
    }

    /// A source option, `None` when unset or empty.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.source
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// A comma-separated source option, split and trimmed.
    #[must_use]
    pub fn list_option(&self, key: &str) -> Vec<&str> {
        self.option(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
