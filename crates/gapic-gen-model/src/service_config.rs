//! `google.api.Service` configuration documents.
//!
//! Only the subset the model builder consumes is decoded; unknown keys are
//! ignored.
//!
//! # File format
//!
//! ```yaml
//! type: google.api.Service
//! name: secretmanager.googleapis.com
//! title: Secret Manager API
//! apis:
//!   - name: google.cloud.location.Locations
//!   - name: google.cloud.secretmanager.v1.SecretManagerService
//! documentation:
//!   summary: Stores sensitive data such as API keys.
//!   rules:
//!     - selector: google.cloud.secretmanager.v1.Secret
//!       description: A secret.
//! publishing:
//!   method_settings:
//!     - selector: google.cloud.secretmanager.v1.SecretManagerService.CreateSecret
//!       auto_populated_fields:
//!         - request_id
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Services mixed into many APIs; they never determine the API's package.
pub const MIXIN_SERVICES: &[&str] = &[
    "google.longrunning.Operations",
    "google.iam.v1.IAMPolicy",
    "google.cloud.location.Locations",
    "google.cloud.location.Location",
];

const HOST_SUFFIX: &str = ".googleapis.com";

/// A decoded service config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service hostname, e.g. `secretmanager.googleapis.com`.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Interfaces the service exposes, mixins included.
    pub apis: Vec<ApiInterface>,
    /// Overview and per-element documentation.
    pub documentation: Documentation,
    /// Client library settings.
    pub publishing: Publishing,
}

/// One entry of `apis`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiInterface {
    /// Fully-qualified service name.
    pub name: String,
}

/// The `documentation` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Documentation {
    /// API overview.
    pub summary: String,
    /// Per-element documentation.
    pub rules: Vec<DocumentationRule>,
}

/// Documentation for the elements matched by `selector`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentationRule {
    /// Element name without a leading dot; a trailing `.*` matches a prefix.
    pub selector: String,
    /// Replacement documentation.
    pub description: String,
}

/// The `publishing` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Publishing {
    /// Per-method client settings.
    pub method_settings: Vec<MethodSettings>,
}

/// Client settings for one method.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MethodSettings {
    /// Fully-qualified method name without a leading dot.
    pub selector: String,
    /// Request fields the client fills with a UUID4 when empty (AIP-4235).
    pub auto_populated_fields: Vec<String>,
}

impl ServiceConfig {
    /// Load a service config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Decode a service config from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if the text is not a valid service config.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// The short API name: `name` without the `.googleapis.com` suffix.
    #[must_use]
    pub fn api_name(&self) -> &str {
        self.name.strip_suffix(HOST_SUFFIX).unwrap_or(&self.name)
    }

    /// Package and unqualified service name of the first non-mixin API.
    #[must_use]
    pub fn package_and_service(&self) -> Option<(&str, &str)> {
        let api = self
            .apis
            .iter()
            .find(|api| !MIXIN_SERVICES.contains(&api.name.as_str()));
        let Some(api) = api else {
            if !self.apis.is_empty() {
                tracing::warn!(name = %self.name, "service config lists only mixin APIs");
            }
            return None;
        };
        Some(match api.name.rsplit_once('.') {
            Some((package, service)) => (package, service),
            None => ("", api.name.as_str()),
        })
    }

    /// The documentation rule whose selector matches `id` (with or without
    /// leading dot). Exact selectors win over `.*` prefix selectors.
    #[must_use]
    pub fn documentation_for(&self, id: &str) -> Option<&str> {
        let name = id.trim_start_matches('.');
        let rules = &self.documentation.rules;
        rules
            .iter()
            .find(|r| r.selector == name)
            .or_else(|| {
                rules.iter().find(|r| {
                    r.selector
                        .strip_suffix(".*")
                        .is_some_and(|prefix| name.starts_with(prefix) && name.len() > prefix.len())
                })
            })
            .map(|r| r.description.as_str())
    }

    /// Auto-populated field names configured for a method.
    #[must_use]
    pub fn auto_populated_fields(&self, method_id: &str) -> &[String] {
        let name = method_id.trim_start_matches('.');
        self.publishing
            .method_settings
            .iter()
            .find(|s| s.selector == name)
            .map(|s| s.auto_populated_fields.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const SECRET_MANAGER: &str = indoc! {"
        type: google.api.Service
        config_version: 3
        name: secretmanager.googleapis.com
        title: Secret Manager API
        apis:
          - name: google.cloud.location.Locations
          - name: google.cloud.secretmanager.v1.SecretManagerService
        documentation:
          summary: Stores sensitive data.
          rules:
            - selector: google.cloud.secretmanager.v1.Secret
              description: A secret.
            - selector: google.cloud.secretmanager.v1.SecretManagerService.*
              description: An RPC.
        publishing:
          method_settings:
            - selector: google.cloud.secretmanager.v1.SecretManagerService.CreateSecret
              auto_populated_fields:
                - request_id
    "};

    #[test]
    fn deserialize_full() {
        let config = ServiceConfig::from_yaml(SECRET_MANAGER).unwrap();
        assert_eq!(config.api_name(), "secretmanager");
        assert_eq!(config.title, "Secret Manager API");
        assert_eq!(config.documentation.summary, "Stores sensitive data.");
        assert_eq!(
            config.package_and_service(),
            Some(("google.cloud.secretmanager.v1", "SecretManagerService"))
        );
    }

    #[test]
    fn deserialize_defaults() {
        let config = ServiceConfig::from_yaml("{}").unwrap();
        assert_eq!(config.api_name(), "");
        assert!(config.package_and_service().is_none());
        assert!(config.auto_populated_fields("a.B.C").is_empty());
    }

    #[test]
    fn only_mixins_yields_no_package() {
        let config = ServiceConfig::from_yaml(indoc! {"
            apis:
              - name: google.longrunning.Operations
              - name: google.iam.v1.IAMPolicy
        "})
        .unwrap();
        assert!(config.package_and_service().is_none());
    }

    #[test]
    fn location_mixin_is_skipped_in_both_spellings() {
        for mixin in ["google.cloud.location.Location", "google.cloud.location.Locations"] {
            let config = ServiceConfig::from_yaml(&format!(
                "apis:\n  - name: {mixin}\n  - name: google.cloud.secretmanager.v1.SecretManagerService\n"
            ))
            .unwrap();
            assert_eq!(
                config.package_and_service(),
                Some(("google.cloud.secretmanager.v1", "SecretManagerService"))
            );
        }
    }

    #[test]
    fn documentation_rules() {
        let config = ServiceConfig::from_yaml(SECRET_MANAGER).unwrap();
        assert_eq!(
            config.documentation_for(".google.cloud.secretmanager.v1.Secret"),
            Some("A secret.")
        );
        assert_eq!(
            config.documentation_for("google.cloud.secretmanager.v1.SecretManagerService.GetSecret"),
            Some("An RPC.")
        );
        assert_eq!(
            config.documentation_for(".google.cloud.secretmanager.v1.Other"),
            None
        );
    }

    #[test]
    fn auto_populated_settings() {
        let config = ServiceConfig::from_yaml(SECRET_MANAGER).unwrap();
        assert_eq!(
            config.auto_populated_fields(
                ".google.cloud.secretmanager.v1.SecretManagerService.CreateSecret"
            ),
            ["request_id".to_string()]
        );
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = ServiceConfig::load(Path::new("/nonexistent/service.yaml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn load_invalid_yaml_returns_error() {
        assert!(matches!(
            ServiceConfig::from_yaml("apis: [[[invalid"),
            Err(Error::Yaml(_))
        ));
    }
}
