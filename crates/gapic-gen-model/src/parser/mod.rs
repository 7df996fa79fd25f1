//! Source format parsers and the model pipeline.
//!
//! Each parser produces an [`Api`] whose cross-entity links are still string
//! IDs. [`create_model`] runs the parser chosen by the config and then the
//! assembly, override and validation passes over the result.

pub mod discovery;
pub mod openapi;
pub mod protobuf;

use tracing::info;

use crate::api::Api;
use crate::config::{
    ModelConfig, SpecificationFormat, DESCRIPTION_OVERRIDE, NAME_OVERRIDE, PACKAGE_NAME_OVERRIDE,
    TITLE_OVERRIDE,
};
use crate::crossref::cross_reference;
use crate::error::Result;
use crate::overrides::{apply_documentation_rules, patch_documentation, skip_model_elements};
use crate::service_config::ServiceConfig;
use crate::validate::validate;

/// Fully-qualified ID of `name` declared in `package`.
pub(crate) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        format!(".{name}")
    } else {
        format!(".{package}.{name}")
    }
}

/// Parse, assemble, patch and validate the model described by `config`.
///
/// `package-name-override` renames the generated package after validation,
/// so the source package is still what elements are checked against.
///
/// # Errors
///
/// Any error from reading the service config, parsing the source,
/// [`cross_reference`], [`skip_model_elements`], [`patch_documentation`] or
/// [`validate`].
pub fn create_model(config: &ModelConfig) -> Result<Api> {
    let service_config = config
        .service_config_path()
        .map(ServiceConfig::load)
        .transpose()?;
    let service_config = service_config.as_ref();

    let source = config.specification_source();
    let mut api = match config.specification_format() {
        SpecificationFormat::Discovery => discovery::parse(source, service_config)?,
        SpecificationFormat::OpenApi => openapi::parse(source, service_config)?,
        SpecificationFormat::Protobuf => protobuf::parse(config, service_config)?,
    };

    if let Some(name) = config.option(NAME_OVERRIDE) {
        api.name = name.to_string();
    }
    if let Some(title) = config.option(TITLE_OVERRIDE) {
        api.title = title.to_string();
    }
    if let Some(description) = config.option(DESCRIPTION_OVERRIDE) {
        api.description = description.to_string();
    }

    cross_reference(&mut api)?;
    skip_model_elements(&mut api, config)?;
    if let Some(sc) = service_config {
        apply_documentation_rules(&mut api, sc);
    }
    patch_documentation(&mut api, &config.documentation_overrides)?;
    validate(&api)?;

    if let Some(package) = config.option(PACKAGE_NAME_OVERRIDE) {
        api.package_name = package.to_string();
    }
    info!(
        format = %config.specification_format(),
        name = %api.name,
        messages = api.messages.len(),
        enums = api.enums.len(),
        services = api.services.len(),
        "model ready"
    );
    Ok(api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_with_and_without_package() {
        assert_eq!(qualify("google.cloud.v1", "Secret"), ".google.cloud.v1.Secret");
        assert_eq!(qualify("", "Foo"), ".Foo");
    }
}
