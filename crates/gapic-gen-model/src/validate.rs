//! Final consistency check before a model is handed to a generator.

use crate::api::{Api, EnumRef, MessageRef};
use crate::error::{Error, Result};

/// Check that every generated service, message and enum, nested ones
/// included, belongs to the model's package.
///
/// External roots are not checked.
///
/// # Errors
///
/// Returns [`Error::PackageMismatch`] for the first element found in
/// another package.
pub fn validate(api: &Api) -> Result<()> {
    let expected = api.package_name.as_str();
    let check = |kind: &'static str, id: &str, actual: &str| {
        if actual == expected {
            Ok(())
        } else {
            Err(Error::PackageMismatch {
                kind,
                id: id.to_string(),
                actual: actual.to_string(),
                expected: expected.to_string(),
            })
        }
    };

    for service in api.services() {
        check("service", &service.id, &service.package)?;
    }
    let messages: Vec<MessageRef> = api.all_messages();
    for &handle in &messages {
        let message = api.message(handle);
        check("message", &message.id, &message.package)?;
    }
    let enums: Vec<EnumRef> = api.all_enums();
    for handle in enums {
        let enumeration = api.enum_type(handle);
        check("enum", &enumeration.id, &enumeration.package)?;
    }
    tracing::debug!(
        services = api.services.len(),
        messages = messages.len(),
        "model validated"
    );
    Ok(())
}
