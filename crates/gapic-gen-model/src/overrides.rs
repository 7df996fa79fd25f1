//! Configuration-driven edits applied after assembly: dropping elements and
//! rewriting documentation.

use tracing::{debug, info};

use crate::api::{Api, MessageRef};
use crate::config::{DocumentationOverride, ModelConfig, INCLUDED_IDS, SKIPPED_IDS};
use crate::crossref::build_indices;
use crate::error::{Error, Result};
use crate::service_config::ServiceConfig;

/// A list of IDs where an entry ending in `.*` matches everything below it.
struct IdFilter<'a>(Vec<&'a str>);

impl IdFilter<'_> {
    fn matches(&self, id: &str) -> bool {
        self.0.iter().any(|pattern| match pattern.strip_suffix(".*") {
            Some(prefix) => id
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.')),
            None => *pattern == id,
        })
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Drop the elements named by the `skipped-ids` and `included-ids` options.
///
/// `skipped-ids` removes matching messages, enums, services and methods at
/// any depth. When `included-ids` is set, only the top-level elements and
/// methods it names survive; a service survives if it or any of its methods
/// is named. The indices are rebuilt afterwards, so removed IDs no longer
/// resolve.
///
/// # Errors
///
/// Returns [`Error::Config`] for list entries that are not fully-qualified
/// IDs (they must start with `.`).
pub fn skip_model_elements(api: &mut Api, config: &ModelConfig) -> Result<()> {
    let skipped = IdFilter(config.list_option(SKIPPED_IDS));
    let included = IdFilter(config.list_option(INCLUDED_IDS));
    if skipped.is_empty() && included.is_empty() {
        return Ok(());
    }
    for (key, filter) in [(SKIPPED_IDS, &skipped), (INCLUDED_IDS, &included)] {
        if let Some(bad) = filter.0.iter().find(|id| !id.starts_with('.')) {
            return Err(Error::Config(format!(
                "{key}: {bad:?} is not a fully-qualified ID"
            )));
        }
    }
    let keep = |id: &str| !skipped.matches(id) && (included.is_empty() || included.matches(id));

    let messages: Vec<MessageRef> = api.messages.iter().copied().filter(|&m| keep(&api.message(m).id)).collect();
    api.messages = messages;
    let enums = api.enums.iter().copied().filter(|&e| keep(&api.enum_type(e).id)).collect();
    api.enums = enums;

    for handle in (0..api.state.messages.len()).map(MessageRef) {
        let message = api.message(handle);
        let messages = message
            .messages
            .iter()
            .copied()
            .filter(|&m| !skipped.matches(&api.message(m).id))
            .collect();
        let enums = message
            .enums
            .iter()
            .copied()
            .filter(|&e| !skipped.matches(&api.enum_type(e).id))
            .collect();
        let message = api.message_mut(handle);
        message.messages = messages;
        message.enums = enums;
    }

    let mut services = Vec::new();
    for handle in api.services.clone() {
        let service_id = api.service(handle).id.clone();
        if skipped.matches(&service_id) {
            continue;
        }
        let whole = included.is_empty() || included.matches(&service_id);
        let methods: Vec<_> = api
            .service(handle)
            .methods
            .iter()
            .copied()
            .filter(|&m| {
                let id = &api.method(m).id;
                !skipped.matches(id) && (whole || included.matches(id))
            })
            .collect();
        if !whole && methods.is_empty() {
            continue;
        }
        api.service_mut(handle).methods = methods;
        services.push(handle);
    }
    api.services = services;

    build_indices(api);
    info!(
        messages = api.messages.len(),
        enums = api.enums.len(),
        services = api.services.len(),
        "applied skip lists"
    );
    Ok(())
}

/// Replace element documentation with the service config's
/// `documentation.rules`.
pub fn apply_documentation_rules(api: &mut Api, service_config: &ServiceConfig) {
    if service_config.documentation.rules.is_empty() {
        return;
    }
    let apply = |id: &str, documentation: &mut String| {
        if let Some(text) = service_config.documentation_for(id) {
            debug!(id, "documentation from service config");
            text.clone_into(documentation);
        }
    };

    let messages: Vec<MessageRef> = api.state.message_by_id.values().copied().collect();
    for handle in messages {
        let message = api.message_mut(handle);
        apply(&message.id, &mut message.documentation);
        for field in &mut message.fields {
            apply(&field.id, &mut field.documentation);
        }
    }
    let enums: Vec<_> = api.state.enum_by_id.values().copied().collect();
    for handle in enums {
        let enumeration = api.enum_type_mut(handle);
        apply(&enumeration.id, &mut enumeration.documentation);
        for value in &mut enumeration.values {
            apply(&value.id, &mut value.documentation);
        }
    }
    let services: Vec<_> = api.state.service_by_id.values().copied().collect();
    for handle in services {
        let service = api.service_mut(handle);
        apply(&service.id, &mut service.documentation);
    }
    let methods: Vec<_> = api.state.method_by_id.values().copied().collect();
    for handle in methods {
        let method = api.method_mut(handle);
        apply(&method.id, &mut method.documentation);
    }
}

/// Apply documentation overrides in order.
///
/// Each override replaces the first occurrence of `matches` in the
/// documentation of the element with ID `id`: a message, field, oneof,
/// enum, enum value, service or method.
///
/// # Errors
///
/// Returns [`Error::DocumentationOverride`] when no element has the ID or
/// its documentation does not contain `matches`.
pub fn patch_documentation(api: &mut Api, overrides: &[DocumentationOverride]) -> Result<()> {
    for item in overrides {
        let documentation = documentation_mut(api, &item.id).ok_or_else(|| Error::DocumentationOverride {
            id: item.id.clone(),
            reason: "no element has this ID".to_string(),
        })?;
        if !documentation.contains(&item.matches) {
            return Err(Error::DocumentationOverride {
                id: item.id.clone(),
                reason: format!("documentation does not contain {:?}", item.matches),
            });
        }
        *documentation = documentation.replacen(&item.matches, &item.replace, 1);
        debug!(id = %item.id, "patched documentation");
    }
    Ok(())
}

fn documentation_mut<'a>(api: &'a mut Api, id: &str) -> Option<&'a mut String> {
    if let Some(handle) = api.state.message_by_id(id) {
        return Some(&mut api.message_mut(handle).documentation);
    }
    if let Some(handle) = api.state.enum_by_id(id) {
        return Some(&mut api.enum_type_mut(handle).documentation);
    }
    if let Some(handle) = api.state.service_by_id(id) {
        return Some(&mut api.service_mut(handle).documentation);
    }
    if let Some(handle) = api.state.method_by_id(id) {
        return Some(&mut api.method_mut(handle).documentation);
    }

    let (parent, name) = id.rsplit_once('.')?;
    if let Some(handle) = api.state.message_by_id(parent) {
        let message = api.message_mut(handle);
        if let Some(i) = message.fields.iter().position(|f| f.name == name) {
            return Some(&mut message.fields[i].documentation);
        }
        let oneof = message.one_ofs.iter_mut().find(|o| o.name == name)?;
        return Some(&mut oneof.documentation);
    }
    let handle = api.state.enum_by_id(parent)?;
    api.enum_type_mut(handle)
        .values
        .iter_mut()
        .find(|v| v.name == name)
        .map(|v| &mut v.documentation)
}
