//! Assembly: turn the string IDs a parser emits into handles.
//!
//! [`cross_reference`] runs once, after parsing and before any override or
//! validation pass. It rebuilds the [`State`](crate::State) indices from the
//! element tree, resolves every type reference against them, and computes
//! the properties that need the whole graph: map fields, recursion, unique
//! enum numbers and pagination.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::api::{
    Api, EnumRef, Field, FieldRef, MessageRef, MethodRef, PaginationInfo, TypeRef, Typez,
};
use crate::error::{Error, Result};
use crate::wellknown;

const PAGE_TOKEN: &str = "page_token";
const NEXT_PAGE_TOKEN: &str = "next_page_token";
const NEXT_PAGE_TOKEN_JSON: &str = "nextPageToken";

/// Index, resolve and annotate a freshly parsed model in place.
///
/// # Errors
///
/// Returns [`Error::UnresolvedReference`] for any field type, method
/// input/output or long-running operation type that names no indexed
/// element, and [`Error::MapEntryShape`] for a map entry message without
/// exactly a `key` and a `value` field.
pub fn cross_reference(api: &mut Api) -> Result<()> {
    build_indices(api);
    resolve_fields(api)?;
    normalize_maps(api)?;
    resolve_methods(api)?;
    mark_recursive_fields(api);
    compute_unique_values(api);
    compute_pagination(api);
    info!(
        messages = api.state.message_by_id.len(),
        enums = api.state.enum_by_id.len(),
        services = api.state.service_by_id.len(),
        methods = api.state.method_by_id.len(),
        "cross-referenced model"
    );
    Ok(())
}

/// Rebuild the four ID indices from the top-level and external roots.
///
/// Also sets each method's service back-link.
pub(crate) fn build_indices(api: &mut Api) {
    api.state.clear_indices();

    let mut stack: Vec<MessageRef> = api
        .messages
        .iter()
        .chain(&api.external_messages)
        .copied()
        .collect();
    let mut enums: Vec<EnumRef> = api
        .enums
        .iter()
        .chain(&api.external_enums)
        .copied()
        .collect();
    while let Some(handle) = stack.pop() {
        let message = api.message(handle);
        stack.extend(&message.messages);
        enums.extend(&message.enums);
        let id = message.id.clone();
        api.state.message_by_id.insert(id, handle);
    }
    for handle in enums {
        let id = api.enum_type(handle).id.clone();
        api.state.enum_by_id.insert(id, handle);
    }

    for service in api.services.clone() {
        let id = api.service(service).id.clone();
        api.state.service_by_id.insert(id, service);
        for method in api.service(service).methods.clone() {
            let m = api.method_mut(method);
            m.service = Some(service);
            let id = m.id.clone();
            api.state.method_by_id.insert(id, method);
        }
    }
}

fn indexed_messages(api: &Api) -> Vec<MessageRef> {
    api.state.message_by_id.values().copied().collect()
}

fn indexed_methods(api: &Api) -> Vec<MethodRef> {
    api.state.method_by_id.values().copied().collect()
}

fn resolve_fields(api: &mut Api) -> Result<()> {
    for handle in indexed_messages(api) {
        let mut targets = Vec::new();
        for field in &api.message(handle).fields {
            let target = match field.typez {
                Typez::Message | Typez::Group => api.state.message_by_id(&field.typez_id).map(TypeRef::Message),
                Typez::Enum => api.state.enum_by_id(&field.typez_id).map(TypeRef::Enum),
                _ => {
                    targets.push(None);
                    continue;
                }
            };
            let target = target.ok_or_else(|| Error::unresolved(&field.id, &field.typez_id))?;
            targets.push(Some(target));
        }
        for (field, target) in api.message_mut(handle).fields.iter_mut().zip(targets) {
            field.target = target;
        }
    }
    Ok(())
}

/// Check map entry shapes and mark the fields that hold them as maps.
fn normalize_maps(api: &mut Api) -> Result<()> {
    let messages = indexed_messages(api);
    for &handle in &messages {
        let message = api.message(handle);
        if !message.is_map {
            continue;
        }
        let mut names: Vec<&str> = message.fields.iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        if names != ["key", "value"] {
            return Err(Error::MapEntryShape {
                id: message.id.clone(),
            });
        }
    }

    for handle in messages {
        let maps: Vec<bool> = api
            .message(handle)
            .fields
            .iter()
            .map(|f| matches!(f.target, Some(TypeRef::Message(t)) if api.message(t).is_map))
            .collect();
        for (field, is_map) in api.message_mut(handle).fields.iter_mut().zip(maps) {
            if is_map {
                field.map = true;
                field.repeated = false;
            }
        }
    }
    Ok(())
}

fn resolve_methods(api: &mut Api) -> Result<()> {
    for handle in indexed_methods(api) {
        let method = api.method(handle);
        let resolve = |id: &str| {
            api.state
                .message_by_id(id)
                .ok_or_else(|| Error::unresolved(&method.id, id))
        };
        let input = resolve(&method.input_type_id)?;
        let output = resolve(&method.output_type_id)?;
        let operation = match &method.operation_info {
            Some(info) => {
                let optional = |id: &str| (!id.is_empty()).then(|| resolve(id)).transpose();
                Some((optional(&info.response_type_id)?, optional(&info.metadata_type_id)?))
            }
            None => None,
        };
        let returns_empty = method.output_type_id == wellknown::EMPTY_ID;

        let method = api.method_mut(handle);
        method.input_type = Some(input);
        method.output_type = Some(output);
        method.returns_empty = returns_empty;
        if let (Some(info), Some((response, metadata))) = (&mut method.operation_info, operation) {
            info.response_type = response;
            info.metadata_type = metadata;
        }
    }
    Ok(())
}

/// A field is recursive when its message type closure leads back to the
/// message that owns it.
fn mark_recursive_fields(api: &mut Api) {
    let mut closures: BTreeMap<MessageRef, BTreeSet<MessageRef>> = BTreeMap::new();
    for handle in indexed_messages(api) {
        let targets: Vec<Option<MessageRef>> = api
            .message(handle)
            .fields
            .iter()
            .map(|f| match f.target {
                Some(TypeRef::Message(t)) => Some(t),
                _ => None,
            })
            .collect();

        let mut recursive = Vec::with_capacity(targets.len());
        for target in targets {
            let reaches = target.is_some_and(|t| {
                closures
                    .entry(t)
                    .or_insert_with(|| message_closure(api, t))
                    .contains(&handle)
            });
            recursive.push(reaches);
        }
        for (field, recursive) in api.message_mut(handle).fields.iter_mut().zip(recursive) {
            field.recursive = recursive;
        }
    }
}

/// Every message reachable from `start` through message-typed fields,
/// `start` included.
fn message_closure(api: &Api, start: MessageRef) -> BTreeSet<MessageRef> {
    let mut visited = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        if !visited.insert(handle) {
            continue;
        }
        for field in &api.message(handle).fields {
            if let Some(TypeRef::Message(t)) = field.target {
                stack.push(t);
            }
        }
    }
    visited
}

fn compute_unique_values(api: &mut Api) {
    let enums: Vec<EnumRef> = api.state.enum_by_id.values().copied().collect();
    for handle in enums {
        let enumeration = api.enum_type_mut(handle);
        let mut seen = BTreeSet::new();
        enumeration.unique_number_values = enumeration
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| seen.insert(v.number))
            .map(|(i, _)| i)
            .collect();
    }
}

/// AIP-4233: the request carries a `page_token`, the response a
/// `next_page_token` and exactly one repeated or map field.
fn compute_pagination(api: &mut Api) {
    for handle in indexed_methods(api) {
        let method = api.method(handle);
        let (Some(input), Some(output)) = (method.input_type, method.output_type) else {
            continue;
        };

        let request = api.message(input);
        let Some(page_token) = request
            .fields
            .iter()
            .position(|f| is_token(f, PAGE_TOKEN, "pageToken"))
        else {
            continue;
        };

        let response = api.message(output);
        let Some(next_page_token) = response
            .fields
            .iter()
            .position(|f| is_token(f, NEXT_PAGE_TOKEN, NEXT_PAGE_TOKEN_JSON))
        else {
            continue;
        };
        let items: Vec<usize> = response
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.repeated || f.map)
            .map(|(i, _)| i)
            .collect();
        let &[pageable_item] = items.as_slice() else {
            debug!(method = %method.id, items = items.len(), "response has a next page token but no single item list");
            continue;
        };

        debug!(method = %method.id, "paginated method");
        api.method_mut(handle).pagination = Some(FieldRef {
            message: input,
            index: page_token,
        });
        api.message_mut(output).pagination = Some(PaginationInfo {
            next_page_token: FieldRef {
                message: output,
                index: next_page_token,
            },
            pageable_item: FieldRef {
                message: output,
                index: pageable_item,
            },
        });
    }
}

fn is_token(field: &Field, name: &str, json_name: &str) -> bool {
    field.typez == Typez::String
        && !field.repeated
        && (field.name == name || field.json_name == json_name)
}
