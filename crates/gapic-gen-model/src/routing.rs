//! AIP-4222 explicit routing headers (`google.api.routing`).

use gapic_gen_core::descriptor::{RoutingParameter, RoutingRule};

use crate::api::{RoutingInfo, RoutingInfoVariant, RoutingPathSpec};
use crate::error::{Error, Result};
use crate::pathtemplate::{MULTI_SEGMENT_WILDCARD, SINGLE_SEGMENT_WILDCARD};

/// Convert a routing rule into one [`RoutingInfo`] per header key.
///
/// Keys keep the order in which they first appear. Within a key, variants
/// are reversed: when several parameters produce the same key, the last one
/// that matches wins, so consumers scan the stored list front to back.
///
/// # Errors
///
/// Returns [`Error::PathTemplate`] for a `path_template` without exactly one
/// `{key=pattern}` variable.
pub fn parse_routing_rule(rule: &RoutingRule) -> Result<Vec<RoutingInfo>> {
    let mut infos: Vec<RoutingInfo> = Vec::new();
    for parameter in &rule.routing_parameters {
        let (name, variant) = parse_parameter(parameter)?;
        match infos.iter_mut().find(|i| i.name == name) {
            Some(info) => info.variants.push(variant),
            None => infos.push(RoutingInfo {
                name,
                variants: vec![variant],
            }),
        }
    }
    for info in &mut infos {
        info.variants.reverse();
    }
    Ok(infos)
}

fn parse_parameter(parameter: &RoutingParameter) -> Result<(String, RoutingInfoVariant)> {
    let field_path: Vec<String> = parameter.field.split('.').map(ToString::to_string).collect();
    let template = parameter.path_template.as_str();

    if template.is_empty() {
        let variant = RoutingInfoVariant {
            field_path,
            matching: spec(&[MULTI_SEGMENT_WILDCARD]),
            ..RoutingInfoVariant::default()
        };
        return Ok((parameter.field.clone(), variant));
    }

    let (Some(open), Some(close)) = (template.find('{'), template.rfind('}')) else {
        return Err(Error::path_template(template, "missing `{key=pattern}` variable"));
    };
    if close < open || template[open + 1..close].contains(['{', '}']) {
        return Err(Error::path_template(template, "expected exactly one variable"));
    }
    let (name, pattern) = match template[open + 1..close].split_once('=') {
        Some((name, pattern)) => (name, pattern),
        None => (&template[open + 1..close], SINGLE_SEGMENT_WILDCARD),
    };
    if name.is_empty() || pattern.is_empty() {
        return Err(Error::path_template(template, "empty key or pattern"));
    }

    let variant = RoutingInfoVariant {
        field_path,
        prefix: segments(&template[..open]),
        matching: segments(pattern),
        suffix: segments(&template[close + 1..]),
        codec: None,
    };
    Ok((name.to_string(), variant))
}

fn segments(text: &str) -> RoutingPathSpec {
    RoutingPathSpec {
        segments: text
            .split('/')
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    }
}

fn spec(segments: &[&str]) -> RoutingPathSpec {
    RoutingPathSpec {
        segments: segments.iter().map(ToString::to_string).collect(),
    }
}
