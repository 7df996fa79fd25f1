//! Google Discovery documents.
//!
//! Top-level schemas become messages, resources with methods become
//! services. Scalar properties map through a fixed `type`/`format` table;
//! array and object properties produce no field.

mod schema;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, info};

use self::schema::{Document, Method as DiscoveryMethod, Resource, Schema, SchemaKind};
use super::qualify;
use crate::api::{Api, Field, Message, Method, PathBinding, PathInfo, Service, Typez};
use crate::error::{Error, Result};
use crate::pathtemplate::PathTemplate;
use crate::service_config::ServiceConfig;
use crate::wellknown;

/// Read and parse a Discovery document.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise whatever
/// [`new_api`] returns.
pub fn parse(source: &Path, service_config: Option<&ServiceConfig>) -> Result<Api> {
    let contents = std::fs::read(source).map_err(|e| Error::io(source, e))?;
    new_api(service_config, &contents)
}

/// Build an [`Api`] from the bytes of a Discovery document.
///
/// The result has string IDs only; run
/// [`cross_reference`](crate::cross_reference) before following links.
///
/// # Errors
///
/// Returns [`Error::Json`] if the document does not decode, and
/// [`Error::Schema`] or [`Error::UnresolvedReference`] for structural
/// problems: non-object top-level schemas, unsupported property
/// `type`/`format` pairs, inline request or response schemas, and media
/// upload methods.
pub fn new_api(service_config: Option<&ServiceConfig>, contents: &[u8]) -> Result<Api> {
    let doc: Document = serde_json::from_slice(contents)?;
    doc.check()?;

    let mut api = Api {
        name: doc.name.clone(),
        title: doc.title.clone(),
        description: doc.description.clone(),
        ..Api::default()
    };
    if let Some(sc) = service_config {
        if !sc.name.is_empty() {
            api.name = sc.api_name().to_string();
        }
        if !sc.title.is_empty() {
            api.title.clone_from(&sc.title);
        }
        if !sc.documentation.summary.is_empty() {
            api.description.clone_from(&sc.documentation.summary);
        }
        if let Some((package, _)) = sc.package_and_service() {
            api.package_name = package.to_string();
        }
    }

    for (name, schema) in &doc.schemas {
        let message = make_message(&api.package_name, name, schema)?;
        let handle = api.add_message(message);
        api.messages.push(handle);
    }

    for name in doc.methods.keys() {
        debug!(method = %name, "ignoring top-level Discovery method");
    }
    let default_host = default_host(&doc.root_url);
    let mut builder = ServiceBuilder {
        api: &mut api,
        service_path: &doc.service_path,
        default_host: &default_host,
        seen: BTreeSet::new(),
    };
    builder.add_resources(&doc.resources)?;

    info!(
        messages = api.messages.len(),
        services = api.services.len(),
        "parsed Discovery document"
    );
    wellknown::register(&mut api);
    Ok(api)
}

fn make_message(package: &str, name: &str, schema: &Schema) -> Result<Message> {
    let id = qualify(package, name);
    match schema.classify(name)? {
        SchemaKind::Struct | SchemaKind::AnyStruct | SchemaKind::Map => {}
        kind => {
            return Err(Error::schema(
                name,
                format!("top-level schema must be an object, found {kind:?}"),
            ));
        }
    }

    let mut fields = Vec::new();
    for (field_name, property) in &schema.properties {
        if let Some(field) = make_field(package, &id, field_name, property)? {
            fields.push(field);
        }
    }
    Ok(Message {
        name: name.to_string(),
        package: package.to_string(),
        documentation: schema.description.clone(),
        deprecated: schema.deprecated,
        fields,
        id,
        ..Message::default()
    })
}

fn make_field(
    package: &str,
    message_id: &str,
    name: &str,
    property: &Schema,
) -> Result<Option<Field>> {
    let field_id = format!("{message_id}.{name}");
    let (typez, typez_id) = match property.classify(&field_id)? {
        SchemaKind::Reference => (Typez::Message, qualify(package, &property.reference)),
        SchemaKind::Simple => scalar_type(&field_id, &property.kind, &property.format)?,
        kind => {
            debug!(field = %field_id, ?kind, "skipping non-scalar Discovery property");
            return Ok(None);
        }
    };
    Ok(Some(Field {
        name: name.to_string(),
        json_name: name.to_string(),
        documentation: property.description.clone(),
        deprecated: property.deprecated,
        optional: true,
        typez,
        typez_id,
        id: field_id,
        ..Field::default()
    }))
}

/// Map a Discovery `type`/`format` pair onto a wire type; well-known
/// message types carry their ID.
fn scalar_type(id: &str, kind: &str, format: &str) -> Result<(Typez, String)> {
    let typez = match (kind, format) {
        ("boolean", _) => Typez::Bool,
        ("integer", "int32") => Typez::Int32,
        ("integer", "uint32") => Typez::Uint32,
        ("integer", "int64") | ("string", "int64") => Typez::Int64,
        ("integer", "uint64") | ("string", "uint64") => Typez::Uint64,
        ("number", "float") => Typez::Float,
        ("number", "double") => Typez::Double,
        ("string", "" | "date") => Typez::String,
        ("string", "byte") => Typez::Bytes,
        ("string", "date-time" | "google-datetime") => {
            return Ok((Typez::Message, wellknown::TIMESTAMP_ID.to_string()));
        }
        ("string", "google-duration") => {
            return Ok((Typez::Message, wellknown::DURATION_ID.to_string()));
        }
        ("string", "google-fieldmask") => {
            return Ok((Typez::Message, wellknown::FIELD_MASK_ID.to_string()));
        }
        _ => {
            return Err(Error::schema(
                id,
                format!("unknown type/format pair {kind:?}/{format:?}"),
            ));
        }
    };
    Ok((typez, String::new()))
}

fn default_host(root_url: &str) -> String {
    let host = root_url
        .strip_prefix("https://")
        .or_else(|| root_url.strip_prefix("http://"))
        .unwrap_or(root_url);
    host.split('/').next().unwrap_or_default().to_string()
}

struct ServiceBuilder<'a> {
    api: &'a mut Api,
    service_path: &'a str,
    default_host: &'a str,
    seen: BTreeSet<String>,
}

impl ServiceBuilder<'_> {
    fn add_resources(&mut self, resources: &BTreeMap<String, Resource>) -> Result<()> {
        for (name, resource) in resources {
            if !resource.methods.is_empty() {
                self.add_service(name, resource)?;
            }
            self.add_resources(&resource.resources)?;
        }
        Ok(())
    }

    fn add_service(&mut self, name: &str, resource: &Resource) -> Result<()> {
        let package = self.api.package_name.clone();
        let id = qualify(&package, name);
        if !self.seen.insert(id.clone()) {
            debug!(service = %id, "service already registered");
            return Ok(());
        }

        let mut methods = Vec::with_capacity(resource.methods.len());
        for (method_name, method) in &resource.methods {
            let method = self.make_method(&package, &id, method_name, method)?;
            methods.push(self.api.add_method(method));
        }
        let handle = self.api.add_service(Service {
            name: name.to_string(),
            id,
            package,
            methods,
            default_host: self.default_host.to_string(),
            ..Service::default()
        });
        self.api.services.push(handle);
        Ok(())
    }

    fn make_method(
        &self,
        package: &str,
        service_id: &str,
        name: &str,
        method: &DiscoveryMethod,
    ) -> Result<Method> {
        let id = format!("{service_id}.{name}");
        if method.supports_media_upload || method.media_upload.is_some() {
            return Err(Error::schema(&id, "media upload methods are not supported"));
        }
        let input_type_id = type_ref(package, &id, "request", method.request.as_ref())?;
        let output_type_id = type_ref(package, &id, "response", method.response.as_ref())?;

        let path = format!("{}{}", self.service_path, method.path);
        let binding = PathBinding {
            verb: method.http_method.to_uppercase(),
            path_template: PathTemplate::parse_discovery(&path)?,
            query_parameters: method
                .parameters
                .iter()
                .filter(|(_, p)| p.location == "query")
                .map(|(name, _)| name.clone())
                .collect(),
            codec: None,
        };
        Ok(Method {
            name: name.to_string(),
            documentation: method.description.clone(),
            deprecated: method.deprecated,
            returns_empty: output_type_id == wellknown::EMPTY_ID,
            path_info: Some(PathInfo {
                bindings: vec![binding],
                body_field_path: if method.request.is_some() { "*" } else { "" }.to_string(),
                codec: None,
            }),
            input_type_id,
            output_type_id,
            id,
            ..Method::default()
        })
    }
}

/// The message ID a request or response schema names; absent means `Empty`.
fn type_ref(package: &str, method_id: &str, kind: &str, schema: Option<&Schema>) -> Result<String> {
    match schema {
        None => Ok(wellknown::EMPTY_ID.to_string()),
        Some(schema) if !schema.reference.is_empty() => Ok(qualify(package, &schema.reference)),
        Some(_) => Err(Error::schema(
            method_id,
            format!("{kind} must be a `$ref` to a top-level schema"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const COMPUTE: &str = indoc! {r#"
        {
          "name": "compute",
          "title": "Compute Engine API",
          "description": "Creates and runs virtual machines.",
          "rootUrl": "https://compute.googleapis.com/",
          "servicePath": "compute/v1/",
          "schemas": {
            "Zone": {
              "type": "object",
              "id": "Zone",
              "properties": {
                "name": {"type": "string"},
                "id": {"type": "string", "format": "uint64"},
                "creationTimestamp": {"type": "string", "format": "google-datetime"},
                "deprecated": {"$ref": "DeprecationStatus"},
                "availableCpuPlatforms": {"type": "array", "items": {"type": "string"}},
                "labels": {"type": "object", "additionalProperties": {"type": "string"}}
              }
            },
            "DeprecationStatus": {
              "type": "object",
              "properties": {"state": {"type": "string"}}
            },
            "Operation": {"type": "object", "properties": {"name": {"type": "string"}}}
          },
          "resources": {
            "zones": {
              "methods": {
                "get": {
                  "id": "compute.zones.get",
                  "path": "projects/{project}/zones/{zone}",
                  "httpMethod": "GET",
                  "parameters": {
                    "project": {"type": "string", "location": "path", "required": true},
                    "zone": {"type": "string", "location": "path", "required": true},
                    "view": {"type": "string", "location": "query"}
                  },
                  "response": {"$ref": "Zone"}
                },
                "delete": {
                  "id": "compute.zones.delete",
                  "path": "projects/{project}/zones/{zone}",
                  "httpMethod": "DELETE",
                  "parameters": {}
                }
              }
            },
            "zonesets": {
              "resources": {
                "zones": {
                  "methods": {
                    "insert": {
                      "path": "projects/{+project}/zones",
                      "httpMethod": "POST",
                      "request": {"$ref": "Zone"},
                      "response": {"$ref": "Operation"}
                    }
                  }
                }
              }
            }
          }
        }
    "#};

    #[test]
    fn minimal_document() {
        let api = new_api(
            None,
            br#"{"name":"x","title":"T","schemas":{"Foo":{"type":"object","properties":{"bar":{"type":"string"}}}}}"#,
        )
        .unwrap();
        assert_eq!(api.name, "x");
        assert_eq!(api.title, "T");
        let messages: Vec<&Message> = api.messages().collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, "Foo");
        assert_eq!(messages[0].id, ".Foo");
        assert_eq!(messages[0].fields.len(), 1);
        assert_eq!(messages[0].fields[0].name, "bar");
        assert_eq!(messages[0].fields[0].typez, Typez::String);
    }

    #[test]
    fn schemas_and_fields_are_sorted() {
        let api = new_api(None, COMPUTE.as_bytes()).unwrap();
        let names: Vec<&str> = api.messages().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["DeprecationStatus", "Operation", "Zone"]);

        let zone = api.messages().find(|m| m.name == "Zone").unwrap();
        let fields: Vec<(&str, Typez, &str)> = zone
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.typez, f.typez_id.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("creationTimestamp", Typez::Message, ".google.protobuf.Timestamp"),
                ("deprecated", Typez::Message, ".DeprecationStatus"),
                ("id", Typez::Uint64, ""),
                ("name", Typez::String, ""),
            ]
        );
    }

    #[test]
    fn resources_become_services() {
        let config = ServiceConfig::from_yaml(indoc! {"
            name: compute.googleapis.com
            apis:
              - name: google.cloud.compute.v1.Zones
        "})
        .unwrap();
        let api = new_api(Some(&config), COMPUTE.as_bytes()).unwrap();
        assert_eq!(api.name, "compute");
        assert_eq!(api.package_name, "google.cloud.compute.v1");

        // `zones` appears twice in the resource tree; the first one wins.
        let services: Vec<&Service> = api.services().collect();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, ".google.cloud.compute.v1.zones");
        assert_eq!(services[0].default_host, "compute.googleapis.com");

        let methods: Vec<&Method> = services[0].methods.iter().map(|&m| api.method(m)).collect();
        assert_eq!(methods[0].name, "delete");
        assert_eq!(methods[0].input_type_id, wellknown::EMPTY_ID);
        assert!(methods[0].returns_empty);

        let get = methods[1];
        assert_eq!(get.id, ".google.cloud.compute.v1.zones.get");
        assert_eq!(get.output_type_id, ".google.cloud.compute.v1.Zone");
        let binding = &get.path_info.as_ref().unwrap().bindings[0];
        assert_eq!(binding.verb, "GET");
        assert_eq!(
            binding.path_template.to_string(),
            "/compute/v1/projects/{project}/zones/{zone}"
        );
        assert_eq!(binding.query_parameters, BTreeSet::from(["view".to_string()]));
    }

    #[test]
    fn top_level_object_with_additional_properties() {
        let api = new_api(
            None,
            br#"{"schemas": {
                "Labels": {"type": "object", "additionalProperties": {"type": "string"}},
                "Mixed": {
                    "type": "object",
                    "properties": {"kind": {"type": "string"}},
                    "additionalProperties": {"type": "integer", "format": "int32"}
                }
            }}"#,
        )
        .unwrap();
        let labels = api.messages().find(|m| m.id == ".Labels").unwrap();
        assert!(labels.fields.is_empty());
        assert!(!labels.is_map);
        let mixed = api.messages().find(|m| m.id == ".Mixed").unwrap();
        let names: Vec<&str> = mixed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["kind"]);
    }

    #[test]
    fn array_and_ref_top_level_schemas_fail() {
        let array = new_api(
            None,
            br#"{"schemas": {"List": {"type": "array", "items": {"type": "string"}}}}"#,
        );
        assert!(matches!(array, Err(Error::Schema { .. })));
        let reference = new_api(
            None,
            br#"{"schemas": {"Foo": {"type": "object"}, "Alias": {"$ref": "Foo"}}}"#,
        );
        assert!(matches!(reference, Err(Error::Schema { .. })));
    }

    #[test]
    fn non_object_top_level_schema_fails() {
        let err = new_api(None, br#"{"schemas": {"Foo": {"type": "string"}}}"#).unwrap_err();
        assert!(matches!(err, Error::Schema { ref id, .. } if id == "Foo"), "{err}");
    }

    #[test]
    fn unknown_format_fails() {
        let err = new_api(
            None,
            br#"{"schemas": {"Foo": {"type": "object", "properties": {"bar": {"type": "integer", "format": "int8"}}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema { ref id, .. } if id == ".Foo.bar"), "{err}");
    }

    #[test]
    fn inline_request_fails() {
        let err = new_api(
            None,
            br#"{"resources": {"r": {"methods": {"m": {"path": "x", "httpMethod": "POST",
                "request": {"type": "object", "properties": {"a": {"type": "string"}}}}}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }), "{err}");
    }

    #[test]
    fn media_upload_fails() {
        let err = new_api(
            None,
            br#"{"resources": {"r": {"methods": {"m": {"path": "x", "httpMethod": "POST",
                "supportsMediaUpload": true}}}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("media upload"), "{err}");
    }

    #[test]
    fn default_host_from_root_url() {
        assert_eq!(default_host("https://compute.googleapis.com/"), "compute.googleapis.com");
        assert_eq!(default_host("compute.googleapis.com"), "compute.googleapis.com");
        assert_eq!(default_host(""), "");
    }
}
