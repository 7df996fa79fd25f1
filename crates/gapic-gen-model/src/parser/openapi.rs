//! OpenAPI 3.0 JSON documents.
//!
//! `components.schemas` become messages. Every operation becomes a method
//! of a single service; its path and query parameters are gathered into a
//! synthetic `{OperationId}Request` message.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::qualify;
use crate::api::{Api, Field, FieldBehavior, Message, MessageRef, Method, PathBinding, PathInfo, Service, Typez};
use crate::error::{Error, Result};
use crate::pathtemplate::PathTemplate;
use crate::service_config::ServiceConfig;
use crate::wellknown;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const JSON_CONTENT: &str = "application/json";
const REQUEST_BODY_FIELD: &str = "requestBody";
const STRUCT_ID: &str = ".google.protobuf.Struct";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    info: Info,
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
    components: Components,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Info {
    title: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Server {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Components {
    schemas: BTreeMap<String, Schema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Schema {
    #[serde(rename = "type")]
    kind: String,
    format: String,
    description: String,
    #[serde(rename = "$ref")]
    reference: String,
    properties: BTreeMap<String, Schema>,
    required: Vec<String>,
    items: Option<Box<Schema>>,
    additional_properties: Option<AdditionalProperties>,
    deprecated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PathItem {
    get: Option<Operation>,
    put: Option<Operation>,
    post: Option<Operation>,
    delete: Option<Operation>,
    patch: Option<Operation>,
    parameters: Vec<Parameter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Operation {
    operation_id: String,
    summary: String,
    description: String,
    deprecated: bool,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: BTreeMap<String, Response>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Parameter {
    name: String,
    #[serde(rename = "in")]
    location: String,
    required: bool,
    description: String,
    schema: Schema,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequestBody {
    description: String,
    required: bool,
    content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediaType {
    schema: Schema,
}

/// Read and parse an OpenAPI document.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise whatever
/// [`new_api`] returns.
pub fn parse(source: &Path, service_config: Option<&ServiceConfig>) -> Result<Api> {
    let contents = std::fs::read(source).map_err(|e| Error::io(source, e))?;
    new_api(service_config, &contents)
}

/// Build an [`Api`] from the bytes of an OpenAPI 3.0 JSON document.
///
/// # Errors
///
/// Returns [`Error::Json`] if the document does not decode, and
/// [`Error::Schema`] for schemas the model cannot represent: inline object
/// properties, unknown `type`/`format` pairs, operations without an
/// `operationId`, and non-`$ref` request or response bodies.
pub fn new_api(service_config: Option<&ServiceConfig>, contents: &[u8]) -> Result<Api> {
    let doc: Document = serde_json::from_slice(contents)?;

    let mut api = Api {
        title: doc.info.title.clone(),
        description: doc.info.description.clone(),
        ..Api::default()
    };
    let mut service_name = doc
        .info
        .title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>();
    if let Some(sc) = service_config {
        api.name = sc.api_name().to_string();
        if !sc.title.is_empty() {
            api.title.clone_from(&sc.title);
        }
        if !sc.documentation.summary.is_empty() {
            api.description.clone_from(&sc.documentation.summary);
        }
        if let Some((package, service)) = sc.package_and_service() {
            api.package_name = package.to_string();
            service_name = service.to_string();
        }
    }
    if api.name.is_empty() {
        api.name = service_name.to_lowercase();
    }

    let mut builder = Builder { api: &mut api };
    for (name, schema) in &doc.components.schemas {
        let handle = builder.add_message(name, schema)?;
        builder.api.messages.push(handle);
    }
    builder.add_service(&doc, &service_name)?;

    info!(
        messages = api.messages.len(),
        services = api.services.len(),
        "parsed OpenAPI document"
    );
    wellknown::register(&mut api);
    Ok(api)
}

struct Builder<'a> {
    api: &'a mut Api,
}

impl Builder<'_> {
    fn package(&self) -> String {
        self.api.package_name.clone()
    }

    fn add_message(&mut self, name: &str, schema: &Schema) -> Result<MessageRef> {
        let package = self.package();
        let id = qualify(&package, name);
        if !matches!(schema.kind.as_str(), "object" | "") || !schema.reference.is_empty() {
            return Err(Error::schema(&id, "component schemas must be objects"));
        }

        let required: BTreeSet<&str> = schema.required.iter().map(String::as_str).collect();
        let mut fields = Vec::new();
        let mut nested = Vec::new();
        for (field_name, property) in &schema.properties {
            let field = self.make_field(&id, field_name, property, &mut nested)?;
            fields.push(with_presence(field, required.contains(field_name.as_str())));
        }

        let handle = self.api.add_message(Message {
            name: name.to_string(),
            package,
            documentation: schema.description.clone(),
            deprecated: schema.deprecated,
            fields,
            messages: nested.clone(),
            id,
            ..Message::default()
        });
        for child in nested {
            self.api.message_mut(child).parent = Some(handle);
        }
        Ok(handle)
    }

    fn make_field(
        &mut self,
        message_id: &str,
        name: &str,
        schema: &Schema,
        nested: &mut Vec<MessageRef>,
    ) -> Result<Field> {
        let id = format!("{message_id}.{name}");
        let mut field = Field {
            name: name.to_string(),
            json_name: name.to_string(),
            documentation: schema.description.clone(),
            deprecated: schema.deprecated,
            ..Field::default()
        };

        match (schema.kind.as_str(), &schema.items, &schema.additional_properties) {
            ("array", Some(items), _) => {
                (field.typez, field.typez_id) = self.element_type(&id, items)?;
                field.repeated = true;
            }
            ("array", None, _) => return Err(Error::schema(&id, "array schema without `items`")),
            ("object", _, Some(AdditionalProperties::Schema(values))) => {
                let entry = self.add_map_entry(message_id, name, values)?;
                field.typez = Typez::Message;
                field.typez_id = self.api.message(entry).id.clone();
                field.map = true;
                nested.push(entry);
            }
            ("object", _, Some(AdditionalProperties::Allowed(allowed))) if schema.properties.is_empty() => {
                debug!(field = %id, allowed, "free-form object property");
                field.typez = Typez::Message;
                field.typez_id = STRUCT_ID.to_string();
            }
            _ => (field.typez, field.typez_id) = self.element_type(&id, schema)?,
        }
        field.id = id;
        Ok(field)
    }

    /// Type of a non-repeated, non-map value.
    fn element_type(&self, id: &str, schema: &Schema) -> Result<(Typez, String)> {
        if !schema.reference.is_empty() {
            return Ok((Typez::Message, self.resolve_ref(id, &schema.reference)?));
        }
        match schema.kind.as_str() {
            "object" if schema.properties.is_empty() => {
                Ok((Typez::Message, STRUCT_ID.to_string()))
            }
            "object" => Err(Error::schema(id, "inline object schemas are not supported")),
            "array" => Err(Error::schema(id, "nested arrays are not supported")),
            kind => scalar_type(id, kind, &schema.format),
        }
    }

    fn resolve_ref(&self, id: &str, reference: &str) -> Result<String> {
        let Some(name) = reference.strip_prefix(SCHEMA_REF_PREFIX) else {
            return Err(Error::schema(id, format!("unsupported $ref {reference:?}")));
        };
        Ok(qualify(&self.api.package_name, name))
    }

    fn add_map_entry(&mut self, message_id: &str, name: &str, values: &Schema) -> Result<MessageRef> {
        let entry_name = format!("{}Entry", pascal_case(name));
        let entry_id = format!("{message_id}.{entry_name}");
        let mut value = self.make_field(&entry_id, "value", values, &mut Vec::new())?;
        if value.repeated || value.map {
            return Err(Error::schema(&entry_id, "map values must be scalars or messages"));
        }
        value.optional = false;
        let key = Field {
            name: "key".to_string(),
            json_name: "key".to_string(),
            id: format!("{entry_id}.key"),
            typez: Typez::String,
            ..Field::default()
        };
        Ok(self.api.add_message(Message {
            name: entry_name,
            package: self.package(),
            fields: vec![key, value],
            is_map: true,
            id: entry_id,
            ..Message::default()
        }))
    }

    fn add_service(&mut self, doc: &Document, service_name: &str) -> Result<()> {
        let package = self.package();
        let service_id = qualify(&package, service_name);

        let mut methods = Vec::new();
        for (path, item) in &doc.paths {
            let operations = [
                ("GET", &item.get),
                ("PUT", &item.put),
                ("POST", &item.post),
                ("DELETE", &item.delete),
                ("PATCH", &item.patch),
            ];
            for (verb, operation) in operations {
                if let Some(operation) = operation {
                    let method = self.make_method(&service_id, path, verb, item, operation)?;
                    methods.push(self.api.add_method(method));
                }
            }
        }
        if methods.is_empty() {
            debug!("OpenAPI document has no operations");
            return Ok(());
        }

        let default_host = doc
            .servers
            .first()
            .map(|s| {
                let url = s.url.split_once("://").map_or(s.url.as_str(), |(_, rest)| rest);
                url.split('/').next().unwrap_or_default().to_string()
            })
            .unwrap_or_default();
        let handle = self.api.add_service(Service {
            name: service_name.to_string(),
            id: service_id,
            package,
            documentation: doc.info.description.clone(),
            methods,
            default_host,
            ..Service::default()
        });
        self.api.services.push(handle);
        Ok(())
    }

    fn make_method(
        &mut self,
        service_id: &str,
        path: &str,
        verb: &str,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<Method> {
        if operation.operation_id.is_empty() {
            return Err(Error::schema(
                format!("{verb} {path}"),
                "operation has no operationId",
            ));
        }
        let name = pascal_case(&operation.operation_id);
        let id = format!("{service_id}.{name}");

        let input = self.add_request_message(&id, &name, item, operation)?;
        let input_type_id = self.api.message(input).id.clone();
        let query_parameters: BTreeSet<String> = item
            .parameters
            .iter()
            .chain(&operation.parameters)
            .filter(|p| p.location == "query")
            .map(|p| p.name.clone())
            .collect();
        let has_body = self
            .api
            .message(input)
            .fields
            .iter()
            .any(|f| f.name == REQUEST_BODY_FIELD);

        let output_type_id = match operation
            .responses
            .get("200")
            .and_then(|r| r.content.get(JSON_CONTENT))
        {
            None => wellknown::EMPTY_ID.to_string(),
            Some(media) if !media.schema.reference.is_empty() => {
                self.resolve_ref(&id, &media.schema.reference)?
            }
            Some(_) => return Err(Error::schema(&id, "response must be a `$ref`")),
        };

        let documentation = if operation.description.is_empty() {
            operation.summary.clone()
        } else {
            operation.description.clone()
        };
        Ok(Method {
            name,
            documentation,
            deprecated: operation.deprecated,
            input_type_id,
            returns_empty: output_type_id == wellknown::EMPTY_ID,
            output_type_id,
            path_info: Some(PathInfo {
                bindings: vec![PathBinding {
                    verb: verb.to_string(),
                    path_template: PathTemplate::parse(path)?,
                    query_parameters,
                    codec: None,
                }],
                body_field_path: if has_body { REQUEST_BODY_FIELD } else { "" }.to_string(),
                codec: None,
            }),
            id,
            ..Method::default()
        })
    }

    fn add_request_message(
        &mut self,
        method_id: &str,
        method_name: &str,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<MessageRef> {
        let name = format!("{method_name}Request");
        let id = qualify(&self.api.package_name, &name);

        let mut fields = Vec::new();
        for parameter in item.parameters.iter().chain(&operation.parameters) {
            if !matches!(parameter.location.as_str(), "path" | "query") {
                debug!(method = %method_id, parameter = %parameter.name, location = %parameter.location, "skipping parameter");
                continue;
            }
            let mut field = self.make_field(&id, &parameter.name, &parameter.schema, &mut Vec::new())?;
            if field.map {
                return Err(Error::schema(&field.id, "map-valued parameters are not supported"));
            }
            if field.documentation.is_empty() {
                field.documentation.clone_from(&parameter.description);
            }
            field.synthetic = true;
            fields.push(with_presence(field, parameter.required || parameter.location == "path"));
        }

        if let Some(body) = &operation.request_body {
            let Some(media) = body.content.get(JSON_CONTENT) else {
                return Err(Error::schema(method_id, "request body must be application/json"));
            };
            if media.schema.reference.is_empty() {
                return Err(Error::schema(method_id, "request body must be a `$ref`"));
            }
            let field = Field {
                name: REQUEST_BODY_FIELD.to_string(),
                json_name: REQUEST_BODY_FIELD.to_string(),
                id: format!("{id}.{REQUEST_BODY_FIELD}"),
                documentation: body.description.clone(),
                typez: Typez::Message,
                typez_id: self.resolve_ref(method_id, &media.schema.reference)?,
                ..Field::default()
            };
            fields.push(with_presence(field, body.required));
        }

        let handle = self.api.add_message(Message {
            name,
            package: self.package(),
            documentation: format!("The request message for {method_name}."),
            fields,
            id,
            ..Message::default()
        });
        self.api.messages.push(handle);
        Ok(handle)
    }
}

fn with_presence(mut field: Field, required: bool) -> Field {
    if required {
        field.behavior.push(FieldBehavior::Required);
    } else {
        field.optional = !field.repeated && !field.map;
    }
    field
}

fn scalar_type(id: &str, kind: &str, format: &str) -> Result<(Typez, String)> {
    let typez = match (kind, format) {
        ("boolean", _) => Typez::Bool,
        ("integer", "" | "int32") => Typez::Int32,
        ("integer", "int64") | ("string", "int64") => Typez::Int64,
        ("integer", "uint32") => Typez::Uint32,
        ("integer", "uint64") | ("string", "uint64") => Typez::Uint64,
        ("number", "float") => Typez::Float,
        ("number", "" | "double") => Typez::Double,
        ("string", "" | "date" | "uuid") => Typez::String,
        ("string", "byte" | "binary") => Typez::Bytes,
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

/// `list_secrets` / `listSecrets` → `ListSecrets`.
fn pascal_case(name: &str) -> String {
    name.split(['_', '-', '.'])
        .filter(|p| !p.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    const SECRETS: &str = indoc! {r##"
        {
          "openapi": "3.0.3",
          "info": {"title": "Secret Manager API", "description": "Stores secrets."},
          "servers": [{"url": "https://secretmanager.googleapis.com"}],
          "paths": {
            "/v1/projects/{project}/secrets": {
              "parameters": [
                {"name": "project", "in": "path", "required": true, "schema": {"type": "string"}}
              ],
              "get": {
                "operationId": "ListSecrets",
                "parameters": [
                  {"name": "pageSize", "in": "query", "schema": {"type": "integer", "format": "int32"}},
                  {"name": "pageToken", "in": "query", "schema": {"type": "string"}},
                  {"name": "x-goog-trace", "in": "header", "schema": {"type": "string"}}
                ],
                "responses": {
                  "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/ListSecretsResponse"}}}}
                }
              },
              "post": {
                "operationId": "CreateSecret",
                "requestBody": {
                  "required": true,
                  "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Secret"}}}
                },
                "responses": {
                  "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Secret"}}}}
                }
              }
            },
            "/v1/projects/{project}/secrets/{secret}": {
              "delete": {
                "operationId": "DeleteSecret",
                "parameters": [
                  {"name": "project", "in": "path", "required": true, "schema": {"type": "string"}},
                  {"name": "secret", "in": "path", "required": true, "schema": {"type": "string"}}
                ],
                "responses": {"200": {"description": "ok"}}
              }
            }
          },
          "components": {
            "schemas": {
              "Secret": {
                "type": "object",
                "required": ["name"],
                "properties": {
                  "name": {"type": "string"},
                  "createTime": {"type": "string", "format": "date-time"},
                  "labels": {"type": "object", "additionalProperties": {"type": "string"}},
                  "aliases": {"type": "array", "items": {"type": "string"}}
                }
              },
              "ListSecretsResponse": {
                "type": "object",
                "properties": {
                  "secrets": {"type": "array", "items": {"$ref": "#/components/schemas/Secret"}},
                  "nextPageToken": {"type": "string"}
                }
              }
            }
          }
        }
    "##};

    #[test]
    fn component_schemas_become_messages() {
        let api = new_api(None, SECRETS.as_bytes()).unwrap();
        assert_eq!(api.title, "Secret Manager API");
        assert_eq!(api.name, "secretmanagerapi");

        let secret = api.messages().find(|m| m.name == "Secret").unwrap();
        let fields: Vec<(&str, Typez, bool, bool, bool)> = secret
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.typez, f.repeated, f.map, f.optional))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("aliases", Typez::String, true, false, false),
                ("createTime", Typez::Message, false, false, true),
                ("labels", Typez::Message, false, true, false),
                ("name", Typez::String, false, false, false),
            ]
        );
        assert!(secret.fields[3].is_required());

        let entry = api.message(secret.messages[0]);
        assert_eq!(entry.id, ".Secret.LabelsEntry");
        assert!(entry.is_map);
        assert_eq!(entry.fields[0].name, "key");
        assert_eq!(entry.fields[1].name, "value");
        assert_eq!(secret.fields[2].typez_id, entry.id);
    }

    #[test]
    fn operations_become_methods() {
        let config = ServiceConfig::from_yaml(indoc! {"
            name: secretmanager.googleapis.com
            apis:
              - name: google.cloud.secretmanager.v1.SecretManagerService
        "})
        .unwrap();
        let api = new_api(Some(&config), SECRETS.as_bytes()).unwrap();
        assert_eq!(api.name, "secretmanager");
        let service = api.services().next().unwrap();
        assert_eq!(service.id, ".google.cloud.secretmanager.v1.SecretManagerService");
        assert_eq!(service.default_host, "secretmanager.googleapis.com");

        let names: Vec<&str> = service.methods.iter().map(|&m| api.method(m).name.as_str()).collect();
        assert_eq!(names, vec!["ListSecrets", "CreateSecret", "DeleteSecret"]);

        let list = api.method(service.methods[0]);
        assert_eq!(list.input_type_id, ".google.cloud.secretmanager.v1.ListSecretsRequest");
        let binding = &list.path_info.as_ref().unwrap().bindings[0];
        assert_eq!(binding.verb, "GET");
        assert_eq!(binding.path_template.to_string(), "/v1/projects/{project}/secrets");
        assert_eq!(
            binding.query_parameters,
            BTreeSet::from(["pageSize".to_string(), "pageToken".to_string()])
        );

        let request = arena_message(&api, &list.input_type_id);
        let fields: Vec<(&str, bool, bool)> = request
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.synthetic, f.is_required()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("project", true, true),
                ("pageSize", true, false),
                ("pageToken", true, false),
            ]
        );

        let create = api.method(service.methods[1]);
        assert_eq!(create.path_info.as_ref().unwrap().body_field_path, "requestBody");
        let delete = api.method(service.methods[2]);
        assert!(delete.returns_empty);
    }

    #[test]
    fn missing_operation_id_fails() {
        let err = new_api(
            None,
            br#"{"paths": {"/v1/x": {"get": {"responses": {}}}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("operationId"), "{err}");
    }

    #[test]
    fn inline_object_property_fails() {
        let err = new_api(
            None,
            br#"{"components": {"schemas": {"Foo": {"type": "object", "properties": {
                "bar": {"type": "object", "properties": {"baz": {"type": "string"}}}
            }}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema { ref id, .. } if id == ".Foo.bar"), "{err}");
    }

    #[test]
    fn pascal_case_names() {
        assert_eq!(pascal_case("listSecrets"), "ListSecrets");
        assert_eq!(pascal_case("list_secrets"), "ListSecrets");
        assert_eq!(pascal_case("labels"), "Labels");
    }

    fn arena_message<'a>(api: &'a Api, id: &str) -> &'a Message {
        api.state.messages.iter().find(|m| m.id == id).unwrap()
    }
}
