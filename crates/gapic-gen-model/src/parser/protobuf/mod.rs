//! Protobuf `FileDescriptorSet`s.
//!
//! The source is either a prebuilt descriptor set or a directory of `.proto`
//! files compiled with `protoc`. Files selected for generation contribute
//! the API's messages, enums and services; every other file in the set
//! contributes external roots so imported types still resolve.

mod protoc;
mod source_info;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use gapic_gen_core::descriptor::{
    field_label, http_rule_bindings, DescriptorProto, EnumDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, HttpRule, MethodDescriptorProto,
    ServiceDescriptorProto, FIELD_INFO_FORMAT_UUID4,
};
use prost::Message as _;
use tracing::{debug, info};

use self::source_info::{
    child, Comments, ENUM_VALUE, FILE_ENUM, FILE_MESSAGE, FILE_SERVICE, MESSAGE_ENUM,
    MESSAGE_FIELD, MESSAGE_NESTED, MESSAGE_ONEOF, SERVICE_METHOD,
};
use super::qualify;
use crate::api::{
    Api, Enum, EnumRef, EnumValue, Field, FieldBehavior, FieldRef, Message, MessageRef, Method,
    OneOf, OperationInfo, PathBinding, PathInfo, Service, Typez,
};
use crate::config::{ModelConfig, EXTRA_PROTOS_ROOT, GOOGLEAPIS_ROOT, INCLUDE_LIST};
use crate::error::{Error, Result};
use crate::pathtemplate::PathTemplate;
use crate::routing::parse_routing_rule;
use crate::service_config::ServiceConfig;
use crate::wellknown;

/// Extensions recognised as prebuilt descriptor sets.
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["binpb", "pb", "desc"];

/// Load the descriptor set named by `config` and build an [`Api`] from it.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Protoc`] when the descriptor set cannot
/// be produced, [`Error::ProtoDecode`] when it does not decode, and whatever
/// [`new_api`] returns.
pub fn parse(config: &ModelConfig, service_config: Option<&ServiceConfig>) -> Result<Api> {
    let source = config.specification_source();
    let prebuilt = source
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext));

    let bytes = if prebuilt {
        std::fs::read(source).map_err(|e| Error::io(source, e))?
    } else {
        let includes: Vec<PathBuf> = [GOOGLEAPIS_ROOT, EXTRA_PROTOS_ROOT]
            .into_iter()
            .filter_map(|key| config.option(key))
            .map(PathBuf::from)
            .collect();
        protoc::descriptor_set(source, &includes)?
    };
    let set = FileDescriptorSet::decode(bytes.as_slice())?;
    new_api(service_config, &set, &config.list_option(INCLUDE_LIST))
}

/// Build an [`Api`] from a decoded descriptor set.
///
/// Files named in `include_list` (full name or trailing path) are generated;
/// when the list is empty, every file sharing the package of the last file
/// in the set is.
///
/// # Errors
///
/// Returns [`Error::Schema`] for fields without a type and
/// [`Error::PathTemplate`] for malformed HTTP or routing annotations.
pub fn new_api(
    service_config: Option<&ServiceConfig>,
    set: &FileDescriptorSet,
    include_list: &[&str],
) -> Result<Api> {
    let generated = select_files(set, include_list);
    let package = set
        .file
        .iter()
        .zip(&generated)
        .find(|(_, selected)| **selected)
        .map(|(file, _)| text(file.package.as_deref()).to_string())
        .unwrap_or_default();

    let mut api = Api {
        name: api_name(&package),
        package_name: package,
        ..Api::default()
    };
    if let Some(sc) = service_config {
        if !sc.name.is_empty() {
            api.name = sc.api_name().to_string();
        }
        api.title.clone_from(&sc.title);
        api.description.clone_from(&sc.documentation.summary);
    }

    let mut builder = Builder {
        api,
        service_config,
        descriptors: BTreeMap::new(),
        handles: BTreeMap::new(),
        proto2: false,
    };
    for file in &set.file {
        let scope = package_scope(text(file.package.as_deref()));
        builder.index_descriptors(&scope, &file.message_type);
    }
    for (file, &selected) in set.file.iter().zip(&generated) {
        builder.add_file_types(file, selected)?;
    }
    for (file, &selected) in set.file.iter().zip(&generated) {
        if selected {
            builder.add_file_services(file)?;
        } else if !file.service.is_empty() {
            debug!(file = %text(file.name.as_deref()), "ignoring services of imported file");
        }
    }

    let mut api = builder.api;
    info!(
        package = %api.package_name,
        messages = api.messages.len(),
        enums = api.enums.len(),
        services = api.services.len(),
        "parsed protobuf descriptors"
    );
    wellknown::register(&mut api);
    Ok(api)
}

fn select_files(set: &FileDescriptorSet, include_list: &[&str]) -> Vec<bool> {
    if include_list.is_empty() {
        let package = set.file.last().map(|f| text(f.package.as_deref()));
        return set
            .file
            .iter()
            .map(|f| Some(text(f.package.as_deref())) == package)
            .collect();
    }
    set.file
        .iter()
        .map(|f| {
            let name = text(f.name.as_deref());
            include_list
                .iter()
                .any(|inc| name == *inc || name.ends_with(&format!("/{inc}")))
        })
        .collect()
}

/// `google.cloud.secretmanager.v1` → `secretmanager`.
fn api_name(package: &str) -> String {
    package
        .rsplit('.')
        .find(|part| {
            let mut chars = part.chars();
            !(chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit()))
        })
        .unwrap_or_default()
        .to_string()
}

/// Operation info names may omit the package of the method.
fn qualify_type(package: &str, name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else if name.contains('.') {
        format!(".{}", name.trim_start_matches('.'))
    } else {
        qualify(package, name)
    }
}

/// Prefix for IDs declared at file level: `.pkg`, or empty without a package.
fn package_scope(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{package}")
    }
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}

struct Builder<'a> {
    api: Api,
    service_config: Option<&'a ServiceConfig>,
    descriptors: BTreeMap<String, &'a DescriptorProto>,
    handles: BTreeMap<String, MessageRef>,
    proto2: bool,
}

impl<'a> Builder<'a> {
    fn index_descriptors(&mut self, scope: &str, messages: &'a [DescriptorProto]) {
        for message in messages {
            let id = format!("{scope}.{}", text(message.name.as_deref()));
            self.index_descriptors(&id, &message.nested_type);
            self.descriptors.insert(id, message);
        }
    }

    fn add_file_types(&mut self, file: &FileDescriptorProto, selected: bool) -> Result<()> {
        let package = text(file.package.as_deref());
        let scope = package_scope(package);
        let comments = Comments::new(file.source_code_info.as_ref());
        self.proto2 = matches!(file.syntax.as_deref(), None | Some("proto2"));

        for (i, proto) in file.message_type.iter().enumerate() {
            let path = child(&[], FILE_MESSAGE, i);
            let handle = self.add_message(proto, package, &scope, None, &path, &comments)?;
            if selected {
                self.api.messages.push(handle);
            } else {
                self.api.external_messages.push(handle);
            }
        }
        for (i, proto) in file.enum_type.iter().enumerate() {
            let path = child(&[], FILE_ENUM, i);
            let handle = self.add_enum(proto, package, &scope, None, &path, &comments);
            if selected {
                self.api.enums.push(handle);
            } else {
                self.api.external_enums.push(handle);
            }
        }
        Ok(())
    }

    fn add_message(
        &mut self,
        proto: &DescriptorProto,
        package: &str,
        scope: &str,
        parent: Option<MessageRef>,
        path: &[i32],
        comments: &Comments,
    ) -> Result<MessageRef> {
        let name = text(proto.name.as_deref());
        let id = format!("{scope}.{name}");

        // proto3 `optional` fields live in a synthetic single-field oneof.
        let synthetic: BTreeSet<i32> = proto
            .field
            .iter()
            .filter(|f| f.proto3_optional == Some(true))
            .filter_map(|f| f.oneof_index)
            .collect();
        let mut groups = BTreeMap::new();
        let mut one_ofs = Vec::new();
        for (k, oneof) in proto.oneof_decl.iter().enumerate() {
            let index = i32::try_from(k).unwrap_or(i32::MAX);
            if synthetic.contains(&index) {
                continue;
            }
            let oneof_name = text(oneof.name.as_deref());
            groups.insert(index, one_ofs.len());
            one_ofs.push(OneOf {
                name: oneof_name.to_string(),
                id: format!("{id}.{oneof_name}"),
                documentation: comments.get(&child(path, MESSAGE_ONEOF, k)),
                ..OneOf::default()
            });
        }

        let mut fields = Vec::with_capacity(proto.field.len());
        for (k, descriptor) in proto.field.iter().enumerate() {
            let mut field = self.make_field(descriptor, &id, comments.get(&child(path, MESSAGE_FIELD, k)))?;
            if let Some(&group) = descriptor.oneof_index.and_then(|i| groups.get(&i)) {
                field.is_oneof = true;
                field.group = Some(group);
                one_ofs[group].fields.push(fields.len());
            }
            fields.push(field);
        }

        let options = proto.options.as_ref();
        let handle = self.api.add_message(Message {
            name: name.to_string(),
            package: package.to_string(),
            documentation: comments.get(path),
            deprecated: options.and_then(|o| o.deprecated).unwrap_or(false),
            is_map: options.and_then(|o| o.map_entry).unwrap_or(false),
            fields,
            one_ofs,
            parent,
            id: id.clone(),
            ..Message::default()
        });
        self.handles.insert(id.clone(), handle);

        for (j, nested) in proto.nested_type.iter().enumerate() {
            let nested_path = child(path, MESSAGE_NESTED, j);
            let nested = self.add_message(nested, package, &id, Some(handle), &nested_path, comments)?;
            self.api.message_mut(handle).messages.push(nested);
        }
        for (j, nested) in proto.enum_type.iter().enumerate() {
            let nested_path = child(path, MESSAGE_ENUM, j);
            let nested = self.add_enum(nested, package, &id, Some(handle), &nested_path, comments);
            self.api.message_mut(handle).enums.push(nested);
        }
        Ok(handle)
    }

    fn make_field(&self, proto: &FieldDescriptorProto, message_id: &str, documentation: String) -> Result<Field> {
        let name = text(proto.name.as_deref());
        let id = format!("{message_id}.{name}");
        let typez = proto
            .r#type
            .and_then(Typez::from_proto)
            .ok_or_else(|| Error::schema(&id, "missing or unknown field type"))?;
        let options = proto.options.as_ref();
        let typez_id = match typez {
            Typez::Message | Typez::Enum | Typez::Group => text(proto.type_name.as_deref()).to_string(),
            _ => String::new(),
        };
        let label = proto.label.unwrap_or(field_label::OPTIONAL);

        Ok(Field {
            name: name.to_string(),
            documentation,
            json_name: proto.json_name.clone().unwrap_or_else(|| name.to_string()),
            typez,
            typez_id,
            repeated: label == field_label::REPEATED,
            optional: proto.proto3_optional == Some(true)
                || (self.proto2 && label == field_label::OPTIONAL),
            deprecated: options.and_then(|o| o.deprecated).unwrap_or(false),
            behavior: options
                .map(|o| {
                    o.field_behavior
                        .iter()
                        .filter_map(|&b| FieldBehavior::from_proto(b))
                        .collect()
                })
                .unwrap_or_default(),
            id,
            ..Field::default()
        })
    }

    fn add_enum(
        &mut self,
        proto: &EnumDescriptorProto,
        package: &str,
        scope: &str,
        parent: Option<MessageRef>,
        path: &[i32],
        comments: &Comments,
    ) -> EnumRef {
        let name = text(proto.name.as_deref());
        let id = format!("{scope}.{name}");
        let values = proto
            .value
            .iter()
            .enumerate()
            .map(|(k, value)| {
                let value_name = text(value.name.as_deref());
                EnumValue {
                    name: value_name.to_string(),
                    id: format!("{id}.{value_name}"),
                    documentation: comments.get(&child(path, ENUM_VALUE, k)),
                    number: value.number.unwrap_or_default(),
                    deprecated: value
                        .options
                        .as_ref()
                        .and_then(|o| o.deprecated)
                        .unwrap_or(false),
                    ..EnumValue::default()
                }
            })
            .collect();
        self.api.add_enum(Enum {
            name: name.to_string(),
            package: package.to_string(),
            documentation: comments.get(path),
            deprecated: proto
                .options
                .as_ref()
                .and_then(|o| o.deprecated)
                .unwrap_or(false),
            values,
            parent,
            id,
            ..Enum::default()
        })
    }

    fn add_file_services(&mut self, file: &FileDescriptorProto) -> Result<()> {
        let package = text(file.package.as_deref());
        let comments = Comments::new(file.source_code_info.as_ref());
        for (i, proto) in file.service.iter().enumerate() {
            let path = child(&[], FILE_SERVICE, i);
            self.add_service(proto, package, &path, &comments)?;
        }
        Ok(())
    }

    fn add_service(
        &mut self,
        proto: &ServiceDescriptorProto,
        package: &str,
        path: &[i32],
        comments: &Comments,
    ) -> Result<()> {
        let name = text(proto.name.as_deref());
        let id = qualify(package, name);

        let mut methods = Vec::with_capacity(proto.method.len());
        for (j, method) in proto.method.iter().enumerate() {
            let documentation = comments.get(&child(path, SERVICE_METHOD, j));
            let method = self.make_method(method, package, &id, documentation)?;
            for field in &method.auto_populated {
                self.api.message_mut(field.message).fields[field.index].auto_populated = true;
            }
            methods.push(self.api.add_method(method));
        }

        let options = proto.options.as_ref();
        let handle = self.api.add_service(Service {
            name: name.to_string(),
            package: package.to_string(),
            documentation: comments.get(path),
            deprecated: options.and_then(|o| o.deprecated).unwrap_or(false),
            default_host: options
                .and_then(|o| o.default_host.clone())
                .unwrap_or_default(),
            methods,
            id,
            ..Service::default()
        });
        self.api.services.push(handle);
        Ok(())
    }

    fn make_method(
        &self,
        proto: &MethodDescriptorProto,
        package: &str,
        service_id: &str,
        documentation: String,
    ) -> Result<Method> {
        let id = format!("{service_id}.{}", text(proto.name.as_deref()));
        let input_type_id = text(proto.input_type.as_deref()).to_string();
        let output_type_id = text(proto.output_type.as_deref()).to_string();
        let options = proto.options.as_ref();

        let path_info = options
            .and_then(|o| o.http.as_ref())
            .map(|rule| self.path_info(rule, &input_type_id))
            .transpose()?;
        let operation_info = options
            .and_then(|o| o.operation_info.as_ref())
            .map(|op| OperationInfo {
                response_type_id: qualify_type(package, &op.response_type),
                metadata_type_id: qualify_type(package, &op.metadata_type),
                ..OperationInfo::default()
            });
        let routing = options
            .and_then(|o| o.routing.as_ref())
            .map(parse_routing_rule)
            .transpose()?
            .unwrap_or_default();
        let auto_populated = self.auto_populated(&id, &input_type_id);

        Ok(Method {
            name: text(proto.name.as_deref()).to_string(),
            documentation,
            deprecated: options.and_then(|o| o.deprecated).unwrap_or(false),
            returns_empty: output_type_id == wellknown::EMPTY_ID,
            input_type_id,
            output_type_id,
            path_info,
            client_streaming: proto.client_streaming.unwrap_or(false),
            server_streaming: proto.server_streaming.unwrap_or(false),
            operation_info,
            routing,
            auto_populated,
            id,
            ..Method::default()
        })
    }

    /// HTTP bindings with query parameters: the request's top-level fields
    /// that are neither bound by the path nor sent as the body.
    fn path_info(&self, rule: &HttpRule, input_type_id: &str) -> Result<PathInfo> {
        let request_fields: Vec<&str> = self
            .descriptors
            .get(input_type_id)
            .map(|d| d.field.iter().map(|f| text(f.name.as_deref())).collect())
            .unwrap_or_default();

        let mut bindings = Vec::new();
        for (verb, path, body) in http_rule_bindings(rule) {
            let path_template = PathTemplate::parse(path)?;
            let mut query_parameters = BTreeSet::new();
            if body != "*" {
                let bound: BTreeSet<&str> = path_template
                    .variables()
                    .filter_map(|v| v.field_path.first())
                    .map(String::as_str)
                    .collect();
                for &name in &request_fields {
                    if name != body && !bound.contains(name) {
                        query_parameters.insert(name.to_string());
                    }
                }
            }
            bindings.push(PathBinding {
                verb: verb.to_string(),
                path_template,
                query_parameters,
                codec: None,
            });
        }
        Ok(PathInfo {
            bindings,
            body_field_path: rule.body.clone(),
            codec: None,
        })
    }

    /// AIP-4235: configured fields that are strings with UUID4 format and
    /// not required.
    fn auto_populated(&self, method_id: &str, input_type_id: &str) -> Vec<FieldRef> {
        let Some(sc) = self.service_config else {
            return Vec::new();
        };
        let names = sc.auto_populated_fields(method_id);
        let (Some(&message), Some(descriptor)) = (
            self.handles.get(input_type_id),
            self.descriptors.get(input_type_id),
        ) else {
            return Vec::new();
        };

        let fields = &self.api.message(message).fields;
        names
            .iter()
            .filter_map(|name| fields.iter().position(|f| f.name == *name))
            .filter(|&index| {
                let field = &fields[index];
                let uuid4 = descriptor.field[index]
                    .options
                    .as_ref()
                    .and_then(|o| o.field_info.as_ref())
                    .is_some_and(|info| info.format == FIELD_INFO_FORMAT_UUID4);
                let eligible = field.typez == Typez::String && uuid4 && !field.is_required();
                if !eligible {
                    debug!(method = %method_id, field = %field.name, "field is not eligible for auto-population");
                }
                eligible
            })
            .map(|index| FieldRef { message, index })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use gapic_gen_core::descriptor::{
        field_type, EnumValueDescriptorProto, FieldInfo, FieldOptions, HttpPattern,
        Location, MessageOptions, MethodOptions, OneofDescriptorProto, OperationInfo as LroInfo,
        RoutingParameter, RoutingRule, ServiceOptions, SourceCodeInfo,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn field(name: &str, ty: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(1),
            label: Some(field_label::OPTIONAL),
            r#type: Some(ty),
            type_name: (!type_name.is_empty()).then(|| type_name.to_string()),
            json_name: None,
            ..FieldDescriptorProto::default()
        }
    }

    fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            ..DescriptorProto::default()
        }
    }

    fn secret_file() -> FileDescriptorProto {
        let mut etag = field("etag", field_type::STRING, "");
        etag.proto3_optional = Some(true);
        etag.oneof_index = Some(1);
        let mut ttl = field("ttl", field_type::MESSAGE, ".google.protobuf.Duration");
        ttl.oneof_index = Some(0);
        let mut labels = field("labels", field_type::MESSAGE, ".test.v1.Secret.LabelsEntry");
        labels.label = Some(field_label::REPEATED);
        let mut name = field("name", field_type::STRING, "");
        name.options = Some(FieldOptions {
            field_behavior: vec![8],
            ..FieldOptions::default()
        });

        let mut secret = message("Secret", vec![name, labels, ttl, etag]);
        secret.oneof_decl = vec![
            OneofDescriptorProto {
                name: Some("expiration".to_string()),
            },
            OneofDescriptorProto {
                name: Some("_etag".to_string()),
            },
        ];
        let mut entry = message(
            "LabelsEntry",
            vec![
                field("key", field_type::STRING, ""),
                field("value", field_type::STRING, ""),
            ],
        );
        entry.options = Some(MessageOptions {
            map_entry: Some(true),
            ..MessageOptions::default()
        });
        secret.nested_type = vec![entry];

        let mut parent = field("parent", field_type::STRING, "");
        parent.options = Some(FieldOptions {
            field_behavior: vec![2],
            ..FieldOptions::default()
        });
        let mut request_id = field("request_id", field_type::STRING, "");
        request_id.options = Some(FieldOptions {
            field_info: Some(FieldInfo {
                format: FIELD_INFO_FORMAT_UUID4,
            }),
            ..FieldOptions::default()
        });
        let mut secret_field = field("secret", field_type::MESSAGE, ".test.v1.Secret");
        secret_field.json_name = Some("secret".to_string());

        let create = message(
            "CreateSecretRequest",
            vec![
                parent,
                field("secret_id", field_type::STRING, ""),
                secret_field,
                request_id,
            ],
        );

        let state = EnumDescriptorProto {
            name: Some("State".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("STATE_UNSPECIFIED".to_string()),
                    number: Some(0),
                    options: None,
                },
                EnumValueDescriptorProto {
                    name: Some("ENABLED".to_string()),
                    number: Some(1),
                    options: None,
                },
            ],
            options: None,
        };

        let create_method = MethodDescriptorProto {
            name: Some("CreateSecret".to_string()),
            input_type: Some(".test.v1.CreateSecretRequest".to_string()),
            output_type: Some(".google.longrunning.Operation".to_string()),
            options: Some(MethodOptions {
                http: Some(HttpRule {
                    pattern: Some(HttpPattern::Post("/v1/{parent=projects/*}/secrets".to_string())),
                    body: "secret".to_string(),
                    additional_bindings: vec![HttpRule {
                        pattern: Some(HttpPattern::Post(
                            "/v1/{parent=projects/*/locations/*}/secrets".to_string(),
                        )),
                        body: "secret".to_string(),
                        ..HttpRule::default()
                    }],
                    ..HttpRule::default()
                }),
                operation_info: Some(LroInfo {
                    response_type: "Secret".to_string(),
                    metadata_type: "google.protobuf.Empty".to_string(),
                }),
                routing: Some(RoutingRule {
                    routing_parameters: vec![RoutingParameter {
                        field: "parent".to_string(),
                        path_template: "{project=projects/*}/**".to_string(),
                    }],
                }),
                ..MethodOptions::default()
            }),
            client_streaming: None,
            server_streaming: Some(false),
        };

        FileDescriptorProto {
            name: Some("test/v1/secret.proto".to_string()),
            package: Some("test.v1".to_string()),
            dependency: vec!["google/protobuf/duration.proto".to_string()],
            message_type: vec![secret, create],
            enum_type: vec![state],
            service: vec![ServiceDescriptorProto {
                name: Some("SecretService".to_string()),
                method: vec![create_method],
                options: Some(ServiceOptions {
                    default_host: Some("secrets.example.com".to_string()),
                    ..ServiceOptions::default()
                }),
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![
                    Location {
                        path: vec![4, 0],
                        leading_comments: Some(" A secret.\n".to_string()),
                        ..Location::default()
                    },
                    Location {
                        path: vec![6, 0, 2, 0],
                        leading_comments: Some(" Creates a secret.\n".to_string()),
                        ..Location::default()
                    },
                ],
            }),
            syntax: Some("proto3".to_string()),
        }
    }

    fn duration_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("google/protobuf/duration.proto".to_string()),
            package: Some("google.protobuf".to_string()),
            message_type: vec![message(
                "Duration",
                vec![field("seconds", field_type::INT64, "")],
            )],
            syntax: Some("proto3".to_string()),
            ..FileDescriptorProto::default()
        }
    }

    fn descriptor_set() -> FileDescriptorSet {
        FileDescriptorSet {
            file: vec![duration_file(), secret_file()],
        }
    }

    fn service_config() -> ServiceConfig {
        ServiceConfig::from_yaml(indoc! {"
            name: secrets.googleapis.com
            title: Secrets API
            apis:
              - name: test.v1.SecretService
            publishing:
              method_settings:
                - selector: test.v1.SecretService.CreateSecret
                  auto_populated_fields:
                    - request_id
                    - parent
                    - secret_id
        "})
        .unwrap()
    }

    #[test]
    fn selects_files_of_last_package() {
        let api = new_api(None, &descriptor_set(), &[]).unwrap();
        assert_eq!(api.package_name, "test.v1");
        assert_eq!(api.name, "test");
        let names: Vec<&str> = api.messages().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Secret", "CreateSecretRequest"]);
        assert_eq!(api.enums().next().unwrap().id, ".test.v1.State");

        let external: Vec<&str> = api
            .external_messages
            .iter()
            .map(|&m| api.message(m).id.as_str())
            .collect();
        assert_eq!(external[0], ".google.protobuf.Duration");
        assert_eq!(
            external.iter().filter(|id| **id == ".google.protobuf.Duration").count(),
            1
        );
    }

    #[test]
    fn include_list_overrides_selection() {
        let api = new_api(None, &descriptor_set(), &["duration.proto"]).unwrap();
        assert_eq!(api.package_name, "google.protobuf");
        assert_eq!(api.messages().next().unwrap().id, ".google.protobuf.Duration");
        assert!(api.services.is_empty());
    }

    #[test]
    fn messages_fields_and_oneofs() {
        let api = new_api(None, &descriptor_set(), &[]).unwrap();
        let secret = api.messages().next().unwrap();
        assert_eq!(secret.documentation, "A secret.");

        // The synthetic `_etag` oneof is folded into `optional`.
        assert_eq!(secret.one_ofs.len(), 1);
        assert_eq!(secret.one_ofs[0].name, "expiration");
        assert_eq!(secret.one_ofs[0].fields, vec![2]);
        let ttl = &secret.fields[2];
        assert!(ttl.is_oneof);
        assert_eq!(ttl.group, Some(0));
        let etag = &secret.fields[3];
        assert!(etag.optional);
        assert!(!etag.is_oneof);

        assert_eq!(secret.fields[0].behavior, vec![FieldBehavior::Identifier]);
        assert_eq!(secret.fields[0].json_name, "name");
        assert!(secret.fields[1].repeated);

        let entry = api.message(secret.messages[0]);
        assert_eq!(entry.id, ".test.v1.Secret.LabelsEntry");
        assert!(entry.is_map);
        assert_eq!(entry.scopes(&api), vec!["test.v1.Secret.LabelsEntry", "test.v1.Secret", "test.v1"]);
    }

    #[test]
    fn services_and_methods() {
        let config = service_config();
        let api = new_api(Some(&config), &descriptor_set(), &[]).unwrap();
        assert_eq!(api.name, "secrets");
        assert_eq!(api.title, "Secrets API");

        let service = api.services().next().unwrap();
        assert_eq!(service.id, ".test.v1.SecretService");
        assert_eq!(service.default_host, "secrets.example.com");

        let method = api.method(service.methods[0]);
        assert_eq!(method.id, ".test.v1.SecretService.CreateSecret");
        assert_eq!(method.documentation, "Creates a secret.");
        assert!(!method.returns_empty);

        let path_info = method.path_info.as_ref().unwrap();
        assert_eq!(path_info.body_field_path, "secret");
        assert_eq!(path_info.bindings.len(), 2);
        assert_eq!(
            path_info.bindings[1].path_template.to_string(),
            "/v1/{parent=projects/*/locations/*}/secrets"
        );
        assert_eq!(
            path_info.bindings[0].query_parameters,
            BTreeSet::from(["request_id".to_string(), "secret_id".to_string()])
        );

        let lro = method.operation_info.as_ref().unwrap();
        assert_eq!(lro.response_type_id, ".test.v1.Secret");
        assert_eq!(lro.metadata_type_id, ".google.protobuf.Empty");

        assert_eq!(method.routing.len(), 1);
        assert_eq!(method.routing[0].name, "project");
        assert_eq!(method.routing[0].variants[0].template_as_string(), "projects/*/**");
    }

    #[test]
    fn auto_populated_fields_need_uuid4_and_optional() {
        let config = service_config();
        let api = new_api(Some(&config), &descriptor_set(), &[]).unwrap();
        let method = api.method(api.services().next().unwrap().methods[0]);

        // `parent` is required and `secret_id` lacks the UUID4 format.
        assert_eq!(method.auto_populated.len(), 1);
        let field = api.field(method.auto_populated[0]);
        assert_eq!(field.name, "request_id");
        assert!(field.auto_populated);
    }

    #[test]
    fn parse_reads_descriptor_files() {
        let dir = std::env::temp_dir().join("gapic-gen-protobuf-parse");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("secrets.binpb");
        std::fs::write(&path, descriptor_set().encode_to_vec()).unwrap();

        let config = ModelConfig::new(crate::config::SpecificationFormat::Protobuf, &path);
        let api = parse(&config, None).unwrap();
        assert_eq!(api.package_name, "test.v1");

        std::fs::write(&path, b"\xff\xff\xff").unwrap();
        assert!(matches!(parse(&config, None), Err(Error::ProtoDecode(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn helpers() {
        assert_eq!(api_name("google.cloud.secretmanager.v1"), "secretmanager");
        assert_eq!(api_name("google.cloud.secretmanager.v1beta2"), "secretmanager");
        assert_eq!(api_name(""), "");
        assert_eq!(qualify_type("a.b", "Foo"), ".a.b.Foo");
        assert_eq!(qualify_type("a.b", "google.protobuf.Empty"), ".google.protobuf.Empty");
        assert_eq!(qualify_type("a.b", ""), "");
    }
}
