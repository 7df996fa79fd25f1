//! Minimal protobuf descriptor types with `google.api` extension support.
//!
//! Standard [`prost_types`] descriptors drop extensions such as
//! `google.api.http` (field 72295728) or `google.api.field_behavior`
//! (field 1052) during decoding because prost doesn't retain unknown fields.
//! These custom types declare them so they survive.
//!
//! [`prost_types`]: https://docs.rs/prost-types

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(string, repeated, tag = "3")]
        pub dependency: Vec<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        /// Comments and spans, present when compiled with `--include_source_info`.
        #[prost(message, optional, tag = "9")]
        pub source_code_info: Option<SourceCodeInfo>,
        #[prost(string, optional, tag = "12")]
        pub syntax: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
        #[prost(message, repeated, tag = "8")]
        pub oneof_decl: Vec<OneofDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        #[prost(bool, optional, tag = "3")]
        pub deprecated: Option<bool>,
        /// Set by `protoc` on the synthetic `FooEntry` message of a `map<K, V>` field.
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "3")]
        pub number: Option<i32>,
        /// `LABEL_OPTIONAL = 1`, `LABEL_REQUIRED = 2`, `LABEL_REPEATED = 3`.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Protobuf field type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields (e.g., `.google.protobuf.Duration`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        #[prost(message, optional, tag = "8")]
        pub options: Option<FieldOptions>,
        #[prost(int32, optional, tag = "9")]
        pub oneof_index: Option<i32>,
        #[prost(string, optional, tag = "10")]
        pub json_name: Option<String>,
        #[prost(bool, optional, tag = "17")]
        pub proto3_optional: Option<bool>,
    }

    /// Field-level options, including the `google.api` field annotations.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldOptions {
        #[prost(bool, optional, tag = "3")]
        pub deprecated: Option<bool>,
        /// `google.api.field_behavior` extension (tag 1052).
        #[prost(int32, repeated, packed = "false", tag = "1052")]
        pub field_behavior: Vec<i32>,
        /// `google.api.field_info` extension (tag 291403980).
        #[prost(message, optional, tag = "291403980")]
        pub field_info: Option<FieldInfo>,
    }

    /// [`google.api.FieldInfo`]: format hints for string fields.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldInfo {
        /// `UUID4 = 1`, `IPV4 = 2`, `IPV6 = 3`, `IPV4_OR_IPV6 = 4`.
        #[prost(int32, tag = "1")]
        pub format: i32,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct OneofDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<EnumOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumOptions {
        #[prost(bool, optional, tag = "3")]
        pub deprecated: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<EnumValueOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueOptions {
        #[prost(bool, optional, tag = "1")]
        pub deprecated: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<ServiceOptions>,
    }

    /// Service options with the `google.api.default_host` extension (field 1049).
    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceOptions {
        #[prost(bool, optional, tag = "33")]
        pub deprecated: Option<bool>,
        #[prost(string, optional, tag = "1049")]
        pub default_host: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(message, optional, tag = "4")]
        pub options: Option<MethodOptions>,
        #[prost(bool, optional, tag = "5")]
        pub client_streaming: Option<bool>,
        #[prost(bool, optional, tag = "6")]
        pub server_streaming: Option<bool>,
    }

    /// Method options with the `google.api.http` (72295728), `google.api.routing`
    /// (72295729) and `google.longrunning.operation_info` (1049) extensions.
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodOptions {
        #[prost(bool, optional, tag = "33")]
        pub deprecated: Option<bool>,
        #[prost(message, optional, tag = "1049")]
        pub operation_info: Option<OperationInfo>,
        #[prost(message, optional, tag = "72295728")]
        pub http: Option<HttpRule>,
        #[prost(message, optional, tag = "72295729")]
        pub routing: Option<RoutingRule>,
    }

    /// [`google.api.HttpRule`]: defines REST mapping for an RPC.
    #[derive(Clone, PartialEq, Message)]
    pub struct HttpRule {
        #[prost(string, tag = "1")]
        pub selector: String,
        #[prost(oneof = "HttpPattern", tags = "2, 3, 4, 5, 6, 8")]
        pub pattern: Option<HttpPattern>,
        #[prost(string, tag = "7")]
        pub body: String,
        #[prost(message, repeated, tag = "11")]
        pub additional_bindings: Vec<HttpRule>,
        #[prost(string, tag = "12")]
        pub response_body: String,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum HttpPattern {
        #[prost(string, tag = "2")]
        Get(String),
        #[prost(string, tag = "3")]
        Put(String),
        #[prost(string, tag = "4")]
        Post(String),
        #[prost(string, tag = "5")]
        Delete(String),
        #[prost(string, tag = "6")]
        Patch(String),
        #[prost(message, tag = "8")]
        Custom(CustomHttpPattern),
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct CustomHttpPattern {
        #[prost(string, tag = "1")]
        pub kind: String,
        #[prost(string, tag = "2")]
        pub path: String,
    }

    /// [`google.api.RoutingRule`]: AIP-4222 explicit routing headers.
    #[derive(Clone, PartialEq, Message)]
    pub struct RoutingRule {
        #[prost(message, repeated, tag = "2")]
        pub routing_parameters: Vec<RoutingParameter>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct RoutingParameter {
        #[prost(string, tag = "1")]
        pub field: String,
        #[prost(string, tag = "2")]
        pub path_template: String,
    }

    /// [`google.longrunning.OperationInfo`]: result and metadata types of an LRO.
    #[derive(Clone, PartialEq, Message)]
    pub struct OperationInfo {
        #[prost(string, tag = "1")]
        pub response_type: String,
        #[prost(string, tag = "2")]
        pub metadata_type: String,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct SourceCodeInfo {
        #[prost(message, repeated, tag = "1")]
        pub location: Vec<Location>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Location {
        #[prost(int32, repeated, tag = "1")]
        pub path: Vec<i32>,
        #[prost(int32, repeated, tag = "2")]
        pub span: Vec<i32>,
        #[prost(string, optional, tag = "3")]
        pub leading_comments: Option<String>,
        #[prost(string, optional, tag = "4")]
        pub trailing_comments: Option<String>,
    }
}

pub use types::*;

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_GROUP = 10`
    pub const GROUP: i32 = 10;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;
}

/// Proto field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod field_label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REQUIRED = 2`
    pub const REQUIRED: i32 = 2;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// `google.api.FieldInfo.Format` value for UUID4 strings.
pub const FIELD_INFO_FORMAT_UUID4: i32 = 1;

/// Extract `(http_method, path)` from a single `HttpRule` pattern.
///
/// Custom patterns report their declared `kind` verbatim.
#[must_use]
pub fn http_rule_pattern(rule: &HttpRule) -> Option<(&str, &str)> {
    Some(match rule.pattern.as_ref()? {
        HttpPattern::Get(p) => ("GET", p.as_str()),
        HttpPattern::Put(p) => ("PUT", p.as_str()),
        HttpPattern::Post(p) => ("POST", p.as_str()),
        HttpPattern::Delete(p) => ("DELETE", p.as_str()),
        HttpPattern::Patch(p) => ("PATCH", p.as_str()),
        HttpPattern::Custom(c) => (c.kind.as_str(), c.path.as_str()),
    })
}

/// All `(http_method, path)` bindings of a rule: the primary one first, then
/// each of its `additional_bindings` in declaration order.
#[must_use]
pub fn http_rule_bindings(rule: &HttpRule) -> Vec<(&str, &str, &str)> {
    std::iter::once(rule)
        .chain(rule.additional_bindings.iter())
        .filter_map(|r| http_rule_pattern(r).map(|(verb, path)| (verb, path, r.body.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use prost::Message as _;

    use super::*;

    fn http_rule(pattern: HttpPattern, body: &str) -> HttpRule {
        HttpRule {
            selector: String::new(),
            pattern: Some(pattern),
            body: body.to_string(),
            additional_bindings: vec![],
            response_body: String::new(),
        }
    }

    #[test]
    fn get_pattern() {
        let rule = http_rule(HttpPattern::Get("/v1/{name=projects/*}".to_string()), "");
        assert_eq!(
            http_rule_pattern(&rule),
            Some(("GET", "/v1/{name=projects/*}"))
        );
    }

    #[test]
    fn custom_pattern_keeps_kind() {
        let rule = http_rule(
            HttpPattern::Custom(CustomHttpPattern {
                kind: "HEAD".to_string(),
                path: "/v1/items".to_string(),
            }),
            "",
        );
        assert_eq!(http_rule_pattern(&rule), Some(("HEAD", "/v1/items")));
    }

    #[test]
    fn rule_without_pattern_has_no_bindings() {
        let rule = HttpRule {
            body: "*".to_string(),
            ..HttpRule::default()
        };
        assert!(http_rule_pattern(&rule).is_none());
        assert!(http_rule_bindings(&rule).is_empty());
    }

    #[test]
    fn bindings_include_additional() {
        let mut rule = http_rule(HttpPattern::Post("/v1/things".to_string()), "*");
        rule.additional_bindings
            .push(http_rule(HttpPattern::Put("/v1/things/{id}".to_string()), "thing"));
        let bindings = http_rule_bindings(&rule);
        assert_eq!(
            bindings,
            vec![
                ("POST", "/v1/things", "*"),
                ("PUT", "/v1/things/{id}", "thing"),
            ]
        );
    }

    #[test]
    fn field_type_constants() {
        assert_eq!(field_type::STRING, 9);
        assert_eq!(field_type::ENUM, 14);
        assert_eq!(field_type::SINT64, 18);
        assert_eq!(field_label::REPEATED, 3);
    }

    /// Encode → decode keeps the google.api extensions intact.
    #[test]
    fn extensions_survive_decoding() {
        let original = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("test.proto".to_string()),
                package: Some("test.v1".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Req".to_string()),
                    field: vec![FieldDescriptorProto {
                        name: Some("request_id".to_string()),
                        number: Some(1),
                        r#type: Some(field_type::STRING),
                        options: Some(FieldOptions {
                            deprecated: None,
                            field_behavior: vec![2, 5],
                            field_info: Some(FieldInfo {
                                format: FIELD_INFO_FORMAT_UUID4,
                            }),
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                service: vec![ServiceDescriptorProto {
                    name: Some("Svc".to_string()),
                    method: vec![MethodDescriptorProto {
                        name: Some("CreateThing".to_string()),
                        input_type: Some(".test.v1.Req".to_string()),
                        output_type: Some(".google.longrunning.Operation".to_string()),
                        options: Some(MethodOptions {
                            http: Some(http_rule(HttpPattern::Post("/v1/test".to_string()), "*")),
                            routing: Some(RoutingRule {
                                routing_parameters: vec![RoutingParameter {
                                    field: "name".to_string(),
                                    path_template: "{project=projects/*}/**".to_string(),
                                }],
                            }),
                            operation_info: Some(OperationInfo {
                                response_type: "Thing".to_string(),
                                metadata_type: "google.protobuf.Empty".to_string(),
                            }),
                            deprecated: Some(true),
                        }),
                        ..Default::default()
                    }],
                    options: Some(ServiceOptions {
                        deprecated: None,
                        default_host: Some("test.googleapis.com".to_string()),
                    }),
                }],
                ..Default::default()
            }],
        };

        let bytes = original.encode_to_vec();
        let decoded = FileDescriptorSet::decode(bytes.as_slice()).unwrap();
        assert_eq!(original, decoded);
    }
}
