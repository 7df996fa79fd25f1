//! The language-neutral API model.
//!
//! All messages, enums, services and methods live in arenas owned by
//! [`State`]. Cross references between them (a field's type, a method's
//! input, a nested message's parent) are small `Copy` handles into those
//! arenas, so the graph can be cyclic without shared ownership.
//!
//! The model is built by a parser, then completed in place by
//! [`cross_reference`](crate::cross_reference). Until that pass has run, only
//! the string IDs (`typez_id`, `input_type_id`, ...) are meaningful.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::pathtemplate::PathTemplate;

/// Opaque per-element annotation slot reserved for code generators.
///
/// Parsers always leave it `None`.
pub type Codec = Option<serde_json::Value>;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);
    };
}

handle!(
    /// Handle to a [`Message`] stored in [`State`].
    MessageRef
);
handle!(
    /// Handle to an [`Enum`] stored in [`State`].
    EnumRef
);
handle!(
    /// Handle to a [`Service`] stored in [`State`].
    ServiceRef
);
handle!(
    /// Handle to a [`Method`] stored in [`State`].
    MethodRef
);

/// Address of a field: the owning message plus the field's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldRef {
    /// Message that owns the field.
    pub message: MessageRef,
    /// Index into [`Message::fields`].
    pub index: usize,
}

/// Resolved target of a message- or enum-typed field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// The field holds a message.
    Message(MessageRef),
    /// The field holds an enum value.
    Enum(EnumRef),
}

/// Wire type of a field, numbered as in `google.protobuf.FieldDescriptorProto.Type`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Typez {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    #[default]
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl Typez {
    /// Map a descriptor `type` number to a [`Typez`].
    #[must_use]
    pub fn from_proto(value: i32) -> Option<Self> {
        Some(match value {
            1 => Self::Double,
            2 => Self::Float,
            3 => Self::Int64,
            4 => Self::Uint64,
            5 => Self::Int32,
            6 => Self::Fixed64,
            7 => Self::Fixed32,
            8 => Self::Bool,
            9 => Self::String,
            10 => Self::Group,
            11 => Self::Message,
            12 => Self::Bytes,
            13 => Self::Uint32,
            14 => Self::Enum,
            15 => Self::Sfixed32,
            16 => Self::Sfixed64,
            17 => Self::Sint32,
            18 => Self::Sint64,
            _ => return None,
        })
    }
}

/// `google.api.field_behavior` annotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum FieldBehavior {
    Optional,
    Required,
    OutputOnly,
    InputOnly,
    Immutable,
    UnorderedList,
    NonEmptyDefault,
    Identifier,
}

impl FieldBehavior {
    /// Map an annotation number to a [`FieldBehavior`]; `0` (unspecified) and
    /// unknown values map to `None`.
    #[must_use]
    pub fn from_proto(value: i32) -> Option<Self> {
        Some(match value {
            1 => Self::Optional,
            2 => Self::Required,
            3 => Self::OutputOnly,
            4 => Self::InputOnly,
            5 => Self::Immutable,
            6 => Self::UnorderedList,
            7 => Self::NonEmptyDefault,
            8 => Self::Identifier,
            _ => return None,
        })
    }
}

/// A complete API: its identity, its top-level elements and the arenas that
/// hold every element reachable from them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Api {
    /// Short API name, e.g. `secretmanager`.
    pub name: String,
    /// Package shared by every element the generator emits.
    pub package_name: String,
    /// Human-readable title.
    pub title: String,
    /// Overview documentation.
    pub description: String,
    /// Services to generate.
    pub services: Vec<ServiceRef>,
    /// Top-level messages to generate.
    pub messages: Vec<MessageRef>,
    /// Top-level enums to generate.
    pub enums: Vec<EnumRef>,
    /// Messages defined elsewhere (imports, well-known types) that the API
    /// refers to but does not generate.
    pub external_messages: Vec<MessageRef>,
    /// Enums defined elsewhere.
    pub external_enums: Vec<EnumRef>,
    /// Element storage and ID indices.
    pub state: State,
    /// Generator annotations.
    pub codec: Codec,
}

/// Arenas and ID → handle indices.
///
/// The indices are rebuilt by [`cross_reference`](crate::cross_reference);
/// elements dropped by skip lists stay in the arenas but disappear from the
/// indices and top-level lists.
#[derive(Clone, Debug, Default, Serialize)]
pub struct State {
    pub(crate) messages: Vec<Message>,
    pub(crate) enums: Vec<Enum>,
    pub(crate) services: Vec<Service>,
    pub(crate) methods: Vec<Method>,
    pub(crate) message_by_id: BTreeMap<String, MessageRef>,
    pub(crate) enum_by_id: BTreeMap<String, EnumRef>,
    pub(crate) service_by_id: BTreeMap<String, ServiceRef>,
    pub(crate) method_by_id: BTreeMap<String, MethodRef>,
}

impl State {
    /// Look up a message by its fully-qualified ID.
    #[must_use]
    pub fn message_by_id(&self, id: &str) -> Option<MessageRef> {
        self.message_by_id.get(id).copied()
    }

    /// Look up an enum by its fully-qualified ID.
    #[must_use]
    pub fn enum_by_id(&self, id: &str) -> Option<EnumRef> {
        self.enum_by_id.get(id).copied()
    }

    /// Look up a service by its fully-qualified ID.
    #[must_use]
    pub fn service_by_id(&self, id: &str) -> Option<ServiceRef> {
        self.service_by_id.get(id).copied()
    }

    /// Look up a method by its fully-qualified ID.
    #[must_use]
    pub fn method_by_id(&self, id: &str) -> Option<MethodRef> {
        self.method_by_id.get(id).copied()
    }

    /// All indexed message IDs, sorted.
    pub fn message_ids(&self) -> impl Iterator<Item = &str> {
        self.message_by_id.keys().map(String::as_str)
    }

    pub(crate) fn add_message(&mut self, mut message: Message) -> MessageRef {
        let handle = MessageRef(self.messages.len());
        for field in &mut message.fields {
            field.parent = Some(handle);
        }
        self.messages.push(message);
        handle
    }

    pub(crate) fn add_enum(&mut self, mut enumeration: Enum) -> EnumRef {
        let handle = EnumRef(self.enums.len());
        for value in &mut enumeration.values {
            value.parent = Some(handle);
        }
        self.enums.push(enumeration);
        handle
    }

    pub(crate) fn add_service(&mut self, service: Service) -> ServiceRef {
        let handle = ServiceRef(self.services.len());
        self.services.push(service);
        handle
    }

    pub(crate) fn add_method(&mut self, method: Method) -> MethodRef {
        let handle = MethodRef(self.methods.len());
        self.methods.push(method);
        handle
    }

    pub(crate) fn clear_indices(&mut self) {
        self.message_by_id.clear();
        self.enum_by_id.clear();
        self.service_by_id.clear();
        self.method_by_id.clear();
    }
}

/// A structured type.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Message {
    /// Simple name, e.g. `Secret`.
    pub name: String,
    /// Fully-qualified ID with a leading dot, e.g. `.google.cloud.secretmanager.v1.Secret`.
    pub id: String,
    /// Package the message was declared in.
    pub package: String,
    /// Documentation comment.
    pub documentation: String,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Nested messages.
    pub messages: Vec<MessageRef>,
    /// Nested enums.
    pub enums: Vec<EnumRef>,
    /// Oneof groups; fields point at them through [`Field::group`].
    pub one_ofs: Vec<OneOf>,
    /// Enclosing message, `None` at top level.
    pub parent: Option<MessageRef>,
    /// Synthetic key/value entry message of a map field.
    pub is_map: bool,
    /// Set on list-response messages.
    pub pagination: Option<PaginationInfo>,
    /// Generator annotations.
    pub codec: Codec,
}

/// Fields of a list response that drive pagination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    /// The `next_page_token` field.
    pub next_page_token: FieldRef,
    /// The single repeated or map field holding the page's items.
    pub pageable_item: FieldRef,
}

/// A field of a [`Message`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct Field {
    /// Field name as written in the source.
    pub name: String,
    /// `{message id}.{name}`.
    pub id: String,
    /// Documentation comment.
    pub documentation: String,
    /// JSON name (lowerCamelCase unless overridden).
    pub json_name: String,
    /// Wire type.
    pub typez: Typez,
    /// ID of the message or enum type, empty for scalars.
    pub typez_id: String,
    /// Resolved `typez_id`.
    pub target: Option<TypeRef>,
    /// Explicit presence.
    pub optional: bool,
    /// Repeated (list) field.
    pub repeated: bool,
    /// Map field; its `typez_id` names an entry message.
    pub map: bool,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// Member of a oneof group.
    pub is_oneof: bool,
    /// Not present on the wire, added by a parser (e.g. OpenAPI path params).
    pub synthetic: bool,
    /// Part of a message-type cycle.
    pub recursive: bool,
    /// Populated with a UUID4 by clients when left empty.
    pub auto_populated: bool,
    /// `google.api.field_behavior` annotations.
    pub behavior: Vec<FieldBehavior>,
    /// Index into the owner's [`Message::one_ofs`].
    pub group: Option<usize>,
    /// Owning message.
    pub parent: Option<MessageRef>,
    /// Generator annotations.
    pub codec: Codec,
}

impl Field {
    /// Whether the field carries the `REQUIRED` behavior.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.behavior.contains(&FieldBehavior::Required)
    }
}

/// A oneof group.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OneOf {
    /// Group name.
    pub name: String,
    /// `{message id}.{name}`.
    pub id: String,
    /// Documentation comment.
    pub documentation: String,
    /// Indices into the owner's [`Message::fields`].
    pub fields: Vec<usize>,
    /// Generator annotations.
    pub codec: Codec,
}

/// An enumeration.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Enum {
    /// Simple name.
    pub name: String,
    /// Fully-qualified ID.
    pub id: String,
    /// Package the enum was declared in.
    pub package: String,
    /// Documentation comment.
    pub documentation: String,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// Values in declaration order.
    pub values: Vec<EnumValue>,
    /// Indices into `values` of the first value declared for each number.
    pub unique_number_values: Vec<usize>,
    /// Enclosing message, `None` at top level.
    pub parent: Option<MessageRef>,
    /// Generator annotations.
    pub codec: Codec,
}

/// One value of an [`Enum`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// `{enum id}.{name}`.
    pub id: String,
    /// Documentation comment.
    pub documentation: String,
    /// Wire number.
    pub number: i32,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// Owning enum.
    pub parent: Option<EnumRef>,
    /// Generator annotations.
    pub codec: Codec,
}

/// A service: a named group of methods.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Service {
    /// Simple name.
    pub name: String,
    /// Fully-qualified ID.
    pub id: String,
    /// Package the service was declared in.
    pub package: String,
    /// Documentation comment.
    pub documentation: String,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// Methods in declaration order.
    pub methods: Vec<MethodRef>,
    /// Default hostname, e.g. `secretmanager.googleapis.com`.
    pub default_host: String,
    /// Generator annotations.
    pub codec: Codec,
}

/// An RPC.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Method {
    /// Simple name.
    pub name: String,
    /// `{service id}.{name}`.
    pub id: String,
    /// Documentation comment.
    pub documentation: String,
    /// Marked deprecated in the source.
    pub deprecated: bool,
    /// ID of the request message.
    pub input_type_id: String,
    /// Resolved `input_type_id`.
    pub input_type: Option<MessageRef>,
    /// ID of the response message.
    pub output_type_id: String,
    /// Resolved `output_type_id`.
    pub output_type: Option<MessageRef>,
    /// The response is `google.protobuf.Empty`.
    pub returns_empty: bool,
    /// HTTP bindings.
    pub path_info: Option<PathInfo>,
    /// Request field carrying the page token, for paginated methods.
    pub pagination: Option<FieldRef>,
    /// Client streaming RPC.
    pub client_streaming: bool,
    /// Server streaming RPC.
    pub server_streaming: bool,
    /// Long-running operation metadata.
    pub operation_info: Option<OperationInfo>,
    /// Implicit routing headers.
    pub routing: Vec<RoutingInfo>,
    /// Request fields clients fill with a UUID4 when empty.
    pub auto_populated: Vec<FieldRef>,
    /// Owning service.
    pub service: Option<ServiceRef>,
    /// Generator annotations.
    pub codec: Codec,
}

/// HTTP bindings for a method.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathInfo {
    /// Primary binding first, then additional bindings.
    pub bindings: Vec<PathBinding>,
    /// Request field sent as the body: `*`, a field name, or empty for none.
    pub body_field_path: String,
    /// Generator annotations.
    pub codec: Codec,
}

/// One HTTP verb + path combination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathBinding {
    /// Upper-case HTTP verb, or the custom verb verbatim.
    pub verb: String,
    /// Request path.
    pub path_template: PathTemplate,
    /// Request fields sent as query parameters.
    pub query_parameters: BTreeSet<String>,
    /// Generator annotations.
    pub codec: Codec,
}

/// Long-running operation types of a method.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OperationInfo {
    /// ID of the metadata message.
    pub metadata_type_id: String,
    /// ID of the final response message.
    pub response_type_id: String,
    /// Resolved `metadata_type_id`.
    pub metadata_type: Option<MessageRef>,
    /// Resolved `response_type_id`.
    pub response_type: Option<MessageRef>,
    /// Generator annotations.
    pub codec: Codec,
}

/// All routing variants that compute one routing header key.
///
/// Variants are stored in reverse declaration order: the last matching
/// declaration wins, so generators try them first to last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoutingInfo {
    /// Header key.
    pub name: String,
    /// Candidate extractions, highest priority first.
    pub variants: Vec<RoutingInfoVariant>,
}

/// One way to extract a routing header value from a request field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoutingInfoVariant {
    /// Request field path, split on `.`.
    pub field_path: Vec<String>,
    /// Segments that must precede the captured value.
    pub prefix: RoutingPathSpec,
    /// Segments that form the captured value.
    pub matching: RoutingPathSpec,
    /// Segments that must follow the captured value.
    pub suffix: RoutingPathSpec,
    /// Generator annotations.
    pub codec: Codec,
}

/// A list of path segments (literals, `*`, `**`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoutingPathSpec {
    /// The segments.
    pub segments: Vec<String>,
}

impl RoutingInfoVariant {
    /// The dotted request field path.
    #[must_use]
    pub fn field_name(&self) -> String {
        self.field_path.join(".")
    }

    /// Prefix, matching and suffix segments joined with `/`.
    #[must_use]
    pub fn template_as_string(&self) -> String {
        self.prefix
            .segments
            .iter()
            .chain(&self.matching.segments)
            .chain(&self.suffix.segments)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// One choice of variant per routing key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingInfoCombo<'a> {
    /// `(key, variant)` pairs in key order.
    pub items: Vec<RoutingInfoComboItem<'a>>,
}

/// A routing key with the variant chosen for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutingInfoComboItem<'a> {
    /// Header key.
    pub name: &'a str,
    /// Chosen extraction.
    pub variant: &'a RoutingInfoVariant,
}

impl Method {
    /// Every combination of one variant per routing key.
    ///
    /// The result size is the product of the variant counts; a method with no
    /// routing info yields a single empty combination.
    #[must_use]
    pub fn routing_combos(&self) -> Vec<RoutingInfoCombo<'_>> {
        let mut combos = vec![RoutingInfoCombo::default()];
        for info in &self.routing {
            let mut next = Vec::with_capacity(combos.len() * info.variants.len());
            for combo in &combos {
                for variant in &info.variants {
                    let mut items = combo.items.clone();
                    items.push(RoutingInfoComboItem {
                        name: &info.name,
                        variant,
                    });
                    next.push(RoutingInfoCombo { items });
                }
            }
            combos = next;
        }
        combos
    }
}

impl Message {
    /// Naming scopes from the innermost outwards: the message itself, each
    /// enclosing message, then the package.
    #[must_use]
    pub fn scopes(&self, api: &Api) -> Vec<String> {
        let mut scopes = vec![self.id.trim_start_matches('.').to_string()];
        let mut parent = self.parent;
        while let Some(p) = parent {
            let message = api.message(p);
            scopes.push(message.id.trim_start_matches('.').to_string());
            parent = message.parent;
        }
        if !self.package.is_empty() {
            scopes.push(self.package.clone());
        }
        scopes
    }

    /// Whether this message, any field, or any nested element is deprecated.
    #[must_use]
    pub fn has_deprecated_entities(&self, api: &Api) -> bool {
        self.deprecated
            || self.fields.iter().any(|f| f.deprecated)
            || self.enums.iter().any(|&e| api.enum_type(e).has_deprecated_entities())
            || self
                .messages
                .iter()
                .any(|&m| api.message(m).has_deprecated_entities(api))
    }

    /// Iterate over the fields that are not members of a oneof group.
    pub fn basic_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_oneof)
    }
}

impl Enum {
    /// Naming scopes used to resolve names declared inside the enum: those of
    /// its enclosing message, or just its package at top level.
    #[must_use]
    pub fn scopes(&self, api: &Api) -> Vec<String> {
        match self.parent {
            Some(p) => api.message(p).scopes(api),
            None if self.package.is_empty() => Vec::new(),
            None => vec![self.package.clone()],
        }
    }

    /// Whether the enum or any of its values is deprecated.
    #[must_use]
    pub fn has_deprecated_entities(&self) -> bool {
        self.deprecated || self.values.iter().any(|v| v.deprecated)
    }

    /// The first value declared for each distinct number.
    pub fn unique_values(&self) -> impl Iterator<Item = &EnumValue> {
        self.unique_number_values.iter().map(|&i| &self.values[i])
    }
}

impl Service {
    /// Whether the service or any of its methods is deprecated.
    #[must_use]
    pub fn has_deprecated_entities(&self, api: &Api) -> bool {
        self.deprecated || self.methods.iter().any(|&m| api.method(m).deprecated)
    }
}

impl Api {
    /// Look up a message by handle.
    #[must_use]
    pub fn message(&self, handle: MessageRef) -> &Message {
        &self.state.messages[handle.0]
    }

    /// Mutable access to a message.
    pub fn message_mut(&mut self, handle: MessageRef) -> &mut Message {
        &mut self.state.messages[handle.0]
    }

    /// Look up an enum by handle.
    #[must_use]
    pub fn enum_type(&self, handle: EnumRef) -> &Enum {
        &self.state.enums[handle.0]
    }

    /// Mutable access to an enum.
    pub fn enum_type_mut(&mut self, handle: EnumRef) -> &mut Enum {
        &mut self.state.enums[handle.0]
    }

    /// Look up a service by handle.
    #[must_use]
    pub fn service(&self, handle: ServiceRef) -> &Service {
        &self.state.services[handle.0]
    }

    /// Mutable access to a service.
    pub fn service_mut(&mut self, handle: ServiceRef) -> &mut Service {
        &mut self.state.services[handle.0]
    }

    /// Look up a method by handle.
    #[must_use]
    pub fn method(&self, handle: MethodRef) -> &Method {
        &self.state.methods[handle.0]
    }

    /// Mutable access to a method.
    pub fn method_mut(&mut self, handle: MethodRef) -> &mut Method {
        &mut self.state.methods[handle.0]
    }

    /// Look up a field by address.
    #[must_use]
    pub fn field(&self, handle: FieldRef) -> &Field {
        &self.message(handle.message).fields[handle.index]
    }

    /// Find an indexed message by ID.
    #[must_use]
    pub fn find_message(&self, id: &str) -> Option<&Message> {
        self.state.message_by_id(id).map(|m| self.message(m))
    }

    /// Find an indexed enum by ID.
    #[must_use]
    pub fn find_enum(&self, id: &str) -> Option<&Enum> {
        self.state.enum_by_id(id).map(|e| self.enum_type(e))
    }

    /// Find an indexed service by ID.
    #[must_use]
    pub fn find_service(&self, id: &str) -> Option<&Service> {
        self.state.service_by_id(id).map(|s| self.service(s))
    }

    /// Find an indexed method by ID.
    #[must_use]
    pub fn find_method(&self, id: &str) -> Option<&Method> {
        self.state.method_by_id(id).map(|m| self.method(m))
    }

    /// Services to generate.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().map(|&s| self.service(s))
    }

    /// Top-level messages to generate.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().map(|&m| self.message(m))
    }

    /// Top-level enums to generate.
    pub fn enums(&self) -> impl Iterator<Item = &Enum> {
        self.enums.iter().map(|&e| self.enum_type(e))
    }

    /// Every message to generate, nested ones included, parents before
    /// children.
    #[must_use]
    pub fn all_messages(&self) -> Vec<MessageRef> {
        let mut out = Vec::new();
        let mut stack: Vec<MessageRef> = self.messages.iter().rev().copied().collect();
        while let Some(m) = stack.pop() {
            out.push(m);
            stack.extend(self.message(m).messages.iter().rev());
        }
        out
    }

    /// Every enum to generate, nested ones included.
    #[must_use]
    pub fn all_enums(&self) -> Vec<EnumRef> {
        let mut out = self.enums.clone();
        for m in self.all_messages() {
            out.extend(&self.message(m).enums);
        }
        out
    }

    /// Whether any generated element is deprecated.
    #[must_use]
    pub fn has_deprecated_entities(&self) -> bool {
        self.messages().any(|m| m.has_deprecated_entities(self))
            || self.enums().any(Enum::has_deprecated_entities)
            || self.services().any(|s| s.has_deprecated_entities(self))
    }

    /// Whether `field` is a map field: a singular message field whose
    /// target is a map entry.
    #[must_use]
    pub fn field_is_map(&self, field: &Field) -> bool {
        if field.repeated || field.typez != Typez::Message {
            return false;
        }
        match field.target {
            Some(TypeRef::Message(m)) => self.message(m).is_map,
            _ => self
                .find_message(&field.typez_id)
                .is_some_and(|m| m.is_map),
        }
    }

    /// Store a message in the arena without listing it anywhere.
    ///
    /// Push the handle onto [`Api::messages`], [`Api::external_messages`] or
    /// a parent's [`Message::messages`] to make it part of the model.
    pub fn add_message(&mut self, message: Message) -> MessageRef {
        self.state.add_message(message)
    }

    /// Store an enum in the arena; see [`Api::add_message`].
    pub fn add_enum(&mut self, enumeration: Enum) -> EnumRef {
        self.state.add_enum(enumeration)
    }

    /// Store a service in the arena; see [`Api::add_message`].
    pub fn add_service(&mut self, service: Service) -> ServiceRef {
        self.state.add_service(service)
    }

    /// Store a method in the arena. List it in a [`Service::methods`].
    pub fn add_method(&mut self, method: Method) -> MethodRef {
        self.state.add_method(method)
    }
}
