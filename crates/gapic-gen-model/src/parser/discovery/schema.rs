//! Discovery document tree and its structural checks.
//!
//! JSON object maps decode into `BTreeMap`s, so every walk over schemas,
//! properties, resources, methods and parameters is sorted by key.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct Document {
    pub name: String,
    pub title: String,
    pub description: String,
    pub root_url: String,
    pub service_path: String,
    pub schemas: BTreeMap<String, Schema>,
    pub resources: BTreeMap<String, Resource>,
    pub methods: BTreeMap<String, Method>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct Schema {
    #[serde(rename = "type")]
    pub kind: String,
    pub format: String,
    pub description: String,
    #[serde(rename = "$ref")]
    pub reference: String,
    pub properties: BTreeMap<String, Schema>,
    pub items: Option<Box<Schema>>,
    pub additional_properties: Option<Box<Schema>>,
    pub deprecated: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Resource {
    pub methods: BTreeMap<String, Method>,
    pub resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct Method {
    pub id: String,
    pub path: String,
    pub http_method: String,
    pub description: String,
    pub deprecated: bool,
    pub parameters: BTreeMap<String, Parameter>,
    pub request: Option<Schema>,
    pub response: Option<Schema>,
    pub supports_media_upload: bool,
    pub media_upload: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct Parameter {
    pub location: String,
}

/// How a schema maps onto the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SchemaKind {
    /// A scalar `type`/`format` pair.
    Simple,
    /// An object with declared properties.
    Struct,
    /// An object with `additionalProperties`.
    Map,
    /// An object with neither properties nor `additionalProperties`.
    AnyStruct,
    /// An array with `items`.
    Array,
    /// A `$ref` to a top-level schema.
    Reference,
}

impl Schema {
    pub fn classify(&self, id: &str) -> Result<SchemaKind> {
        if !self.reference.is_empty() {
            if !self.kind.is_empty() || !self.properties.is_empty() || self.items.is_some() {
                return Err(Error::schema(id, "schema has both `$ref` and a concrete type"));
            }
            return Ok(SchemaKind::Reference);
        }
        if self.kind != "array" && self.items.is_some() {
            return Err(Error::schema(id, format!("{:?} schema declares `items`", self.kind)));
        }
        match self.kind.as_str() {
            "array" if self.items.is_none() => Err(Error::schema(id, "array schema without `items`")),
            "array" => Ok(SchemaKind::Array),
            "object" if self.additional_properties.is_some() => Ok(SchemaKind::Map),
            "object" if self.properties.is_empty() => Ok(SchemaKind::AnyStruct),
            "object" => Ok(SchemaKind::Struct),
            "" => Err(Error::schema(id, "schema has neither `type` nor `$ref`")),
            _ => Ok(SchemaKind::Simple),
        }
    }
}

impl Document {
    /// Classify every schema, resolve every `$ref`, and check array/object
    /// shapes recursively.
    pub fn check(&self) -> Result<()> {
        for (name, schema) in &self.schemas {
            self.check_schema(name, schema)?;
        }
        for (name, method) in &self.methods {
            self.check_method(name, method)?;
        }
        self.check_resources(&self.resources)
    }

    fn check_resources(&self, resources: &BTreeMap<String, Resource>) -> Result<()> {
        for resource in resources.values() {
            for (name, method) in &resource.methods {
                self.check_method(name, method)?;
            }
            self.check_resources(&resource.resources)?;
        }
        Ok(())
    }

    fn check_method(&self, name: &str, method: &Method) -> Result<()> {
        let id = if method.id.is_empty() { name } else { &method.id };
        for (kind, schema) in [("request", &method.request), ("response", &method.response)] {
            if let Some(schema) = schema {
                self.check_schema(&format!("{id}.{kind}"), schema)?;
            }
        }
        Ok(())
    }

    fn check_schema(&self, id: &str, schema: &Schema) -> Result<()> {
        match schema.classify(id)? {
            SchemaKind::Reference => {
                if !self.schemas.contains_key(&schema.reference) {
                    return Err(Error::unresolved(id, &schema.reference));
                }
            }
            SchemaKind::Array => {
                if let Some(items) = &schema.items {
                    self.check_schema(&format!("{id}[]"), items)?;
                }
            }
            SchemaKind::Map => {
                if let Some(values) = &schema.additional_properties {
                    self.check_schema(&format!("{id}{{}}"), values)?;
                }
            }
            SchemaKind::Simple | SchemaKind::Struct | SchemaKind::AnyStruct => {}
        }
        for (name, property) in &schema.properties {
            self.check_schema(&format!("{id}.{name}"), property)?;
        }
        Ok(())
    }
}
