#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod config;
mod crossref;
mod error;
mod overrides;
pub mod parser;
pub mod pathtemplate;
mod routing;
mod service_config;
mod validate;
pub mod wellknown;

pub use api::{
    Api, Codec, Enum, EnumRef, EnumValue, Field, FieldBehavior, FieldRef, Message, MessageRef,
    Method, MethodRef, OneOf, OperationInfo, PaginationInfo, PathBinding, PathInfo, RoutingInfo,
    RoutingInfoCombo, RoutingInfoComboItem, RoutingInfoVariant, RoutingPathSpec, Service,
    ServiceRef, State, TypeRef, Typez,
};
pub use config::{
    DocumentationOverride, ModelConfig, SpecificationFormat, DESCRIPTION_OVERRIDE,
    EXTRA_PROTOS_ROOT, GOOGLEAPIS_ROOT, INCLUDED_IDS, INCLUDE_LIST, NAME_OVERRIDE,
    PACKAGE_NAME_OVERRIDE, SKIPPED_IDS, TITLE_OVERRIDE,
};
pub use crossref::cross_reference;
pub use error::{Error, Result};
pub use overrides::{apply_documentation_rules, patch_documentation, skip_model_elements};
pub use parser::create_model;
pub use routing::parse_routing_rule;
pub use service_config::{
    ApiInterface, Documentation, DocumentationRule, MethodSettings, Publishing, ServiceConfig,
    MIXIN_SERVICES,
};
pub use validate::validate;
