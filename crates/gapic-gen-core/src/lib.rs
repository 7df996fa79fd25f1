//! Shared protobuf descriptor types for the gapic-gen model builder.
//!
//! This crate provides custom [`prost::Message`] types that preserve the
//! `google.api.*` and `google.longrunning.*` extensions that standard
//! `prost_types` descriptors drop during decoding.
//!
//! `gapic-gen-model` depends on these types to build its API model from a
//! `FileDescriptorSet`. You should not need to depend on this crate directly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
