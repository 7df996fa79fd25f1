//! Typed error enum for the `gapic-gen-model` library API.
//!
//! Every failure is terminal for the current run: a model with unresolved
//! references or shape violations is never returned to the caller. The
//! binary converts these to `anyhow::Error` at its boundary.

use std::path::PathBuf;

/// Errors produced while parsing, assembling, patching or validating a model.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A specification or service-config file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file that failed to open or read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document (Discovery or OpenAPI) could not be decoded.
    #[error("failed to decode JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML service config could not be decoded.
    #[error("failed to decode service config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Proto `FileDescriptorSet` decoding failure.
    #[error("failed to decode FileDescriptorSet: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// Running `protoc` to produce a descriptor set failed.
    #[error("protoc failed: {0}")]
    Protoc(String),

    /// The source document has a shape the parser cannot represent.
    #[error("invalid schema for {id}: {reason}")]
    Schema {
        /// ID or name of the offending element.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A type reference does not name any known message or enum.
    #[error("cannot resolve {id} referenced by {owner}")]
    UnresolvedReference {
        /// ID of the element holding the dangling reference.
        owner: String,
        /// The missing ID.
        id: String,
    },

    /// A message flagged as a map entry lacks the `key`/`value` field pair.
    #[error("map entry message {id} must have exactly a `key` and a `value` field")]
    MapEntryShape {
        /// ID of the map entry message.
        id: String,
    },

    /// An element's package disagrees with the model package.
    #[error("{kind} {id} has package {actual:?}, expected {expected:?}")]
    PackageMismatch {
        /// Element kind (`message`, `enum`, `service`).
        kind: &'static str,
        /// ID of the offending element.
        id: String,
        /// The element's own package.
        actual: String,
        /// The model package.
        expected: String,
    },

    /// An HTTP or routing path template is malformed.
    #[error("invalid path template {template:?}: {reason}")]
    PathTemplate {
        /// The template text.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A documentation override cannot be applied.
    #[error("documentation override for {id}: {reason}")]
    DocumentationOverride {
        /// The element ID named by the override.
        id: String,
        /// Why it could not be applied.
        reason: String,
    },

    /// Generic configuration error.
    #[error("{0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(owner: impl Into<String>, id: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            owner: owner.into(),
            id: id.into(),
        }
    }

    pub(crate) fn path_template(template: &str, reason: impl Into<String>) -> Self {
        Self::PathTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn messages_name_the_offending_element() {
        let err = Error::unresolved(".test.Foo.bar", ".test.Missing");
        assert_eq!(
            err.to_string(),
            "cannot resolve .test.Missing referenced by .test.Foo.bar"
        );

        let err = Error::PackageMismatch {
            kind: "message",
            id: ".other.Foo".to_string(),
            actual: "other".to_string(),
            expected: "test".to_string(),
        };
        assert!(err.to_string().contains(".other.Foo"));
        assert!(err.to_string().contains("\"test\""));
    }

    #[test]
    fn io_error_includes_path() {
        let err = Error::io(
            "/nonexistent/doc.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nonexistent/doc.json"));
    }
}
