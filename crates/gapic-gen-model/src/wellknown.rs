//! `google.protobuf` well-known types.
//!
//! Every source format may refer to these by fixed ID without defining them.
//! They are added as external roots so cross-referencing can resolve them.

use std::collections::BTreeSet;

use crate::api::{Api, Enum, EnumValue, Message};

/// Package of the well-known types.
pub const PACKAGE: &str = "google.protobuf";

/// ID of `google.protobuf.Empty`.
pub const EMPTY_ID: &str = ".google.protobuf.Empty";
/// ID of `google.protobuf.Timestamp`.
pub const TIMESTAMP_ID: &str = ".google.protobuf.Timestamp";
/// ID of `google.protobuf.Duration`.
pub const DURATION_ID: &str = ".google.protobuf.Duration";
/// ID of `google.protobuf.FieldMask`.
pub const FIELD_MASK_ID: &str = ".google.protobuf.FieldMask";
/// ID of `google.protobuf.Any`.
pub const ANY_ID: &str = ".google.protobuf.Any";

const MESSAGES: &[&str] = &[
    "Any",
    "BoolValue",
    "BytesValue",
    "DoubleValue",
    "Duration",
    "Empty",
    "FieldMask",
    "FloatValue",
    "Int32Value",
    "Int64Value",
    "ListValue",
    "StringValue",
    "Struct",
    "Timestamp",
    "UInt32Value",
    "UInt64Value",
    "Value",
];

const NULL_VALUE: &str = "NullValue";

/// Add every well-known type the model does not already contain.
pub(crate) fn register(api: &mut Api) {
    let messages: BTreeSet<String> = api.state.messages.iter().map(|m| m.id.clone()).collect();
    let enums: BTreeSet<String> = api.state.enums.iter().map(|e| e.id.clone()).collect();

    let mut added = 0_usize;
    for name in MESSAGES {
        let id = format!(".{PACKAGE}.{name}");
        if messages.contains(&id) {
            continue;
        }
        let handle = api.add_message(Message {
            name: (*name).to_string(),
            id,
            package: PACKAGE.to_string(),
            ..Message::default()
        });
        api.external_messages.push(handle);
        added += 1;
    }

    let id = format!(".{PACKAGE}.{NULL_VALUE}");
    if !enums.contains(&id) {
        let handle = api.add_enum(Enum {
            name: NULL_VALUE.to_string(),
            values: vec![EnumValue {
                name: "NULL_VALUE".to_string(),
                id: format!("{id}.NULL_VALUE"),
                number: 0,
                ..EnumValue::default()
            }],
            id,
            package: PACKAGE.to_string(),
            ..Enum::default()
        });
        api.external_enums.push(handle);
        added += 1;
    }
    tracing::debug!(added, "registered well-known types");
}
