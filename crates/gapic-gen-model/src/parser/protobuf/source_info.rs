//! Leading comments from `SourceCodeInfo`, keyed by descriptor path.

use std::collections::HashMap;

use gapic_gen_core::descriptor::SourceCodeInfo;

// Field numbers used in descriptor paths.
pub(super) const FILE_MESSAGE: i32 = 4;
pub(super) const FILE_ENUM: i32 = 5;
pub(super) const FILE_SERVICE: i32 = 6;
pub(super) const MESSAGE_FIELD: i32 = 2;
pub(super) const MESSAGE_NESTED: i32 = 3;
pub(super) const MESSAGE_ENUM: i32 = 4;
pub(super) const MESSAGE_ONEOF: i32 = 8;
pub(super) const ENUM_VALUE: i32 = 2;
pub(super) const SERVICE_METHOD: i32 = 2;

#[derive(Debug, Default)]
pub(super) struct Comments(HashMap<Vec<i32>, String>);

impl Comments {
    pub fn new(info: Option<&SourceCodeInfo>) -> Self {
        let Some(info) = info else {
            return Self::default();
        };
        Self(
            info.location
                .iter()
                .filter_map(|loc| {
                    let text = loc.leading_comments.as_deref()?;
                    Some((loc.path.clone(), clean(text)))
                })
                .collect(),
        )
    }

    pub fn get(&self, path: &[i32]) -> String {
        self.0.get(path).cloned().unwrap_or_default()
    }
}

/// Strip the single space `protoc` keeps after `//` and surrounding blank lines.
fn clean(text: &str) -> String {
    text.lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `parent` extended with `(field, index)`.
pub(super) fn child(parent: &[i32], field: i32, index: usize) -> Vec<i32> {
    let mut path = Vec::with_capacity(parent.len() + 2);
    path.extend_from_slice(parent);
    path.push(field);
    path.push(i32::try_from(index).unwrap_or(i32::MAX));
    path
}

#[cfg(test)]
mod tests {
    use gapic_gen_core::descriptor::Location;

    use super::*;

    #[test]
    fn leading_comments_by_path() {
        let info = SourceCodeInfo {
            location: vec![
                Location {
                    path: vec![4, 0],
                    leading_comments: Some(" A secret.\n Holds data.\n".to_string()),
                    ..Location::default()
                },
                Location {
                    path: vec![4, 0, 2, 1],
                    trailing_comments: Some(" ignored".to_string()),
                    ..Location::default()
                },
            ],
        };
        let comments = Comments::new(Some(&info));
        assert_eq!(comments.get(&[4, 0]), "A secret.\nHolds data.");
        assert_eq!(comments.get(&[4, 0, 2, 1]), "");
        assert_eq!(comments.get(&child(&[4, 0], MESSAGE_FIELD, 1)), "");
        assert_eq!(child(&[4, 0], MESSAGE_NESTED, 2), vec![4, 0, 3, 2]);
    }
}
