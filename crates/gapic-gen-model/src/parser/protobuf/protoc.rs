//! Compile a directory of `.proto` files into a `FileDescriptorSet`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Run `protoc` over every `.proto` file in `source`.
///
/// `source` is used as-is when it is a directory, otherwise it is looked up
/// under each include root in turn. `protoc` is taken from the `PROTOC`
/// environment variable, falling back to `protoc` on `PATH`.
///
/// Imports and source info are always included: the former so imported
/// types resolve, the latter so comments become documentation.
pub(super) fn descriptor_set(source: &Path, includes: &[PathBuf]) -> Result<Vec<u8>> {
    let dir = if source.is_dir() {
        source.to_path_buf()
    } else {
        includes
            .iter()
            .map(|root| root.join(source))
            .find(|candidate| candidate.is_dir())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} is neither a descriptor set nor a directory of .proto files",
                    source.display()
                ))
            })?
    };

    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .map_err(|e| Error::io(&dir, e))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "proto"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(Error::Config(format!("no .proto files in {}", dir.display())));
    }

    let protoc = std::env::var_os("PROTOC").map_or_else(|| PathBuf::from("protoc"), PathBuf::from);
    let out_path = std::env::temp_dir().join(format!(
        "gapic-gen-{}-{}.binpb",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos())
    ));

    let mut cmd = Command::new(&protoc);
    cmd.arg(format!("--descriptor_set_out={}", out_path.display()));
    cmd.arg("--include_imports");
    cmd.arg("--include_source_info");
    for inc in includes {
        cmd.arg(format!("--proto_path={}", inc.display()));
    }
    // Files outside every include root need their own directory as a root.
    if !includes.iter().any(|inc| dir.starts_with(inc)) {
        cmd.arg(format!("--proto_path={}", dir.display()));
    }
    cmd.args(&files);

    tracing::debug!(protoc = %protoc.display(), files = files.len(), "running protoc");
    let output = cmd
        .output()
        .map_err(|e| Error::Protoc(format!("failed to run {}: {e}", protoc.display())))?;
    if !output.status.success() {
        return Err(Error::Protoc(format!(
            "exited with {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
        )));
    }

    let bytes = std::fs::read(&out_path).map_err(|e| Error::io(&out_path, e))?;
    std::fs::remove_file(&out_path).ok();
    Ok(bytes)
}
