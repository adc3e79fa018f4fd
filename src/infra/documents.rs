//! Filesystem access for the source document and the generated output.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
    time::Instant,
};

use tracing::{debug, info};

use super::error::InfraError;

/// Read the Markdown source as UTF-8.
pub fn read_source(path: &Path) -> Result<String, InfraError> {
    let started_at = Instant::now();
    let markdown = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => InfraError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => InfraError::read(path, err),
    })?;

    debug!(
        target = "infra::documents",
        op = "documents::read_source",
        path = %path.display(),
        bytes = markdown.len(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "Source document read"
    );

    Ok(markdown)
}

/// Write `contents` to `path` through a temporary file in the same directory,
/// so an existing output is only replaced by a complete document. Returns the
/// size of the written file in bytes.
pub fn write_output(path: &Path, contents: &str) -> Result<u64, InfraError> {
    let started_at = Instant::now();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".mdprint-")
        .suffix(".html.tmp")
        .tempfile_in(directory)
        .map_err(|err| InfraError::write(path, err))?;
    staged
        .write_all(contents.as_bytes())
        .map_err(|err| InfraError::write(path, err))?;
    staged.flush().map_err(|err| InfraError::write(path, err))?;

    staged
        .persist(path)
        .map_err(|err| InfraError::write(path, err.error))?;

    let bytes_written = fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|err| InfraError::write(path, err))?;

    info!(
        target = "infra::documents",
        op = "documents::write_output",
        path = %path.display(),
        bytes = bytes_written,
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "Output document written"
    );

    Ok(bytes_written)
}
