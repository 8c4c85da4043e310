//! Writing rendered output through a [`Runtime`].
//!
//! Every target path is normalised and must stay inside the bundle's
//! output directory; a chunk postfix such as `/../x.js` is rejected before
//! anything is written.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use splitpack::Runtime;
use tracing::debug;

use super::BundleOutput;
use crate::{Error, Result};

/// Write every file of `output`, creating the output directory first.
///
/// All paths are validated up front so a bad path leaves the disk untouched.
pub async fn write_bundle(output: &BundleOutput, runtime: &dyn Runtime) -> Result<()> {
    let dir = output.directory.clean();

    let targets = output
        .files
        .iter()
        .map(|file| validate_output_path(&dir, &file.path).map(|path| (path, file)))
        .collect::<Result<Vec<_>>>()?;

    create_dir(runtime, &dir).await?;
    for (path, file) in targets {
        runtime
            .write_file(&path, file.contents.as_bytes())
            .await
            .map_err(|e| {
                Error::WriteFailure(format!("Failed to write '{}': {}", path.display(), e))
            })?;
        debug!(chunk = %file.chunk, path = %path.display(), "wrote chunk");
    }
    Ok(())
}

/// Write a single-file bundle to `path`, creating its parent directory.
pub async fn write_single(path: &Path, contents: &str, runtime: &dyn Runtime) -> Result<()> {
    let path = path.clean();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(runtime, parent).await?;
    }
    runtime
        .write_file(&path, contents.as_bytes())
        .await
        .map_err(|e| Error::WriteFailure(format!("Failed to write '{}': {}", path.display(), e)))
}

async fn create_dir(runtime: &dyn Runtime, dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || runtime.exists(dir) {
        return Ok(());
    }
    runtime.create_dir(dir, true).await.map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// Normalise `path` and check it stays under `base_dir`.
fn validate_output_path(base_dir: &Path, path: &Path) -> Result<PathBuf> {
    if path.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let target = if path.is_absolute() {
        path.clean()
    } else {
        base_dir.join(path).clean()
    };

    if !target.starts_with(base_dir) || target == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            path.display(),
            base_dir.display()
        )));
    }
    Ok(target)
}
