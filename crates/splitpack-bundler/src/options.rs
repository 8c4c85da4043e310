//! Output configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a finished graph is turned into JavaScript files.
///
/// Every field is optional on the wire; unset fields fall back to defaults
/// derived from `output` when split output is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    /// Path of the first chunk's file. Other chunks are written next to it.
    pub output: Option<PathBuf>,

    /// Directory for every emitted file. Defaults to the parent of `output`.
    pub output_directory: Option<PathBuf>,

    /// Suffix appended to a chunk id to form its file name. Defaults to
    /// `"." + <output file name>`, so chunk 1 of `web.js` is `1.web.js`.
    pub output_postfix: Option<String>,

    /// Global callback lazily loaded chunks invoke. Defaults to
    /// `"webpackJsonp" + library`.
    pub jsonp_function: Option<String>,

    /// Prepended to chunk file names when the runtime loads them.
    pub script_src_prefix: String,

    /// Assign the entry module's exports to a global `var`.
    pub library: Option<String>,

    /// Emit a `/*** <path> ***/` comment above each module body.
    pub include_filenames: bool,
}

/// [`OutputOptions`] with every default filled in, ready for split output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLayout {
    pub directory: PathBuf,
    pub file_name: String,
    pub postfix: String,
    pub jsonp_function: String,
    pub script_src_prefix: String,
}

impl SplitLayout {
    /// File path for `chunk`. The first chunk takes the output file name,
    /// every other one is `<id><postfix>`.
    pub fn chunk_path(&self, chunk: u32) -> PathBuf {
        if chunk == 0 {
            self.directory.join(&self.file_name)
        } else {
            self.directory.join(format!("{chunk}{}", self.postfix))
        }
    }
}

impl OutputOptions {
    /// Options for split output written to `output`.
    pub fn split(output: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }

    /// Fill in the defaults that depend on `output`.
    ///
    /// Fails when `output` is unset or has no file name.
    pub fn layout(&self) -> Result<SplitLayout> {
        let output = self
            .output
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("split output requires an output path".into()))?;

        let file_name = output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "output path '{}' has no file name",
                    output.display()
                ))
            })?;

        let directory = match &self.output_directory {
            Some(directory) => directory.clone(),
            None => output.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let postfix = self
            .output_postfix
            .clone()
            .unwrap_or_else(|| format!(".{file_name}"));

        let jsonp_function = self.jsonp_function.clone().unwrap_or_else(|| {
            format!("webpackJsonp{}", self.library.as_deref().unwrap_or_default())
        });

        Ok(SplitLayout {
            directory,
            file_name,
            postfix,
            jsonp_function,
            script_src_prefix: self.script_src_prefix.clone(),
        })
    }
}
