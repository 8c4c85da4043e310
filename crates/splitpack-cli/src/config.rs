//! Layered configuration.
//!
//! Priority: CLI flags > `SPLITPACK_*` environment variables > `--options`
//! JSON file > defaults.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use splitpack_bundler::{BuildOptions, OutputOptions, ResolveOptions};

use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Everything the options file and environment can set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitpackConfig {
    pub resolve: ResolveOptions,
    pub max_concurrency: Option<usize>,
    pub output_directory: Option<PathBuf>,
    pub output_postfix: Option<String>,
    #[serde(alias = "outputJsonpFunction")]
    pub jsonp_function: Option<String>,
    pub script_src_prefix: String,
    pub library: Option<String>,
    pub include_filenames: bool,
}

/// A partial layer: the flags a user passed, or the `SPLITPACK_*` variables
/// that are set. Environment keys are the snake_case field names with `__`
/// between nesting levels. Unset values are left out when serialized so they
/// don't mask lower layers.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
struct Overrides {
    #[serde(skip_serializing_if = "ResolveOverrides::is_empty")]
    resolve: ResolveOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_postfix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jsonp_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_src_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    library: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_filenames: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ResolveOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paths: Vec<PathBuf>,
}

impl ResolveOverrides {
    fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.paths.is_empty()
    }
}

impl Overrides {
    fn from_args(args: &Cli, cwd: &Path) -> Self {
        Self {
            resolve: ResolveOverrides {
                extensions: args.extensions.clone(),
                paths: args.paths.iter().map(|p| resolve_path(p, cwd)).collect(),
            },
            max_concurrency: args.max_concurrency.map(|n| n as usize),
            script_src_prefix: args.script_src_prefix.clone(),
            library: args.library.clone(),
            include_filenames: args.filenames,
            ..Self::default()
        }
    }

    /// `SPLITPACK_MAX_CONCURRENCY` sets `max_concurrency` and
    /// `SPLITPACK_RESOLVE__EXTENSIONS` sets `resolve.extensions`.
    fn from_env() -> Result<Self> {
        Figment::from(Env::prefixed("SPLITPACK_").split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }
}

/// Join a relative path onto `cwd`.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

impl SplitpackConfig {
    /// Every configuration layer for `args`, lowest priority first.
    pub fn figment(args: &Cli, cwd: &Path) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(options) = &args.options {
            let path = resolve_path(options, cwd);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path).into());
            }
            figment = figment.merge(Json::file(path));
        }

        Ok(figment
            .merge(Serialized::defaults(Overrides::from_env()?))
            .merge(Serialized::defaults(Overrides::from_args(args, cwd))))
    }

    /// Load configuration for `args`, resolving relative paths against `cwd`.
    pub fn load(args: &Cli, cwd: &Path) -> Result<Self> {
        let mut config: Self = Self::figment(args, cwd)?
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        config.resolve.paths = config
            .resolve
            .paths
            .iter()
            .map(|p| resolve_path(p, cwd))
            .collect();
        config.output_directory = config.output_directory.map(|p| resolve_path(&p, cwd));
        Ok(config)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            resolve: self.resolve.clone(),
            max_concurrency: self.max_concurrency,
        }
    }

    /// Output options writing the entry chunk to `output`, or single-file
    /// options when `output` is `None`.
    pub fn output_options(&self, output: Option<PathBuf>) -> OutputOptions {
        OutputOptions {
            output,
            output_directory: self.output_directory.clone(),
            output_postfix: self.output_postfix.clone(),
            jsonp_function: self.jsonp_function.clone(),
            script_src_prefix: self.script_src_prefix.clone(),
            library: self.library.clone(),
            include_filenames: self.include_filenames,
        }
    }
}
