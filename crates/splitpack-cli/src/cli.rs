//! Command-line interface definition.

use clap::Parser;
use std::path::PathBuf;

/// splitpack - bundle CommonJS modules into lazily loaded chunks
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "splitpack",
    version,
    about = "Bundle CommonJS modules into lazily loaded chunks",
    long_about = "splitpack follows require() calls from an entry module, splits the module graph\n\
                  at require.ensure() boundaries and writes one file per chunk. The entry chunk\n\
                  loads the others on demand."
)]
pub struct Cli {
    /// Entry module
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file for the entry chunk [default: ./js/web.js]
    ///
    /// Other chunks are written next to it as `<id>.<file name>`. With
    /// --single the bundle is printed to stdout when OUTPUT is omitted.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Emit one file with every module and no lazy loading
    #[arg(short, long)]
    pub single: bool,

    /// Add a comment with the source path above every module
    #[arg(long)]
    pub filenames: bool,

    /// JSON file with build and output options
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Prefix for chunk URLs loaded at runtime
    #[arg(long, value_name = "PREFIX")]
    pub script_src_prefix: Option<String>,

    /// Store the entry module's exports in this global variable
    #[arg(long, value_name = "NAME", value_parser = parse_library)]
    pub library: Option<String>,

    /// Extensions tried when resolving, in order (e.g. .js,.jsx)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Extra directories searched for packages before node_modules
    #[arg(long = "paths", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Limit on concurrent resolve and read operations
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_concurrency: Option<u32>,

    /// Also write the dependency graph as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Parse and validate a library name.
///
/// The name becomes `var <name>=` in the output, so it must be a JavaScript
/// identifier.
pub fn parse_library(s: &str) -> Result<String, String> {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return Err("Library name cannot be empty".to_string());
    };

    if !first.is_alphabetic() && first != '_' && first != '$' {
        return Err(format!(
            "Library name must start with a letter, underscore, or dollar sign: '{}'",
            s
        ));
    }

    if chars.any(|c| !c.is_alphanumeric() && c != '_' && c != '$') {
        return Err(format!(
            "Library name can only contain letters, numbers, underscores, or dollar signs: '{}'",
            s
        ));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_library() {
        assert_eq!(parse_library("MyLib"), Ok("MyLib".to_string()));
        assert_eq!(parse_library("$jq_1"), Ok("$jq_1".to_string()));
        assert!(parse_library("").is_err());
        assert!(parse_library("1lib").is_err());
        assert!(parse_library("my-lib").is_err());
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["splitpack", "src/index.js", "dist/web.js"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("src/index.js"));
        assert_eq!(cli.output, Some(PathBuf::from("dist/web.js")));
        assert!(!cli.single);

        let cli = Cli::try_parse_from(["splitpack", "index.js"]).unwrap();
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "splitpack",
            "index.js",
            "-s",
            "--filenames",
            "--library",
            "App",
            "--script-src-prefix",
            "/static/",
            "--extensions",
            ".js,.jsx",
            "--paths",
            "vendor",
            "--paths",
            "lib",
            "--max-concurrency",
            "8",
        ])
        .unwrap();

        assert!(cli.single);
        assert!(cli.filenames);
        assert_eq!(cli.library.as_deref(), Some("App"));
        assert_eq!(cli.script_src_prefix.as_deref(), Some("/static/"));
        assert_eq!(cli.extensions, vec![".js", ".jsx"]);
        assert_eq!(cli.paths, vec![PathBuf::from("vendor"), PathBuf::from("lib")]);
        assert_eq!(cli.max_concurrency, Some(8));
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["splitpack"]).is_err());
        assert!(Cli::try_parse_from(["splitpack", "a.js", "--library", "a-b"]).is_err());
        assert!(Cli::try_parse_from(["splitpack", "a.js", "--max-concurrency", "0"]).is_err());
        assert!(Cli::try_parse_from(["splitpack", "a.js", "-v", "-q"]).is_err());
    }
}
