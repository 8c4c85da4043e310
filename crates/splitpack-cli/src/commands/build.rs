//! The bundling command.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use splitpack_bundler::{
    Builder, DependencyGraph, NativeRuntime, Runtime, render_chunks, render_single, write_bundle,
    write_single,
};
use tracing::info;

use crate::cli::Cli;
use crate::config::{SplitpackConfig, resolve_path};
use crate::error::{CliError, Result};
use crate::ui;

/// Where split output goes when no OUTPUT is given, relative to the cwd.
pub const DEFAULT_OUTPUT: &str = "js/web.js";

/// Run a build from parsed arguments.
///
/// 1. Load configuration (flags > env > options file > defaults)
/// 2. Build the module graph for INPUT
/// 3. Optionally dump the graph as JSON
/// 4. Render and write single or split output
///
/// Nothing is written unless the graph builds.
pub async fn execute(args: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    execute_in(args, &cwd).await
}

/// [`execute`] with an explicit working directory.
pub async fn execute_in(args: Cli, cwd: &Path) -> Result<()> {
    let start = Instant::now();
    let config = SplitpackConfig::load(&args, cwd)?;
    let runtime = Arc::new(NativeRuntime::new());

    let input = resolve_path(&args.input, cwd);
    if !runtime.exists(&input) {
        return Err(CliError::EntryNotFound(input));
    }

    if !args.quiet {
        ui::info(&format!("Building {}", input.display()));
    }
    let builder = Builder::new(config.build_options(), runtime.clone());
    let graph = builder.build_entry(&input).await?;

    if let Some(json) = &args.json {
        write_graph_json(&graph, &resolve_path(json, cwd), runtime.as_ref()).await?;
    }

    let output = args.output.as_deref().map(|p| resolve_path(p, cwd));

    if args.single {
        let text = render_single(&graph, &config.output_options(None));
        match output {
            Some(path) => {
                write_single(&path, &text, runtime.as_ref()).await?;
                info!(path = %path.display(), size = text.len(), "wrote bundle");
            }
            None => print!("{text}"),
        }
        return Ok(());
    }

    let output = output.unwrap_or_else(|| cwd.join(DEFAULT_OUTPUT));
    let bundle = render_chunks(&graph, &config.output_options(Some(output)))?;
    write_bundle(&bundle, runtime.as_ref()).await?;

    if !args.quiet {
        ui::print_stats(&bundle.stats);
        ui::success(&format!(
            "Wrote {} file(s) to {} in {}",
            bundle.files.len(),
            bundle.directory.display(),
            ui::format_duration(start.elapsed())
        ));
    }
    Ok(())
}

async fn write_graph_json(graph: &DependencyGraph, path: &Path, runtime: &dyn Runtime) -> Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    write_single(path, &json, runtime).await?;
    info!(path = %path.display(), "wrote dependency graph");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (relative, content) in files {
            let path = temp.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp
    }

    fn args(input: &str) -> Cli {
        Cli {
            input: PathBuf::from(input),
            quiet: true,
            ..Cli::default()
        }
    }

    #[tokio::test]
    async fn test_default_output_location() {
        let temp = project(&[
            ("index.js", "require.ensure('./lazy', function() {});"),
            ("lazy.js", ""),
        ]);

        execute_in(args("index.js"), temp.path()).await.unwrap();

        assert!(temp.path().join("js/web.js").is_file());
        assert!(temp.path().join("js/1.web.js").is_file());
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let temp = TempDir::new().unwrap();
        let err = execute_in(args("nope.js"), temp.path()).await.unwrap_err();
        assert!(matches!(err, CliError::EntryNotFound(path) if path == temp.path().join("nope.js")));
    }

    #[tokio::test]
    async fn test_graph_json_dump() {
        let temp = project(&[("index.js", "require('./a');"), ("a.js", "")]);
        let mut cli = args("index.js");
        cli.output = Some(PathBuf::from("out/web.js"));
        cli.json = Some(PathBuf::from("out/graph.json"));

        execute_in(cli, temp.path()).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("out/graph.json")).unwrap())
                .unwrap();
        assert_eq!(json["modules"].as_array().unwrap().len(), 2);
        assert_eq!(json["chunks"][0]["id"], 0);
    }

    #[tokio::test]
    async fn test_failed_build_leaves_no_output() {
        let temp = project(&[("index.js", "require('./missing');")]);
        let mut cli = args("index.js");
        cli.output = Some(PathBuf::from("dist/web.js"));

        let err = execute_in(cli, temp.path()).await.unwrap_err();

        assert!(matches!(err, CliError::Build(_)));
        assert!(!temp.path().join("dist").exists());
    }
}
