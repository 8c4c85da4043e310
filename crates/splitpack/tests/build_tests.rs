//! End-to-end builds against real files.
//!
//! These tests exercise the native runtime, the resolver's on-disk probing
//! and the full discovery/chunk/rewrite pipeline together.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use splitpack::{
    BuildError, BuildOptions, Builder, ChunkId, DependencyGraph, DiscoveryError, Membership,
    ModuleId, NativeRuntime, ResolveOptions, render_module, render_modules,
};
use tempfile::TempDir;

/// Write `(relative path, content)` fixtures into a fresh temp directory.
fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = temp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    temp
}

fn builder() -> Builder {
    Builder::new(BuildOptions::default(), Arc::new(NativeRuntime::new()))
}

fn module_id(graph: &DependencyGraph, path: &Path) -> ModuleId {
    graph
        .module_by_path(path)
        .unwrap_or_else(|| panic!("{} missing from graph", path.display()))
        .id
}

#[tokio::test]
async fn test_entry_with_lazy_chunk() {
    let temp = project(&[
        ("src/e.js", "var a = require('./a');\nvar b = require('./b');\n"),
        (
            "src/a.js",
            "require.ensure('./c', function(require) {\n  require('./c');\n});\n",
        ),
        ("src/b.js", "module.exports = 'b';\n"),
        ("src/c.js", "module.exports = 'c';\n"),
    ]);
    let src = temp.path().join("src");

    let graph = builder().build(&src, "./e").await.unwrap();

    let e = module_id(&graph, &src.join("e.js"));
    let a = module_id(&graph, &src.join("a.js"));
    let b = module_id(&graph, &src.join("b.js"));
    let c = module_id(&graph, &src.join("c.js"));
    assert_eq!(e, ModuleId(0));

    let entry_chunk: BTreeSet<_> = graph.chunk(ChunkId::ENTRY).unwrap().included().collect();
    assert_eq!(entry_chunk, BTreeSet::from([e, a, b]));

    let lazy: BTreeSet<_> = graph.chunk(ChunkId(1)).unwrap().included().collect();
    assert_eq!(lazy, BTreeSet::from([c]));

    let rendered = render_module(&graph, graph.module(e).unwrap());
    assert_eq!(
        rendered,
        format!("var a = require({a});\nvar b = require({b});\n")
    );

    let rendered = render_module(&graph, graph.module(a).unwrap());
    assert_eq!(
        rendered,
        format!("require.ensure(1, function(require) {{\n  require({c});\n}});\n")
    );

    let per_chunk = render_modules(&graph, Some(ChunkId(1)));
    assert_eq!(per_chunk.len(), 1);
    assert_eq!(per_chunk[&c], "module.exports = 'c';\n");
}

#[tokio::test]
async fn test_build_entry_from_file_path() {
    let temp = project(&[("main.js", "require('./util');"), ("util.js", "")]);

    let graph = builder()
        .build_entry(&temp.path().join("main.js"))
        .await
        .unwrap();

    assert_eq!(graph.entry().unwrap().path, temp.path().join("main.js"));
    assert_eq!(graph.module_count(), 2);
}

#[tokio::test]
async fn test_packages_resolve_through_node_modules() {
    let temp = project(&[
        ("app/src/index.js", "require('lib'); require('util/fmt');"),
        ("app/node_modules/lib/package.json", r#"{"main": "dist/lib"}"#),
        ("app/node_modules/lib/dist/lib.js", "require('./inner');"),
        ("app/node_modules/lib/dist/inner.js", ""),
        ("node_modules/util/fmt.js", ""),
        ("node_modules/lib.js", "module.exports = 'shadowed';"),
    ]);

    let graph = builder()
        .build(&temp.path().join("app/src"), "./index")
        .await
        .unwrap();

    let paths: BTreeSet<PathBuf> = graph.modules().map(|m| m.path.clone()).collect();
    assert_eq!(
        paths,
        BTreeSet::from([
            temp.path().join("app/src/index.js"),
            temp.path().join("app/node_modules/lib/dist/lib.js"),
            temp.path().join("app/node_modules/lib/dist/inner.js"),
            temp.path().join("node_modules/util/fmt.js"),
        ])
    );
}

#[tokio::test]
async fn test_custom_extensions_and_paths() {
    let temp = project(&[
        ("src/index.js", "require('./view'); require('shared');"),
        ("src/view.jsx", ""),
        ("vendor/shared.js", ""),
    ]);
    let options = BuildOptions {
        resolve: ResolveOptions {
            extensions: vec![".js".into(), ".jsx".into()],
            paths: vec![temp.path().join("vendor")],
        },
        max_concurrency: Some(2),
    };

    let graph = Builder::new(options, Arc::new(NativeRuntime::new()))
        .build(&temp.path().join("src"), "./index")
        .await
        .unwrap();

    assert!(graph.module_by_path(&temp.path().join("src/view.jsx")).is_some());
    assert!(graph.module_by_path(&temp.path().join("vendor/shared.js")).is_some());
}

#[tokio::test]
async fn test_every_broken_import_is_reported() {
    let temp = project(&[
        ("index.js", "require('./a');\nrequire('./b');\nrequire('./gone');"),
        ("a.js", "require('./also-gone');"),
        ("b.js", "require('missing-package');"),
    ]);

    let err = builder().build(temp.path(), "./index").await.unwrap_err();
    let BuildError::Unresolved(failures) = &err else {
        panic!("expected unresolved error, got {err:?}");
    };

    let mut reported: Vec<(String, PathBuf)> = failures
        .iter()
        .map(|failure| {
            let specifier = match &failure.error {
                DiscoveryError::ModuleNotFound { specifier, .. } => specifier.clone(),
                other => panic!("unexpected {other:?}"),
            };
            (specifier, failure.origin.clone().unwrap())
        })
        .collect();
    reported.sort();

    assert_eq!(
        reported,
        vec![
            ("./also-gone".to_string(), temp.path().join("a.js")),
            ("./gone".to_string(), temp.path().join("index.js")),
            ("missing-package".to_string(), temp.path().join("b.js")),
        ]
    );
    assert!(err.to_string().starts_with("3 module(s) could not be resolved"));
}

#[tokio::test]
async fn test_dynamic_require_is_fatal() {
    let temp = project(&[("index.js", "var x = 'a';\nrequire(x);")]);

    let err = builder().build(temp.path(), "./index").await.unwrap_err();
    assert!(matches!(
        err,
        BuildError::MalformedRequire { line: 2, column: 0, .. }
    ));
}

#[tokio::test]
async fn test_unparsable_module_is_fatal() {
    let temp = project(&[("index.js", "require('./broken');"), ("broken.js", "function (")]);

    let err = builder().build(temp.path(), "./index").await.unwrap_err();
    match err {
        BuildError::Parse { path, .. } => assert_eq!(path, temp.path().join("broken.js")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_module_ids_are_a_bijection_with_paths() {
    // A diamond with a cycle, a lazy chunk and many spellings of one file.
    let temp = project(&[
        (
            "index.js",
            "require('./a'); require('./b'); require('./lib'); require.ensure(['./c', './lib/index'], function() {});",
        ),
        ("a.js", "require('./b'); require('./lib/index.js'); require('./c');"),
        ("b.js", "require('./a'); require('./lib/');"),
        ("c.js", "require('./lib/../a');"),
        ("lib/index.js", "require('../b');"),
    ]);

    let graph = builder().build(temp.path(), "./index").await.unwrap();

    let ids: Vec<u32> = graph.modules().map(|m| m.id.0).collect();
    assert_eq!(ids, (0..graph.module_count() as u32).collect::<Vec<_>>());

    let paths: BTreeSet<&Path> = graph.modules().map(|m| m.path.as_path()).collect();
    assert_eq!(paths.len(), graph.module_count());
    assert_eq!(graph.module_count(), 5);

    for module in graph.modules() {
        assert_eq!(module_id(&graph, &module.path), module.id);
        for site in &module.requires {
            assert!(site.resolved.is_some(), "{} left unresolved", site.specifier);
        }
    }

    // `c` is only reachable lazily through the boundary, but `a` requires it
    // synchronously, so the lazy chunk adds nothing of its own.
    let lazy = graph.chunk(ChunkId(1)).unwrap();
    assert!(lazy.empty);
    assert!(lazy.modules.values().all(|m| *m == Membership::InParent));
    assert_eq!(graph.live_chunks().count(), 1);
}
