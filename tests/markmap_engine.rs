//! Subprocess tests for `MarkmapEngine`.
//!
//! The real `markmap` CLI is not assumed to be installed. Instead the engine
//! runs `sh` with a small script that accepts the same flags, which exercises
//! process spawning, exit status handling, diagnostics capture and timeouts.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use mindmap_converter_mcp::convert::{Converter, MarkmapEngine};
use mindmap_converter_mcp::mcp::{Dispatcher, OutputSettings};
use serde_json::json;
use tempfile::TempDir;

/// Mimics `markmap --offline --no-open [--no-toolbar] -o OUT IN`.
const FAKE_MARKMAP: &str = r#"
out=""
in=""
toolbar="yes"
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    --no-toolbar) toolbar="no"; shift ;;
    --offline|--no-open) shift ;;
    *) in="$1"; shift ;;
  esac
done
{
  echo "<!DOCTYPE html>"
  echo "<html><head><title>Markmap</title></head><body data-toolbar=\"$toolbar\"><pre>"
  cat "$in"
  echo "</pre></body></html>"
} > "$out"
"#;

const FAILING_MARKMAP: &str = r#"
echo "Error: unexpected token in input" >&2
exit 2
"#;

const SILENT_MARKMAP: &str = "exit 0\n";

const HANGING_MARKMAP: &str = "sleep 30\n";

struct Setup {
    _scripts: TempDir,
    workspaces: TempDir,
    output: TempDir,
    dispatcher: Dispatcher<MarkmapEngine>,
}

fn setup(script: &str, timeout: Option<Duration>) -> Setup {
    let scripts = tempfile::tempdir().unwrap();
    let script_path = scripts.path().join("markmap.sh");
    std::fs::write(&script_path, script).unwrap();

    let engine = MarkmapEngine::new("sh")
        .with_prefix_args(vec![script_path.to_string_lossy().into_owned()])
        .with_timeout(timeout);

    let workspaces = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dispatcher = Dispatcher::new(
        Converter::new(engine).with_workspace_root(Some(workspaces.path().to_path_buf())),
        OutputSettings {
            dir: output.path().to_path_buf(),
            host_dir: None,
        },
    );

    Setup {
        _scripts: scripts,
        workspaces,
        output,
        dispatcher,
    }
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

#[tokio::test]
async fn content_end_to_end() {
    let s = setup(FAKE_MARKMAP, Some(Duration::from_secs(30)));

    let result = s
        .dispatcher
        .call(
            "markdown-to-mindmap-content",
            &json!({"markdown": "# A\n## B\n## C"}),
        )
        .await;

    assert!(!result.is_error, "{:?}", result.first_text());
    let html = result.first_text().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<html"));
    assert!(html.contains("# A"));
    assert!(html.contains("## B"));
    assert!(html.contains("## C"));
    assert!(html.contains("data-toolbar=\"yes\""));
    assert!(entries(s.workspaces.path()).is_empty());
}

#[tokio::test]
async fn toolbar_flag_reaches_engine() {
    let s = setup(FAKE_MARKMAP, None);

    let result = s
        .dispatcher
        .call(
            "markdown-to-mindmap-content",
            &json!({"markdown": "# A", "toolbar": false}),
        )
        .await;

    assert!(!result.is_error);
    assert!(result.first_text().unwrap().contains("data-toolbar=\"no\""));
}

#[tokio::test]
async fn file_end_to_end_with_awkward_name() {
    let s = setup(FAKE_MARKMAP, None);
    let filename = "my map $(whoami) \"quoted\".html";

    let result = s
        .dispatcher
        .call(
            "markdown-to-mindmap-file",
            &json!({"markdown": "# Saved", "filename": filename}),
        )
        .await;

    assert!(!result.is_error, "{:?}", result.first_text());
    let saved = s.output.path().join(filename);
    assert!(std::fs::read_to_string(saved).unwrap().contains("# Saved"));
    assert_eq!(entries(s.output.path()).len(), 1);
    assert!(entries(s.workspaces.path()).is_empty());
}

#[tokio::test]
async fn engine_diagnostics_are_propagated() {
    let s = setup(FAILING_MARKMAP, None);

    let result = s
        .dispatcher
        .call("markdown-to-mindmap-content", &json!({"markdown": "# A"}))
        .await;

    assert!(result.is_error);
    let message = result.first_text().unwrap();
    assert!(message.starts_with("Error converting markdown to mindmap: "));
    assert!(message.contains("Error: unexpected token in input"));
    assert!(!message.contains("panicked"));
    assert!(entries(s.workspaces.path()).is_empty());
}

#[tokio::test]
async fn success_without_output_is_an_error() {
    let s = setup(SILENT_MARKMAP, None);

    let result = s
        .dispatcher
        .call("markdown-to-mindmap-content", &json!({"markdown": "# A"}))
        .await;

    assert!(result.is_error);
    assert!(result.first_text().unwrap().contains("produced no output"));
    assert!(entries(s.workspaces.path()).is_empty());
}

#[tokio::test]
async fn hung_engine_times_out() {
    let s = setup(HANGING_MARKMAP, Some(Duration::from_secs(1)));

    let result = s
        .dispatcher
        .call("markdown-to-mindmap-content", &json!({"markdown": "# A"}))
        .await;

    assert!(result.is_error);
    assert!(result
        .first_text()
        .unwrap()
        .contains("did not finish within 1s"));
    assert!(entries(s.workspaces.path()).is_empty());
}
