#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Integration tests for `cleanup` and `diff`.
//!
//! Cleanup may only remove what no manifest in scope declares, and only after
//! the confirmation gate agrees (or `--force`). Diff never mutates.

mod common;

use brewfiles_cli::error::ReconcileError;
use brewfiles_cli::manifest::EntryKind;
use common::*;

const BASE: &str = "brew \"git\"\nbrew \"jq\"\n";
const DEV: &str = "cask \"docker\"\n";

fn context() -> IntegrationTestContext {
    TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("dev", DEV)
        .installed(&[
            "brew \"git\"",
            "brew \"wget\"",
            "cask \"docker\"",
            "cask \"zoom\"",
        ])
        .build()
}

// ---------------------------------------------------------------------------
// cleanup
// ---------------------------------------------------------------------------

/// Everything declared anywhere in scope survives cleanup.
#[test]
fn cleanup_keeps_declared_entries() {
    let ctx = context();

    let report = ctx.run(&["--system", "dev", "cleanup"], "y\n").unwrap();

    assert_eq!(report.removed, 2);
    assert_eq!(ctx.backend.keys(), keys(&["brew:git", "cask:docker"]));
}

/// Narrowing the scope widens what cleanup considers undeclared.
#[test]
fn cleanup_scope_follows_system_type() {
    let ctx = context();

    ctx.run(&["--system", "base", "cleanup", "--force"], "")
        .unwrap();

    assert_eq!(ctx.backend.keys(), keys(&["brew:git"]));
}

/// Removal is handed to the backend as one batch of installed entries.
#[test]
fn cleanup_passes_installed_entries_to_backend() {
    let ctx = context();

    ctx.run(&["--system", "dev", "cleanup"], "y\n").unwrap();

    let removals = ctx.backend.removals();
    assert_eq!(removals.len(), 1);
    let kinds: Vec<EntryKind> = removals[0].iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [EntryKind::Formula, EntryKind::Cask]);
}

/// Declining the prompt is a cancellation, not a failure, and removes nothing.
#[test]
fn cleanup_declined_is_cancelled() {
    let ctx = context();

    let err = ctx.run(&["--system", "dev", "cleanup"], "n\n").unwrap_err();

    assert!(is_cancelled(&err));
    assert!(ctx.backend.removals().is_empty());
    assert!(ctx.files.tracked().is_empty());
}

/// End of input at the prompt declines.
#[test]
fn cleanup_eof_is_cancelled() {
    let ctx = context();

    let err = ctx.run(&["--system", "dev", "cleanup"], "").unwrap_err();

    assert!(is_cancelled(&err));
    assert_eq!(ctx.backend.keys().len(), 4);
}

/// Dry-run cleanup reports without prompting or removing.
#[test]
fn cleanup_dry_run_reports_only() {
    let ctx = context();

    let report = ctx
        .run(&["--system", "dev", "cleanup", "--dry-run"], "")
        .unwrap();

    assert_eq!(report.plan.to_remove.len(), 2);
    assert!(ctx.backend.removals().is_empty());
    assert!(ctx.log.contains("dry_run", "would remove 2 entries"));
}

/// Nothing undeclared means nothing to confirm.
#[test]
fn cleanup_converged_is_a_no_op() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .installed(&["brew \"git\"", "brew \"jq\""])
        .build();

    let report = ctx.run(&["--system", "base", "cleanup"], "").unwrap();

    assert_eq!(report.removed, 0);
    assert!(ctx.backend.removals().is_empty());
    assert!(ctx.log.contains("success", "nothing to remove"));
}

/// A blank `--manifests` list is an error, not an empty scope.
#[test]
fn cleanup_blank_manifest_list_removes_nothing() {
    let ctx = context();

    let err = ctx
        .run(&["--manifests", ",", "cleanup", "--force"], "")
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReconcileError>(),
        Some(ReconcileError::EmptySelection { .. })
    ));
    assert!(ctx.backend.removals().is_empty());
    assert_eq!(ctx.backend.keys().len(), 4);
    assert!(ctx.files.tracked().is_empty());
}

/// A system type emptied in `systems.toml` is rejected the same way.
#[test]
fn cleanup_empty_system_preset_removes_nothing() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .systems_toml("[base]\nmanifests = []\n")
        .installed(&["brew \"git\"", "brew \"wget\""])
        .build();

    let err = ctx
        .run(&["--system", "base", "cleanup", "--force"], "")
        .unwrap_err();

    match err.downcast_ref::<ReconcileError>() {
        Some(ReconcileError::EmptySelection { selection }) => {
            assert_eq!(selection, "system type 'base'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(ctx.backend.keys(), keys(&["brew:git", "brew:wget"]));
}

/// A tap still needed by a declared tap-qualified formula survives cleanup.
#[test]
fn cleanup_keeps_tap_of_declared_formula() {
    let ctx = TestContextBuilder::new()
        .manifest("base", "brew \"hashicorp/tap/terraform\"\n")
        .installed(&[
            "tap \"hashicorp/tap\"",
            "tap \"homebrew/cask-fonts\"",
            "brew \"hashicorp/tap/terraform\"",
            "brew \"wget\"",
        ])
        .build();

    let report = ctx
        .run(&["--system", "base", "cleanup", "--force"], "")
        .unwrap();

    assert_eq!(report.removed, 2);
    assert_eq!(
        ctx.backend.keys(),
        keys(&["brew:terraform", "tap:hashicorp/tap"])
    );
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// Diff lists both directions through the result channel.
#[test]
fn diff_lists_missing_and_undeclared() {
    let ctx = context();

    let report = ctx.run(&["--system", "dev", "diff"], "").unwrap();

    assert_eq!(report.plan.to_install.len(), 1);
    assert_eq!(report.plan.to_remove.len(), 2);
    insta::assert_snapshot!(ctx.log.at("result").join("\n"), @r#"
    to install (1):
      + brew "jq"
    to remove (2):
      - brew "wget"
      - cask "zoom"
    "#);
}

/// Diff ignores `--dry-run` and never mutates or prompts.
#[test]
fn diff_is_read_only() {
    let ctx = context();

    ctx.run(&["--system", "dev", "diff", "-n"], "y\n").unwrap();

    assert!(ctx.backend.installs().is_empty());
    assert!(ctx.backend.removals().is_empty());
    assert!(ctx.log.at("dry_run").is_empty());
}
