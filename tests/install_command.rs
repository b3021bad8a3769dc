#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Integration tests for `install` and `sync`.
//!
//! These run the full resolve → merge → dispatch → release sequence against
//! an in-memory backend and check which manifests were merged, what the
//! backend was asked to do, and that the merged manifest never outlives the
//! command.

mod common;

use brewfiles_cli::error::ReconcileError;
use common::*;

const BASE: &str = "# Core tools\nbrew \"git\"\n";
const DEV: &str = "cask \"docker\"\n";
const UTILITIES: &str = "brew \"htop\"\n";

// ---------------------------------------------------------------------------
// Manifest selection and merging
// ---------------------------------------------------------------------------

/// `--system dev` merges base then dev, and nothing else.
#[test]
fn dev_system_merges_base_then_dev() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("dev", DEV)
        .manifest("utilities", UTILITIES)
        .build();

    ctx.run(&["--system", "dev", "install"], "").unwrap();

    let installs = ctx.backend.installs();
    assert_eq!(installs.len(), 1);
    let body: Vec<&str> = installs[0]
        .content
        .lines()
        .filter(|l| !l.starts_with('#') && !l.is_empty())
        .collect();
    assert_eq!(body, ["brew \"git\"", "cask \"docker\""]);
    assert!(installs[0].content.contains("# System type: dev"));
    assert_eq!(ctx.backend.keys(), keys(&["brew:git", "cask:docker"]));
}

/// The merged manifest exists during the backend call and is gone afterwards.
#[test]
fn merged_manifest_is_released_after_success() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("dev", DEV)
        .build();

    ctx.run(&["--system", "dev"], "").unwrap();

    let call = &ctx.backend.installs()[0];
    assert!(!call.path.exists(), "merged manifest should be deleted");
    assert!(ctx.files.tracked().is_empty());
}

/// A failing backend still releases the merged manifest.
#[test]
fn merged_manifest_is_released_after_failure() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .failing_install()
        .build();

    let err = ctx.run(&["--system", "base", "install"], "").unwrap_err();

    assert!(format!("{err:#}").contains("simulated failure"));
    assert!(matches!(
        err.downcast_ref::<ReconcileError>(),
        Some(ReconcileError::BackendOperation { .. })
    ));
    assert!(!ctx.backend.installs()[0].path.exists());
    assert!(ctx.files.tracked().is_empty());
}

/// A missing manifest fails before the backend is consulted.
#[test]
fn missing_manifest_fails_before_backend() {
    let ctx = TestContextBuilder::new().manifest("base", BASE).build();

    let err = ctx.run(&["--system", "dev", "install"], "").unwrap_err();

    match err.downcast_ref::<ReconcileError>() {
        Some(ReconcileError::ManifestNotFound { path }) => {
            assert_eq!(path.file_name().unwrap(), "dev.manifest");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ctx.backend.installs().is_empty());
    assert!(ctx.files.tracked().is_empty());
}

/// An unknown system type is rejected before resolution.
#[test]
fn unknown_system_type_is_rejected() {
    let ctx = TestContextBuilder::new().manifest("base", BASE).build();

    let err = ctx.run(&["--system", "gaming"], "").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReconcileError>(),
        Some(ReconcileError::UnknownSystemType(name)) if name == "gaming"
    ));
    assert!(ctx.backend.installs().is_empty());
}

/// Explicit manifest lists keep their order and accept bare names.
#[test]
fn explicit_manifest_list_keeps_order() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("work", "brew \"awscli\"\n")
        .build();

    ctx.run(&["--manifests", "work,base", "install"], "").unwrap();

    let content = &ctx.backend.installs()[0].content;
    assert!(content.contains("# System type: custom"));
    let awscli = content.find("awscli").unwrap();
    let git = content.find("\"git\"").unwrap();
    assert!(awscli < git);
}

/// `systems.toml` replaces a preset's manifest list.
#[test]
fn systems_toml_overrides_preset() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("work", "brew \"awscli\"\n")
        .systems_toml("[dev]\nmanifests = [\"base\", \"work\"]\n")
        .build();

    ctx.run(&["--system", "dev", "install"], "").unwrap();

    assert_eq!(ctx.backend.keys(), keys(&["brew:awscli", "brew:git"]));
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

/// Running install twice asks the backend to install only once.
#[test]
fn install_is_idempotent() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .manifest("dev", DEV)
        .build();

    let first = ctx.run(&["--system", "dev", "install"], "").unwrap();
    let second = ctx.run(&["--system", "dev", "install"], "").unwrap();

    assert_eq!(first.installed, 2);
    assert_eq!(second.installed, 0);
    assert_eq!(ctx.backend.installs().len(), 1);
}

/// Install never removes, even with undeclared packages installed.
#[test]
fn install_never_removes() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .installed(&["brew \"wget\"", "cask \"zoom\""])
        .build();

    ctx.run(&["--system", "base", "install"], "").unwrap();

    assert!(ctx.backend.removals().is_empty());
    assert_eq!(
        ctx.backend.keys(),
        keys(&["brew:git", "brew:wget", "cask:zoom"])
    );
}

/// Dry-run install leaves the system untouched.
#[test]
fn install_dry_run_is_pure() {
    let ctx = TestContextBuilder::new().manifest("base", BASE).build();

    let report = ctx.run(&["--system", "base", "-n"], "").unwrap();

    assert!(report.dry_run);
    assert_eq!(report.plan.to_install.len(), 1);
    assert!(ctx.backend.installs().is_empty());
    assert!(ctx.log.contains("dry_run", "would install 1 entries"));
}

/// `--output` has no effect outside backup and says so in the debug log.
#[test]
fn output_flag_is_ignored_by_install() {
    let ctx = TestContextBuilder::new().manifest("base", BASE).build();
    let before = ctx.dir_entries();

    ctx.run(
        &["--system", "base", "--output", "snapshot.manifest", "install"],
        "",
    )
    .unwrap();

    assert!(ctx.log.contains("debug", "only applies to backup"));
    assert_eq!(ctx.dir_entries(), before);
    assert_eq!(ctx.backend.installs().len(), 1);
}

/// Conflicting metadata across manifests is reported with both sources.
#[test]
fn conflicting_metadata_warns() {
    let ctx = TestContextBuilder::new()
        .manifest("base", "brew \"postgresql@14\"\n")
        .manifest("dev", "brew \"postgresql@14\", restart_service: true\n")
        .build();

    let report = ctx.run(&["--system", "dev", "-n"], "").unwrap();

    let entry = report.plan.to_install.values().next().unwrap();
    assert_eq!(entry.metadata.as_deref(), Some("restart_service: true"));
    assert!(ctx.log.contains("warn", "base.manifest"));
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

/// Sync installs first, then removes undeclared packages after confirmation.
#[test]
fn sync_converges_both_ways() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .installed(&["brew \"wget\""])
        .build();

    let report = ctx.run(&["--system", "base", "sync"], "yes\n").unwrap();

    assert_eq!(report.installed, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(ctx.backend.keys(), keys(&["brew:git"]));
}

/// A failed install skips the cleanup half of sync.
#[test]
fn sync_skips_cleanup_after_failed_install() {
    let ctx = TestContextBuilder::new()
        .manifest("base", BASE)
        .installed(&["brew \"wget\""])
        .failing_install()
        .build();

    assert!(ctx.run(&["--system", "base", "sync"], "y\n").is_err());
    assert!(ctx.backend.removals().is_empty());
    assert!(ctx.backend.keys().contains("brew:wget"));
}
