//! Tests for the runtime packaging pipeline.
//!
//! Most tests use in-process fake tools; the failure tests use the real
//! command-backed toolchain pointed at scripts or at programs that do not
//! exist.

mod helpers;

use std::fs;
use std::time::SystemTime;

use hapkg_shim::config::Programs;
use hapkg_shim::{
    finalize, install, pack, remove, PackOutcome, ShimError, SkipReason, Toolchain, ToolFailure,
};
use helpers::{
    assert_absent, assert_file_exists, create_mock_elf, fake_toolchain, write_script, TestEnv,
};

fn snapshot(dir: &std::path::Path) -> Vec<(String, SystemTime, u64)> {
    let mut entries: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| {
            let meta = e.metadata().unwrap();
            (
                e.path().display().to_string(),
                meta.modified().unwrap(),
                meta.len(),
            )
        })
        .collect();
    entries.sort();
    entries
}

#[test]
fn test_finalize_runs_pipeline_once_then_noops() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let mut ctx = env.context();
    let (tools, log, _) = fake_toolchain();

    install(&mut ctx, "usr/bin/foo").unwrap();
    let outcome = finalize(&mut ctx, &tools).unwrap();

    assert_eq!(
        outcome,
        PackOutcome::Installed {
            container: env.container()
        }
    );
    assert!(!ctx.is_dirty());
    assert_eq!(
        *log.borrow(),
        vec![
            "pack".to_string(),
            "assemble".to_string(),
            format!("install 314159 {}", env.container().display()),
        ]
    );
    assert_eq!(
        fs::read(env.container()).unwrap(),
        b"PK-base|hnp/arm64-v8a/horpkgruntime.hnp|foo".to_vec()
    );
    assert_file_exists(&env.prefix.join("temp/horpkgruntime.hnp.sha256"));

    let before = snapshot(&env.prefix.join("temp"));
    let outcome = finalize(&mut ctx, &tools).unwrap();
    assert_eq!(outcome, PackOutcome::Skipped(SkipReason::Clean));
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(snapshot(&env.prefix.join("temp")), before);
}

#[test]
fn test_clean_context_skips() {
    let env = TestEnv::new();
    let mut ctx = env.context();
    let (tools, log, _) = fake_toolchain();

    assert_eq!(
        pack(&mut ctx, &tools).unwrap(),
        PackOutcome::Skipped(SkipReason::Clean)
    );
    assert!(log.borrow().is_empty());
    assert_absent(&env.prefix.join("temp"));
}

#[test]
fn test_skip_switch_leaves_disk_alone() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let mut ctx = env.context();
    ctx.config.skip_pack = true;
    let (tools, log, _) = fake_toolchain();

    install(&mut ctx, "usr/bin/foo").unwrap();
    let before = snapshot(&env.prefix.join("temp"));

    assert_eq!(
        finalize(&mut ctx, &tools).unwrap(),
        PackOutcome::Skipped(SkipReason::Disabled)
    );
    assert!(log.borrow().is_empty());
    assert!(ctx.is_dirty());
    assert_eq!(snapshot(&env.prefix.join("temp")), before);
}

#[test]
fn test_missing_staging_clears_dirty() {
    let env = TestEnv::new();
    let mut ctx = env.context();
    ctx.staging.mark_dirty();
    let (tools, log, _) = fake_toolchain();

    assert_eq!(
        finalize(&mut ctx, &tools).unwrap(),
        PackOutcome::Skipped(SkipReason::NoStaging)
    );
    assert!(!ctx.is_dirty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_missing_packer_is_tool_failure() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let mut ctx = env.context();
    ctx.config.programs = Programs {
        packer: "nonexistent_hnpcli_12345".to_string(),
        installer: "nonexistent_horpkg_12345".to_string(),
        unzip: "nonexistent_unzip_12345".to_string(),
        zip: "nonexistent_zip_12345".to_string(),
    };
    let tools = Toolchain::from_config(&ctx.config);

    install(&mut ctx, "usr/bin/foo").unwrap();
    let err = finalize(&mut ctx, &tools).unwrap_err();

    match err {
        ShimError::ExternalTool { tool, failure } => {
            assert_eq!(tool, "nonexistent_hnpcli_12345");
            assert!(matches!(failure, ToolFailure::Launch(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ctx.is_dirty());
    assert_absent(&env.container());
}

#[test]
fn test_failing_archiver_keeps_dirty() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let bin = env.temp().join("tools");
    let packer = bin.join("hnpcli");
    let unzip = bin.join("unzip");
    // argv: pack -i <staging> -o <output>
    write_script(&packer, "touch \"$5/horpkgruntime.hnp\"\n");
    // mimics unzip on a missing archive
    write_script(&unzip, "exit 9\n");

    let mut ctx = env.context();
    ctx.config.base_runtime = env.temp().join("missing.hap");
    ctx.config.programs = Programs {
        packer: packer.display().to_string(),
        installer: "nonexistent_horpkg_12345".to_string(),
        unzip: unzip.display().to_string(),
        zip: "nonexistent_zip_12345".to_string(),
    };
    let tools = Toolchain::from_config(&ctx.config);

    install(&mut ctx, "usr/bin/foo").unwrap();
    let err = finalize(&mut ctx, &tools).unwrap_err();

    match err {
        ShimError::ExternalTool { tool, failure } => {
            assert_eq!(tool, unzip.display().to_string());
            assert!(matches!(failure, ToolFailure::Exit(9)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ctx.is_dirty());
    assert_file_exists(&env.prefix.join("temp/horpkgruntime.hnp"));
    assert_absent(&env.container());
}

#[test]
fn test_failed_install_retries_from_the_top() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let mut ctx = env.context();
    let (tools, log, fail) = fake_toolchain();

    install(&mut ctx, "usr/bin/foo").unwrap();
    *fail.borrow_mut() = true;
    let err = finalize(&mut ctx, &tools).unwrap_err();
    assert_eq!(err.tool(), Some("horpkg"));
    assert!(ctx.is_dirty());
    let first = fs::read(env.container()).unwrap();

    *fail.borrow_mut() = false;
    finalize(&mut ctx, &tools).unwrap();
    assert!(!ctx.is_dirty());
    assert_eq!(log.borrow().len(), 6);
    assert_eq!(log.borrow()[3], "pack");
    assert_eq!(fs::read(env.container()).unwrap(), first);
}

#[test]
fn test_stale_outputs_are_removed_before_packing() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    let mut ctx = env.context();
    ctx.config.programs.packer = "nonexistent_hnpcli_12345".to_string();
    let tools = Toolchain::from_config(&ctx.config);

    install(&mut ctx, "usr/bin/foo").unwrap();
    fs::write(env.prefix.join("temp/horpkgruntime.hnp"), "stale bundle").unwrap();
    fs::write(env.container(), "stale container").unwrap();

    assert!(finalize(&mut ctx, &tools).is_err());
    assert_absent(&env.prefix.join("temp/horpkgruntime.hnp"));
    assert_absent(&env.container());
}

#[test]
fn test_removed_shim_is_dropped_from_next_pack() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "usr/bin/foo");
    create_mock_elf(&env.sysroot, "usr/bin/bar");
    let mut ctx = env.context();
    let (tools, _, _) = fake_toolchain();

    install(&mut ctx, "usr/bin/foo").unwrap();
    install(&mut ctx, "usr/bin/bar").unwrap();
    finalize(&mut ctx, &tools).unwrap();
    assert!(fs::read(env.container()).unwrap().ends_with(b"bar\nfoo"));

    remove(&mut ctx, "usr/bin/bar").unwrap();
    assert!(ctx.is_dirty());
    finalize(&mut ctx, &tools).unwrap();
    assert!(fs::read(env.container()).unwrap().ends_with(b"|foo"));
}

#[test]
fn test_custom_arch_and_pin() {
    let env = TestEnv::new();
    create_mock_elf(&env.sysroot, "bin/foo");
    let mut ctx = env.context();
    ctx.config.hnp_arch = "x86_64".to_string();
    ctx.config.install_pin = "0000".to_string();
    let (tools, log, _) = fake_toolchain();

    install(&mut ctx, "bin/foo").unwrap();
    finalize(&mut ctx, &tools).unwrap();

    assert!(fs::read(env.container())
        .unwrap()
        .starts_with(b"PK-base|hnp/x86_64/horpkgruntime.hnp|"));
    assert!(log.borrow()[2].starts_with("install 0000 "));
}
