//! Shared test utilities for hapkg-shim tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

use hapkg_shim::config::PACKED_ARTIFACT;
use hapkg_shim::pack::{Archiver, ContainerJob, Installer, Packer};
use hapkg_shim::{Config, Context, Result, ShimError, Toolchain};
use tempfile::TempDir;

/// Test environment with a prefix laid out as `<tmp>/prefix/{sysroot,temp}`.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// `<tmp>/prefix`
    pub prefix: PathBuf,
    /// `<tmp>/prefix/sysroot`
    pub sysroot: PathBuf,
    /// Fake base runtime container
    pub base_runtime: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let prefix = temp_dir.path().join("prefix");
        let sysroot = prefix.join("sysroot");
        fs::create_dir_all(&sysroot).expect("Failed to create sysroot");

        let base_runtime = temp_dir.path().join("org.horpkg.runtime.hap");
        fs::write(&base_runtime, b"PK-base").expect("Failed to create base runtime");

        Self {
            _temp_dir: temp_dir,
            prefix,
            sysroot,
            base_runtime,
        }
    }

    pub fn temp(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Configuration independent of the process environment.
    pub fn config(&self) -> Config {
        Config {
            base_runtime: self.base_runtime.clone(),
            ..Config::default()
        }
    }

    /// Context rooted at the sysroot.
    pub fn context(&self) -> Context {
        Context::new(self.sysroot.clone(), self.config())
    }

    pub fn staging_root(&self) -> PathBuf {
        self.prefix.join("temp/horpkgruntime")
    }

    pub fn container(&self) -> PathBuf {
        self.prefix.join("temp/org.horpkg.runtime.hap")
    }
}

/// Create an executable file starting with the ELF magic.
pub fn create_mock_elf(root: &Path, rel: &str) -> PathBuf {
    write_file(root, rel, b"\x7fELF\x02\x01\x01\x00mock", 0o755)
}

/// Create a file with the given content and mode.
pub fn write_file(root: &Path, rel: &str, content: &[u8], mode: u32) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write file");
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("Failed to set permissions");
    path
}

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) {
    write_file(
        path.parent().unwrap(),
        path.file_name().unwrap().to_str().unwrap(),
        format!("#!/bin/sh\n{}", body).as_bytes(),
        0o755,
    );
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that a path does not exist.
pub fn assert_absent(path: &Path) {
    assert!(!path.exists(), "Expected {} to be absent", path.display());
}

/// Calls made to the fake tools, in order.
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Fake packer: writes the bundle with the list of staged shims.
pub struct FakePacker {
    pub log: CallLog,
}

impl Packer for FakePacker {
    fn pack(&self, staging_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        self.log.borrow_mut().push("pack".to_string());
        let mut names: Vec<String> = fs::read_dir(staging_dir.join("bin"))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        let artifact = output_dir.join(PACKED_ARTIFACT);
        fs::write(&artifact, names.join("\n")).map_err(|e| ShimError::io(&artifact, e))?;
        Ok(artifact)
    }
}

/// Fake archiver: destination = base bytes + entry name + bundle bytes.
pub struct FakeArchiver {
    pub log: CallLog,
}

impl Archiver for FakeArchiver {
    fn assemble(&self, job: &ContainerJob<'_>) -> Result<()> {
        self.log.borrow_mut().push("assemble".to_string());
        let mut out = fs::read(job.base).map_err(|e| ShimError::io(job.base, e))?;
        out.extend_from_slice(b"|");
        out.extend_from_slice(job.entry.to_string_lossy().as_bytes());
        out.extend_from_slice(b"|");
        out.extend(fs::read(job.artifact).map_err(|e| ShimError::io(job.artifact, e))?);
        fs::write(job.destination, out).map_err(|e| ShimError::io(job.destination, e))
    }
}

/// Fake installer that can be told to fail.
pub struct FakeInstaller {
    pub log: CallLog,
    pub fail: Rc<RefCell<bool>>,
}

impl Installer for FakeInstaller {
    fn install(&self, token: &str, container: &Path) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("install {} {}", token, container.display()));
        if *self.fail.borrow() {
            return Err(ShimError::from_status("horpkg", ExitStatus::from_raw(1 << 8)));
        }
        Ok(())
    }
}

/// Build a toolchain of fakes sharing one call log.
pub fn fake_toolchain() -> (Toolchain, CallLog, Rc<RefCell<bool>>) {
    let log: CallLog = Rc::default();
    let fail = Rc::new(RefCell::new(false));
    let tools = Toolchain {
        packer: Box::new(FakePacker { log: log.clone() }),
        archiver: Box::new(FakeArchiver { log: log.clone() }),
        installer: Box::new(FakeInstaller {
            log: log.clone(),
            fail: fail.clone(),
        }),
    };
    (tools, log, fail)
}
