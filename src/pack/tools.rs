//! External tool capabilities used by the packaging pipeline.
//!
//! Each capability is a trait with one method so an in-process archive
//! implementation can replace the command-backed one without touching the
//! pipeline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common::{copy_file_with_dirs, prepare_work_dir, remove_file_if_exists};
use crate::config::{Config, ContainerStrategy, PACKED_ARTIFACT};
use crate::error::{IoContext, Result, ShimError};
use crate::process::Cmd;

/// Packs a staging directory into a single-file bundle.
pub trait Packer {
    /// Pack `staging_dir` into `output_dir`, returning the produced file.
    fn pack(&self, staging_dir: &Path, output_dir: &Path) -> Result<PathBuf>;
}

/// Everything needed to build the destination container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerJob<'a> {
    /// Base runtime container shipped by the platform.
    pub base: &'a Path,
    /// Packed bundle to inject.
    pub artifact: &'a Path,
    /// Path of the bundle inside the container, e.g. `hnp/arm64-v8a/x.hnp`.
    pub entry: &'a Path,
    /// Scratch directory owned by the archiver.
    pub scratch: &'a Path,
    /// Container file to produce.
    pub destination: &'a Path,
}

/// Produces a fresh container from the base with the artifact injected.
pub trait Archiver {
    fn assemble(&self, job: &ContainerJob<'_>) -> Result<()>;
}

/// Installs a finished container.
pub trait Installer {
    fn install(&self, token: &str, container: &Path) -> Result<()>;
}

/// Copy the artifact to `entry` below `dir`, creating directories as needed.
pub fn inject_artifact(dir: &Path, entry: &Path, artifact: &Path) -> Result<PathBuf> {
    let target = dir.join(entry);
    copy_file_with_dirs(artifact, &target)?;
    debug!("injected {} at {}", artifact.display(), target.display());
    Ok(target)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).at(path)
}

/// `hnpcli pack -i <staging> -o <output>`
#[derive(Debug, Clone)]
pub struct HnpPacker {
    pub program: String,
}

impl Packer for HnpPacker {
    fn pack(&self, staging_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        Cmd::new(&self.program)
            .arg("pack")
            .arg("-i")
            .arg_path(staging_dir)
            .arg("-o")
            .arg_path(output_dir)
            .run_interactive()?;

        let artifact = output_dir.join(PACKED_ARTIFACT);
        if !artifact.is_file() {
            return Err(ShimError::io(
                artifact,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} reported success but produced no bundle", self.program),
                ),
            ));
        }
        Ok(artifact)
    }
}

/// Strategy (a): unpack the base into scratch, inject, re-archive.
#[derive(Debug, Clone)]
pub struct UnpackArchiver {
    pub unzip: String,
    pub zip: String,
}

impl Archiver for UnpackArchiver {
    fn assemble(&self, job: &ContainerJob<'_>) -> Result<()> {
        let destination = absolute(job.destination)?;

        prepare_work_dir(job.scratch)?;
        Cmd::new(&self.unzip)
            .arg("-oq")
            .arg_path(job.base)
            .arg("-d")
            .arg_path(job.scratch)
            .run_interactive()?;

        inject_artifact(job.scratch, job.entry, job.artifact)?;

        remove_file_if_exists(&destination)?;
        Cmd::new(&self.zip)
            .arg("-qr")
            .arg_path(&destination)
            .arg(".")
            .dir(job.scratch)
            .run_interactive()
    }
}

/// Strategy (b): copy the base file, then update the entry in place.
#[derive(Debug, Clone)]
pub struct CopyArchiver {
    pub zip: String,
}

impl Archiver for CopyArchiver {
    fn assemble(&self, job: &ContainerJob<'_>) -> Result<()> {
        let destination = absolute(job.destination)?;

        remove_file_if_exists(&destination)?;
        fs::copy(job.base, &destination).at(job.base)?;

        // zip stores entries relative to its working directory
        prepare_work_dir(job.scratch)?;
        inject_artifact(job.scratch, job.entry, job.artifact)?;

        Cmd::new(&self.zip)
            .arg("-q")
            .arg_path(&destination)
            .arg_path(job.entry)
            .dir(job.scratch)
            .run_interactive()
    }
}

/// `horpkg install pin <token> <container>`
#[derive(Debug, Clone)]
pub struct HorpkgInstaller {
    pub program: String,
}

impl Installer for HorpkgInstaller {
    fn install(&self, token: &str, container: &Path) -> Result<()> {
        Cmd::new(&self.program)
            .args(["install", "pin", token])
            .arg_path(container)
            .run_interactive()
    }
}

/// The set of capabilities one pipeline run uses.
pub struct Toolchain {
    pub packer: Box<dyn Packer>,
    pub archiver: Box<dyn Archiver>,
    pub installer: Box<dyn Installer>,
}

impl Toolchain {
    /// Command-backed tools named by the configuration.
    pub fn from_config(config: &Config) -> Self {
        let programs = &config.programs;
        let archiver: Box<dyn Archiver> = match config.strategy {
            ContainerStrategy::Unpack => Box::new(UnpackArchiver {
                unzip: programs.unzip.clone(),
                zip: programs.zip.clone(),
            }),
            ContainerStrategy::Copy => Box::new(CopyArchiver {
                zip: programs.zip.clone(),
            }),
        };
        Self {
            packer: Box::new(HnpPacker {
                program: programs.packer.clone(),
            }),
            archiver,
            installer: Box::new(HorpkgInstaller {
                program: programs.installer.clone(),
            }),
        }
    }
}
