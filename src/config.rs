//! Configuration management for hapkg-shim.
//!
//! Reads configuration from environment variables. The binary loads an
//! optional `.env` first (via dotenvy); real environment variables win.

use std::collections::HashMap;
use std::path::PathBuf;

/// Name of the runtime bundle staged under `<prefix>/temp/`.
pub const RUNTIME_NAME: &str = "horpkgruntime";
/// File produced by the packer inside the output directory.
pub const PACKED_ARTIFACT: &str = "horpkgruntime.hnp";
/// Destination container produced in the output directory.
pub const CONTAINER_NAME: &str = "org.horpkg.runtime.hap";
/// Scratch directory used to unpack the base container.
pub const CONTAINER_SCRATCH: &str = "org.horpkg.runtime.hap.dir";
/// Bundle manifest file inside the staging directory.
pub const MANIFEST_FILE: &str = "hnp.json";
/// Version written into the bundle manifest.
pub const MANIFEST_VERSION: &str = "1.0";
/// Digest of the staging tree recorded after a successful pack.
pub const STAGING_DIGEST: &str = "horpkgruntime.hnp.sha256";

/// Default base runtime container shipped by the platform.
pub const DEFAULT_BASE_RUNTIME: &str =
    "/data/service/hnp/horpkg-base.org/horpkg-base_1.0/share/horpkg/resources/org.horpkg.runtime.hap";
/// Default installer authorization token.
pub const DEFAULT_INSTALL_PIN: &str = "314159";
/// Default architecture segment of the injected artifact path.
pub const DEFAULT_HNP_ARCH: &str = "arm64-v8a";

pub const ENV_PREFIX: &str = "HPKG_PREFIX";
pub const ENV_HOME: &str = "HOME";
pub const ENV_SKIP_PACK: &str = "HPKG_SKIP_SHIM_PACK";
pub const ENV_POLICY: &str = "HPKG_SHIM_POLICY";
pub const ENV_STRATEGY: &str = "HPKG_CONTAINER_STRATEGY";
pub const ENV_BASE_RUNTIME: &str = "HPKG_BASE_RUNTIME";
pub const ENV_INSTALL_PIN: &str = "HPKG_INSTALL_PIN";
pub const ENV_HNP_ARCH: &str = "HPKG_HNP_ARCH";
pub const ENV_PACKER: &str = "HPKG_PACKER";
pub const ENV_INSTALLER: &str = "HPKG_INSTALLER";
pub const ENV_UNZIP: &str = "HPKG_UNZIP";
pub const ENV_ZIP: &str = "HPKG_ZIP";

/// Which installed files are eligible for a shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShimPolicy {
    /// Only files under conventional bin directories, then the ELF check.
    #[default]
    BinDirsOnly,
    /// Every executable regular ELF file, wherever it lives.
    AnyExecutable,
}

impl ShimPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "bin-dirs" => Some(Self::BinDirsOnly),
            "any-executable" => Some(Self::AnyExecutable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BinDirsOnly => "bin-dirs",
            Self::AnyExecutable => "any-executable",
        }
    }
}

/// How a fresh copy of the base runtime container is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerStrategy {
    /// Unpack into a scratch directory, inject, re-archive.
    #[default]
    Unpack,
    /// Copy the container file, then update it in place.
    Copy,
}

impl ContainerStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "unpack" => Some(Self::Unpack),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpack => "unpack",
            Self::Copy => "copy",
        }
    }
}

/// External program names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programs {
    pub packer: String,
    pub installer: String,
    pub unzip: String,
    pub zip: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            packer: "hnpcli".to_string(),
            installer: "horpkg".to_string(),
            unzip: "unzip".to_string(),
            zip: "zip".to_string(),
        }
    }
}

/// hapkg-shim configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit prefix override (HPKG_PREFIX), if set and non-empty.
    pub prefix_override: Option<PathBuf>,
    /// Home directory used for the `~/.hapkg` fallback.
    pub home: Option<PathBuf>,
    /// Packaging disabled entirely (HPKG_SKIP_SHIM_PACK present).
    pub skip_pack: bool,
    pub policy: ShimPolicy,
    pub strategy: ContainerStrategy,
    /// Base runtime container to inject into.
    pub base_runtime: PathBuf,
    /// Token passed to the installer.
    pub install_pin: String,
    /// Architecture directory inside the container (`hnp/<arch>/`).
    pub hnp_arch: String,
    pub programs: Programs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix_override: None,
            home: None,
            skip_pack: false,
            policy: ShimPolicy::default(),
            strategy: ContainerStrategy::default(),
            base_runtime: PathBuf::from(DEFAULT_BASE_RUNTIME),
            install_pin: DEFAULT_INSTALL_PIN.to_string(),
            hnp_arch: DEFAULT_HNP_ARCH.to_string(),
            programs: Programs::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::from_vars(std::env::vars());
        if config.home.is_none() {
            config.home = dirs::home_dir();
        }
        config
    }

    /// Build configuration from an explicit set of variables.
    ///
    /// Unknown policy or strategy values fall back to the defaults with a
    /// warning.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env_vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let non_empty = |key: &str| env_vars.get(key).filter(|v| !v.is_empty()).cloned();

        let mut config = Self {
            prefix_override: non_empty(ENV_PREFIX).map(PathBuf::from),
            home: non_empty(ENV_HOME).map(PathBuf::from),
            skip_pack: env_vars.contains_key(ENV_SKIP_PACK),
            ..Self::default()
        };

        if let Some(value) = non_empty(ENV_POLICY) {
            match ShimPolicy::parse(&value) {
                Some(policy) => config.policy = policy,
                None => tracing::warn!("ignoring unknown {}={}", ENV_POLICY, value),
            }
        }
        if let Some(value) = non_empty(ENV_STRATEGY) {
            match ContainerStrategy::parse(&value) {
                Some(strategy) => config.strategy = strategy,
                None => tracing::warn!("ignoring unknown {}={}", ENV_STRATEGY, value),
            }
        }
        if let Some(value) = non_empty(ENV_BASE_RUNTIME) {
            config.base_runtime = PathBuf::from(value);
        }
        if let Some(value) = non_empty(ENV_INSTALL_PIN) {
            config.install_pin = value;
        }
        if let Some(value) = non_empty(ENV_HNP_ARCH) {
            config.hnp_arch = value;
        }
        if let Some(value) = non_empty(ENV_PACKER) {
            config.programs.packer = value;
        }
        if let Some(value) = non_empty(ENV_INSTALLER) {
            config.programs.installer = value;
        }
        if let Some(value) = non_empty(ENV_UNZIP) {
            config.programs.unzip = value;
        }
        if let Some(value) = non_empty(ENV_ZIP) {
            config.programs.zip = value;
        }

        config
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        let show = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        };
        println!("Configuration:");
        println!("  {}: {}", ENV_PREFIX, show(&self.prefix_override));
        println!("  {}: {}", ENV_HOME, show(&self.home));
        println!("  {}: {}", ENV_SKIP_PACK, self.skip_pack);
        println!("  {}: {}", ENV_POLICY, self.policy.as_str());
        println!("  {}: {}", ENV_STRATEGY, self.strategy.as_str());
        println!("  {}: {}", ENV_BASE_RUNTIME, self.base_runtime.display());
        println!("  {}: {}", ENV_HNP_ARCH, self.hnp_arch);
        println!(
            "  Programs: packer={} installer={} unzip={} zip={}",
            self.programs.packer, self.programs.installer, self.programs.unzip, self.programs.zip
        );
    }
}
