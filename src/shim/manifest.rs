//! Bundle manifest (`hnp.json`) written into the staging directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::write_file_atomic;
use crate::config::{MANIFEST_VERSION, RUNTIME_NAME};
use crate::error::Result;

/// A link the installer creates when the bundle is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnpLink {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnpInstall {
    pub links: Vec<HnpLink>,
}

/// `{ "type": "hnp-config", "name", "version", "install": { "links": [] } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnpManifest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub version: String,
    pub install: HnpInstall,
}

impl HnpManifest {
    /// Manifest for the runtime bundle.
    pub fn runtime() -> Self {
        Self {
            kind: "hnp-config".to_string(),
            name: RUNTIME_NAME.to_string(),
            version: MANIFEST_VERSION.to_string(),
            install: HnpInstall::default(),
        }
    }
}

/// Write the runtime manifest unless one already exists.
///
/// Returns true if the file was created.
pub fn ensure_manifest(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let mut json = serde_json::to_string_pretty(&HnpManifest::runtime())?;
    json.push('\n');
    write_file_atomic(path, json, 0o644)?;
    Ok(true)
}
