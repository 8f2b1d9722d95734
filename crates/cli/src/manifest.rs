//! Ghost package manifests (`manifest.json`).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::HostError;

/// Installed-package metadata, one per ghost directory.
#[derive(Debug, Clone, Deserialize)]
pub struct GhostManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub entry: EntrySection,
    pub shell: ShellSection,
    pub balloon: BalloonSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntrySection {
    /// Script dialect of the package; this host runs `yaml` entries.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellSection {
    /// Shell directory relative to the package root.
    pub default: String,
    /// Surface table filename inside the shell directory.
    pub surfaces: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalloonSection {
    pub default: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    pub mode: String,
    /// Save record path relative to the package root.
    pub path: String,
}

pub fn load_manifest(path: &Path) -> Result<GhostManifest, HostError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
