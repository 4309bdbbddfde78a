use std::path::{Path, PathBuf};

use anyhow::{Context, Ok, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::procedure::Deployment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub chain_id: u64,
    #[serde(flatten)]
    pub deployment: Deployment,
}

/// Writes finished deployments to `<root>/<chain id>/<factory address>/deployed.json`.
pub struct Recorder {
    root_dir: PathBuf,
}

impl Recorder {
    pub fn new(root_dir: &Path, chain_id: u64) -> Self {
        Self {
            root_dir: root_dir.join(chain_id.to_string()),
        }
    }

    pub fn save(&self, record: &DeploymentRecord) -> Result<PathBuf> {
        let dir = self
            .root_dir
            .join(record.deployment.factory.address.to_string());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join("deployed.json");
        info!("Saving deployment record to: {:#}", path.display());
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, record)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
