use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use super::ValidatedMapping;
use crate::catalog::{ApiVersion, Partition};
use crate::error::BsbLanResult;

/// Known discovery results for a device, used to warm-start a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub api_version: ApiVersion,
    #[serde(default)]
    pub partitions: BTreeMap<String, ValidatedMapping>,
}

impl DeviceProfile {
    pub fn new(api_version: ApiVersion) -> Self {
        Self {
            api_version,
            partitions: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, partition: Partition, mapping: ValidatedMapping) {
        self.partitions.insert(partition.key().to_string(), mapping);
    }

    /// Typed entries; fails on the first unknown partition key.
    pub fn entries(&self) -> BsbLanResult<Vec<(Partition, ValidatedMapping)>> {
        self.partitions
            .iter()
            .map(|(key, mapping)| Ok((key.parse::<Partition>()?, mapping.clone())))
            .collect()
    }

    pub async fn load(path: impl AsRef<Path>) -> BsbLanResult<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> BsbLanResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
