use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{DeviceProfile, DiscoveryCache, GateTable, ProbeExecutor, ValidatedMapping};
use crate::catalog::{Catalog, Partition};
use crate::error::{BsbLanError, BsbLanResult};
use crate::transport::Transport;

/// Instance-owned discovery state for one device
pub struct Discovery {
    catalog: Arc<Catalog>,
    gates: GateTable,
    cache: DiscoveryCache,
    probe: ProbeExecutor,
}

impl Discovery {
    pub fn new(catalog: Arc<Catalog>, transport: Arc<dyn Transport>) -> Self {
        Self {
            catalog,
            gates: GateTable::new(),
            cache: DiscoveryCache::new(),
            probe: ProbeExecutor::new(transport),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_validated(&self, partition: Partition) -> bool {
        self.cache.is_validated(partition)
    }

    /// Validated mapping if discovery already ran, without probing.
    pub fn validated(&self, partition: Partition) -> Option<Arc<ValidatedMapping>> {
        self.cache.read(partition)
    }

    /// Learn which candidates of `partition` the device supports, probing at most
    /// once no matter how many callers race here.
    ///
    /// An empty probe result is reported as `NoParametersAvailable` and not
    /// cached. Transport errors propagate and leave the partition unvalidated.
    #[instrument(skip_all, fields(partition = %partition))]
    pub async fn ensure_validated(
        &self,
        partition: Partition,
    ) -> BsbLanResult<Arc<ValidatedMapping>> {
        if let Some(mapping) = self.cache.read(partition) {
            debug!("Discovery cache hit");
            return Ok(mapping);
        }

        let gate = self.gates.get_or_create(partition).await;
        debug!("Waiting for discovery gate");
        // Dropped on every exit path, including cancellation of this future
        let _guard = gate.lock_owned().await;

        if let Some(mapping) = self.cache.read(partition) {
            debug!("Validated by a concurrent caller");
            return Ok(mapping);
        }

        let spec = self.catalog.spec(partition);
        let mapping = self.probe.probe(spec).await?;

        if mapping.is_empty() {
            warn!("Device reported none of the {} candidates", spec.len());
            return Err(BsbLanError::NoParametersAvailable {
                partition: partition.key().to_string(),
            });
        }

        info!("Validated {}/{} parameters", mapping.len(), spec.len());
        Ok(self.cache.commit(partition, mapping))
    }

    /// Mark `partition` validated with a known mapping, skipping the probe.
    /// IDs outside the partition's catalog are dropped.
    ///
    /// Takes the partition gate, so a probe already in flight commits first
    /// and the seeded mapping is what remains.
    pub async fn seed(
        &self,
        partition: Partition,
        mapping: ValidatedMapping,
    ) -> Arc<ValidatedMapping> {
        let gate = self.gates.get_or_create(partition).await;
        let _guard = gate.lock_owned().await;

        let spec = self.catalog.spec(partition);
        let filtered: ValidatedMapping = mapping
            .iter()
            .filter(|(id, _)| {
                let known = spec.name_of(id).is_some();
                if !known {
                    warn!("Ignoring seeded parameter {} unknown to {}", id, partition);
                }
                known
            })
            .collect();
        self.cache.commit(partition, filtered)
    }

    pub fn reset(&self, partition: Partition) {
        debug!("Resetting discovery for {}", partition);
        self.cache.reset(partition);
    }

    pub fn reset_all(&self) {
        debug!("Resetting discovery for all partitions");
        self.cache.reset_all();
    }

    pub fn export_profile(&self) -> DeviceProfile {
        let mut profile = DeviceProfile::new(self.catalog.version());
        for (partition, mapping) in self.cache.snapshot() {
            profile.insert(partition, (*mapping).clone());
        }
        profile
    }

    /// Seed every partition recorded in `profile`.
    /// A profile taken from a different API version is rejected.
    pub async fn import_profile(&self, profile: &DeviceProfile) -> BsbLanResult<usize> {
        if profile.api_version != self.catalog.version() {
            return Err(BsbLanError::Config(format!(
                "profile was recorded for API {:?}, device speaks {:?}",
                profile.api_version,
                self.catalog.version()
            )));
        }

        let entries = profile.entries()?;
        let count = entries.len();
        for (partition, mapping) in entries {
            self.seed(partition, mapping).await;
        }
        info!("Imported discovery profile with {} partitions", count);
        Ok(count)
    }
}
