use arc_swap::ArcSwapOption;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::Partition;

/// Candidates of one partition confirmed present on the device, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedMapping {
    entries: IndexMap<String, String>,
}

impl ValidatedMapping {
    pub fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id.as_str())
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, String> {
        self.entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValidatedMapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Per-partition discovery state, one slot per `Partition::ALL` entry.
/// A slot is `None` until validated.
pub struct DiscoveryCache {
    slots: Vec<ArcSwapOption<ValidatedMapping>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self {
            slots: Partition::ALL.iter().map(|_| ArcSwapOption::empty()).collect(),
        }
    }

    fn slot(&self, partition: Partition) -> &ArcSwapOption<ValidatedMapping> {
        &self.slots[partition.index()]
    }

    pub fn is_validated(&self, partition: Partition) -> bool {
        self.slot(partition).load().is_some()
    }

    pub fn read(&self, partition: Partition) -> Option<Arc<ValidatedMapping>> {
        self.slot(partition).load_full()
    }

    /// Only the gate holder for `partition` may call this during discovery.
    pub fn commit(&self, partition: Partition, mapping: ValidatedMapping) -> Arc<ValidatedMapping> {
        let mapping = Arc::new(mapping);
        self.slot(partition).store(Some(mapping.clone()));
        mapping
    }

    pub fn reset(&self, partition: Partition) {
        self.slot(partition).store(None);
    }

    pub fn reset_all(&self) {
        for slot in &self.slots {
            slot.store(None);
        }
    }

    /// Validated partitions with their mappings, in catalog order.
    pub fn snapshot(&self) -> Vec<(Partition, Arc<ValidatedMapping>)> {
        Partition::ALL
            .iter()
            .zip(&self.slots)
            .filter_map(|(p, slot)| slot.load_full().map(|m| (*p, m)))
            .collect()
    }
}

impl Default for DiscoveryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_then_read() {
        let cache = DiscoveryCache::new();
        assert!(!cache.is_validated(Partition::HotWaterConfig));
        assert!(cache.read(Partition::HotWaterConfig).is_none());

        let mapping: ValidatedMapping = [("1601", "eco_mode_selection")].into_iter().collect();
        cache.commit(Partition::HotWaterConfig, mapping.clone());

        assert!(cache.is_validated(Partition::HotWaterConfig));
        assert_eq!(*cache.read(Partition::HotWaterConfig).unwrap(), mapping);
        assert!(!cache.is_validated(Partition::HotWaterEssential));
    }

    #[test]
    fn test_reset_clears_mapping() {
        let cache = DiscoveryCache::new();
        cache.commit(Partition::Sensor, [("8700", "outside_temperature")].into_iter().collect());
        cache.commit(Partition::Device, [("6224", "device_identification")].into_iter().collect());

        cache.reset(Partition::Sensor);
        assert!(!cache.is_validated(Partition::Sensor));
        assert!(cache.is_validated(Partition::Device));

        cache.reset_all();
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn test_mapping_preserves_order() {
        let mapping: ValidatedMapping = [("8830", "b"), ("1600", "a")].into_iter().collect();
        assert_eq!(mapping.ids(), vec!["8830".to_string(), "1600".to_string()]);
        assert_eq!(mapping.id_of("a"), Some("1600"));
    }
}
