use std::sync::Arc;
use tracing::{info, warn};

use super::ValidatedMapping;
use crate::catalog::PartitionSpec;
use crate::error::BsbLanResult;
use crate::models::{DecodeFailure, EntityInfo};
use crate::transport::{RawResponse, Transport};

/// Issues the one batched discovery query for a partition
pub struct ProbeExecutor {
    transport: Arc<dyn Transport>,
}

impl ProbeExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Query every candidate of `spec` and keep the ones the device answered for.
    /// Fails only when the request itself fails.
    pub async fn probe(&self, spec: &PartitionSpec) -> BsbLanResult<ValidatedMapping> {
        let response = self.transport.query(&spec.candidate_ids()).await?;
        Ok(Self::select_supported(spec, &response))
    }

    fn select_supported(spec: &PartitionSpec, response: &RawResponse) -> ValidatedMapping {
        let partition = spec.partition;

        spec.candidates()
            .iter()
            .filter(|(id, name)| match response.get(*id) {
                None => {
                    info!("Parameter {} ({}) not found on device for {}", id, name, partition);
                    false
                }
                Some(raw) => match EntityInfo::from_raw(raw) {
                    Ok(_) => true,
                    Err(DecodeFailure::Unsupported) => {
                        info!("Parameter {} ({}) not supported for {}", id, name, partition);
                        false
                    }
                    Err(DecodeFailure::Malformed(reason)) => {
                        warn!(
                            "Skipping malformed entry {} ({}) for {}: {}",
                            id, name, partition, reason
                        );
                        false
                    }
                },
            })
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ApiVersion, Catalog, Partition};
    use serde_json::json;

    fn response(value: serde_json::Value) -> RawResponse {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_select_supported_filters_and_keeps_order() {
        let catalog = Catalog::for_version(ApiVersion::V3);
        let spec = catalog.spec(Partition::HotWaterEssential);

        let raw = response(json!({
            "8820": {"name": "Pumpe", "value": "0", "unit": "", "desc": "Aus", "dataType": 1},
            "1600": {"name": "Betriebsart", "value": "1", "unit": "", "desc": "Ein", "dataType": 1},
            "1610": {"name": "Nennsollwert", "value": "---", "unit": "&deg;C", "dataType": 0},
            "1612": "garbage"
        }));

        let mapping = ProbeExecutor::select_supported(spec, &raw);
        let pairs: Vec<_> = mapping.iter().collect();
        assert_eq!(pairs, vec![("1600", "operating_mode"), ("8820", "state_dhw_pump")]);
    }

    #[test]
    fn test_select_supported_empty_response() {
        let catalog = Catalog::for_version(ApiVersion::V1);
        let spec = catalog.spec(Partition::Sensor);
        assert!(ProbeExecutor::select_supported(spec, &RawResponse::new()).is_empty());
    }
}
