#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bsblan::{BsbLanError, BsbLanResult, RawResponse, SetRequest, Transport};

/// In-memory stand-in for a BSB-LAN device that records every request
pub struct MockDevice {
    entries: Mutex<RawResponse>,
    info: Mutex<Value>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: AtomicUsize,
    queries: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<SetRequest>>,
    telegrams: Mutex<Vec<(String, String)>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(RawResponse::new()),
            info: Mutex::new(json!({
                "name": "BSB-LAN",
                "version": "3.1.2-20230101",
                "MAC": "00:80:41:19:69:90",
                "uptime": 1234
            })),
            delays: Mutex::new(HashMap::new()),
            failures: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            telegrams: Mutex::new(Vec::new()),
        }
    }

    pub fn with_entry(self, id: &str, entry: Value) -> Self {
        self.set_entry(id, entry);
        self
    }

    pub fn set_entry(&self, id: &str, entry: Value) {
        self.entries.lock().unwrap().insert(id.to_string(), entry);
    }

    pub fn copy_entries_from(&self, other: &MockDevice) {
        let source = other.entries.lock().unwrap().clone();
        self.entries.lock().unwrap().extend(source);
    }

    pub fn clear_entries(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn set_firmware(&self, version: &str) {
        self.info.lock().unwrap()["version"] = json!(version);
    }

    /// Delay any query whose first ID is `first_id`.
    pub fn set_delay(&self, first_id: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(first_id.to_string(), delay);
    }

    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<Vec<String>> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<Vec<String>> {
        self.queries.lock().unwrap().last().cloned()
    }

    pub fn writes(&self) -> Vec<SetRequest> {
        self.writes.lock().unwrap().clone()
    }

    pub fn telegrams(&self) -> Vec<(String, String)> {
        self.telegrams.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockDevice {
    async fn query(&self, ids: &[String]) -> BsbLanResult<RawResponse> {
        self.queries.lock().unwrap().push(ids.to_vec());

        let delay = ids
            .first()
            .and_then(|id| self.delays.lock().unwrap().get(id).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BsbLanError::Connection("connection reset by peer".into()));
        }

        let entries = self.entries.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| entries.get(id).map(|e| (id.clone(), e.clone())))
            .collect())
    }

    async fn device_info(&self) -> BsbLanResult<Value> {
        Ok(self.info.lock().unwrap().clone())
    }

    async fn set(&self, request: &SetRequest) -> BsbLanResult<Value> {
        self.writes.lock().unwrap().push(request.clone());
        let mut body = serde_json::Map::new();
        body.insert(request.parameter.clone(), json!({ "status": 1 }));
        Ok(Value::Object(body))
    }

    async fn inf_telegram(&self, parameter: &str, value: &str) -> BsbLanResult<()> {
        self.telegrams
            .lock()
            .unwrap()
            .push((parameter.to_string(), value.to_string()));
        Ok(())
    }
}

/// A raw `/JQ` entry as the firmware reports it
pub fn entry(name: &str, value: &str, unit: &str, data_type: u8) -> Value {
    json!({
        "name": name,
        "error": 0,
        "value": value,
        "desc": "",
        "dataType": data_type,
        "readonly": 0,
        "unit": unit
    })
}

pub fn enum_entry(name: &str, value: &str, desc: &str) -> Value {
    json!({
        "name": name,
        "error": 0,
        "value": value,
        "desc": desc,
        "dataType": 1,
        "readonly": 0,
        "unit": ""
    })
}

/// Device answering all five essential hot water parameters
pub fn hot_water_device() -> MockDevice {
    MockDevice::new()
        .with_entry("1600", enum_entry("Betriebsart", "1", "Ein"))
        .with_entry("1610", entry("Nennsollwert", "50.0", "&deg;C", 0))
        .with_entry("1612", entry("Reduziertsollwert", "40.0", "&deg;C", 0))
        .with_entry("8830", entry("Trinkwassertemperatur 1", "47.3", "&deg;C", 0))
        .with_entry("8820", enum_entry("Trinkwasserpumpe", "0", "Aus"))
}
