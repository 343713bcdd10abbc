use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::Partition;

/// Per-partition discovery gate
pub type Gate = Arc<Mutex<()>>;

/// Hands out exactly one gate per partition for the lifetime of the table.
///
/// The table-wide lock only covers insert-if-absent; probes run under the
/// per-partition gate it returns.
#[derive(Default)]
pub struct GateTable {
    gates: Mutex<HashMap<Partition, Gate>>,
}

impl GateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, partition: Partition) -> Gate {
        let mut gates = self.gates.lock().await;
        gates.entry(partition).or_default().clone()
    }

    pub async fn len(&self) -> usize {
        self.gates.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.gates.lock().await.is_empty()
    }
}
