//! Parameter Discovery
//!
//! Learns, once per partition, which catalog parameters the connected device
//! actually supports, and caches that for the lifetime of the client.
//! Concurrent callers for the same partition share a single probe.

mod cache;
mod coordinator;
mod gates;
mod probe;
mod profile;

pub use cache::{DiscoveryCache, ValidatedMapping};
pub use coordinator::Discovery;
pub use gates::{Gate, GateTable};
pub use probe::ProbeExecutor;
pub use profile::DeviceProfile;
