//! BSB-LAN Probe
//!
//! Connects to the device named by `BSBLAN_HOST`, discovers every section
//! and prints the supported parameters with their current values.
//!
//! Usage: `bsblan_probe [profile.json]`. When a profile path is given it is
//! imported first (if present) and rewritten with the discovery results.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bsblan::{BsbLan, BsbLanConfig, BsbLanError, Circuit, DeviceProfile, EntityInfo, Partition};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bsblan=info")),
        )
        .with_target(true)
        .init();

    let profile_path = std::env::args().nth(1).map(PathBuf::from);

    let config = BsbLanConfig::from_env()?;
    let client = BsbLan::new(config)?;

    let device = client.device().await?;
    println!("\n{}", "═".repeat(60));
    println!("{} {} ({})", device.name, device.version, device.mac);
    println!("{}", "═".repeat(60));

    match client.time().await {
        Ok(time) => println!("Device time: {}", time.time.value),
        Err(e) => warn!("Device time unavailable: {}", e),
    }

    client.initialize().await?;
    println!("API version: {:?}", client.api_version().await?);

    if let Some(path) = &profile_path {
        if path.exists() {
            let profile = DeviceProfile::load(path).await?;
            let count = client.import_profile(&profile).await?;
            info!("Warm-started {} sections from {}", count, path.display());
        }
    }

    let discovery = client.discovery().await?;
    for partition in Partition::ALL {
        match discovery.ensure_validated(partition).await {
            Ok(mapping) => {
                let total = discovery.catalog().spec(partition).len();
                println!("\n[{}] {}/{} parameters", partition, mapping.len(), total);
                let ids: Vec<&str> = mapping.iter().map(|(id, _)| id).collect();
                let values = client.read_parameters(&ids).await?;
                for (id, name) in mapping.iter() {
                    match values.get(id) {
                        Some(entity) => {
                            println!("  {:>5} {:<36} {} {}", id, name, entity.value, entity.unit)
                        }
                        None => println!("  {:>5} {:<36} -", id, name),
                    }
                }
            }
            Err(BsbLanError::NoParametersAvailable { .. }) => {
                println!("\n[{}] not available on this device", partition);
            }
            Err(e) => warn!("Discovery failed for {}: {}", partition, e),
        }
    }

    let circuits = client.get_available_circuits().await?;
    println!("\nHeating circuits: {:?}", circuits);
    match client.static_values(Circuit::One, None).await {
        Ok(range) => {
            let show = |e: Option<EntityInfo>| e.map_or("-".to_string(), |e| e.value.to_string());
            println!(
                "Comfort range: {} to {} {}",
                show(range.min_temp),
                show(range.max_temp),
                client.temperature_unit().await
            );
        }
        Err(e) => warn!("Temperature range unavailable: {}", e),
    }

    if let Some(path) = profile_path {
        client.export_profile().await?.save(&path).await?;
        info!("Saved discovery profile to {}", path.display());
    }

    Ok(())
}
