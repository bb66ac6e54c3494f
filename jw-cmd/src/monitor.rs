//! Zone, realtime and history queries.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use jw_client::MonitorClient;
use jw_model::{MonitoringZone, SensorReading};

pub async fn run_zones(client: &MonitorClient) -> anyhow::Result<()> {
    let zones = client.zones().await?;
    if zones.is_empty() {
        println!("No monitoring zones configured");
        return Ok(());
    }

    println!("{:>6}  {:<24}  {:<12}  {}", "ID", "NAME", "TYPE", "LOCATION");
    for zone in &zones {
        println!(
            "{:>6}  {:<24}  {:<12}  {}",
            zone.id,
            zone.name,
            zone.zone_type,
            format_location(zone)
        );
    }
    Ok(())
}

/// Print the latest reading per zone, optionally restricted to one zone.
pub async fn run_realtime(client: &MonitorClient, zone: Option<i64>) -> anyhow::Result<()> {
    let zones = client.zones().await?;
    let names: HashMap<i64, &str> = zones.iter().map(|z| (z.id, z.name.as_str())).collect();

    let readings = client.realtime().await?;
    let mut shown = 0;
    for reading in &readings {
        if zone.is_some_and(|id| id != reading.zone_id) {
            continue;
        }
        let label = match names.get(&reading.zone_id) {
            Some(name) => format!("{} ({})", name, reading.zone_id),
            None => format!("zone {}", reading.zone_id),
        };
        println!("{}", summary_line(reading, &label));
        shown += 1;
    }

    if shown == 0 {
        match zone {
            Some(id) => println!("No reading for zone {id}"),
            None => println!("No readings available"),
        }
    }
    Ok(())
}

/// Print or export the history for one zone. The server returns readings
/// newest-first and the output keeps that order.
pub async fn run_history(
    client: &MonitorClient,
    zone: i64,
    csv: Option<&str>,
) -> anyhow::Result<()> {
    let readings = client.history(zone).await?;

    if let Some(path) = csv {
        export_csv(Path::new(path), &readings)?;
        println!("Wrote {} readings for zone {} to {}", readings.len(), zone, path);
        return Ok(());
    }

    if readings.is_empty() {
        println!("No history recorded for zone {zone}");
        return Ok(());
    }

    println!("History for zone {} ({} readings, newest first)", zone, readings.len());
    for reading in &readings {
        println!("{}", detail_line(reading));
    }
    Ok(())
}

/// Write readings to `path` as CSV with a header row, one row per reading.
pub fn export_csv(path: &Path, readings: &[SensorReading]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for reading in readings {
        writer.serialize(reading)?;
    }
    writer.flush()?;
    Ok(())
}

fn format_location(zone: &MonitoringZone) -> String {
    match zone.location() {
        Some(point) => format!("{:.4}, {:.4}", point.lat, point.lon),
        None => "-".to_string(),
    }
}

fn summary_line(reading: &SensorReading, label: &str) -> String {
    format!(
        "{}  {:<28}  temp {:>5.1}C{}  salinity {:>4.1}  density {:>4.1}/m3{}",
        reading.record_time.format("%Y-%m-%d %H:%M:%S"),
        label,
        reading.temperature,
        warn_flag(reading.temperature_alert()),
        reading.salinity,
        reading.jellyfish_density,
        high_flag(reading.density_alert()),
    )
}

fn detail_line(reading: &SensorReading) -> String {
    format!(
        "{}  temp {:>5.1}C{}  salinity {:>4.1}  current {:>4.2}m/s  chlorophyll {:>4.1}  oxygen {:>4.1}mg/L  density {:>4.1}/m3{}",
        reading.record_time.format("%Y-%m-%d %H:%M:%S"),
        reading.temperature,
        warn_flag(reading.temperature_alert()),
        reading.salinity,
        reading.current_speed,
        reading.chlorophyll,
        reading.dissolved_oxygen,
        reading.jellyfish_density,
        high_flag(reading.density_alert()),
    )
}

fn warn_flag(alert: bool) -> &'static str {
    if alert {
        " [WARN]"
    } else {
        ""
    }
}

fn high_flag(alert: bool) -> &'static str {
    if alert {
        " [HIGH]"
    } else {
        ""
    }
}
