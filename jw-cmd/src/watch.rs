//! Long-running dashboard poll, one printed line per applied refresh.

use jw_client::MonitorClient;
use jw_sync::{DashboardSnapshot, SyncConfig, ZoneSyncHandle, DEFAULT_ZONE_ID};

/// Poll the selected zone until Ctrl-C.
///
/// Runs the same synchronization engine as the interactive dashboard and
/// prints a line whenever a refresh cycle lands. Intermediate publications
/// (loading toggles, discarded cycles) stay silent.
pub async fn run_watch(client: &MonitorClient, zone: Option<i64>) -> anyhow::Result<()> {
    // Fail fast on connectivity and on a bad --zone before the loop starts;
    // the engine itself would silently fall back to another zone.
    let zones = client.zones().await?;
    if zones.is_empty() {
        println!("No monitoring zones configured");
        return Ok(());
    }
    if let Some(id) = zone {
        if !zones.iter().any(|z| z.id == id) {
            anyhow::bail!("zone {id} is not in the monitored set");
        }
    }

    let config = SyncConfig {
        default_zone_id: zone.or(Some(DEFAULT_ZONE_ID)),
        ..SyncConfig::default()
    };
    let period = config.refresh_interval.as_secs();
    let handle = ZoneSyncHandle::spawn(client.clone(), config);
    let mut snapshots = handle.snapshots();
    handle.start();
    println!("Watching every {period}s (Ctrl-C to stop)");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_applied = 0u64;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                if snap.cycles_applied > last_applied {
                    last_applied = snap.cycles_applied;
                    println!("{}", refresh_line(&snap));
                }
            }
        }
    }

    handle.stop();
    handle.shutdown().await;
    Ok(())
}

fn refresh_line(snap: &DashboardSnapshot) -> String {
    let zone = match snap.selected_zone() {
        Some(zone) => format!("{} ({})", zone.name, zone.id),
        None => match snap.selected_zone_id() {
            Some(id) => format!("zone {id}"),
            None => "no zone".to_string(),
        },
    };
    match &snap.latest {
        Some(r) => format!(
            "{}  {}  temp {:.1}C{}  salinity {:.1}  density {:.1}/m3  ({} history points)",
            r.record_time.format("%Y-%m-%d %H:%M:%S"),
            zone,
            r.temperature,
            if r.temperature_alert() { " [WARN]" } else { "" },
            r.salinity,
            r.jellyfish_density,
            snap.history.len(),
        ),
        None => format!(
            "{zone}  no current reading  ({} history points)",
            snap.history.len()
        ),
    }
}
