//! The refresh loop driver.
//!
//! One driver task owns all mutable state. Commands arrive over an mpsc
//! channel, refresh cycles run as spawned subtasks reporting back over a
//! second channel, and every state change is published as a whole
//! [`DashboardSnapshot`] on a watch channel.
//!
//! A generation counter stamps each cycle. Switching zones and deactivating
//! both bump the generation, so a cycle that resolves late can be recognized
//! as superseded and discarded instead of clobbering newer state.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use jw_model::SensorReading;

use crate::snapshot::{choose_zone, DashboardSnapshot, SyncPhase};
use crate::source::MonitorSource;

/// Zone preferred on first load when present in the fetched list.
pub const DEFAULT_ZONE_ID: i64 = 102;

/// Period between refresh cycles.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub default_zone_id: Option<i64>,
    pub refresh_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            default_zone_id: Some(DEFAULT_ZONE_ID),
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

enum Command {
    Start,
    Stop,
    SwitchZone(i64),
}

struct CycleOutcome {
    generation: u64,
    zone_id: i64,
    result: anyhow::Result<(Vec<SensorReading>, Vec<SensorReading>)>,
}

/// Handle to a running synchronization driver.
///
/// Commands are fire-and-forget; their effects surface through the snapshot
/// channel. Dropping the handle shuts the driver down.
pub struct ZoneSyncHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<DashboardSnapshot>,
    driver: JoinHandle<()>,
}

impl ZoneSyncHandle {
    /// Spawn the driver task. Must be called from within a tokio runtime.
    pub fn spawn<S: MonitorSource>(source: S, config: SyncConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(DashboardSnapshot::default());
        let driver = Driver {
            source: Arc::new(source),
            config,
            state: DashboardSnapshot::default(),
            generation: 0,
            commands: command_rx,
            outcomes: outcome_rx,
            outcome_tx,
            snapshots: snapshot_tx,
        };
        ZoneSyncHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            driver: tokio::spawn(driver.run()),
        }
    }

    /// Activate: fetch the zone list once, pick the initial zone, start
    /// polling with an immediate first cycle.
    pub fn start(&self) {
        let _ = self.commands.send(Command::Start);
    }

    /// Deactivate: stop the timer, discard in-flight cycles, reset state.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Stop);
    }

    /// Re-target polling at another zone: cancels the pending tick, runs one
    /// immediate cycle for the new zone, then re-arms the interval.
    pub fn switch_zone(&self, zone_id: i64) {
        let _ = self.commands.send(Command::SwitchZone(zone_id));
    }

    /// Subscribe to state publications.
    pub fn snapshots(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Tear down the driver task and wait for it to exit.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.driver.await;
    }
}

struct Driver<S> {
    source: Arc<S>,
    config: SyncConfig,
    state: DashboardSnapshot,
    generation: u64,
    commands: mpsc::UnboundedReceiver<Command>,
    outcomes: mpsc::UnboundedReceiver<CycleOutcome>,
    outcome_tx: mpsc::UnboundedSender<CycleOutcome>,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl<S: MonitorSource> Driver<S> {
    async fn run(mut self) {
        let mut interval = tokio::time::interval(self.config.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let running = matches!(self.state.phase, SyncPhase::Running { .. });
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Start) => self.activate(&mut interval).await,
                    Some(Command::Stop) => self.deactivate(),
                    Some(Command::SwitchZone(id)) => self.switch_zone(id, &mut interval),
                    None => break,
                },
                Some(outcome) = self.outcomes.recv() => self.apply(outcome),
                _ = interval.tick(), if running => self.launch_cycle(),
            }
        }
    }

    /// Fetch the zone list exactly once and derive the initial selection. An
    /// empty list is a valid "no data yet" state, not a fault.
    async fn activate(&mut self, interval: &mut Interval) {
        if matches!(self.state.phase, SyncPhase::Running { .. }) {
            debug!("start ignored; already polling");
            return;
        }
        let zones = match self.source.fetch_zones().await {
            Ok(zones) => zones,
            Err(e) => {
                warn!("zone list fetch failed: {e:#}");
                return;
            }
        };
        self.state.zones = zones;
        match choose_zone(&self.state.zones, self.config.default_zone_id) {
            Some(zone_id) => {
                info!(
                    "monitoring zone {zone_id}, refreshing every {:?}",
                    self.config.refresh_interval
                );
                self.state.phase = SyncPhase::Running { zone_id };
                interval.reset();
                self.launch_cycle();
            }
            None => {
                info!("zone list is empty, staying idle");
                self.publish();
            }
        }
    }

    fn deactivate(&mut self) {
        if matches!(self.state.phase, SyncPhase::Idle) {
            return;
        }
        debug!("sync deactivated");
        self.generation += 1;
        self.state = DashboardSnapshot::default();
        self.publish();
    }

    fn switch_zone(&mut self, zone_id: i64, interval: &mut Interval) {
        match self.state.phase {
            SyncPhase::Idle => debug!("switch to zone {zone_id} ignored while idle"),
            SyncPhase::Running { zone_id: current } if current == zone_id => {
                debug!("already polling zone {zone_id}");
            }
            SyncPhase::Running { .. } => {
                self.generation += 1;
                self.state.phase = SyncPhase::Running { zone_id };
                interval.reset();
                self.launch_cycle();
            }
        }
    }

    /// Issue one concurrent realtime+history fetch for the selected zone.
    fn launch_cycle(&mut self) {
        let SyncPhase::Running { zone_id } = self.state.phase else {
            return;
        };
        self.state.loading = true;
        self.publish();
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = tokio::try_join!(source.fetch_realtime(), source.fetch_history(zone_id));
            let _ = outcome_tx.send(CycleOutcome {
                generation,
                zone_id,
                result,
            });
        });
    }

    /// Fold a finished cycle into state. Both fetches must have succeeded for
    /// the cycle to apply; a failed cycle only clears the loading flag,
    /// leaving previously displayed data untouched.
    fn apply(&mut self, outcome: CycleOutcome) {
        if outcome.generation != self.generation {
            debug!("discarding superseded refresh cycle for zone {}", outcome.zone_id);
            return;
        }
        self.state.loading = false;
        match outcome.result {
            Ok((realtime, history)) => {
                self.state.latest = realtime.into_iter().find(|r| r.zone_id == outcome.zone_id);
                self.state.history = history;
                self.state.cycles_applied += 1;
            }
            Err(e) => warn!("refresh cycle for zone {} failed: {e:#}", outcome.zone_id),
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use jw_model::MonitoringZone;
    use tokio::time::{advance, Instant};

    fn zone(id: i64, name: &str) -> MonitoringZone {
        MonitoringZone {
            id,
            name: name.to_string(),
            zone_type: "coastal".to_string(),
            geometry: None,
        }
    }

    fn reading(zone_id: i64, temperature: f64) -> SensorReading {
        SensorReading {
            id: None,
            zone_id,
            record_time: NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            temperature,
            salinity: 31.0,
            current_speed: 0.4,
            chlorophyll: 2.1,
            dissolved_oxygen: 7.5,
            jellyfish_density: 3.0,
        }
    }

    /// In-memory source with call counters, switchable failure injection, and
    /// an optional artificial fetch delay for in-flight scenarios.
    #[derive(Default)]
    struct FakeSource {
        zones: Vec<MonitoringZone>,
        realtime: Mutex<Vec<SensorReading>>,
        fail: AtomicBool,
        delay: Mutex<Option<Duration>>,
        zone_fetches: AtomicUsize,
        realtime_fetches: AtomicUsize,
        history_fetches: Mutex<Vec<i64>>,
    }

    impl FakeSource {
        fn with_zones(zones: Vec<MonitoringZone>) -> Arc<Self> {
            Arc::new(FakeSource {
                zones,
                ..Default::default()
            })
        }

        fn set_realtime(&self, readings: Vec<SensorReading>) {
            *self.realtime.lock().unwrap() = readings;
        }

        fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn set_delay(&self, delay: Option<Duration>) {
            *self.delay.lock().unwrap() = delay;
        }

        fn history_requests(&self) -> Vec<i64> {
            self.history_fetches.lock().unwrap().clone()
        }

        async fn pause(&self) {
            let delay = *self.delay.lock().unwrap();
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
        }

        fn checked(&self) -> anyhow::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("injected fetch failure");
            }
            Ok(())
        }
    }

    impl MonitorSource for FakeSource {
        async fn fetch_zones(&self) -> anyhow::Result<Vec<MonitoringZone>> {
            self.zone_fetches.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.checked()?;
            Ok(self.zones.clone())
        }

        async fn fetch_realtime(&self) -> anyhow::Result<Vec<SensorReading>> {
            self.realtime_fetches.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.checked()?;
            Ok(self.realtime.lock().unwrap().clone())
        }

        async fn fetch_history(&self, zone_id: i64) -> anyhow::Result<Vec<SensorReading>> {
            self.history_fetches.lock().unwrap().push(zone_id);
            self.pause().await;
            self.checked()?;
            Ok(vec![reading(zone_id, 20.0), reading(zone_id, 19.5)])
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<DashboardSnapshot>,
        what: &str,
        pred: impl Fn(&DashboardSnapshot) -> bool,
    ) -> DashboardSnapshot {
        loop {
            {
                let snap = rx.borrow_and_update();
                if pred(&snap) {
                    return snap.clone();
                }
            }
            rx.changed()
                .await
                .unwrap_or_else(|_| panic!("driver exited while waiting for {what}"));
        }
    }

    /// Let spawned cycle tasks and the driver drain their ready work.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_selects_default_zone_when_present() {
        let source = FakeSource::with_zones(vec![
            zone(7, "North buoy"),
            zone(102, "Qingdao offshore"),
        ]);
        source.set_realtime(vec![reading(7, 21.0), reading(102, 22.5)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        let snap = wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;

        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 102 });
        assert_eq!(snap.latest.as_ref().map(|r| r.zone_id), Some(102));
        assert_eq!(snap.zones.len(), 2);
        assert!(!snap.loading);
        assert_eq!(source.history_requests(), vec![102]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_falls_back_to_first_zone() {
        let source = FakeSource::with_zones(vec![zone(7, "North buoy"), zone(9, "South buoy")]);
        source.set_realtime(vec![reading(7, 21.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        let snap = wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;

        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 7 });
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn empty_zone_list_stays_idle_without_polling() {
        let source = FakeSource::with_zones(vec![]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DashboardSnapshot::default());

        advance(Duration::from_secs(35)).await;
        settle().await;
        assert_eq!(source.zone_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(source.realtime_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(handle.snapshot().phase, SyncPhase::Idle);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_does_not_refetch_zones() {
        let source = FakeSource::with_zones(vec![zone(5, "Bay mouth")]);
        source.set_realtime(vec![reading(5, 21.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;
        handle.start();
        settle().await;

        assert_eq!(source.zone_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(handle.snapshot().phase, SyncPhase::Running { zone_id: 5 });
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zone_fetch_failure_leaves_engine_idle() {
        let source = FakeSource::with_zones(vec![zone(5, "Bay mouth")]);
        source.set_realtime(vec![reading(5, 21.0)]);
        source.set_fail(true);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        settle().await;
        assert_eq!(handle.snapshot().phase, SyncPhase::Idle);
        assert_eq!(source.zone_fetches.load(Ordering::SeqCst), 1);

        source.set_fail(false);
        handle.start();
        let snap = wait_for(&mut rx, "recovery after failed activation", |s| {
            s.cycles_applied == 1
        })
        .await;
        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 5 });
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_reading_reconciles_to_selected_zone() {
        let source = FakeSource::with_zones(vec![zone(5, "Bay mouth"), zone(8, "Outer shoal")]);
        source.set_realtime(vec![reading(8, 24.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        let snap = wait_for(&mut rx, "cycle without matching reading", |s| {
            s.cycles_applied == 1
        })
        .await;
        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 5 });
        assert_eq!(snap.latest, None, "no reading for the selected zone means unknown");
        assert!(!snap.temperature_alert());

        source.set_realtime(vec![reading(5, 26.0), reading(8, 24.0)]);
        let snap = wait_for(&mut rx, "cycle with matching reading", |s| {
            s.cycles_applied == 2
        })
        .await;
        assert_eq!(snap.latest.as_ref().map(|r| r.zone_id), Some(5));
        assert!(snap.temperature_alert(), "26.0 is above the warning threshold");

        source.set_realtime(vec![reading(8, 24.0)]);
        let snap = wait_for(&mut rx, "reading disappearing again", |s| {
            s.cycles_applied == 3
        })
        .await;
        assert_eq!(snap.latest, None, "a vanished reading clears the display");
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_preserves_previous_data() {
        let source = FakeSource::with_zones(vec![zone(5, "Bay mouth")]);
        source.set_realtime(vec![reading(5, 24.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        let good = wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;
        assert!(good.latest.is_some());

        source.set_fail(true);
        source.set_delay(Some(Duration::from_secs(1)));
        wait_for(&mut rx, "failing cycle start", |s| s.loading).await;
        let snap = wait_for(&mut rx, "failing cycle folded", |s| !s.loading).await;

        assert_eq!(snap.cycles_applied, 1, "a failed cycle must not count as applied");
        assert_eq!(snap.latest, good.latest);
        assert_eq!(snap.history, good.history);

        source.set_fail(false);
        source.set_delay(None);
        let snap = wait_for(&mut rx, "recovery cycle", |s| s.cycles_applied == 2).await;
        assert_eq!(snap.latest.as_ref().map(|r| r.zone_id), Some(5));
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switch_runs_immediately_and_keeps_a_single_timer() {
        let source = FakeSource::with_zones(vec![zone(1, "Bay mouth"), zone(2, "Outer shoal")]);
        source.set_realtime(vec![reading(1, 20.0), reading(2, 28.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;
        assert_eq!(source.history_requests(), vec![1]);

        advance(Duration::from_secs(3)).await;
        let switched_at = Instant::now();
        handle.switch_zone(2);
        let snap = wait_for(&mut rx, "immediate cycle after switch", |s| {
            s.cycles_applied == 2
        })
        .await;
        assert_eq!(Instant::now(), switched_at, "the switch cycle must not wait for the timer");
        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 2 });
        assert_eq!(snap.latest.as_ref().map(|r| r.zone_id), Some(2));
        assert!(snap.temperature_alert());
        assert_eq!(source.history_requests(), vec![1, 2]);

        // The old schedule would have fired 10 s after start; the re-armed
        // timer fires 10 s after the switch instead, and only once.
        wait_for(&mut rx, "first timed cycle after switch", |s| s.cycles_applied == 3).await;
        assert_eq!(Instant::now().duration_since(switched_at), Duration::from_secs(10));
        assert_eq!(source.history_requests(), vec![1, 2, 2]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switch_while_cycle_in_flight_discards_stale_result() {
        let source = FakeSource::with_zones(vec![zone(1, "Bay mouth"), zone(2, "Outer shoal")]);
        source.set_realtime(vec![reading(1, 20.0), reading(2, 22.0)]);
        source.set_delay(Some(Duration::from_secs(2)));
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        let snap = wait_for(&mut rx, "first cycle in flight", |s| s.loading).await;
        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 1 });

        handle.switch_zone(2);
        let snap = wait_for(&mut rx, "switch cycle applied", |s| s.cycles_applied == 1).await;

        assert_eq!(snap.phase, SyncPhase::Running { zone_id: 2 });
        assert_eq!(snap.latest.as_ref().map(|r| r.zone_id), Some(2));
        assert_eq!(
            snap.history.first().map(|r| r.zone_id),
            Some(2),
            "history must come from the new zone, not the superseded cycle"
        );
        assert_eq!(source.history_requests(), vec![1, 2]);

        settle().await;
        assert_eq!(
            handle.snapshot().cycles_applied,
            1,
            "the superseded cycle must never apply"
        );
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_cycle() {
        let source = FakeSource::with_zones(vec![zone(1, "Bay mouth")]);
        source.set_realtime(vec![reading(1, 20.0)]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());
        let mut rx = handle.snapshots();

        handle.start();
        wait_for(&mut rx, "first applied cycle", |s| s.cycles_applied == 1).await;

        source.set_delay(Some(Duration::from_secs(5)));
        wait_for(&mut rx, "second cycle in flight", |s| s.loading).await;
        let fetches_at_stop = source.realtime_fetches.load(Ordering::SeqCst);

        handle.stop();
        let snap = wait_for(&mut rx, "idle after stop", |s| s.phase == SyncPhase::Idle).await;
        assert_eq!(snap, DashboardSnapshot::default());

        // Let the in-flight cycle resolve and verify it changes nothing.
        advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(handle.snapshot(), DashboardSnapshot::default());
        assert_eq!(source.realtime_fetches.load(Ordering::SeqCst), fetches_at_stop);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switch_while_idle_is_ignored() {
        let source = FakeSource::with_zones(vec![]);
        let handle = ZoneSyncHandle::spawn(Arc::clone(&source), SyncConfig::default());

        handle.switch_zone(2);
        settle().await;
        assert_eq!(handle.snapshot().phase, SyncPhase::Idle);
        assert!(source.history_requests().is_empty());
        handle.shutdown().await;
    }
}
