//! The respawn tracker: registry, scheduler, history and snapshot store wired
//! together behind one set of operations.
//!
//! ## Lifecycle
//!
//! ```ignore
//! let mut tracker = Tracker::new(&config, SnapshotStore::new(config.state_path()?))?;
//! tracker.acquire_state_lock()?;       // one writer per state file
//! let events = tracker.subscribe();
//! tracker.restore();                   // resume countdowns from the last snapshot
//! let handle = TrackerHandle::new(tracker);
//! TickDriver::new(handle.clone(), config.tick_interval()).spawn();
//! handle.mark_killed("Subora", 3, None)?;
//! ```
//!
//! Every mutating operation writes the snapshot before it returns. Through a
//! [`TrackerHandle`] the write happens after the tracker lock is released, so
//! a slow disk never stalls other callers. Snapshot failures never propagate:
//! they are logged and published as [`Event::PersistenceWarning`], and the
//! next write tries again.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::error::{ConfigError, PersistenceError, Result};
use crate::events::Event;
use crate::history::{EventLog, HistoryEntry};
use crate::scheduler::TickScheduler;
use crate::storage::{Config, PersistedSnapshot, SnapshotStore, StateLock};
use crate::timer::{
    effective_duration, format_remaining, SlotId, SlotView, TickOutcome, TimerRegistry,
};

const EVENT_CAPACITY: usize = 1024;

/// Result of reading the snapshot at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No snapshot on disk; every slot starts idle.
    ColdStart,
    /// Snapshot loaded; this many countdowns were resumed.
    Resumed(usize),
    /// Snapshot unreadable; started cold and reported a warning.
    Degraded,
}

/// Counts from one tick pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub advanced: usize,
    pub alerts: usize,
    pub expired: usize,
}

impl PassReport {
    pub fn changed(&self) -> bool {
        self.advanced > 0
    }
}

/// Snapshot taken under the tracker lock, waiting to be written.
#[derive(Debug)]
struct PendingSnapshot {
    generation: u64,
    snapshot: PersistedSnapshot,
}

/// Writes pending snapshots, newest wins.
struct SnapshotWriter {
    store: SnapshotStore,
    /// Highest generation handed to the store so far.
    latest: Mutex<u64>,
    events: broadcast::Sender<Event>,
}

impl SnapshotWriter {
    fn write(&self, pending: PendingSnapshot) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.generation <= *latest {
            tracing::trace!(generation = pending.generation, "newer snapshot already written");
            return;
        }
        *latest = pending.generation;

        if let Err(e) = self.store.save(&pending.snapshot) {
            tracing::warn!(error = %e, "failed to save timer snapshot, keeping in-memory state");
            let _ = self.events.send(Event::PersistenceWarning {
                message: e.to_string(),
                at: Utc::now(),
            });
        }
    }
}

pub struct Tracker {
    registry: TimerRegistry,
    scheduler: TickScheduler,
    history: EventLog,
    writer: Arc<SnapshotWriter>,
    generation: u64,
    state_lock: Option<StateLock>,
    default_duration_secs: u32,
    alert_threshold_secs: u32,
    events: broadcast::Sender<Event>,
}

impl Tracker {
    /// Build a tracker with every slot idle. Call [`Tracker::restore`] to
    /// resume persisted countdowns.
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate.
    pub fn new(config: &Config, store: SnapshotStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let writer = Arc::new(SnapshotWriter {
            store,
            latest: Mutex::new(0),
            events: events.clone(),
        });
        Ok(Self {
            registry: TimerRegistry::new(&config.tracker.entities, config.tracker.channel_count),
            scheduler: TickScheduler::new(),
            history: EventLog::new(),
            writer,
            generation: 0,
            state_lock: None,
            default_duration_secs: config.timer.default_duration_secs,
            alert_threshold_secs: config.timer.alert_threshold_secs,
            events,
        })
    }

    /// Build a tracker on the configured state file, claim the file and
    /// restore it.
    ///
    /// # Errors
    /// `PersistenceError::Locked` while another process (normally a running
    /// `watch`) owns the state file.
    pub fn open(config: &Config) -> Result<Self> {
        let store = SnapshotStore::new(config.state_path()?);
        let mut tracker = Self::new(config, store)?;
        tracker.acquire_state_lock()?;
        tracker.restore();
        Ok(tracker)
    }

    /// Build and restore a tracker without claiming the state file.
    ///
    /// For read-only views. Nothing stops the result from writing, so callers
    /// must not mutate it.
    pub fn open_read_only(config: &Config) -> Result<Self> {
        let store = SnapshotStore::new(config.state_path()?);
        let mut tracker = Self::new(config, store)?;
        tracker.restore();
        Ok(tracker)
    }

    /// Take the single-writer lock on the state file for the tracker's
    /// lifetime. A no-op if already held.
    ///
    /// # Errors
    /// `Locked` if another tracker holds it.
    pub fn acquire_state_lock(&mut self) -> Result<(), PersistenceError> {
        if self.state_lock.is_none() {
            self.state_lock = Some(StateLock::try_acquire(self.writer.store.path())?);
        }
        Ok(())
    }

    pub fn holds_state_lock(&self) -> bool {
        self.state_lock.is_some()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get_remaining(&self, entity: &str, channel: usize) -> Result<u32> {
        self.registry.get_remaining(entity, channel)
    }

    pub fn slot(&self, entity: &str, channel: usize) -> Result<SlotView> {
        let id = self.registry.resolve(entity, channel)?;
        Ok(self.registry.view(id))
    }

    pub fn all_slots(&self) -> Vec<SlotView> {
        self.registry.all_slots()
    }

    pub fn entities(&self) -> &[String] {
        self.registry.entities()
    }

    pub fn channel_count(&self) -> usize {
        self.registry.channel_count()
    }

    /// Number of slots currently counting down.
    pub fn active_count(&self) -> usize {
        self.scheduler.armed_count()
    }

    /// History texts, newest first.
    pub fn history(&self) -> Vec<String> {
        self.history.snapshot()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.entries().cloned().collect()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.writer.store
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::new(self.registry.remaining_by_entity())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the snapshot and resume every countdown with time left.
    pub fn restore(&mut self) -> RestoreOutcome {
        let snapshot = match self.writer.store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::info!(path = %self.writer.store.path().display(), "no timer snapshot, cold start");
                return RestoreOutcome::ColdStart;
            }
            Err(e) => {
                tracing::warn!(error = %e, "timer snapshot unusable, starting cold");
                self.emit(Event::PersistenceWarning {
                    message: e.to_string(),
                    at: Utc::now(),
                });
                return RestoreOutcome::Degraded;
            }
        };

        let mut resumed = 0;
        for (entity, remaining) in &snapshot.remaining {
            if remaining.len() != self.registry.channel_count() {
                tracing::warn!(
                    entity = %entity,
                    persisted = remaining.len(),
                    configured = self.registry.channel_count(),
                    "channel count changed since snapshot"
                );
            }
            for (channel, &secs) in remaining.iter().enumerate() {
                if secs == 0 {
                    continue;
                }
                match self.registry.resolve(entity, channel) {
                    Ok(id) => {
                        self.resume_slot(id, secs);
                        resumed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping persisted countdown");
                    }
                }
            }
        }

        tracing::info!(resumed, "timer snapshot restored");
        RestoreOutcome::Resumed(resumed)
    }

    /// Record a kill and restart the countdown for `(entity, channel)`.
    ///
    /// A positive `duration_override` replaces the configured full duration;
    /// anything else falls back to it.
    ///
    /// # Errors
    /// `UnknownEntity` or `ChannelOutOfRange` for pairs outside the
    /// configuration. Snapshot failures are reported as events, not errors.
    pub fn mark_killed(
        &mut self,
        entity: &str,
        channel: usize,
        duration_override: Option<i64>,
    ) -> Result<()> {
        let pending = self.apply_kill(entity, channel, duration_override)?;
        self.writer.write(pending);
        Ok(())
    }

    /// Advance every counting slot by one second and snapshot once.
    pub fn tick(&mut self) -> PassReport {
        let (report, pending) = self.apply_pass();
        if let Some(pending) = pending {
            self.writer.write(pending);
        }
        report
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.emit(Event::HistoryCleared { at: Utc::now() });
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_kill(
        &mut self,
        entity: &str,
        channel: usize,
        duration_override: Option<i64>,
    ) -> Result<PendingSnapshot> {
        let id = self.registry.resolve(entity, channel)?;
        let duration_secs = effective_duration(duration_override, self.default_duration_secs);

        self.registry.slot_mut(id).arm(duration_secs);
        self.scheduler.arm(id);

        self.emit(Event::SlotKilled {
            entity: entity.to_string(),
            channel,
            duration_secs,
            at: Utc::now(),
        });
        self.append_history(format!(
            "{entity} killed on channel {}, respawn in {}",
            channel + 1,
            format_remaining(duration_secs)
        ));
        Ok(self.next_snapshot())
    }

    fn apply_pass(&mut self) -> (PassReport, Option<PendingSnapshot>) {
        let outcomes = self.scheduler.pass(&mut self.registry, self.alert_threshold_secs);
        let mut report = PassReport::default();

        for (id, outcome) in outcomes {
            let (entity, channel) = self.registry.key(id);
            let entity = entity.to_string();
            let remaining_secs = self.registry.slot(id).remaining_secs();
            let at = Utc::now();
            report.advanced += 1;

            self.emit(Event::SlotTicked {
                entity: entity.clone(),
                channel,
                remaining_secs,
                at,
            });

            match outcome {
                TickOutcome::Advanced => {}
                TickOutcome::Alerted => {
                    report.alerts += 1;
                    self.emit(Event::ThresholdAlert {
                        entity: entity.clone(),
                        channel,
                        remaining_secs,
                        at,
                    });
                    self.append_history(format!(
                        "{entity} on channel {} respawns in {}",
                        channel + 1,
                        format_remaining(remaining_secs)
                    ));
                }
                TickOutcome::Expired => {
                    report.expired += 1;
                    self.emit(Event::SlotExpired {
                        entity: entity.clone(),
                        channel,
                        at,
                    });
                    self.append_history(format!(
                        "{entity} on channel {} is live again",
                        channel + 1
                    ));
                }
            }
        }

        let pending = report.changed().then(|| self.next_snapshot());
        (report, pending)
    }

    fn next_snapshot(&mut self) -> PendingSnapshot {
        self.generation += 1;
        PendingSnapshot {
            generation: self.generation,
            snapshot: self.snapshot(),
        }
    }

    fn resume_slot(&mut self, id: SlotId, remaining_secs: u32) {
        self.registry
            .slot_mut(id)
            .resume(remaining_secs, self.alert_threshold_secs);
        self.scheduler.arm(id);

        let view = self.registry.view(id);
        tracing::debug!(entity = %view.entity, channel = view.channel, remaining_secs, "countdown resumed");
        self.emit(Event::SlotResumed {
            entity: view.entity,
            channel: view.channel,
            remaining_secs,
            alerted: view.alerted,
            at: Utc::now(),
        });
    }

    fn append_history(&mut self, text: String) {
        let entry = self.history.append(text);
        self.emit(Event::HistoryAppended {
            text: entry.text,
            at: entry.at,
        });
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Cloneable, thread-safe handle to one [`Tracker`].
///
/// State changes happen under the tracker lock, so a kill is applied entirely
/// before or entirely after any tick pass. The snapshot write that follows
/// runs after the lock is released; a snapshot older than one already
/// written is dropped.
#[derive(Clone)]
pub struct TrackerHandle {
    inner: Arc<Mutex<Tracker>>,
    writer: Arc<SnapshotWriter>,
}

impl TrackerHandle {
    pub fn new(tracker: Tracker) -> Self {
        let writer = Arc::clone(&tracker.writer);
        Self {
            inner: Arc::new(Mutex::new(tracker)),
            writer,
        }
    }

    /// Lock the tracker for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, Tracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.lock().subscribe()
    }

    pub fn mark_killed(
        &self,
        entity: &str,
        channel: usize,
        duration_override: Option<i64>,
    ) -> Result<()> {
        let pending = self.lock().apply_kill(entity, channel, duration_override)?;
        self.writer.write(pending);
        Ok(())
    }

    pub fn get_remaining(&self, entity: &str, channel: usize) -> Result<u32> {
        self.lock().get_remaining(entity, channel)
    }

    pub fn all_slots(&self) -> Vec<SlotView> {
        self.lock().all_slots()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history()
    }

    pub fn clear_history(&self) {
        self.lock().clear_history()
    }

    pub fn tick(&self) -> PassReport {
        let (report, pending) = self.lock().apply_pass();
        if let Some(pending) = pending {
            self.writer.write(pending);
        }
        report
    }
}
