//! # Bosswatch Core Library
//!
//! This library provides the core logic for Bosswatch, a respawn tracker for
//! a fixed set of bosses running on several parallel channels. Every
//! (boss, channel) pair has its own countdown; the CLI is a thin presentation
//! layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: per-slot countdown state machine and the registry owning all
//!   slots
//! - **Scheduler**: one pass per second over every counting slot, plus the async
//!   driver that runs it
//! - **Storage**: TOML configuration and the atomic JSON snapshot of remaining
//!   times that survives restarts, guarded by a single-writer lock
//! - **History**: transient, newest-first log of kills, alerts and respawns
//!
//! ## Key Components
//!
//! - [`Tracker`]: Engine facade; owns registry, scheduler, history and store
//! - [`TrackerHandle`]: Shared handle used by the tick driver and the UI
//! - [`TickDriver`]: Periodic tick loop
//! - [`SnapshotStore`]: Snapshot persistence
//! - [`StateLock`]: Exclusive claim on the state file for the owning process
//! - [`Config`]: Tracker configuration management

pub mod error;
pub mod events;
pub mod history;
pub mod scheduler;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use error::{ConfigError, CoreError, PersistenceError};
pub use events::Event;
pub use history::{EventLog, HistoryEntry};
pub use scheduler::{TickDriver, TickScheduler};
pub use storage::{Config, PersistedSnapshot, SnapshotStore, StateLock};
pub use timer::{
    format_remaining, parse_duration_override, SlotState, SlotView, TimerRegistry, TimerSlot,
};
pub use tracker::{PassReport, RestoreOutcome, Tracker, TrackerHandle};
