#![forbid(unsafe_code)]

//! notepin runtime services.
//!
//! # Key Components
//!
//! - [`HistoryStore`] - bounded undo/redo over document snapshots
//! - [`Scheduler`] - cancellable delayed tasks on an injectable [`Clock`]
//! - [`PersistenceGateway`] - load/save with fallback over a [`StorageBackend`]
//! - [`RuntimeConfig`] - TOML configuration
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Role in notepin
//! The board in the `notepin` crate owns one of each of these. None of them
//! knows about views or rows.

pub mod config;
pub mod logging;
pub mod scheduler;
pub mod storage;
pub mod undo;

pub use config::{ConfigError, RuntimeConfig};
pub use logging::{LogFormat, init_logging};
pub use scheduler::{Clock, ManualClock, MonotonicClock, Scheduler, TaskId};
pub use storage::{
    FileStorage, LoadSource, Loaded, MemoryStorage, PersistenceGateway, StorageBackend,
    StorageError, StorageResult, default_data_path,
};
pub use undo::{HistoryConfig, HistoryStore, MAX_HISTORY_SIZE};
