#![forbid(unsafe_code)]

//! Document persistence.
//!
//! Two layers:
//!
//! - [`StorageBackend`] moves a [`Document`] to and from somewhere and
//!   reports typed [`StorageError`]s. [`FileStorage`] writes pretty JSON
//!   atomically; [`MemoryStorage`] keeps the JSON in memory and can be told
//!   to fail.
//! - [`PersistenceGateway`] applies the recovery policy on top: a load that
//!   fails for any reason yields the default document, and a save that fails
//!   is logged and reported as `false`. Nothing here surfaces to the user.
//!
//! # File format
//!
//! ```json
//! {
//!   "items": [
//!     { "id": 1, "text": "milk", "completed": false, "created_at": "2025-01-01T09:00:00" }
//!   ],
//!   "window": { "x": 100, "y": 100, "width": 320, "height": 450 },
//!   "settings": { "mode": "topmost", "visibility_mode": "always_visible", ... }
//! }
//! ```
//!
//! Missing keys at any level are filled from defaults on load.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use notepin_core::{Document, ItemId};

/// File name used when no data path is configured.
pub const DEFAULT_FILE_NAME: &str = "notes_data.json";

/// `notes_data.json` next to the running executable, or in the current
/// directory when the executable path is unknown.
#[must_use]
pub fn default_data_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FILE_NAME)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure at the storage seam.
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure at `path`.
    Io { path: PathBuf, source: io::Error },
    /// Stored data is not a valid document, or could not be encoded.
    Json(serde_json::Error),
    /// The backend refused the request.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Where documents live.
pub trait StorageBackend {
    /// Read the stored document. `Ok(None)` means nothing is stored yet.
    fn read(&self) -> StorageResult<Option<Document>>;

    /// Replace the stored document.
    fn write(&self, document: &Document) -> StorageResult<()>;

    /// Short label for log lines.
    fn describe(&self) -> String;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn read(&self) -> StorageResult<Option<Document>> {
        (**self).read()
    }

    fn write(&self, document: &Document) -> StorageResult<()> {
        (**self).write(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

fn encode(document: &Document) -> StorageResult<String> {
    let mut json = serde_json::to_string_pretty(document)?;
    json.push('\n');
    Ok(json)
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at [`default_data_path`].
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(default_data_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StorageBackend for FileStorage {
    fn read(&self) -> StorageResult<Option<Document>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Self::io_error(&self.path, source)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write(&self, document: &Document) -> StorageResult<()> {
        let json = encode(document)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Self::io_error(parent, source))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json.as_bytes()).map_err(|source| Self::io_error(&tmp, source))?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_error(&self.path, source));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory JSON slot. Clones share the slot and the failure switches.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with raw JSON, valid or not.
    #[must_use]
    pub fn with_json(raw: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut slot) = storage.slot.lock() {
            *slot = Some(raw.into());
        }
        storage
    }

    /// Storage pre-filled with `document`.
    pub fn with_document(document: &Document) -> StorageResult<Self> {
        Ok(Self::with_json(encode(document)?))
    }

    /// Stored JSON, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Stored document, if any and if it parses.
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.raw().and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self) -> StorageResult<Option<Document>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, document: &Document) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let json = encode(document)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("slot poisoned".into()))?;
        *slot = Some(json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read from the backend.
    Stored,
    /// Nothing stored yet; defaults.
    Missing,
    /// The backend failed; defaults.
    Recovered,
}

/// A loaded document plus what happened on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: Document,
    pub source: LoadSource,
    /// Repeated ids that were dropped, one entry per dropped item.
    pub dropped_duplicates: Vec<ItemId>,
}

/// Recovery policy over a [`StorageBackend`].
#[derive(Debug)]
pub struct PersistenceGateway<B> {
    backend: B,
}

impl<B: StorageBackend> PersistenceGateway<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Load the document, falling back to defaults on any failure.
    #[must_use]
    pub fn load(&self) -> Document {
        self.load_report().document
    }

    /// [`load`](Self::load) with details about the outcome.
    #[must_use]
    pub fn load_report(&self) -> Loaded {
        self.try_load_report().unwrap_or_else(|error| {
            tracing::warn!(
                target: "notepin.storage",
                location = %self.backend.describe(),
                error = %error,
                "failed to load document; starting empty"
            );
            Loaded {
                document: Document::default(),
                source: LoadSource::Recovered,
                dropped_duplicates: Vec::new(),
            }
        })
    }

    /// Load without recovery: a backend failure is returned to the caller,
    /// so stored data that could not be read is never replaced by defaults.
    pub fn try_load_report(&self) -> StorageResult<Loaded> {
        let location = self.backend.describe();
        let Some(mut document) = self.backend.read()? else {
            tracing::info!(
                target: "notepin.storage",
                location = %location,
                "no stored document; starting empty"
            );
            return Ok(Loaded {
                document: Document::default(),
                source: LoadSource::Missing,
                dropped_duplicates: Vec::new(),
            });
        };

        let dropped_duplicates = document.dedupe_ids();
        if !dropped_duplicates.is_empty() {
            tracing::warn!(
                target: "notepin.storage",
                location = %location,
                dropped = dropped_duplicates.len(),
                "duplicate item ids in stored data; kept first occurrence"
            );
        }
        document.settings.clamp_opacities();
        tracing::info!(
            target: "notepin.storage",
            location = %location,
            items = document.len(),
            "document loaded"
        );
        Ok(Loaded {
            document,
            source: LoadSource::Stored,
            dropped_duplicates,
        })
    }

    /// Persist `document`. Failures are logged and reported as `false`.
    pub fn save(&self, document: &Document) -> bool {
        match self.backend.write(document) {
            Ok(()) => {
                tracing::debug!(
                    target: "notepin.storage",
                    items = document.len(),
                    "document saved"
                );
                true
            }
            Err(error) => {
                tracing::warn!(
                    target: "notepin.storage",
                    location = %self.backend.describe(),
                    error = %error,
                    "failed to save document"
                );
                false
            }
        }
    }
}
