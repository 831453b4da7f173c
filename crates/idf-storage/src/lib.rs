use anyhow::{Context, Result};
use idf_api_types::TransportKind;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key the browser front-end uses for the reconnect hint.
pub const RECONNECT_HINT_KEY: &str = "connectedWallet";

/// Remembers which transport kind was last used so a later start can try a
/// silent reconnect.
pub trait HintStore {
    fn load_hint(&self) -> Result<Option<TransportKind>>;
    fn save_hint(&self, kind: TransportKind) -> Result<()>;
    fn clear_hint(&self) -> Result<()>;
}

#[derive(Default)]
pub struct NoopHintStore;

impl HintStore for NoopHintStore {
    fn load_hint(&self) -> Result<Option<TransportKind>> {
        Ok(None)
    }

    fn save_hint(&self, _kind: TransportKind) -> Result<()> {
        Ok(())
    }

    fn clear_hint(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryHintStore {
    hint: RefCell<Option<TransportKind>>,
}

impl InMemoryHintStore {
    pub fn with_hint(kind: TransportKind) -> Self {
        Self {
            hint: RefCell::new(Some(kind)),
        }
    }
}

impl HintStore for InMemoryHintStore {
    fn load_hint(&self) -> Result<Option<TransportKind>> {
        Ok(*self.hint.borrow())
    }

    fn save_hint(&self, kind: TransportKind) -> Result<()> {
        *self.hint.borrow_mut() = Some(kind);
        Ok(())
    }

    fn clear_hint(&self) -> Result<()> {
        self.hint.borrow_mut().take();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintRecord {
    pub transport: String,
    pub saved_at_epoch_ms: u128,
}

/// JSON file holding a single [`HintRecord`]. Used by native hosts that have
/// no browser storage.
pub struct FileHintStore {
    path: PathBuf,
}

impl FileHintStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HintStore for FileHintStore {
    fn load_hint(&self) -> Result<Option<TransportKind>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&self.path)
            .with_context(|| format!("failed to read hint file: {}", self.path.display()))?;
        let record: HintRecord = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse hint file: {}", self.path.display()))?;
        Ok(TransportKind::parse(&record.transport))
    }

    fn save_hint(&self, kind: TransportKind) -> Result<()> {
        let record = HintRecord {
            transport: kind.as_str().to_owned(),
            saved_at_epoch_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
        };
        let value = serde_json::to_vec(&record)?;
        fs::write(&self.path, value)
            .with_context(|| format!("failed to write hint file: {}", self.path.display()))?;
        Ok(())
    }

    fn clear_hint(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove hint file: {}", self.path.display()))?;
        }
        Ok(())
    }
}
