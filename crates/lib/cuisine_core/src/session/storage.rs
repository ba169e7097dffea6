//! Bearer-token persistence for the session controller.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::SessionError;

/// Where the client keeps its bearer token between runs.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut slot = self
            .token
            .lock()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self
            .token
            .lock()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Token kept in a file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the platform data directory.
    ///
    /// Platform paths:
    /// - macOS: `~/Library/Application Support/cuisine/token`
    /// - Linux: `~/.local/share/cuisine/token`
    /// - Windows: `%APPDATA%\cuisine\token`
    pub fn default_location() -> Self {
        Self::new(default_token_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Path to the persisted session token.
pub fn default_token_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cuisine")
        .join("token")
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        write_private(&self.path, token).map_err(|e| SessionError::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

/// Write `contents` readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
