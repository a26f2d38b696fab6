//! # Persisted Token
//!
//! The one piece of console state that survives a restart.
//!
//! ```text
//! ┌──────────────┐  save(token)   ┌────────────────────────────────────────┐
//! │  Session     │ ─────────────► │ <data dir>/session.token               │
//! │  transitions │  clear()       │   written to session.token.tmp, then   │
//! │  (effects)   │ ─────────────► │   renamed over the old file            │
//! └──────────────┘  load()        └────────────────────────────────────────┘
//! ```
//!
//! At most one token is stored; saving replaces the previous one. On unix
//! the file is created with mode 0600.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Fixed file name of the persisted token.
pub const TOKEN_FILE_NAME: &str = "session.token";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;

    /// True when a non-empty token is stored. Read failures count as absent.
    fn is_present(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

// =============================================================================
// File Store
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    /// Store under the platform data directory.
    pub fn in_default_location() -> ClientResult<Self> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| ClientError::Storage("no data directory available".into()))
    }

    /// Explicit path if given, otherwise the platform data directory.
    pub fn from_config(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(p) => Ok(Self::new(p)),
            None => Self::in_default_location(),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bakery", "console")
            .map(|dirs| dirs.data_dir().join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TOKEN_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Writes `contents` to a fresh file only the owner can read (0600 on unix).
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        write_private(&temp, token)?;
        std::fs::rename(&temp, &self.path)?;
        debug!(path = ?self.path, "Session token persisted");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "Session token removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryTokenStore {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> ClientResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| ClientError::Storage("token store lock poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.slot()?.clone().filter(|t| !t.trim().is_empty()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join(TOKEN_FILE_NAME));

        assert_eq!(store.load().unwrap(), None);
        assert!(!store.is_present());

        store.save("tok-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));

        store.save("tok-2").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-2"));
        assert!(!store.temp_path().exists());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join(TOKEN_FILE_NAME));

        // a leftover temp file with loose permissions is replaced, not reused
        std::fs::write(store.temp_path(), "stale").unwrap();
        std::fs::set_permissions(store.temp_path(), std::fs::Permissions::from_mode(0o644))
            .unwrap();

        store.save("tok-1").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_blank_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("abc");
        assert!(store.is_present());
        store.clear().unwrap();
        assert!(!store.is_present());
        store.save("def").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def"));
    }
}
