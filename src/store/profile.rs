//! Profile store: cookie and local-storage maps, optionally backed by a file.
//!
//! DESIGN
//! ======
//! Writes never fail from the caller's side, matching browser cookie and
//! `localStorage` semantics. When a backing file is configured, every
//! mutation rewrites it while the lock is held so the file reflects writes in
//! order; a failed rewrite is logged and the in-memory value stays current.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::StoreError;
use super::cookies::CookieStore;
use super::local::LocalStorage;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProfileData {
    #[serde(default)]
    cookies: BTreeMap<String, String>,
    #[serde(default)]
    local: BTreeMap<String, String>,
}

/// Cookie jar plus local storage for one client profile.
#[derive(Debug, Default)]
pub struct ProfileStore {
    data: Mutex<ProfileData>,
    path: Option<PathBuf>,
}

impl ProfileStore {
    /// A profile that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed profile. A missing file starts empty and is created
    /// on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => ProfileData::default(),
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { path: path.clone(), source })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProfileData::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { data: Mutex::new(data), path: Some(path) })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, ProfileData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut ProfileData)) {
        let mut data = self.lock();
        f(&mut data);
        if let Some(path) = &self.path {
            if let Err(e) = persist(path, &data) {
                tracing::warn!(error = %e, "profile write failed");
            }
        }
    }
}

fn persist(path: &Path, data: &ProfileData) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let raw = serde_json::to_string_pretty(data)
        .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })?;
    let tmp = path.with_extension("tmp");
    write_private(&tmp, raw.as_bytes()).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

/// Write `bytes` to `path` with owner-only permissions on unix.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

impl CookieStore for ProfileStore {
    fn get(&self, name: &str) -> Option<String> {
        self.lock().cookies.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.mutate(|data| {
            data.cookies.insert(name.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, name: &str) {
        if self.lock().cookies.contains_key(name) {
            self.mutate(|data| {
                data.cookies.remove(name);
            });
        }
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.lock().cookies.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl LocalStorage for ProfileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().local.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.mutate(|data| {
            data.local.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove_item(&self, key: &str) {
        if self.lock().local.contains_key(key) {
            self.mutate(|data| {
                data.local.remove(key);
            });
        }
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
