//! Persistence port and the flat-file JSON store behind it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::models::{Account, Listing};

/// File name of the listings resource inside the data directory.
pub const LISTINGS_FILE: &str = "listings.json";
/// File name of the accounts resource inside the data directory.
pub const ACCOUNTS_FILE: &str = "accounts.json";

/// Failure talking to a backing store.
///
/// An absent resource is not an error: the load methods report it as
/// `Ok(None)` so the catalog can fall back to seed data. Everything
/// else, including content that no longer parses, surfaces here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying read or write failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Resource that was being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The resource exists but its content does not parse.
    #[error("failed to parse {path}: {source}")]
    Malformed {
        /// Resource that failed to parse.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Abstract persistence port for the two catalog resources.
///
/// `Ok(None)` from a load means the resource does not exist yet; the
/// catalog treats that as a recoverable first-run condition. Saves
/// replace the whole resource, not incrementally.
pub trait CatalogStore {
    /// Load every persisted listing, or `None` if the resource is absent.
    fn load_listings(&self) -> Result<Option<Vec<Listing>>, StoreError>;
    /// Load every persisted account, or `None` if the resource is absent.
    fn load_accounts(&self) -> Result<Option<Vec<Account>>, StoreError>;
    /// Replace the listings resource with the given sequence.
    fn save_listings(&self, listings: &[Listing]) -> Result<(), StoreError>;
    /// Replace the accounts resource with the given sequence.
    fn save_accounts(&self, accounts: &[Account]) -> Result<(), StoreError>;
}

/// Flat-file store keeping each resource as pretty-printed JSON under
/// a single data directory. Writes are full rewrites and not atomic.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the listings resource.
    pub fn listings_path(&self) -> PathBuf {
        self.root.join(LISTINGS_FILE)
    }

    /// Path of the accounts resource.
    pub fn accounts_path(&self) -> PathBuf {
        self.root.join(ACCOUNTS_FILE)
    }

    fn read<T>(&self, path: &Path) -> Result<Option<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };
        let parsed = serde_json::from_str(&content).map_err(|err| StoreError::Malformed {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(Some(parsed))
    }

    fn write<T>(&self, path: &Path, value: &T) -> Result<(), StoreError>
    where
        T: serde::Serialize,
    {
        fs::create_dir_all(&self.root).map_err(|err| StoreError::Io {
            path: self.root.clone(),
            source: err,
        })?;
        let serialised = serde_json::to_vec_pretty(value).map_err(|err| StoreError::Malformed {
            path: path.to_path_buf(),
            source: err,
        })?;
        fs::write(path, serialised).map_err(|err| StoreError::Io {
            path: path.to_path_buf(),
            source: err,
        })
    }
}

impl CatalogStore for JsonFileStore {
    fn load_listings(&self) -> Result<Option<Vec<Listing>>, StoreError> {
        self.read(&self.listings_path())
    }

    fn load_accounts(&self) -> Result<Option<Vec<Account>>, StoreError> {
        self.read(&self.accounts_path())
    }

    fn save_listings(&self, listings: &[Listing]) -> Result<(), StoreError> {
        self.write(&self.listings_path(), &listings)
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<(), StoreError> {
        self.write(&self.accounts_path(), &accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_resources_load_as_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_listings().unwrap().is_none());
        assert!(store.load_accounts().unwrap().is_none());
    }

    #[test]
    fn listings_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let listings = vec![
            Listing::new("Studio", 1, 25_000.0, 12, false),
            Listing::new("Loft", 2, 48_000.0, 7, true),
        ];

        store.save_listings(&listings).unwrap();
        let loaded = store.load_listings().unwrap().unwrap();
        assert_eq!(loaded, listings);
    }

    #[test]
    fn save_creates_missing_data_directory() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("data"));
        store.save_listings(&[]).unwrap();
        assert!(store.listings_path().exists());
    }

    #[test]
    fn malformed_content_is_not_treated_as_absent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.listings_path(), b"{ this is not json").unwrap();

        match store.load_listings() {
            Err(StoreError::Malformed { path, .. }) => {
                assert_eq!(path, store.listings_path());
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
