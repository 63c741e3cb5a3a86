//! A single JSON file holding one entity collection

use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::models::{Host, User};

/// A record stored in a [`JsonCollection`]
pub trait Entity: Serialize + DeserializeOwned + Send {
    /// Field name of the array in the document, also used in messages
    const COLLECTION: &'static str;
    /// File name inside the data directory
    const FILE_NAME: &'static str;

    /// Unique identifier
    fn id(&self) -> &str;

    /// Key the collection is sorted by when written; compared case-insensitively
    fn sort_key(&self) -> &str;
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const FILE_NAME: &'static str = "users.json";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> &str {
        &self.username
    }
}

impl Entity for Host {
    const COLLECTION: &'static str = "hosts";
    const FILE_NAME: &'static str = "hosts.json";

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> &str {
        &self.name
    }
}

/// All records of one entity type, persisted as `{ "<collection>": [...] }`
///
/// Every load-modify-save cycle runs under the collection's mutex. Writes go
/// to a temporary file in the same directory which then replaces the target,
/// so readers never observe a partially written document.
pub struct JsonCollection<T: Entity> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> std::fmt::Debug for JsonCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCollection")
            .field("collection", &T::COLLECTION)
            .field("path", &self.path)
            .finish()
    }
}

/// Exclusive access to a collection file, obtained from [`JsonCollection::lock`]
pub struct CollectionGuard<'a, T: Entity> {
    collection: &'a JsonCollection<T>,
    _guard: MutexGuard<'a, ()>,
}

impl<T: Entity> CollectionGuard<'_, T> {
    /// Reads the collection
    ///
    /// # Errors
    ///
    /// See [`JsonCollection::load_all`].
    pub fn load(&self) -> StoreResult<Vec<T>> {
        self.collection.read_file()
    }

    /// Writes the collection
    ///
    /// # Errors
    ///
    /// See [`JsonCollection::save_all`].
    pub fn save(&self, items: &mut Vec<T>) -> StoreResult<()> {
        self.collection.write_file(items)
    }
}

impl<T: Entity> JsonCollection<T> {
    /// Creates a collection stored as `T::FILE_NAME` inside `dir`
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(T::FILE_NAME),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes the collection's mutex
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if a previous holder panicked.
    pub fn lock(&self) -> StoreResult<CollectionGuard<'_, T>> {
        let guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Poisoned(T::COLLECTION))?;
        Ok(CollectionGuard {
            collection: self,
            _guard: guard,
        })
    }

    /// Loads every record
    ///
    /// A missing file, an empty file or a document without the collection
    /// field yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the file cannot be read and
    /// `StoreError::Corrupt` if it is not a valid collection document. The
    /// file is never modified on error.
    pub fn load_all(&self) -> StoreResult<Vec<T>> {
        self.lock()?.load()
    }

    /// Replaces the whole collection
    ///
    /// Records are written sorted case-insensitively by their sort key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialize` or `StoreError::Write` on failure; the
    /// previous file is left in place.
    pub fn save_all(&self, items: &[T]) -> StoreResult<()>
    where
        T: Clone,
    {
        let mut items = items.to_vec();
        self.lock()?.save(&mut items)
    }

    /// Runs a load-modify-save cycle under the mutex
    ///
    /// An error from `f` aborts the cycle before anything is written.
    ///
    /// # Errors
    ///
    /// Returns the closure's error or any store error, converted into `E`.
    pub fn update<R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let guard = self.lock()?;
        let mut items = guard.load()?;
        let result = f(&mut items)?;
        guard.save(&mut items)?;
        Ok(result)
    }

    /// Loads the collection under the mutex and passes it to `f`
    ///
    /// # Errors
    ///
    /// See [`JsonCollection::load_all`].
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> StoreResult<R> {
        let items = self.load_all()?;
        Ok(f(&items))
    }

    fn read_file(&self) -> StoreResult<Vec<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(collection = T::COLLECTION, "No store file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let corrupt = |e: serde_json::Error| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        };
        let mut document: serde_json::Value = serde_json::from_str(&content).map_err(corrupt)?;
        let Some(object) = document.as_object_mut() else {
            return Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: "top-level value is not an object".to_string(),
            });
        };

        match object.remove(T::COLLECTION) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items).map_err(corrupt),
        }
    }

    fn write_file(&self, items: &mut Vec<T>) -> StoreResult<()> {
        items.sort_by_cached_key(|item| item.sort_key().to_lowercase());

        let serialize_error = |e: serde_json::Error| StoreError::Serialize {
            collection: T::COLLECTION,
            reason: e.to_string(),
        };
        let mut document = serde_json::Map::new();
        document.insert(
            T::COLLECTION.to_string(),
            serde_json::to_value(&*items).map_err(serialize_error)?,
        );
        let mut content = serde_json::to_string_pretty(&document).map_err(serialize_error)?;
        content.push('\n');

        let write_error = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_error)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
        temp.write_all(content.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        tracing::debug!(
            collection = T::COLLECTION,
            count = items.len(),
            "Collection saved"
        );
        Ok(())
    }
}
