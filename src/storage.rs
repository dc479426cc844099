use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};
use tracing::warn;

/// String key/value persistence. Implementations never surface failures:
/// they log and degrade to a miss or a no-op.
pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str);
  fn remove(&self, key: &str);
  fn clear(&self);
}

pub trait JsonStoreExt: KeyValueStore {
  fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.get(key)?;
    if raw.trim().is_empty() {
      return None;
    }
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(err) => {
        warn!(key, error = %err, "Stored value is not valid JSON");
        None
      }
    }
  }

  fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
    match serde_json::to_string(value) {
      Ok(raw) => self.set(key, &raw),
      Err(err) => warn!(key, error = %err, "Value could not be serialized for storage"),
    }
  }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}

#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) {
    self.entries.lock().insert(key.to_string(), value.to_string());
  }

  fn remove(&self, key: &str) {
    self.entries.lock().remove(key);
  }

  fn clear(&self) {
    self.entries.lock().clear();
  }
}

/// A JSON object on disk, rewritten on every mutation. A mutation whose write
/// fails is dropped so memory never runs ahead of the file.
pub struct FileStore {
  path: PathBuf,
  entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let entries = load_entries(&path);
    Self {
      path,
      entries: Mutex::new(entries),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  // Synchronous write under the lock: the file is a handful of keys, and
  // mutations land on disk in the order they are applied.
  fn mutate(&self, f: impl FnOnce(&mut HashMap<String, String>)) {
    let mut guard = self.entries.lock();
    let mut next = guard.clone();
    f(&mut next);
    if persist_entries(&self.path, &next) {
      *guard = next;
    }
  }
}

fn load_entries(path: &Path) -> HashMap<String, String> {
  let data = match std::fs::read(path) {
    Ok(data) => data,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
    Err(err) => {
      warn!(path = %path.display(), error = %err, "Failed to read storage file");
      return HashMap::new();
    }
  };
  match serde_json::from_slice(&data) {
    Ok(entries) => entries,
    Err(err) => {
      warn!(path = %path.display(), error = %err, "Storage file is corrupt; starting empty");
      HashMap::new()
    }
  }
}

fn persist_entries(path: &Path, entries: &HashMap<String, String>) -> bool {
  let data = match serde_json::to_vec_pretty(entries) {
    Ok(data) => data,
    Err(err) => {
      warn!(error = %err, "Failed to encode storage entries");
      return false;
    }
  };
  match std::fs::write(path, data) {
    Ok(()) => true,
    Err(err) => {
      warn!(path = %path.display(), error = %err, "Failed to write storage file");
      false
    }
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) {
    self.mutate(|entries| {
      entries.insert(key.to_string(), value.to_string());
    });
  }

  fn remove(&self, key: &str) {
    self.mutate(|entries| {
      entries.remove(key);
    });
  }

  fn clear(&self) {
    self.mutate(HashMap::clear);
  }
}
