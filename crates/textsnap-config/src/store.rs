use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::Config;

const DEFAULT_CONFIG_FILE: &str = "config.json";

/// File-backed settings store.
///
/// `load` and `update` each do a full read-modify-write of the JSON file.
/// The internal mutex serialises them within one process; separate processes
/// writing the same file are not coordinated.
pub struct ConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, thiserror::Error)]
enum ReadError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("top level is not an object")]
    NotAnObject,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `TEXTSNAP_CONFIG`, or `config.json` in the working directory.
    pub fn from_env() -> Self {
        let path = env::var("TEXTSNAP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, backfilling every missing or mistyped key from the
    /// defaults. The merged document is written back only when something had
    /// to be filled in. A corrupt file is left alone and defaults are returned.
    pub fn load(&self) -> Config {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (mut root, mut modified) = match self.read_document() {
            Ok(Some(root)) => (root, false),
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "Config file not found, creating it from defaults");
                (Map::new(), true)
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    "An error occurred while loading the configuration file ({e}). Using default settings"
                );
                return Config::default();
            }
        };

        let defaults = default_document();
        modified |= backfill(&mut root, &defaults);

        let config = Config {
            preferences: section(&mut root, &defaults, "preferences", &mut modified),
            ocr: section(&mut root, &defaults, "ocr", &mut modified),
            preprocess: section(&mut root, &defaults, "preprocess", &mut modified),
            output: section(&mut root, &defaults, "output", &mut modified),
            translate: section(&mut root, &defaults, "translate", &mut modified),
            ocr_window: section(&mut root, &defaults, "ocr_window", &mut modified),
            miscellaneous: section(&mut root, &defaults, "miscellaneous", &mut modified),
        };

        if modified {
            if let Err(e) = self.write_document(&root) {
                tracing::error!(path = %self.path.display(), "Failed to persist merged configuration: {e}");
            }
        } else {
            tracing::debug!("All keys were found in the configuration file");
        }

        config
    }

    /// Merge `partial` into the stored document, one section at a time.
    ///
    /// Keys of a section present in both are replaced, new sections are added,
    /// everything else is kept. Errors are logged and swallowed.
    pub fn update(&self, partial: Value) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Value::Object(partial) = partial else {
            tracing::warn!("Ignoring configuration update that is not an object");
            return;
        };

        let mut root = match self.read_document() {
            Ok(Some(root)) => root,
            Ok(None) => default_document(),
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    "An error occurred while updating the configuration file: {e}"
                );
                return;
            }
        };

        for (name, values) in partial {
            match (root.get_mut(&name), values) {
                (Some(Value::Object(existing)), Value::Object(values)) => existing.extend(values),
                (_, values) => {
                    root.insert(name, values);
                }
            }
        }

        match self.write_document(&root) {
            Ok(()) => tracing::info!("Configuration file successfully updated"),
            Err(e) => tracing::error!(path = %self.path.display(), "Failed to write configuration: {e}"),
        }
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, ReadError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&data)? {
            Value::Object(root) => Ok(Some(root)),
            _ => Err(ReadError::NotAnObject),
        }
    }

    fn write_document(&self, root: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(root)?;
        fs::write(&self.path, content)
    }
}

fn default_document() -> Map<String, Value> {
    match serde_json::to_value(Config::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Fill absent sections/keys and replace values whose JSON kind differs from
/// the default. Unknown keys are left in place.
fn backfill(root: &mut Map<String, Value>, defaults: &Map<String, Value>) -> bool {
    let mut modified = false;

    for (name, default_section) in defaults {
        let Value::Object(default_keys) = default_section else {
            continue;
        };

        match root.get_mut(name) {
            Some(Value::Object(stored)) => {
                for (key, default_value) in default_keys {
                    match stored.get(key) {
                        None => {
                            tracing::warn!("Missing key: [{name}][{key}]");
                            stored.insert(key.clone(), default_value.clone());
                            modified = true;
                        }
                        Some(value) if !same_kind(value, default_value) => {
                            tracing::warn!("Key [{name}][{key}] has the wrong type, using default");
                            stored.insert(key.clone(), default_value.clone());
                            modified = true;
                        }
                        Some(_) => {}
                    }
                }
            }
            _ => {
                tracing::warn!("Missing section: [{name}]");
                root.insert(name.clone(), default_section.clone());
                modified = true;
            }
        }
    }

    modified
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Deserialize one section, resetting offending keys to their defaults when
/// the stored values are well-kinded but still invalid (e.g. an unknown mode
/// name or an out-of-range number).
fn section<T>(
    root: &mut Map<String, Value>,
    defaults: &Map<String, Value>,
    name: &str,
    modified: &mut bool,
) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    let (Some(Value::Object(stored)), Some(Value::Object(default_keys))) =
        (root.get_mut(name), defaults.get(name))
    else {
        return T::default();
    };

    if let Ok(value) = serde_json::from_value::<T>(Value::Object(stored.clone())) {
        return value;
    }

    // Try resetting a single key first so valid user values survive
    for (key, default_value) in default_keys {
        let mut candidate = stored.clone();
        candidate.insert(key.clone(), default_value.clone());
        if let Ok(value) = serde_json::from_value::<T>(Value::Object(candidate)) {
            tracing::warn!("Key [{name}][{key}] is invalid, using default");
            stored.insert(key.clone(), default_value.clone());
            *modified = true;
            return value;
        }
    }

    tracing::warn!("Section [{name}] is invalid, using defaults");
    for (key, default_value) in default_keys {
        stored.insert(key.clone(), default_value.clone());
    }
    *modified = true;
    serde_json::from_value::<T>(Value::Object(stored.clone())).unwrap_or_default()
}
