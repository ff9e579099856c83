//! Client-local persistence of inputs and named scenarios.
//!
//! The calculator never touches storage directly. Callers hand a
//! [`KeyValueStore`] to [`save_inputs`], [`load_inputs`], or a
//! [`ScenarioBook`], and the blobs are opaque JSON strings.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::calc::params::ParamError;
use crate::calc::report::Analysis;
use crate::config::CalculatorConfig;

/// Key holding the current calculator inputs.
pub const INPUTS_KEY: &str = "carbonCalculatorInputs";

/// Key holding the saved scenario list.
pub const SCENARIOS_KEY: &str = "carbonCalculatorScenarios";

/// Maximum number of scenarios selected for side-by-side comparison.
pub const MAX_COMPARED: usize = 3;

/// Persistence or scenario-management failure.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying storage failed.
    Io(io::Error),
    /// Key contains characters the backend cannot store.
    InvalidKey(String),
    /// A stored blob could not be decoded.
    Corrupt { key: String, message: String },
    /// Scenario names must not be blank.
    EmptyName,
    /// No saved scenario has this id.
    NotFound(u64),
    /// Comparison already holds [`MAX_COMPARED`] scenarios.
    CompareLimit,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage error: {e}"),
            StoreError::InvalidKey(key) => write!(f, "invalid storage key \"{key}\""),
            StoreError::Corrupt { key, message } => {
                write!(f, "stored value for \"{key}\" is unreadable: {message}")
            }
            StoreError::EmptyName => write!(f, "please enter a name for this scenario"),
            StoreError::NotFound(id) => write!(f, "no saved scenario with id {id}"),
            StoreError::CompareLimit => {
                write!(f, "you can compare up to {MAX_COMPARED} scenarios at a time")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// String-keyed blob storage.
pub trait KeyValueStore {
    /// Returns the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedding callers.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::write(path, blob)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(key: &str, blob: &str) -> Result<T, StoreError> {
    serde_json::from_str(blob).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Persists the current inputs.
///
/// # Errors
///
/// Returns a [`StoreError`] if the backend write fails.
pub fn save_inputs(
    store: &mut impl KeyValueStore,
    config: &CalculatorConfig,
) -> Result<(), StoreError> {
    let blob = encode(INPUTS_KEY, config)?;
    store.set(INPUTS_KEY, &blob)
}

/// Reads previously saved inputs; `Ok(None)` when nothing was saved.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] if the saved blob does not decode.
pub fn load_inputs(store: &impl KeyValueStore) -> Result<Option<CalculatorConfig>, StoreError> {
    store
        .get(INPUTS_KEY)?
        .map(|blob| decode(INPUTS_KEY, &blob))
        .transpose()
}

/// Restores saved inputs, falling back to the baseline when absent or unreadable.
pub fn restore_inputs_or_default(store: &impl KeyValueStore) -> CalculatorConfig {
    match load_inputs(store) {
        Ok(Some(config)) => config,
        Ok(None) => CalculatorConfig::baseline(),
        Err(e) => {
            warn!("ignoring saved inputs: {e}");
            CalculatorConfig::baseline()
        }
    }
}

/// Clears saved inputs and returns the defaults.
///
/// # Errors
///
/// Returns a [`StoreError`] if the backend delete fails.
pub fn reset_inputs(store: &mut impl KeyValueStore) -> Result<CalculatorConfig, StoreError> {
    store.remove(INPUTS_KEY)?;
    Ok(CalculatorConfig::baseline())
}

/// A named snapshot of calculator inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u64,
    pub name: String,
    pub inputs: CalculatorConfig,
}

impl Scenario {
    /// Recomputes the results for this scenario's inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if the stored inputs are invalid.
    pub fn analysis(&self) -> Result<Analysis, ParamError> {
        Analysis::run(&self.inputs)
    }
}

/// Saved scenarios plus the subset selected for comparison.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBook {
    scenarios: Vec<Scenario>,
    compared: Vec<u64>,
    next_id: u64,
}

impl ScenarioBook {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Saved scenarios in insertion order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Saves a deep copy of `inputs` under `name` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] for a blank name.
    pub fn save(&mut self, name: &str, inputs: &CalculatorConfig) -> Result<u64, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.scenarios.push(Scenario {
            id,
            name: name.to_string(),
            inputs: inputs.clone(),
        });
        debug!("saved scenario {id} \"{name}\"");
        Ok(id)
    }

    /// Returns a copy of the inputs saved under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no scenario has this id.
    pub fn load(&self, id: u64) -> Result<CalculatorConfig, StoreError> {
        self.get(id)
            .map(|s| s.inputs.clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Looks up a scenario by id.
    pub fn get(&self, id: u64) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Deletes a scenario and drops it from the comparison.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no scenario has this id.
    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let before = self.scenarios.len();
        self.scenarios.retain(|s| s.id != id);
        if self.scenarios.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.compared.retain(|c| *c != id);
        Ok(())
    }

    /// Adds or removes a scenario from the comparison; returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::CompareLimit`] when adding beyond [`MAX_COMPARED`].
    pub fn toggle_compare(&mut self, id: u64) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        if let Some(pos) = self.compared.iter().position(|c| *c == id) {
            self.compared.remove(pos);
            return Ok(false);
        }
        if self.compared.len() >= MAX_COMPARED {
            return Err(StoreError::CompareLimit);
        }
        self.compared.push(id);
        Ok(true)
    }

    /// Scenarios currently selected for comparison, in selection order.
    pub fn compared(&self) -> Vec<&Scenario> {
        self.compared.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// Writes the scenario list to `store`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend write fails.
    pub fn persist(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        let blob = encode(SCENARIOS_KEY, &self.scenarios)?;
        store.set(SCENARIOS_KEY, &blob)
    }

    /// Reads the scenario list from `store`; an empty book when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the saved list does not decode.
    pub fn restore(store: &impl KeyValueStore) -> Result<Self, StoreError> {
        let Some(blob) = store.get(SCENARIOS_KEY)? else {
            return Ok(Self::new());
        };
        let scenarios: Vec<Scenario> = decode(SCENARIOS_KEY, &blob)?;
        let next_id = scenarios.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Ok(Self {
            scenarios,
            compared: Vec::new(),
            next_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "carbon-incentives-{}-{name}",
            std::process::id()
        ))
    }

    #[test]
    fn inputs_round_trip_through_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(load_inputs(&store).ok().flatten(), None);

        let cfg = CalculatorConfig::high_rates();
        save_inputs(&mut store, &cfg).unwrap();
        assert_eq!(load_inputs(&store).unwrap(), Some(cfg));
    }

    #[test]
    fn corrupt_inputs_fall_back_to_baseline() {
        let mut store = MemoryStore::new();
        store.set(INPUTS_KEY, "{not json").unwrap();
        assert!(matches!(
            load_inputs(&store),
            Err(StoreError::Corrupt { .. })
        ));
        assert_eq!(
            restore_inputs_or_default(&store),
            CalculatorConfig::baseline()
        );
    }

    #[test]
    fn reset_clears_saved_inputs() {
        let mut store = MemoryStore::new();
        save_inputs(&mut store, &CalculatorConfig::cold_climate()).unwrap();
        let cfg = reset_inputs(&mut store).unwrap();
        assert_eq!(cfg, CalculatorConfig::baseline());
        assert_eq!(store.get(INPUTS_KEY).unwrap(), None);
    }

    #[test]
    fn save_rejects_blank_name() {
        let mut book = ScenarioBook::new();
        let err = book.save("   ", &CalculatorConfig::baseline());
        assert!(matches!(err, Err(StoreError::EmptyName)));
        assert!(book.scenarios().is_empty());
    }

    #[test]
    fn saved_scenario_is_a_copy() {
        let mut book = ScenarioBook::new();
        let mut cfg = CalculatorConfig::baseline();
        let id = book.save("base", &cfg).unwrap();
        cfg.space_heating.gas_rate = 5.0;
        assert_eq!(book.load(id).unwrap().space_heating.gas_rate, 1.5);
    }

    #[test]
    fn compare_allows_at_most_three() {
        let mut book = ScenarioBook::new();
        let ids: Vec<u64> = (0..4)
            .map(|i| book.save(&format!("s{i}"), &CalculatorConfig::baseline()).unwrap())
            .collect();
        for id in &ids[..3] {
            assert!(book.toggle_compare(*id).unwrap());
        }
        assert!(matches!(
            book.toggle_compare(ids[3]),
            Err(StoreError::CompareLimit)
        ));
        assert!(!book.toggle_compare(ids[0]).unwrap());
        assert!(book.toggle_compare(ids[3]).unwrap());
        let names: Vec<&str> = book.compared().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["s1", "s2", "s3"]);
    }

    #[test]
    fn delete_removes_from_comparison() {
        let mut book = ScenarioBook::new();
        let id = book.save("a", &CalculatorConfig::baseline()).unwrap();
        book.toggle_compare(id).unwrap();
        book.delete(id).unwrap();
        assert!(book.compared().is_empty());
        assert!(matches!(book.delete(id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn book_persists_and_restores() {
        let mut store = MemoryStore::new();
        let mut book = ScenarioBook::new();
        book.save("base", &CalculatorConfig::baseline()).unwrap();
        book.save("cold", &CalculatorConfig::cold_climate()).unwrap();
        book.persist(&mut store).unwrap();

        let mut restored = ScenarioBook::restore(&store).unwrap();
        assert_eq!(restored.scenarios(), book.scenarios());
        let next = restored.save("third", &CalculatorConfig::baseline()).unwrap();
        assert_eq!(next, 3);
        assert!(restored.scenarios()[1].analysis().is_ok());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_dir("file-store");
        let mut store = FileStore::open(&dir).unwrap();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("alpha", "{\"a\":1}").unwrap();
        assert_eq!(store.get("alpha").unwrap().as_deref(), Some("{\"a\":1}"));
        store.remove("alpha").unwrap();
        store.remove("alpha").unwrap();
        assert_eq!(store.get("alpha").unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_rejects_path_keys() {
        let dir = temp_dir("bad-key");
        let mut store = FileStore::open(&dir).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
