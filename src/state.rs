//! Persistent counters shared between export runs.
//!
//! Banks require a handful of values to keep increasing from one file to the
//! next: the file id modifier, cash letter ids and item sequence numbers. They
//! live in a [`StateStore`] under keys scoped by the destination, and are
//! accessed through a per-run [`Counters`] session that only writes them back
//! once the file has been encoded.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value storage for counters.
pub trait StateStore {
    /// Read a value; `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Write several values as one update. Either all of them are stored or,
    /// on error, none are.
    fn set_many(&mut self, entries: &BTreeMap<String, String>) -> Result<()>;
}

/// In-memory store, used by tests and one-off exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored values.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&mut self, entries: &BTreeMap<String, String>) -> Result<()> {
        self.values.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// Every update writes the whole object to a sibling temporary file and
/// renames it over the store, so the file always holds a complete update.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::StateStore(format!("{} is not a valid state file: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `values`, and keep them only once they are on disk.
    fn persist(&mut self, values: BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(&values)?;
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, content)
            .and_then(|_| fs::rename(&temp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp);
                Error::StateStore(format!("cannot write {}: {}", self.path.display(), e))
            })?;

        self.values = values;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value.to_string());
        self.persist(values)
    }

    fn set_many(&mut self, entries: &BTreeMap<String, String>) -> Result<()> {
        let mut values = self.values.clone();
        values.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.persist(values)
    }
}

/// Counter names, appended to the destination key.
pub const LAST_FILE_MODIFIER: &str = "LastFileModifier";
pub const NEXT_CASH_LETTER_ID: &str = "NextCashLetterId";
pub const LAST_ITEM_SEQUENCE_NUMBER: &str = "LastItemSequenceNumber";

/// Counter session for one export run.
///
/// Values read through the session see the session's own staged updates.
/// Nothing reaches the store until [`Counters::commit`].
pub struct Counters<'a> {
    store: &'a mut dyn StateStore,
    prefix: String,
    staged: BTreeMap<String, String>,
}

impl<'a> Counters<'a> {
    /// Open a session whose keys are prefixed by `destination_key`.
    pub fn new(store: &'a mut dyn StateStore, destination_key: impl Into<String>) -> Self {
        Self {
            store,
            prefix: destination_key.into(),
            staged: BTreeMap::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    /// Current value of a counter, including staged updates.
    pub fn read(&self, name: &str) -> Result<Option<String>> {
        let key = self.key(name);
        match self.staged.get(&key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.store.get(&key),
        }
    }

    /// Stage a new value for a counter.
    pub fn stage(&mut self, name: &str, value: impl Into<String>) {
        let key = self.key(name);
        self.staged.insert(key, value.into());
    }

    fn read_number(&self, name: &str) -> Result<Option<u64>> {
        match self.read(name)? {
            Some(value) => value.trim().parse::<u64>().map(Some).map_err(|_| {
                Error::StateStore(format!("{} holds '{}', expected a number", self.key(name), value))
            }),
            None => Ok(None),
        }
    }

    /// Take the value of a "next value" counter and stage its successor.
    pub fn take_next(&mut self, name: &str, initial: u64) -> Result<u64> {
        let value = self.read_number(name)?.unwrap_or(initial);
        self.stage(name, (value + 1).to_string());
        Ok(value)
    }

    /// Advance a "last value" counter and return the new value.
    pub fn advance_last(&mut self, name: &str) -> Result<u64> {
        let value = self.read_number(name)?.unwrap_or(0) + 1;
        self.stage(name, value.to_string());
        Ok(value)
    }

    /// File id modifier for a file between two routing numbers on a date.
    ///
    /// The first file of a day gets `A`; each further file with the same
    /// routing numbers on the same day gets the next letter, wrapping from
    /// `Z` back to `A`.
    pub fn next_file_id_modifier(
        &mut self,
        destination: &str,
        origin: &str,
        date: NaiveDate,
    ) -> Result<char> {
        let hash = file_hash(destination, origin, date);

        let letter = match self.read(LAST_FILE_MODIFIER)? {
            Some(stored) => match stored.split_once('|') {
                Some((stored_hash, letter)) if stored_hash == hash => {
                    next_letter(letter.chars().next().unwrap_or('Z'))
                }
                _ => 'A',
            },
            None => 'A',
        };

        self.stage(LAST_FILE_MODIFIER, format!("{}|{}", hash, letter));
        Ok(letter)
    }

    /// Next cash letter id, starting at `initial`.
    pub fn next_cash_letter_id(&mut self, initial: u64) -> Result<u64> {
        self.take_next(NEXT_CASH_LETTER_ID, initial)
    }

    /// Next item sequence number, starting at 1.
    pub fn next_item_sequence_number(&mut self) -> Result<u64> {
        self.advance_last(LAST_ITEM_SEQUENCE_NUMBER)
    }

    /// Write every staged update to the store in one update.
    pub fn commit(self) -> Result<()> {
        let Counters { store, staged, .. } = self;
        if staged.is_empty() {
            return Ok(());
        }
        for (key, value) in &staged {
            debug!("Committing counter {} = {}", key, value);
        }
        store.set_many(&staged)
    }
}

fn file_hash(destination: &str, origin: &str, date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(destination.as_bytes());
    hasher.update(origin.as_bytes());
    hasher.update(date.format("%Y%m%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn next_letter(letter: char) -> char {
    match letter {
        'A'..='Y' => ((letter as u8) + 1) as char,
        _ => 'A',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, d).unwrap()
    }

    fn modifier(store: &mut MemoryStore, date: NaiveDate) -> char {
        let mut counters = Counters::new(store, "bank");
        let letter = counters.next_file_id_modifier("123456780", "99887766", date).unwrap();
        counters.commit().unwrap();
        letter
    }

    #[test]
    fn test_same_day_modifiers_advance() {
        let mut store = MemoryStore::new();

        assert_eq!(modifier(&mut store, day(15)), 'A');
        assert_eq!(modifier(&mut store, day(15)), 'B');
        assert_eq!(modifier(&mut store, day(15)), 'C');
    }

    #[test]
    fn test_modifier_wraps_after_z() {
        let mut store = MemoryStore::new();
        let letters: Vec<char> = (0..27).map(|_| modifier(&mut store, day(15))).collect();

        assert_eq!(letters[0], 'A');
        assert_eq!(letters[25], 'Z');
        assert_eq!(letters[26], 'A');
    }

    #[test]
    fn test_new_day_resets_modifier() {
        let mut store = MemoryStore::new();

        assert_eq!(modifier(&mut store, day(15)), 'A');
        assert_eq!(modifier(&mut store, day(15)), 'B');
        assert_eq!(modifier(&mut store, day(16)), 'A');
    }

    #[test]
    fn test_modifier_hash_is_stored() {
        let mut store = MemoryStore::new();
        modifier(&mut store, day(15));

        let stored = store.get("bank.LastFileModifier").unwrap().unwrap();
        let (hash, letter) = stored.split_once('|').unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(letter, "A");
    }

    #[test]
    fn test_nothing_written_before_commit() {
        let mut store = MemoryStore::new();
        {
            let mut counters = Counters::new(&mut store, "bank");
            assert_eq!(counters.next_cash_letter_id(10000001).unwrap(), 10000001);
            assert_eq!(counters.next_cash_letter_id(10000001).unwrap(), 10000002);
            assert_eq!(counters.next_item_sequence_number().unwrap(), 1);
            assert_eq!(counters.next_item_sequence_number().unwrap(), 2);
        }
        assert!(store.values().is_empty());

        let mut counters = Counters::new(&mut store, "bank");
        counters.next_item_sequence_number().unwrap();
        counters.commit().unwrap();

        assert_eq!(store.get("bank.LastItemSequenceNumber").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_keys_are_scoped_by_destination() {
        let mut store = MemoryStore::new();
        store.set("other.NextCashLetterId", "42").unwrap();

        let mut counters = Counters::new(&mut store, "bank");
        assert_eq!(counters.next_cash_letter_id(1).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_counter_is_an_error() {
        let mut store = MemoryStore::new();
        store.set("bank.NextCashLetterId", "abc").unwrap();

        let mut counters = Counters::new(&mut store, "bank");
        assert!(matches!(counters.next_cash_letter_id(1), Err(Error::StateStore(_))));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("bank.NextCashLetterId").unwrap(), None);
        store.set("bank.NextCashLetterId", "7").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("bank.NextCashLetterId").unwrap().as_deref(), Some("7"));
    }

    /// Accepts `writes_left` writes, then fails.
    struct FailingStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl StateStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            let mut entries = BTreeMap::new();
            entries.insert(key.to_string(), value.to_string());
            self.set_many(&entries)
        }

        fn set_many(&mut self, entries: &BTreeMap<String, String>) -> Result<()> {
            if self.writes_left == 0 {
                return Err(Error::StateStore("disk full".into()));
            }
            self.writes_left -= 1;
            self.inner.set_many(entries)
        }
    }

    #[test]
    fn test_commit_is_one_write() {
        let mut store = FailingStore { inner: MemoryStore::new(), writes_left: 1 };

        let mut counters = Counters::new(&mut store, "bank");
        counters.next_file_id_modifier("123456780", "99887766", day(15)).unwrap();
        counters.next_cash_letter_id(1).unwrap();
        counters.next_item_sequence_number().unwrap();
        counters.commit().unwrap();

        assert_eq!(store.inner.values().len(), 3);
    }

    #[test]
    fn test_failed_commit_stores_nothing() {
        let mut store = FailingStore { inner: MemoryStore::new(), writes_left: 0 };

        let mut counters = Counters::new(&mut store, "bank");
        counters.next_file_id_modifier("123456780", "99887766", day(15)).unwrap();
        counters.next_cash_letter_id(1).unwrap();
        assert!(matches!(counters.commit(), Err(Error::StateStore(_))));

        assert!(store.inner.values().is_empty());
    }

    #[test]
    fn test_json_file_store_failed_write_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("bank.NextCashLetterId", "7").unwrap();
        assert_eq!(store.path(), path.as_path());

        // A directory in place of the file makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let mut counters = Counters::new(&mut store, "bank");
        counters.next_file_id_modifier("123456780", "99887766", day(15)).unwrap();
        assert_eq!(counters.next_cash_letter_id(1).unwrap(), 7);
        assert!(matches!(counters.commit(), Err(Error::StateStore(_))));

        assert_eq!(store.get("bank.NextCashLetterId").unwrap().as_deref(), Some("7"));
        assert_eq!(store.get("bank.LastFileModifier").unwrap(), None);
        assert!(!dir.path().join("state.json.tmp").exists());
    }
}
