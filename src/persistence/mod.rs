use crate::entry::TimesheetEntry;
use crate::triage::TriageShiftEntry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Error as SerdeJsonError, Value};
use std::io;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub const ENTRIES_KEY: &str = "timesheet_entries";
pub const SHIFTS_KEY: &str = "triage_shifts";

/// String key-value persistence, the local-storage stand-in.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> PersistenceResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).write(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn read(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).write(key, value)
    }
}

/// The timesheet collection as the editor and exporter see it.
pub trait EntryStore {
    /// Never fails: unreadable content comes back as an empty collection.
    fn load(&self) -> Vec<TimesheetEntry>;
    /// Rewrites the collection. Stored records that could not be decoded are
    /// kept as they are.
    fn replace_all(&self, entries: &[TimesheetEntry]) -> PersistenceResult<()>;
    /// Empties the collection, unreadable records included.
    fn clear_all(&self) -> PersistenceResult<()>;
}

pub trait ShiftStore {
    fn load_shifts(&self) -> Vec<TriageShiftEntry>;
    fn replace_all_shifts(&self, shifts: &[TriageShiftEntry]) -> PersistenceResult<()>;
    fn clear_all_shifts(&self) -> PersistenceResult<()>;
}

/// A stored collection split into the records that decoded and the raw
/// records that did not.
struct Decoded<T> {
    items: Vec<T>,
    unreadable: Vec<Value>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unreadable: Vec::new(),
        }
    }
}

/// Typed collections on top of a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct TimesheetRepository<S> {
    store: S,
}

impl<S: KeyValueStore> TimesheetRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Entries sorted ascending by date. Equal dates keep their stored order.
    pub fn load_entries(&self) -> Vec<TimesheetEntry> {
        let mut entries = soften(ENTRIES_KEY, self.decode_entries()).items;
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        entries
    }

    /// Writes `entries` followed by any stored records that did not decode.
    pub fn replace_entries(&self, entries: &[TimesheetEntry]) -> PersistenceResult<()> {
        let unreadable = self.decode_entries()?.unreadable;
        self.save_collection(ENTRIES_KEY, entries, unreadable)
    }

    pub fn clear_entries(&self) -> PersistenceResult<()> {
        self.save_collection::<TimesheetEntry>(ENTRIES_KEY, &[], Vec::new())
    }

    /// Shifts sorted descending by date, newest first.
    pub fn load_triage_shifts(&self) -> Vec<TriageShiftEntry> {
        let mut shifts = soften(SHIFTS_KEY, self.decode_shifts()).items;
        shifts.sort_by(|a, b| b.date.cmp(&a.date));
        shifts
    }

    pub fn replace_triage_shifts(&self, shifts: &[TriageShiftEntry]) -> PersistenceResult<()> {
        let unreadable = self.decode_shifts()?.unreadable;
        self.save_collection(SHIFTS_KEY, shifts, unreadable)
    }

    pub fn clear_triage_shifts(&self) -> PersistenceResult<()> {
        self.save_collection::<TriageShiftEntry>(SHIFTS_KEY, &[], Vec::new())
    }

    fn decode_entries(&self) -> PersistenceResult<Decoded<TimesheetEntry>> {
        self.read_collection(ENTRIES_KEY, |entry: &TimesheetEntry| {
            let ok = entry.is_well_formed();
            if !ok {
                warn!(id = %entry.id, "keeping entry without id or task aside");
            }
            ok
        })
    }

    fn decode_shifts(&self) -> PersistenceResult<Decoded<TriageShiftEntry>> {
        self.read_collection(SHIFTS_KEY, |_: &TriageShiftEntry| true)
    }

    fn read_collection<T: DeserializeOwned>(
        &self,
        key: &str,
        accept: impl Fn(&T) -> bool,
    ) -> PersistenceResult<Decoded<T>> {
        match self.store.read(key)? {
            Some(raw) => Ok(decode_collection(key, &raw, accept)),
            None => {
                debug!(key, "nothing stored yet");
                Ok(Decoded::default())
            }
        }
    }

    fn save_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
        unreadable: Vec<Value>,
    ) -> PersistenceResult<()> {
        let kept = unreadable.len();
        let mut values = Vec::with_capacity(items.len() + kept);
        for item in items {
            values.push(serde_json::to_value(item)?);
        }
        values.extend(unreadable);
        let json = serde_json::to_string(&values)?;
        self.store.write(key, &json)?;
        debug!(key, count = items.len(), kept, "collection written");
        Ok(())
    }
}

fn soften<T>(key: &str, result: PersistenceResult<Decoded<T>>) -> Decoded<T> {
    result.unwrap_or_else(|err| {
        warn!(key, error = %err, "failed to read store, starting empty");
        Decoded::default()
    })
}

/// Decodes a JSON array record by record so one malformed record does not
/// cost the whole collection. Records that fail to decode, or that `accept`
/// rejects, are returned raw so a later write can put them back.
fn decode_collection<T: DeserializeOwned>(
    key: &str,
    raw: &str,
    accept: impl Fn(&T) -> bool,
) -> Decoded<T> {
    let mut decoded = Decoded::default();
    if raw.trim().is_empty() {
        return decoded;
    }
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(err) => {
            warn!(key, error = %err, "stored collection is not a JSON array, starting empty");
            return decoded;
        }
    };
    for (idx, value) in values.into_iter().enumerate() {
        match <T as Deserialize>::deserialize(&value) {
            Ok(item) if accept(&item) => decoded.items.push(item),
            Ok(_) => decoded.unreadable.push(value),
            Err(err) => {
                warn!(key, index = idx, error = %err, "keeping unreadable record aside");
                decoded.unreadable.push(value);
            }
        }
    }
    decoded
}

impl<S: KeyValueStore> EntryStore for TimesheetRepository<S> {
    fn load(&self) -> Vec<TimesheetEntry> {
        self.load_entries()
    }

    fn replace_all(&self, entries: &[TimesheetEntry]) -> PersistenceResult<()> {
        self.replace_entries(entries)
    }

    fn clear_all(&self) -> PersistenceResult<()> {
        self.clear_entries()
    }
}

impl<S: KeyValueStore> ShiftStore for TimesheetRepository<S> {
    fn load_shifts(&self) -> Vec<TriageShiftEntry> {
        self.load_triage_shifts()
    }

    fn replace_all_shifts(&self, shifts: &[TriageShiftEntry]) -> PersistenceResult<()> {
        self.replace_triage_shifts(shifts)
    }

    fn clear_all_shifts(&self) -> PersistenceResult<()> {
        self.clear_triage_shifts()
    }
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
