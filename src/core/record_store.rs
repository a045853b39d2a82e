//! # Record Store
//!
//! A name → (string value, payload) table kept in an [`OrderedList`] sorted by
//! ascending name hash. Lookups walk from the head and give up as soon as they
//! pass the target hash, so a miss costs at most the records hashed at or below it.
//!
//! Config, auth, ban and command tables are all built on this store. It performs
//! no locking of its own; wrap it in a [`SharedStore`](crate::core::SharedStore)
//! when more than one thread needs it.
//!
//! ## Iteration Order
//! [`RecordStore::iter`] always yields records by ascending hash. Records whose
//! hashes collide appear in registration order. Persistence code relies on this
//! order being stable between runs.

use log::debug;

use super::list::{NodeId, OrderedList, Placement};
use super::parse::{leading_float, leading_int};

/// Hashes a record name with 32-bit FNV-1a.
///
/// # Examples
/// ```
/// use voxel_core::core::record_store::name_hash;
///
/// assert_eq!(name_hash(""), 0x811c_9dc5);
/// assert_ne!(name_hash("dirt"), name_hash("grass"));
/// ```
pub fn name_hash(name: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    name.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(PRIME)
    })
}

/// One entry of a [`RecordStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record<D> {
    name: String,
    hash: u32,
    value: Option<String>,
    data: Option<D>,
}

impl<D> Record<D> {
    /// The record's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The precomputed hash of [`Record::name`].
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The owned string value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The attached payload, if any.
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Mutable access to the attached payload.
    pub fn data_mut(&mut self) -> Option<&mut D> {
        self.data.as_mut()
    }

    /// Splits the record into its value and payload.
    pub fn into_parts(self) -> (Option<String>, Option<D>) {
        (self.value, self.data)
    }
}

/// Hash-ordered key/value/payload table.
#[derive(Debug)]
pub struct RecordStore<D> {
    records: OrderedList<Record<D>>,
}

impl<D> Default for RecordStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> RecordStore<D> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: OrderedList::new(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record called `name`.
    pub fn get(&self, name: &str) -> Option<&Record<D>> {
        let (id, _) = self.find(name);
        id.and_then(|id| self.records.get(id))
    }

    /// Mutable lookup of the record called `name`.
    ///
    /// The name is not reachable through the returned reference, so the hash
    /// order cannot be disturbed.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Record<D>> {
        let (id, _) = self.find(name);
        id.and_then(move |id| self.records.get_mut(id))
    }

    /// Creates or updates the record called `name`.
    ///
    /// On an existing record the value is always replaced (`None` clears it) while
    /// the payload is only replaced when `data` is `Some`. A missing record is only
    /// created when at least one of `value` and `data` is given; new records land
    /// after any existing records with the same hash.
    pub fn set(&mut self, name: &str, value: Option<&str>, data: Option<D>) {
        if let Some(record) = self.get_mut(name) {
            record.value = value.map(str::to_owned);
            if data.is_some() {
                record.data = data;
            }
            return;
        }

        if value.is_none() && data.is_none() {
            return;
        }

        let record = Record {
            name: name.to_owned(),
            hash: name_hash(name),
            value: value.map(str::to_owned),
            data,
        };
        debug!("record store: creating {name:?} (hash {:#010x})", record.hash);
        if self.records.insert_by(record, by_hash).is_err() {
            unreachable!("hash ordering never rejects");
        }
    }

    /// Removes the record called `name` and returns it.
    pub fn remove(&mut self, name: &str) -> Option<Record<D>> {
        let (id, _) = self.find(name);
        let record = self.records.remove(id?)?;
        debug!("record store: removed {name:?}");
        Some(record)
    }

    /// The string value of `name`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.value()
    }

    /// The value of `name` read as a leading base-10 integer, or zero.
    pub fn get_int(&self, name: &str) -> i64 {
        self.get_str(name).map(leading_int).unwrap_or(0)
    }

    /// The value of `name` read as a leading float literal, or zero.
    pub fn get_float(&self, name: &str) -> f64 {
        self.get_str(name).map(leading_float).unwrap_or(0.0)
    }

    /// `true` only when the value of `name` is exactly `"1"` or `"true"`.
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.get_str(name), Some("1" | "true"))
    }

    /// The payload attached to `name`.
    pub fn get_data(&self, name: &str) -> Option<&D> {
        self.get(name)?.data()
    }

    /// Mutable access to the payload attached to `name`.
    pub fn get_data_mut(&mut self, name: &str) -> Option<&mut D> {
        self.get_mut(name)?.data_mut()
    }

    /// Iterates records in ascending hash order.
    pub fn iter(&self) -> impl Iterator<Item = &Record<D>> + '_ {
        self.records.iter()
    }

    /// Iterates record names in ascending hash order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(Record::name)
    }

    /// Empties the store.
    ///
    /// Payloads are dropped when `free_data` is set. Otherwise they are handed back
    /// to the caller, head to tail, since they were never owned by the table.
    pub fn free(&mut self, free_data: bool) -> Vec<D> {
        let mut payloads = Vec::new();
        while let Some(record) = self.records.pop() {
            if let (false, Some(data)) = (free_data, record.data) {
                payloads.push(data);
            }
        }
        payloads.reverse();
        payloads
    }

    /// Walks the chain for `name`, returning the match and the number of records
    /// visited. The walk stops at the first record hashed above the target.
    fn find(&self, name: &str) -> (Option<NodeId>, usize) {
        let hash = name_hash(name);
        let mut probes = 0;
        for id in self.records.ids() {
            let Some(record) = self.records.get(id) else {
                continue;
            };
            probes += 1;
            if record.hash > hash {
                break;
            }
            if record.hash == hash && record.name == name {
                return (Some(id), probes);
            }
        }
        (None, probes)
    }
}

fn by_hash<D>(new: &Record<D>, current: &Record<D>) -> Placement {
    if new.hash < current.hash {
        Placement::Before
    } else {
        Placement::After
    }
}
