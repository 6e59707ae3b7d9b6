//! In-memory record store.
//!
//! Holds [`Record`]s in insertion order and answers exact-id / tag-subset queries.
//! Every value going in or out is an owned copy; callers never alias the stored data.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::QuiescentError;

/// Default maximum number of records held by a [`RecordStore`].
pub const MAX_RECORDS: usize = 10_000;

/// A stored record: an identifier and a set of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Record {
    /// Unique identifier.
    pub id: String,
    /// Free-form tags.
    pub tags: Vec<String>,
}

impl Record {
    /// Build a record from an id and any iterable of tags.
    pub fn new<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filter for [`RecordStore::query`].
///
/// A record matches when its id equals `id` (if set and non-empty) and its tags
/// contain every tag in `tags`. The default criteria match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryCriteria {
    /// Exact identifier to match.
    pub id: Option<String>,
    /// Tags that must all be present.
    pub tags: Vec<String>,
}

impl QueryCriteria {
    /// Match a single identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            tags: Vec::new(),
        }
    }

    /// Match records carrying all of `tags`.
    pub fn by_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty())
            && record.id != id
        {
            return false;
        }

        self.tags.iter().all(|tag| record.tags.contains(tag))
    }
}

#[derive(Default)]
struct Records {
    ordered: Vec<Record>,
    ids: HashSet<String>,
}

/// Thread-safe, bounded, insertion-ordered record collection.
///
/// ```
/// use quiescent::{QueryCriteria, Record, RecordStore};
///
/// let store = RecordStore::new();
/// store.add(Record::new("a", ["red", "big"])).unwrap();
/// store.add(Record::new("b", ["red"])).unwrap();
///
/// let red_and_big = store.query(Some(&QueryCriteria::by_tags(["red", "big"])));
/// assert_eq!(red_and_big, vec![Record::new("a", ["red", "big"])]);
///
/// assert!(store.add(Record::new("a", Vec::<String>::new())).is_err());
/// ```
pub struct RecordStore {
    capacity: usize,
    records: RwLock<Records>,
}

impl RecordStore {
    /// Store bounded at [`MAX_RECORDS`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_RECORDS)
    }

    /// Store bounded at `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: RwLock::new(Records::default()),
        }
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a copy of `record`.
    ///
    /// # Errors
    ///
    /// - [`QuiescentError::CapacityExceeded`] when the store is full
    /// - [`QuiescentError::DuplicateKey`] when a record with the same id exists
    pub fn add(&self, record: Record) -> Result<(), QuiescentError> {
        let mut records = self.records.write();

        if records.ordered.len() >= self.capacity {
            return Err(QuiescentError::CapacityExceeded(self.capacity));
        }

        if records.ids.contains(&record.id) {
            return Err(QuiescentError::DuplicateKey(record.id));
        }

        records.ids.insert(record.id.clone());
        records.ordered.push(record);

        Ok(())
    } // end method add

    /// Copies of every record matching `criteria`, in insertion order.
    ///
    /// `None` (or default criteria) returns everything.
    pub fn query(&self, criteria: Option<&QueryCriteria>) -> Vec<Record> {
        let records = self.records.read();

        match criteria {
            None => records.ordered.clone(),
            Some(criteria) => records
                .ordered
                .iter()
                .filter(|record| criteria.matches(record))
                .cloned()
                .collect(),
        }
    }

    /// Number of stored records.
    pub fn size(&self) -> usize {
        self.records.read().ordered.len()
    }

    /// Remove every record.
    pub fn clear(&self) {
        let mut records = self.records.write();
        records.ordered.clear();
        records.ids.clear();
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
