//! Ordered MIB store.
//!
//! [`MibStore`] holds leaf entries keyed by OID in ascending order. Each
//! [`MibEntry`] carries an inline [`Value`] whose type is the declared type
//! of the leaf, an [`Access`] mode, and optionally an [`Accessor`] that
//! computes reads or actuates writes.
//!
//! # Example
//!
//! ```
//! use usnmp::mib::{Access, MibEntry, MibStore};
//! use usnmp::{Value, oid};
//!
//! let mut mib = MibStore::new();
//! mib.insert(MibEntry::new(oid!(B, 1, 5, 0), Value::from("gw"), Access::ReadWrite)).unwrap();
//! mib.insert(MibEntry::new(oid!(B, 1, 1, 0), Value::from("router"), Access::ReadOnly)).unwrap();
//!
//! let next = mib.get_next(&oid!(B, 1)).unwrap();
//! assert_eq!(next.oid(), &oid!(B, 1, 1, 0));
//! ```

pub mod dump;
pub mod uptime;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::value::{DataType, Value};

/// Longest octet string or OID value a leaf stores inline.
pub const MAX_OCTET_LEN: usize = 128;

/// Access mode of a MIB leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    /// Letter used in the MIB dump (`R` or `W`).
    pub fn letter(self) -> char {
        match self {
            Access::ReadOnly => 'R',
            Access::ReadWrite => 'W',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'R' => Some(Access::ReadOnly),
            'W' => Some(Access::ReadWrite),
            _ => None,
        }
    }
}

/// Custom read/write behavior of a MIB leaf.
///
/// Both methods have defaults, so an implementation may override only one.
/// A read defaults to the inline value. A write defaults to accepting the
/// value; after any successful `set` the store overwrites the inline value.
pub trait Accessor: Send + Sync {
    /// Produce the current value of `entry`.
    fn get(&self, entry: &MibEntry) -> std::result::Result<Value, ErrorStatus> {
        Ok(entry.value().clone())
    }

    /// Actuate a write of `value` to `entry`.
    ///
    /// `value` already has the entry's declared type. Returning an error
    /// status rejects the write and leaves the inline value unchanged.
    fn set(&self, entry: &MibEntry, value: &Value) -> std::result::Result<(), ErrorStatus> {
        let _ = (entry, value);
        Ok(())
    }
}

impl<F> Accessor for F
where
    F: Fn(&MibEntry) -> std::result::Result<Value, ErrorStatus> + Send + Sync,
{
    fn get(&self, entry: &MibEntry) -> std::result::Result<Value, ErrorStatus> {
        self(entry)
    }
}

/// One leaf of the MIB.
#[derive(Clone)]
pub struct MibEntry {
    oid: Oid,
    value: Value,
    access: Access,
    accessor: Option<Arc<dyn Accessor>>,
}

impl MibEntry {
    /// Create an entry whose declared type is the type of `value`.
    pub fn new(oid: Oid, value: Value, access: Access) -> Self {
        Self {
            oid,
            value,
            access,
            accessor: None,
        }
    }

    /// Attach an accessor, replacing any previous one.
    pub fn with_accessor(mut self, accessor: Arc<dyn Accessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn set_accessor(&mut self, accessor: Arc<dyn Accessor>) {
        self.accessor = Some(accessor);
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// The inline value, ignoring any accessor.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn data_type(&self) -> DataType {
        self.value.data_type()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    /// Read the current value through the accessor, if any.
    pub fn read(&self) -> std::result::Result<Value, ErrorStatus> {
        match &self.accessor {
            Some(accessor) => accessor.get(self),
            None => Ok(self.value.clone()),
        }
    }

    /// Replace the inline value without running the accessor.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Write `value` with SET semantics.
    ///
    /// Checks access and type, runs the accessor's `set`, then stores the
    /// value inline.
    pub fn write(&mut self, value: &Value) -> std::result::Result<(), ErrorStatus> {
        if self.access != Access::ReadWrite {
            return Err(ErrorStatus::ReadOnly);
        }
        if value.data_type() != self.data_type() {
            return Err(ErrorStatus::BadValue);
        }
        let oversized = match value {
            Value::OctetString(data) | Value::Opaque(data) => data.len() > MAX_OCTET_LEN,
            _ => false,
        };
        if oversized {
            return Err(ErrorStatus::BadValue);
        }
        if let Some(accessor) = &self.accessor {
            accessor.set(self, value)?;
        }
        self.value = value.clone();
        Ok(())
    }
}

impl fmt::Debug for MibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MibEntry")
            .field("oid", &self.oid)
            .field("value", &self.value)
            .field("access", &self.access)
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

/// Ordered collection of MIB leaves.
#[derive(Debug, Clone, Default)]
pub struct MibStore {
    entries: BTreeMap<Oid, MibEntry>,
}

impl MibStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup.
    pub fn get(&self, oid: &Oid) -> Option<&MibEntry> {
        self.entries.get(oid)
    }

    pub fn get_mut(&mut self, oid: &Oid) -> Option<&mut MibEntry> {
        self.entries.get_mut(oid)
    }

    /// Smallest entry strictly greater than `oid`.
    ///
    /// `oid` does not need to be in the store.
    pub fn get_next(&self, oid: &Oid) -> Option<&MibEntry> {
        self.entries
            .range((Bound::Excluded(oid), Bound::Unbounded))
            .next()
            .map(|(_, entry)| entry)
    }

    /// Smallest entry greater than or equal to `oid`.
    pub fn get_at_or_after(&self, oid: &Oid) -> Option<&MibEntry> {
        self.entries.range(oid..).next().map(|(_, entry)| entry)
    }

    /// Insert a new entry.
    ///
    /// Fails with [`Error::DuplicateOid`] if the OID is already present.
    pub fn insert(&mut self, entry: MibEntry) -> Result<()> {
        match self.entries.entry(entry.oid.clone()) {
            btree_map::Entry::Occupied(_) => Err(Error::DuplicateOid { oid: entry.oid }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn upsert(&mut self, entry: MibEntry) -> Option<MibEntry> {
        self.entries.insert(entry.oid.clone(), entry)
    }

    pub fn remove(&mut self, oid: &Oid) -> Option<MibEntry> {
        self.entries.remove(oid)
    }

    /// Attach an accessor to an existing entry.
    ///
    /// Returns `false` if no entry has this OID.
    pub fn attach_accessor(&mut self, oid: &Oid, accessor: Arc<dyn Accessor>) -> bool {
        match self.entries.get_mut(oid) {
            Some(entry) => {
                entry.accessor = Some(accessor);
                true
            }
            None => false,
        }
    }

    /// Remove the accessor from an entry, returning it.
    pub fn detach_accessor(&mut self, oid: &Oid) -> Option<Arc<dyn Accessor>> {
        self.entries.get_mut(oid).and_then(|e| e.accessor.take())
    }

    /// Entries in ascending OID order.
    pub fn iter(&self) -> impl Iterator<Item = &MibEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MibEntry> {
        self.entries.values_mut()
    }

    /// Apply a SET of `value` to the entry at `oid`.
    pub fn set(&mut self, oid: &Oid, value: &Value) -> std::result::Result<(), ErrorStatus> {
        let entry = self.entries.get_mut(oid).ok_or(ErrorStatus::NoSuchName)?;
        let result = entry.write(value);
        if let Err(status) = result {
            tracing::debug!(target: "usnmp::mib", { %oid, snmp.status = %status }, "set rejected");
        }
        result
    }
}

impl FromIterator<MibEntry> for MibStore {
    /// Later entries replace earlier ones with the same OID.
    fn from_iter<I: IntoIterator<Item = MibEntry>>(iter: I) -> Self {
        let mut store = MibStore::new();
        for entry in iter {
            store.upsert(entry);
        }
        store
    }
}

impl<'a> IntoIterator for &'a MibStore {
    type Item = &'a MibEntry;
    type IntoIter = btree_map::Values<'a, Oid, MibEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn sample() -> MibStore {
        [
            MibEntry::new(oid!(B, 2, 1), Value::Integer(3), Access::ReadOnly),
            MibEntry::new(oid!(B, 1, 2), Value::Integer(2), Access::ReadWrite),
            MibEntry::new(oid!(B, 1, 1), Value::Integer(1), Access::ReadOnly),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_ordered_iteration() {
        let mib = sample();
        let oids: Vec<_> = mib.iter().map(|e| e.oid().to_string()).collect();
        assert_eq!(oids, ["B.1.1", "B.1.2", "B.2.1"]);
    }

    #[test]
    fn test_get_next() {
        let mib = sample();
        assert_eq!(mib.get_next(&oid!(B, 1)).unwrap().oid(), &oid!(B, 1, 1));
        assert_eq!(mib.get_next(&oid!(B, 1, 1)).unwrap().oid(), &oid!(B, 1, 2));
        assert_eq!(mib.get_next(&oid!(B, 1, 1, 5)).unwrap().oid(), &oid!(B, 1, 2));
        assert_eq!(mib.get_next(&oid!(B, 1, 2)).unwrap().oid(), &oid!(B, 2, 1));
        assert!(mib.get_next(&oid!(B, 2, 1)).is_none());
        // E sorts after B
        assert!(mib.get_next(&oid!(E, 1)).is_none());
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut mib = sample();
        let err = mib
            .insert(MibEntry::new(oid!(B, 1, 1), Value::Null, Access::ReadOnly))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateOid { .. }));
        assert_eq!(mib.get(&oid!(B, 1, 1)).unwrap().value(), &Value::Integer(1));
    }

    #[test]
    fn test_remove() {
        let mut mib = sample();
        assert!(mib.remove(&oid!(B, 1, 2)).is_some());
        assert!(mib.remove(&oid!(B, 1, 2)).is_none());
        assert_eq!(mib.get_next(&oid!(B, 1, 1)).unwrap().oid(), &oid!(B, 2, 1));
    }

    #[test]
    fn test_set_semantics() {
        let mut mib = sample();
        assert_eq!(
            mib.set(&oid!(B, 1, 1), &Value::Integer(9)),
            Err(ErrorStatus::ReadOnly)
        );
        assert_eq!(
            mib.set(&oid!(B, 1, 2), &Value::from("x")),
            Err(ErrorStatus::BadValue)
        );
        assert_eq!(
            mib.set(&oid!(B, 9), &Value::Integer(1)),
            Err(ErrorStatus::NoSuchName)
        );
        mib.set(&oid!(B, 1, 2), &Value::Integer(42)).unwrap();
        assert_eq!(mib.get(&oid!(B, 1, 2)).unwrap().value(), &Value::Integer(42));
    }

    #[test]
    fn test_set_oversized_string() {
        let mut mib = MibStore::new();
        mib.insert(MibEntry::new(
            oid!(B, 1, 5, 0),
            Value::from("x"),
            Access::ReadWrite,
        ))
        .unwrap();
        let long = Value::from(vec![b'a'; MAX_OCTET_LEN + 1].as_slice());
        assert_eq!(
            mib.set(&oid!(B, 1, 5, 0), &long),
            Err(ErrorStatus::BadValue)
        );
    }

    struct Counting {
        sets: AtomicU32,
        reject: bool,
    }

    impl Accessor for Counting {
        fn get(&self, _entry: &MibEntry) -> std::result::Result<Value, ErrorStatus> {
            Ok(Value::Gauge32(self.sets.load(Ordering::Relaxed)))
        }

        fn set(&self, _entry: &MibEntry, _value: &Value) -> std::result::Result<(), ErrorStatus> {
            if self.reject {
                return Err(ErrorStatus::GenErr);
            }
            self.sets.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn test_accessor_hooks() {
        let mut mib = MibStore::new();
        let oid = oid!(P, 38644, 1);
        mib.insert(MibEntry::new(oid.clone(), Value::Gauge32(0), Access::ReadWrite))
            .unwrap();
        let accessor = Arc::new(Counting {
            sets: AtomicU32::new(0),
            reject: false,
        });
        assert!(mib.attach_accessor(&oid, accessor.clone()));
        mib.set(&oid, &Value::Gauge32(7)).unwrap();
        assert_eq!(mib.get(&oid).unwrap().value(), &Value::Gauge32(7));
        assert_eq!(mib.get(&oid).unwrap().read(), Ok(Value::Gauge32(1)));

        mib.attach_accessor(
            &oid,
            Arc::new(Counting {
                sets: AtomicU32::new(0),
                reject: true,
            }),
        );
        assert_eq!(mib.set(&oid, &Value::Gauge32(8)), Err(ErrorStatus::GenErr));
        assert_eq!(mib.get(&oid).unwrap().value(), &Value::Gauge32(7));

        assert!(mib.detach_accessor(&oid).is_some());
        assert_eq!(mib.get(&oid).unwrap().read(), Ok(Value::Gauge32(7)));
        assert!(!mib.attach_accessor(&oid!(P, 1), accessor));
    }

    #[test]
    fn test_closure_accessor() {
        let entry = MibEntry::new(oid!(B, 1, 3, 0), Value::TimeTicks(0), Access::ReadOnly)
            .with_accessor(Arc::new(|_: &MibEntry| Ok::<_, ErrorStatus>(Value::TimeTicks(1234))));
        assert_eq!(entry.read(), Ok(Value::TimeTicks(1234)));
        assert_eq!(entry.value(), &Value::TimeTicks(0));
    }
}
