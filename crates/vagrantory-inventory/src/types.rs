//! Inventory type definitions

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A guest reported by `vagrant status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestStatus {
    /// Machine name within the project
    pub name: String,
    /// Lifecycle state as reported by the provider (`running`, `poweroff`, ...)
    pub state: String,
}

/// What is known about a single guest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    /// Host-side port forwarded to the guest's SSH port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
}

impl GuestRecord {
    /// Record for a guest with a forwarded SSH port
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            ssh_port: Some(port),
        }
    }

    /// Whether the guest is reachable
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ssh_port.is_some()
    }
}

/// Guests of one project keyed by name
///
/// This is the unit that is cached and handed to population. Guests keep the
/// order vagrant reported them in; a repeated name replaces the earlier record
/// in place. Serialized as a plain JSON object in that order, e.g.
/// `{"default": {"ssh_port": 2222}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    guests: Vec<(String, GuestRecord)>,
}

impl Snapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guest, or replace the record of a guest already present
    pub fn insert(&mut self, name: impl Into<String>, record: GuestRecord) {
        let name = name.into();
        match self.guests.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = record,
            None => self.guests.push((name, record)),
        }
    }

    /// Look up a guest by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GuestRecord> {
        self.guests
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, record)| record)
    }

    /// Iterate guests in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GuestRecord)> {
        self.guests.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Number of guests
    #[must_use]
    pub fn len(&self) -> usize {
        self.guests.len()
    }

    /// Check if no guests were discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }
}

impl FromIterator<(String, GuestRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, GuestRecord)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (name, record) in iter {
            snapshot.insert(name, record);
        }
        snapshot
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.guests.len()))?;
        for (name, record) in &self.guests {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = Snapshot;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of guest names to records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Snapshot, A::Error> {
                let mut snapshot = Snapshot::new();
                while let Some((name, record)) = access.next_entry::<String, GuestRecord>()? {
                    snapshot.insert(name, record);
                }
                Ok(snapshot)
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}
