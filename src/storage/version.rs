use crate::core::{TransactionId, Value};
use serde::Serialize;
use std::collections::BTreeSet;

/// One timestamped value of a key.
///
/// `read_ts` is the high-water mark of readers and never decreases.
/// `dependants` holds ids, never transaction references: the transaction
/// table stays the only owner of transaction state.
#[derive(Debug, Clone)]
pub struct Version {
    write_ts: TransactionId,
    read_ts: u64,
    content: Value,
    dependants: BTreeSet<TransactionId>,
}

impl Version {
    /// Version created by `insert`; nobody has read it yet.
    pub fn initial(write_ts: TransactionId, content: Value) -> Self {
        Self {
            write_ts,
            read_ts: 0,
            content,
            dependants: BTreeSet::new(),
        }
    }

    /// Version created by `write`; the writer counts as its first reader.
    pub fn written(write_ts: TransactionId, content: Value) -> Self {
        Self {
            write_ts,
            read_ts: write_ts.as_u64(),
            content,
            dependants: BTreeSet::new(),
        }
    }

    pub fn write_ts(&self) -> TransactionId {
        self.write_ts
    }

    pub fn read_ts(&self) -> u64 {
        self.read_ts
    }

    pub fn content(&self) -> Value {
        self.content
    }

    pub fn set_content(&mut self, content: Value) {
        self.content = content;
    }

    pub fn dependants(&self) -> &BTreeSet<TransactionId> {
        &self.dependants
    }

    /// Record a read by `reader`: raise the read timestamp and register the
    /// reader as a dependant.
    ///
    /// Returns `true` if the reader was not registered before.
    pub fn observe_read(&mut self, reader: TransactionId) -> bool {
        if reader.as_u64() > self.read_ts {
            self.read_ts = reader.as_u64();
        }
        self.dependants.insert(reader)
    }

    pub fn remove_dependant(&mut self, reader: TransactionId) -> bool {
        self.dependants.remove(&reader)
    }

    pub fn info(&self) -> VersionInfo {
        VersionInfo {
            write_ts: self.write_ts,
            read_ts: self.read_ts,
            content: self.content,
            dependants: self.dependants.iter().copied().collect(),
        }
    }
}

/// Read-only copy of a version, for inspection and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub write_ts: TransactionId,
    pub read_ts: u64,
    pub content: Value,
    pub dependants: Vec<TransactionId>,
}
