/// MVTO protocol tests
///
/// Visibility, read-timestamp and write-ordering rules of the store
/// Run with: cargo test --test mvto_protocol_tests

use mvtokv::{CommitStatus, DbError, Key, MvtoStore, TransactionId};

fn assert_chain_ordered(store: &MvtoStore, key: Key) {
    if let Some(versions) = store.versions(key) {
        for pair in versions.windows(2) {
            assert!(
                pair[0].write_ts < pair[1].write_ts,
                "key {} has unordered versions: {:?}",
                key,
                versions
            );
        }
    }
}

fn assert_all_chains_ordered(store: &MvtoStore) {
    for key in store.keys() {
        assert_chain_ordered(store, key);
    }
}

#[test]
fn test_committed_write_visible_to_younger_reader() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 100).unwrap();
    store.commit(t1).unwrap();

    let t2 = store.begin().unwrap();
    assert_eq!(store.read(t2, 1).unwrap(), 100);
    store.write(t2, 1, 200).unwrap();

    let t3 = store.begin().unwrap();
    assert_eq!(store.read(t3, 1).unwrap(), 200);
    assert_all_chains_ordered(&store);
}

#[test]
fn test_write_too_late_rolls_back_writer() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 100).unwrap();

    // the writer is older than the reader
    let writer = store.begin().unwrap();
    let reader = store.begin().unwrap();
    assert!(writer < reader);

    store.read(reader, 1).unwrap();
    let err = store.write(writer, 1, 999).unwrap_err();

    assert_eq!(
        err,
        DbError::WriteTooLate {
            txn: writer,
            key: 1,
            read_ts: reader.as_u64()
        }
    );
    assert!(err.is_abort());
    assert!(!store.is_active(writer));
    assert!(store.is_active(reader));
    assert_eq!(store.read(reader, 1).unwrap(), 100);
    assert_eq!(store.stats().write_too_late, 1);
}

#[test]
fn test_duplicate_insert_rolls_back_inserter() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 5).unwrap();
    let t2 = store.begin().unwrap();
    store.insert(t2, 2, 50).unwrap();

    assert_eq!(store.insert(t2, 1, 9), Err(DbError::DuplicateKey(1)));
    assert!(!store.is_active(t2));

    // the rollback took t2's earlier insert with it
    assert!(store.versions(2).is_none());
    assert_eq!(store.read(t1, 1).unwrap(), 5);
}

#[test]
fn test_read_after_insert_returns_inserted_value() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 10, 1).unwrap();
    store.insert(t1, 20, 2).unwrap();

    let t2 = store.begin().unwrap();
    let t3 = store.begin().unwrap();
    assert_eq!(store.read(t3, 20).unwrap(), 2);
    assert_eq!(store.read(t2, 10).unwrap(), 1);
    assert_eq!(store.read(t1, 10).unwrap(), 1);
}

#[test]
fn test_write_visible_to_all_younger_readers() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 0).unwrap();
    store.commit(t1).unwrap();

    let writer = store.begin().unwrap();
    store.write(writer, 1, 42).unwrap();
    assert_eq!(store.read(writer, 1).unwrap(), 42);

    for _ in 0..3 {
        let reader = store.begin().unwrap();
        assert_eq!(store.read(reader, 1).unwrap(), 42);
    }
}

#[test]
fn test_older_reader_keeps_seeing_older_version() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 10).unwrap();
    store.commit(t1).unwrap();

    let old = store.begin().unwrap();
    let young = store.begin().unwrap();
    store.write(young, 1, 20).unwrap();

    assert_eq!(store.read(old, 1).unwrap(), 10);
    assert_eq!(store.read(young, 1).unwrap(), 20);

    let versions = store.versions(1).unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].read_ts, old.as_u64());
    assert_eq!(versions[1].read_ts, young.as_u64());
}

#[test]
fn test_read_timestamp_only_increases() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 1).unwrap();
    store.commit(t1).unwrap();

    let t2 = store.begin().unwrap();
    let t3 = store.begin().unwrap();
    store.read(t3, 1).unwrap();
    store.read(t2, 1).unwrap();

    assert_eq!(store.versions(1).unwrap()[0].read_ts, t3.as_u64());
    assert_eq!(store.versions(1).unwrap()[0].dependants, vec![t2, t3]);
}

#[test]
fn test_write_after_own_read_is_allowed() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 1).unwrap();
    store.commit(t1).unwrap();

    let t2 = store.begin().unwrap();
    assert_eq!(store.read(t2, 1).unwrap(), 1);
    store.write(t2, 1, 2).unwrap();
    assert_eq!(store.read(t2, 1).unwrap(), 2);
    assert_eq!(store.commit(t2).unwrap(), CommitStatus::Committed);
}

#[test]
fn test_in_place_write_rejected_after_younger_read() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 1).unwrap();
    let t2 = store.begin().unwrap();
    store.read(t2, 1).unwrap();

    // t1 owns the version, but t2 has already seen it
    assert!(matches!(
        store.write(t1, 1, 5),
        Err(DbError::WriteTooLate { .. })
    ));
    assert!(!store.is_active(t1));
    assert!(!store.is_active(t2));
    assert!(store.keys().is_empty());
}

#[test]
fn test_operations_on_inactive_transaction() {
    let mut store = MvtoStore::new();

    let t1 = store.begin().unwrap();
    store.insert(t1, 1, 1).unwrap();
    store.commit(t1).unwrap();

    assert_eq!(store.read(t1, 1), Err(DbError::NoSuchTransaction(t1)));
    assert_eq!(store.write(t1, 1, 2), Err(DbError::NoSuchTransaction(t1)));
    assert_eq!(store.insert(t1, 2, 2), Err(DbError::NoSuchTransaction(t1)));
    assert_eq!(store.commit(t1), Err(DbError::NoSuchTransaction(t1)));

    let never = TransactionId(99);
    assert_eq!(store.read(never, 1), Err(DbError::NoSuchTransaction(never)));
}

#[test]
fn test_missing_key() {
    let mut store = MvtoStore::new();
    let t1 = store.begin().unwrap();

    assert_eq!(store.read(t1, 1), Err(DbError::NoSuchKey(1)));
    assert_eq!(store.write(t1, 1, 1), Err(DbError::NoSuchKey(1)));
    // not an abort
    assert!(store.is_active(t1));
}

/// Deterministic interleaving of many transactions; the chain order
/// invariant must hold after every step.
#[test]
fn test_chain_order_under_interleaving() {
    let mut store = MvtoStore::new();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    let setup = store.begin().unwrap();
    for key in 0..4 {
        store.insert(setup, key, 0).unwrap();
    }
    store.commit(setup).unwrap();

    let mut live: Vec<TransactionId> = Vec::new();
    for step in 0..500 {
        let roll = next() % 10;
        if live.is_empty() || roll == 0 {
            live.push(store.begin().unwrap());
            continue;
        }

        let txn = live[(next() % live.len() as u64) as usize];
        let key = (next() % 4) as Key;
        let _ = match roll {
            1..=4 => store.read(txn, key).map(|_| ()),
            5..=7 => store.write(txn, key, step),
            8 => store.commit(txn).map(|_| ()),
            _ => {
                store.rollback(txn);
                Ok(())
            }
        };

        assert_all_chains_ordered(&store);
        live.retain(|t| store.is_active(*t));
    }

    // everything left can be finished
    for txn in live {
        let _ = store.commit(txn);
    }
}
