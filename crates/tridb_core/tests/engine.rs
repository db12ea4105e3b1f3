//! End-to-end tests for the storage engine.

use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tridb_core::{Config, Database, Error, TextFraming, WalkOptions, COMPACTING_SUFFIX};

fn collect_keys(db: &Database, opts: &WalkOptions) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    db.read(|r| {
        r.walk(opts, |key| {
            keys.push(key.to_vec());
            Ok(())
        })
    })
    .unwrap();
    keys
}

#[test]
fn set_survives_reopen_with_expected_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e1.db");

    {
        let db = Database::open(&path).unwrap();
        db.read_write(|_r, w| {
            w.set("k", "v");
            Ok(())
        })
        .unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    db.read(|r| {
        assert_eq!(r.get(b"k")?, Some(b"v".to_vec()));
        Ok(())
    })
    .unwrap();

    assert_eq!(fs::read(&path).unwrap(), [b'+', 1, 0, 0, 0, 1, b'k', b'v']);
}

#[test]
fn overwrite_then_delete_leaves_three_rows_and_no_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e2.db");
    let db = Database::open(&path).unwrap();

    db.read_write(|_r, w| {
        w.set("a", "1");
        w.set("a", "2");
        w.delete("a");
        Ok(())
    })
    .unwrap();

    db.read(|r| {
        assert!(!r.has(b"a"));
        assert_eq!(r.count(), 0);
        Ok(())
    })
    .unwrap();

    // Two set rows of 8 bytes and one delete row of 7: all three persist.
    assert_eq!(fs::metadata(&path).unwrap().len(), 8 + 8 + 7);
}

#[test]
fn walk_visits_keys_in_byte_lex_order() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("e3.db")).unwrap();

    db.read_write(|_r, w| {
        w.set("b", "2");
        w.set("c", "3");
        w.set("a", "1");
        Ok(())
    })
    .unwrap();

    assert_eq!(collect_keys(&db, &WalkOptions::new()), [b"a", b"b", b"c"]);
    assert_eq!(
        collect_keys(&db, &WalkOptions::new().reverse(true)),
        [b"c", b"b", b"a"]
    );
}

#[test]
fn prefix_scoping_restricts_counts_and_walks() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("e4.db")).unwrap();

    db.read_write(|_r, w| {
        w.set("my-1", "a");
        w.set("my-2", "b");
        w.set("other", "c");
        Ok(())
    })
    .unwrap();

    db.read(|r| {
        assert_eq!(r.count_prefix(b"my-"), 2);
        assert_eq!(r.count(), 3);
        Ok(())
    })
    .unwrap();

    let opts = WalkOptions::new().prefix(b"my-".to_vec());
    assert_eq!(collect_keys(&db, &opts), [b"my-1", b"my-2"]);
}

#[test]
fn compacting_a_fully_deleted_database_empties_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e5.db");
    let db = Database::open(&path).unwrap();

    db.read_write(|_r, w| {
        w.set("a", "1");
        w.set("a", "2");
        w.delete("a");
        Ok(())
    })
    .unwrap();

    db.compact().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    db.read(|r| {
        assert_eq!(r.count(), 0);
        Ok(())
    })
    .unwrap();
}

#[test]
fn oversized_key_aborts_without_touching_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e6.db");
    let db = Database::open(&path).unwrap();

    let result = db.read_write(|_r, w| {
        w.set(vec![b'x'; 256], b"v".to_vec());
        Ok(())
    });

    assert!(matches!(result, Err(Error::KeyTooLong { len: 256 })));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    db.read(|r| {
        assert_eq!(r.count(), 0);
        Ok(())
    })
    .unwrap();
}

#[test]
fn text_framing_rejects_sentinel_in_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e7.db");
    let db =
        Database::open_with_config(&path, Config::new().framing(TextFraming::default())).unwrap();

    let result = db.read_write(|_r, w| {
        w.set("k", "v\n");
        Ok(())
    });

    assert!(matches!(result, Err(Error::SentinelInValue { .. })));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn text_framing_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("text.db");
    let config = Config::new().framing(TextFraming::default());

    {
        let db = Database::open_with_config(&path, config.clone()).unwrap();
        db.read_write(|_r, w| {
            w.set("name", "Ada Lovelace");
            w.set("born", "1815");
            w.delete("born");
            Ok(())
        })
        .unwrap();
        db.close().unwrap();
    }

    // The file is plain text, one row per line.
    assert_eq!(
        fs::read(&path).unwrap(),
        b"+ name Ada Lovelace\n+ born 1815\n- born \n"
    );

    let db = Database::open_with_config(&path, config).unwrap();
    db.read(|r| {
        assert_eq!(r.get(b"name")?, Some(b"Ada Lovelace".to_vec()));
        assert!(!r.has(b"born"));
        assert_eq!(r.count(), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn last_write_wins_across_transactions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lww.db");
    let db = Database::open(&path).unwrap();

    for value in ["first", "second", "third"] {
        db.read_write(|_r, w| {
            w.set("key", value);
            Ok(())
        })
        .unwrap();
    }

    db.read(|r| {
        assert_eq!(r.get(b"key")?, Some(b"third".to_vec()));
        assert_eq!(r.count(), 1);
        Ok(())
    })
    .unwrap();

    // Still the case after replay and after compaction.
    db.close().unwrap();
    let db = Database::open(&path).unwrap();
    db.compact().unwrap();
    db.read(|r| {
        assert_eq!(r.get(b"key")?, Some(b"third".to_vec()));
        Ok(())
    })
    .unwrap();
}

#[test]
fn aborted_transaction_preserves_previous_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("abort.db");
    let db = Database::open(&path).unwrap();

    db.read_write(|_r, w| {
        w.set("kept", "original");
        Ok(())
    })
    .unwrap();
    let len_before = fs::metadata(&path).unwrap().len();

    let result = db.read_write(|_r, w| {
        w.set("kept", "clobbered");
        w.set("new", "never lands");
        Err::<(), _>(Error::Break)
    });
    assert!(result.is_err());

    assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
    db.read(|r| {
        assert_eq!(r.get(b"kept")?, Some(b"original".to_vec()));
        assert!(!r.has(b"new"));
        Ok(())
    })
    .unwrap();
}

#[test]
fn reads_inside_write_transaction_see_pre_transaction_state() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("rw.db")).unwrap();

    db.read_write(|_r, w| {
        w.set("k", "v");
        Ok(())
    })
    .unwrap();

    db.read_write(|r, w| {
        // Buffered operations are not visible until commit.
        w.set("k", "updated");
        assert_eq!(r.get(b"k")?, Some(b"v".to_vec()));
        Ok(())
    })
    .unwrap();

    db.read(|r| {
        assert_eq!(r.get(b"k")?, Some(b"updated".to_vec()));
        Ok(())
    })
    .unwrap();
}

#[test]
fn break_sentinel_stops_walk_and_passes_through() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("break.db")).unwrap();

    db.read_write(|_r, w| {
        for key in ["a", "b", "c", "d"] {
            w.set(key, "v");
        }
        Ok(())
    })
    .unwrap();

    let mut seen = Vec::new();
    let result = db.read(|r| {
        r.walk(&WalkOptions::new(), |key| {
            seen.push(key.to_vec());
            if seen.len() == 2 {
                return Err(Error::Break);
            }
            Ok(())
        })
    });

    assert!(result.is_err_and(|e| e.is_break()));
    assert_eq!(seen, [b"a", b"b"]);
}

#[test]
fn walk_with_value_reads_current_values() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("wwv.db")).unwrap();

    db.read_write(|_r, w| {
        w.set("a", "1");
        w.set("b", "stale");
        w.set("b", "2");
        Ok(())
    })
    .unwrap();

    let mut entries = Vec::new();
    db.read(|r| {
        r.walk_with_value(&WalkOptions::new(), |key, value| {
            entries.push((key.to_vec(), value.to_vec()));
            Ok(())
        })
    })
    .unwrap();

    assert_eq!(
        entries,
        [
            (b"a".to_vec(), b"1".to_vec()),
            (b"b".to_vec(), b"2".to_vec()),
        ]
    );
}

#[test]
fn missing_keys_are_not_errors() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("missing.db")).unwrap();

    db.read(|r| {
        assert_eq!(r.get(b"nothing")?, None);
        assert!(!r.has(b"nothing"));
        Ok(())
    })
    .unwrap();
}

#[test]
fn empty_key_and_empty_value_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.db");

    {
        let db = Database::open(&path).unwrap();
        db.read_write(|_r, w| {
            w.set("", "value under the empty key");
            w.set("empty-value", "");
            Ok(())
        })
        .unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    db.read(|r| {
        assert_eq!(r.get(b"")?, Some(b"value under the empty key".to_vec()));
        assert_eq!(r.get(b"empty-value")?, Some(Vec::new()));
        assert_eq!(r.count(), 2);
        Ok(())
    })
    .unwrap();
}

#[test]
fn stray_compacting_file_is_ignored_and_removed_at_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crash.db");

    {
        let db = Database::open(&path).unwrap();
        db.read_write(|_r, w| {
            w.set("survivor", "intact");
            Ok(())
        })
        .unwrap();
        db.close().unwrap();
    }

    // A crash mid-compaction leaves a scratch file; its content must not
    // matter because the rename never happened.
    let scratch = scratch_path(&path);
    fs::write(&scratch, b"half-written garbage that is not a row log").unwrap();

    let db = Database::open(&path).unwrap();
    assert!(!scratch.exists());
    db.read(|r| {
        assert_eq!(r.get(b"survivor")?, Some(b"intact".to_vec()));
        assert_eq!(r.count(), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn compaction_replaces_the_scratch_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("swap.db");
    let db = Database::open(&path).unwrap();

    db.read_write(|_r, w| {
        w.set("a", "1");
        w.delete("a");
        w.set("b", "2");
        Ok(())
    })
    .unwrap();

    db.compact().unwrap();
    assert!(!scratch_path(&path).exists());
    assert!(path.exists());
}

#[test]
fn copy_to_mirrors_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("backup.db");
    let db = Database::open(&path).unwrap();

    db.read_write(|_r, w| {
        w.set("a", "1");
        w.set("b", "2");
        Ok(())
    })
    .unwrap();

    let mut sink = Vec::new();
    let copied = db.copy_to(&mut sink).unwrap();

    assert_eq!(copied, fs::metadata(&path).unwrap().len());
    assert_eq!(sink, fs::read(&path).unwrap());
}

#[test]
fn path_reports_the_opened_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("named.db");
    let db = Database::open(&path).unwrap();
    assert_eq!(db.path(), path);
}

fn scratch_path(path: &Path) -> std::path::PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(COMPACTING_SUFFIX);
    std::path::PathBuf::from(os)
}
