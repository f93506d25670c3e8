//! Persistence across reopen

use crate::common::*;
use std::fs::OpenOptions;
use std::io::Write;

fn populate(vector: &VectorStore) {
    vector
        .create_collection("notes", Some(json!({"team": "infra"})))
        .unwrap();
    vector
        .add(
            "notes",
            AddRequest::new(["n1", "n2", "n3"])
                .embeddings(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]])
                .documents(["first", "second", "third"])
                .metadatas(vec![
                    Some(json!({"p": 1})),
                    Some(json!({"p": 2})),
                    Some(json!({"p": 3})),
                ]),
        )
        .unwrap();
}

#[test]
fn data_survives_reopen() {
    for mut test_db in [TestDb::new(), TestDb::new_strict()] {
        {
            let vector = test_db.vector();
            populate(&vector);
        }
        test_db.reopen();

        let vector = test_db.vector();
        let collection = vector.get_collection("notes").unwrap().unwrap();
        assert_eq!(collection.metadata, json!({"team": "infra"}));

        let got = vector.get("notes", GetRequest::all()).unwrap();
        assert_eq!(got.ids, vec!["n1", "n2", "n3"]);
        assert_eq!(got.embeddings.unwrap()[1], vec![0.0, 1.0, 0.0]);
        assert_eq!(got.metadatas.unwrap()[2], Some(json!({"p": 3})));
    }
}

#[test]
fn mutations_replay_in_order() {
    let mut test_db = TestDb::new();
    {
        let vector = test_db.vector();
        populate(&vector);
        vector
            .add(
                "notes",
                AddRequest::new(["n1"]).embeddings(vec![vec![1.0, 1.0, 0.0]]),
            )
            .unwrap();
        vector
            .update(
                "notes",
                UpdateRequest::new(["n2", "n3"]).metadatas(vec![None, Some(json!({"p": 30}))]),
            )
            .unwrap();
        vector.delete("notes", DeleteRequest::ids(["n2"])).unwrap();
    }
    test_db.reopen();

    let vector = test_db.vector();
    let got = vector.get("notes", GetRequest::all()).unwrap();
    assert_eq!(got.ids, vec!["n3", "n1"]);
    assert_eq!(got.metadatas.as_ref().unwrap()[0], Some(json!({"p": 30})));
    assert_eq!(got.metadatas.as_ref().unwrap()[1], None);
    assert_eq!(got.embeddings.unwrap()[1], vec![1.0, 1.0, 0.0]);
}

#[test]
fn cleared_metadata_stays_cleared() {
    let mut test_db = TestDb::new_strict();
    {
        let vector = test_db.vector();
        populate(&vector);
        vector
            .update("notes", UpdateRequest::new(["n1"]).metadatas(vec![None::<JsonValue>]))
            .unwrap();
    }
    test_db.reopen();

    let got = test_db
        .vector()
        .get("notes", GetRequest::ids(["n1"]))
        .unwrap();
    assert_eq!(got.metadatas, Some(vec![None]));
}

#[test]
fn deleted_collection_stays_deleted() {
    let mut test_db = TestDb::new();
    {
        let vector = test_db.vector();
        populate(&vector);
        vector.delete_collection("notes").unwrap();
        vector.create_collection("other", None).unwrap();
    }
    test_db.reopen();

    let vector = test_db.vector();
    assert!(vector.get_collection("notes").unwrap().is_none());
    let names: Vec<String> = vector
        .list_collections()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["other"]);
}

#[test]
fn query_after_reopen() {
    let mut test_db = TestDb::new();
    {
        let vector = test_db.vector();
        populate(&vector);
    }
    test_db.reopen();

    let result = test_db
        .vector()
        .query("notes", QueryRequest::embeddings(vec![vec![0.0, 0.9, 0.1]]).top_n(1))
        .unwrap();
    assert_eq!(result.ids, vec![vec!["n2"]]);
}

#[test]
fn torn_tail_loses_only_last_write() {
    let mut test_db = TestDb::new_strict();
    {
        let vector = test_db.vector();
        populate(&vector);
    }
    drop(std::mem::replace(&mut test_db.db, Database::ephemeral()));

    // A half-written record at the end of the log
    let mut log = OpenOptions::new()
        .append(true)
        .open(test_db.log_path())
        .unwrap();
    log.write_all(&[200, 0, 0, 0, 1, 0x92]).unwrap();
    drop(log);

    test_db.reopen();
    let vector = test_db.vector();
    assert_eq!(vector.count("notes").unwrap(), 3);

    // The store keeps accepting writes after recovery
    vector
        .add("notes", AddRequest::new(["n4"]).embeddings(vec![vec![1.0, 1.0, 1.0]]))
        .unwrap();
    drop(vector);
    test_db.reopen();
    assert_eq!(test_db.vector().count("notes").unwrap(), 4);
}

#[test]
fn second_open_is_rejected_while_in_use() {
    let test_db = TestDb::new();
    let err = Database::open(test_db.db_path()).unwrap_err();
    assert!(err.to_string().contains("already in use"));
}

#[test]
fn config_file_is_written_and_honoured() {
    let dir = tempfile::tempdir().unwrap();
    {
        let _db = Database::open_with_config(dir.path(), always_config()).unwrap();
    }
    let text = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(text.contains("always"));

    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.config().durability, "always");
}

#[test]
fn flush_is_available_in_every_mode() {
    for (mode, vector, _dir) in all_mode_stores() {
        vector.create_collection("c", None).unwrap();
        add_points(&vector, "c", &[("1", [1.0, 2.0])]);
        vector.database().flush().unwrap_or_else(|e| panic!("{}: {}", mode, e));
    }
}
