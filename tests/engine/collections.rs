//! Collection lifecycle tests

use crate::common::*;

#[test]
fn create_and_get_collection() {
    for (mode, vector, _dir) in all_mode_stores() {
        let created = vector
            .create_collection("articles", Some(json!({"owner": "search-team"})))
            .unwrap();
        assert_eq!(created.name, "articles", "{}", mode);

        let fetched = vector.get_collection("articles").unwrap().unwrap();
        assert_eq!(fetched, created, "{}", mode);
        assert_eq!(fetched.metadata, json!({"owner": "search-team"}));
    }
}

#[test]
fn create_defaults_metadata_to_empty_object() {
    let vector = ephemeral_vector();
    let created = vector.create_collection("plain", None).unwrap();
    assert_eq!(created.metadata, json!({}));
}

#[test]
fn create_duplicate_fails() {
    let vector = ephemeral_vector();
    vector.create_collection("dup", None).unwrap();

    let err = vector.create_collection("dup", None).unwrap_err();
    assert!(err.is_already_exists());
    assert!(matches!(err, VectorError::CollectionAlreadyExists { .. }));
}

#[test]
fn invalid_names_are_rejected() {
    let vector = ephemeral_vector();
    for name in ["", "a/b", "_system", "nul\0byte"] {
        let err = vector.create_collection(name, None).unwrap_err();
        assert!(err.is_invalid_argument(), "name {:?}", name);
    }
    assert!(vector.list_collections().unwrap().is_empty());
}

#[test]
fn non_object_metadata_is_rejected() {
    let vector = ephemeral_vector();
    let err = vector
        .create_collection("meta", Some(json!([1, 2, 3])))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(!vector.collection_exists("meta").unwrap());
}

#[test]
fn get_or_create_is_idempotent() {
    let vector = ephemeral_vector();
    let first = vector
        .get_or_create_collection("shared", Some(json!({"v": 1})))
        .unwrap();
    let second = vector
        .get_or_create_collection("shared", Some(json!({"v": 2})))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.metadata, json!({"v": 1}));
    assert_eq!(vector.list_collections().unwrap().len(), 1);
}

#[test]
fn list_collections_returns_all() {
    let vector = ephemeral_vector();
    vector.create_collection("coll_a", None).unwrap();
    vector.create_collection("coll_b", None).unwrap();

    let names: Vec<String> = vector
        .list_collections()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"coll_a".to_string()));
    assert!(names.contains(&"coll_b".to_string()));
}

#[test]
fn delete_collection_removes_items() {
    let vector = ephemeral_vector();
    vector.create_collection("gone", None).unwrap();
    add_points(&vector, "gone", &[("1", [1.0, 0.0]), ("2", [0.0, 1.0])]);

    vector.delete_collection("gone").unwrap();
    assert!(vector.get_collection("gone").unwrap().is_none());
    assert!(vector.count("gone").unwrap_err().is_not_found());

    // Recreating starts empty
    vector.create_collection("gone", None).unwrap();
    assert_eq!(vector.count("gone").unwrap(), 0);
}

#[test]
fn delete_missing_collection_fails() {
    let vector = ephemeral_vector();
    let err = vector.delete_collection("never").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn collections_are_isolated() {
    let vector = ephemeral_vector();
    vector.create_collection("left", None).unwrap();
    vector.create_collection("right", None).unwrap();
    add_points(&vector, "left", &[("same-id", [1.0, 0.0])]);
    add_points(&vector, "right", &[("same-id", [0.0, 1.0])]);

    vector.delete("left", DeleteRequest::all()).unwrap();

    assert_eq!(vector.count("left").unwrap(), 0);
    let right = vector.get("right", GetRequest::all()).unwrap();
    assert_eq!(right.embeddings, Some(vec![vec![0.0, 1.0]]));
}

#[test]
fn handles_over_one_database_share_state() {
    let test_db = TestDb::new();
    let writer = test_db.vector();
    let reader = test_db.vector();

    writer.create_collection("shared", None).unwrap();
    add_points(&writer, "shared", &[("1", [1.0, 1.0])]);

    assert!(reader.collection_exists("shared").unwrap());
    assert_eq!(reader.count("shared").unwrap(), 1);
}
