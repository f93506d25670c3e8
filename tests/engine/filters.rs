//! Metadata and document filter tests through get()

use crate::common::*;

fn catalog() -> VectorStore {
    let vector = ephemeral_vector();
    vector.create_collection("catalog", None).unwrap();
    vector
        .add(
            "catalog",
            AddRequest::new(["p1", "p2", "p3", "p4", "p5"])
                .embeddings(vec![vec![1.0, 0.0]; 5])
                .documents([
                    "Rust in Action",
                    "Programming Rust",
                    "The Go Programming Language",
                    "Python Crash Course",
                    "Untitled",
                ])
                .metadatas(vec![
                    Some(json!({"lang": "rust", "year": 2021, "price": 39.5})),
                    Some(json!({"lang": "rust", "year": 2017, "price": 49})),
                    Some(json!({"lang": "go", "year": 2015, "price": 35})),
                    Some(json!({"lang": "python", "year": 2019})),
                    None,
                ]),
        )
        .unwrap();
    vector
}

fn ids_where(vector: &VectorStore, filter: JsonValue) -> Vec<String> {
    let filter = MetadataFilter::parse(&filter).unwrap();
    vector
        .get("catalog", GetRequest::all().where_metadata(filter))
        .unwrap()
        .ids
}

fn ids_where_document(vector: &VectorStore, filter: JsonValue) -> Vec<String> {
    let filter = DocumentFilter::parse(&filter).unwrap();
    vector
        .get("catalog", GetRequest::all().where_document(filter))
        .unwrap()
        .ids
}

#[test]
fn implicit_equality() {
    let vector = catalog();
    assert_eq!(ids_where(&vector, json!({"lang": "rust"})), vec!["p1", "p2"]);
    assert_eq!(ids_where(&vector, json!({"lang": "rust", "year": 2017})), vec!["p2"]);
}

#[test]
fn comparison_operators() {
    let vector = catalog();
    assert_eq!(ids_where(&vector, json!({"year": {"$gt": 2017}})), vec!["p1", "p4"]);
    assert_eq!(ids_where(&vector, json!({"year": {"$gte": 2017}})), vec!["p1", "p2", "p4"]);
    assert_eq!(ids_where(&vector, json!({"year": {"$lt": 2017}})), vec!["p3"]);
    assert_eq!(
        ids_where(&vector, json!({"year": {"$gte": 2015, "$lte": 2019}})),
        vec!["p2", "p3", "p4"]
    );
}

#[test]
fn numbers_compare_by_value() {
    let vector = catalog();
    assert_eq!(ids_where(&vector, json!({"price": 49.0})), vec!["p2"]);
    assert_eq!(ids_where(&vector, json!({"price": {"$lt": 40}})), vec!["p1", "p3"]);
}

#[test]
fn missing_fields_only_satisfy_negations() {
    let vector = catalog();
    assert_eq!(
        ids_where(&vector, json!({"price": {"$ne": 35}})),
        vec!["p1", "p2", "p4", "p5"]
    );
    assert_eq!(
        ids_where(&vector, json!({"lang": {"$nin": ["rust", "go"]}})),
        vec!["p4", "p5"]
    );
    assert!(ids_where(&vector, json!({"price": {"$gt": 0}})).len() == 3);
}

#[test]
fn membership_operators() {
    let vector = catalog();
    assert_eq!(
        ids_where(&vector, json!({"lang": {"$in": ["go", "python"]}})),
        vec!["p3", "p4"]
    );
}

#[test]
fn ordering_across_types_never_holds() {
    let vector = catalog();
    assert!(ids_where(&vector, json!({"lang": {"$gt": 5}})).is_empty());
    assert!(ids_where(&vector, json!({"year": {"$lt": "3000"}})).is_empty());
}

#[test]
fn logical_operators() {
    let vector = catalog();
    assert_eq!(
        ids_where(
            &vector,
            json!({"$or": [{"lang": "go"}, {"year": {"$gte": 2021}}]})
        ),
        vec!["p1", "p3"]
    );
    assert_eq!(
        ids_where(
            &vector,
            json!({"$and": [{"lang": "rust"}, {"price": {"$gt": 40}}]})
        ),
        vec!["p2"]
    );
    assert_eq!(
        ids_where(
            &vector,
            json!({"lang": "rust", "$or": [{"year": 2015}, {"year": 2021}]})
        ),
        vec!["p1"]
    );
}

#[test]
fn empty_logical_lists() {
    let vector = catalog();
    assert_eq!(ids_where(&vector, json!({"$and": []})).len(), 5);
    assert!(ids_where(&vector, json!({"$or": []})).is_empty());
    assert_eq!(ids_where(&vector, json!({})).len(), 5);
}

#[test]
fn malformed_filters_are_rejected() {
    for filter in [
        json!({"year": {"$between": [1, 2]}}),
        json!({"lang": {"$in": "rust"}}),
        json!({"$or": {"lang": "rust"}}),
        json!(["lang", "rust"]),
    ] {
        let err = MetadataFilter::parse(&filter).unwrap_err();
        assert!(err.is_invalid_argument(), "{}", filter);
    }
    assert!(DocumentFilter::parse(&json!({"$regex": "R.*"}))
        .unwrap_err()
        .is_invalid_argument());
}

#[test]
fn document_contains() {
    let vector = catalog();
    assert_eq!(ids_where_document(&vector, json!({"$contains": "Rust"})), vec!["p1", "p2"]);
    assert!(ids_where_document(&vector, json!({"$contains": "rust"})).is_empty());
    assert_eq!(
        ids_where_document(&vector, json!({"$not_contains": "Programming"})),
        vec!["p1", "p4", "p5"]
    );
}

#[test]
fn metadata_and_document_filters_combine() {
    let vector = catalog();
    let got = vector
        .get(
            "catalog",
            GetRequest::all()
                .where_metadata(MetadataFilter::new().eq("lang", "rust"))
                .where_document(DocumentFilter::new().contains("Programming")),
        )
        .unwrap();
    assert_eq!(got.ids, vec!["p2"]);
}

#[test]
fn ids_then_filters() {
    let vector = catalog();
    let got = vector
        .get(
            "catalog",
            GetRequest::ids(["p1", "p3"]).where_metadata(MetadataFilter::new().eq("lang", "go")),
        )
        .unwrap();
    assert_eq!(got.ids, vec!["p3"]);
}

#[test]
fn and_or_over_two_fields() {
    let vector = ephemeral_vector();
    vector.create_collection("ab", None).unwrap();
    vector
        .add(
            "ab",
            AddRequest::new(["both", "only-a", "only-b", "neither"])
                .embeddings(vec![vec![1.0]; 4])
                .metadatas(vec![
                    json!({"a": 1, "b": 3}),
                    json!({"a": 1, "b": 2}),
                    json!({"a": 2, "b": 5}),
                    json!({"a": 0}),
                ]),
        )
        .unwrap();

    let get = |filter: JsonValue| {
        vector
            .get("ab", GetRequest::all().where_metadata(MetadataFilter::parse(&filter).unwrap()))
            .unwrap()
            .ids
    };
    assert_eq!(get(json!({"$and": [{"a": 1}, {"b": {"$gt": 2}}]})), vec!["both"]);
    assert_eq!(
        get(json!({"$or": [{"a": 1}, {"b": {"$gt": 2}}]})),
        vec!["both", "only-a", "only-b"]
    );
}

#[test]
fn contains_is_substring_match() {
    let vector = ephemeral_vector();
    vector.create_collection("words", None).unwrap();
    vector
        .add(
            "words",
            AddRequest::new(["1", "2"])
                .embeddings(vec![vec![1.0], vec![1.0]])
                .documents(["foobar", "bar"]),
        )
        .unwrap();
    let filter = DocumentFilter::parse(&json!({"$contains": "foo"})).unwrap();
    let got = vector
        .get("words", GetRequest::all().where_document(filter))
        .unwrap();
    assert_eq!(got.ids, vec!["1"]);
}
