//! Similarity query tests

use crate::common::*;

fn compass() -> VectorStore {
    let vector = ephemeral_vector();
    vector.create_collection("compass", None).unwrap();
    vector
        .add(
            "compass",
            AddRequest::new(["north", "east", "south", "west", "north-east"])
                .embeddings(vec![
                    vec![0.0, 1.0],
                    vec![1.0, 0.0],
                    vec![0.0, -1.0],
                    vec![-1.0, 0.0],
                    vec![1.0, 1.0],
                ])
                .documents(["up", "right", "down", "left", "diagonal"])
                .metadatas(vec![
                    json!({"axis": "y"}),
                    json!({"axis": "x"}),
                    json!({"axis": "y"}),
                    json!({"axis": "x"}),
                    json!({"axis": "xy"}),
                ]),
        )
        .unwrap();
    vector
}

#[test]
fn nearest_neighbours_in_distance_order() {
    let vector = compass();
    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![0.9, 0.1]]).top_n(3))
        .unwrap();

    assert_eq!(result.ids, vec![vec!["east", "north-east", "north"]]);
    let distances = &result.distances.as_ref().unwrap()[0];
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| (0.0..=2.0).contains(d)));
}

#[test]
fn opposite_vector_is_farthest() {
    let vector = compass();
    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![0.0, 1.0]]))
        .unwrap();
    let ids = &result.ids[0];
    assert_eq!(ids.first().map(String::as_str), Some("north"));
    assert_eq!(ids.last().map(String::as_str), Some("south"));
    let last = *result.distances.unwrap()[0].last().unwrap();
    assert!((last - 2.0).abs() < 1e-6);
}

#[test]
fn top_n_larger_than_collection() {
    let vector = compass();
    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(100))
        .unwrap();
    assert_eq!(result.ids[0].len(), 5);
}

#[test]
fn default_include_returns_everything() {
    let vector = compass();
    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(1))
        .unwrap();
    assert_eq!(result.embeddings, Some(vec![vec![vec![1.0, 0.0]]]));
    assert_eq!(result.documents, Some(vec![vec![Some("right".to_string())]]));
    assert_eq!(result.metadatas, Some(vec![vec![Some(json!({"axis": "x"}))]]));
    assert!(result.distances.is_some());
}

#[test]
fn include_selects_fields() {
    let vector = compass();
    let include = Include::from_names(&["documents"]).unwrap();
    let result = vector
        .query(
            "compass",
            QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(1).include(include),
        )
        .unwrap();
    assert_eq!(result.ids, vec![vec!["east"]]);
    assert!(result.documents.is_some());
    assert!(result.embeddings.is_none());
    assert!(result.metadatas.is_none());
    assert!(result.distances.is_none());
}

#[test]
fn multiple_query_vectors() {
    let vector = compass();
    let result = vector
        .query(
            "compass",
            QueryRequest::embeddings(vec![vec![0.0, 1.0], vec![-1.0, 0.0]]).top_n(1),
        )
        .unwrap();
    assert_eq!(result.num_queries(), 2);
    assert_eq!(result.ids, vec![vec!["north"], vec!["west"]]);
}

#[test]
fn filters_apply_before_top_n() {
    let vector = compass();
    let result = vector
        .query(
            "compass",
            QueryRequest::embeddings(vec![vec![1.0, 0.0]])
                .top_n(2)
                .where_metadata(MetadataFilter::new().eq("axis", "y")),
        )
        .unwrap();
    assert_eq!(result.ids[0].len(), 2);
    assert!(result.ids[0].iter().all(|id| id == "north" || id == "south"));

    let result = vector
        .query(
            "compass",
            QueryRequest::embeddings(vec![vec![1.0, 0.0]])
                .where_document(DocumentFilter::new().not_contains("i")),
        )
        .unwrap();
    assert_eq!(result.ids[0], vec!["north", "south", "west"]);
}

#[test]
fn query_by_text_uses_embedding_function() {
    let vector = ephemeral_vector().with_embedding_function(letter_embedder);
    vector.create_collection("letters", None).unwrap();
    vector
        .add("letters", AddRequest::new(["aaa", "ddd"]).documents(["aaa", "ddd"]))
        .unwrap();

    let result = vector
        .query("letters", QueryRequest::texts(["a"]).top_n(1))
        .unwrap();
    assert_eq!(result.ids, vec![vec!["aaa"]]);
}

#[test]
fn mismatched_dimensions_are_skipped() {
    let vector = compass();
    vector
        .add("compass", AddRequest::new(["up-3d"]).embeddings(vec![vec![0.0, 1.0, 0.0]]))
        .unwrap();

    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![0.0, 1.0, 0.0]]))
        .unwrap();
    assert_eq!(result.ids, vec![vec!["up-3d"]]);

    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![0.0, 1.0]]))
        .unwrap();
    assert_eq!(result.ids[0].len(), 5);
}

#[test]
fn zero_vector_is_distance_one() {
    let vector = ephemeral_vector();
    vector.create_collection("zeros", None).unwrap();
    add_points(&vector, "zeros", &[("zero", [0.0, 0.0])]);

    let result = vector
        .query("zeros", QueryRequest::embeddings(vec![vec![1.0, 0.0]]))
        .unwrap();
    assert_eq!(result.distances, Some(vec![vec![1.0]]));
}

#[test]
fn query_reflects_latest_writes() {
    let vector = compass();
    vector.delete("compass", DeleteRequest::ids(["east"])).unwrap();
    vector
        .update(
            "compass",
            UpdateRequest::new(["west"]).embeddings(vec![vec![1.0, 0.0]]),
        )
        .unwrap();

    let result = vector
        .query("compass", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(1))
        .unwrap();
    assert_eq!(result.ids, vec![vec!["west"]]);
}

#[test]
fn large_collection_uses_same_ranking() {
    let test_db = TestDb::new();
    let vector = test_db.vector();
    vector.create_collection("big", None).unwrap();

    let count = test_db.db.config().vector.parallel_scan_threshold + 100;
    let ids: Vec<String> = (0..count).map(|i| format!("v{:05}", i)).collect();
    let embeddings: Vec<Vec<f32>> = (0..count)
        .map(|i| {
            if i == 0 {
                return vec![1.0, 0.0];
            }
            let angle = 0.1 + i as f32 * 0.0005;
            vec![angle.cos(), angle.sin()]
        })
        .collect();
    vector
        .add("big", AddRequest::new(ids).embeddings(embeddings))
        .unwrap();

    let result = vector
        .query("big", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(3))
        .unwrap();
    assert_eq!(result.ids[0][0], "v00000");
    assert_eq!(result.ids[0].len(), 3);
    let distances = &result.distances.unwrap()[0];
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn docs_collection_example() {
    let vector = ephemeral_vector();
    vector.create_collection("docs", None).unwrap();
    vector
        .add(
            "docs",
            AddRequest::new(["1", "2"])
                .embeddings(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
                .documents(["alpha", "beta"]),
        )
        .unwrap();

    let result = vector
        .query("docs", QueryRequest::embeddings(vec![vec![1.0, 0.0]]).top_n(1))
        .unwrap();
    assert_eq!(result.ids, vec![vec!["1"]]);
    assert_eq!(result.distances, Some(vec![vec![0.0]]));
}

#[test]
fn identical_vectors_rank_first_in_scan_order() {
    let vector = ephemeral_vector();
    vector.create_collection("twins", None).unwrap();
    add_points(
        &vector,
        "twins",
        &[("other", [0.3, 0.7]), ("twin-a", [2.0, 1.0]), ("twin-b", [2.0, 1.0])],
    );

    let result = vector
        .query("twins", QueryRequest::embeddings(vec![vec![2.0, 1.0]]))
        .unwrap();
    assert_eq!(result.ids[0], vec!["twin-a", "twin-b", "other"]);
}

#[test]
fn query_missing_collection_is_not_found() {
    let vector = ephemeral_vector();
    let err = vector
        .query("absent", QueryRequest::embeddings(vec![vec![1.0]]))
        .unwrap_err();
    assert!(err.is_not_found());
}
