// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Tests for SQLite-backed collections: upsert, query, delete and reload

use rag_ml_service::vector::store::DATABASE_FILE;
use rag_ml_service::vector::{DocumentRecord, Metadata, StoreError, VectorStore};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(test)]
mod collection_store_tests {
    use super::*;

    /// Helper: unit vector along `axis` with a small offset on the next axis
    fn axis_vector(axis: usize, dimensions: usize, offset: f32) -> Vec<f32> {
        let mut vector = vec![0.0; dimensions];
        vector[axis % dimensions] = 1.0;
        vector[(axis + 1) % dimensions] = offset;
        vector
    }

    fn record(id: &str, embedding: Vec<f32>) -> DocumentRecord {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!("test"));
        DocumentRecord {
            id: id.to_string(),
            document: format!("document {}", id),
            embedding,
            metadata,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_instance() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();

        let a = store.get_or_create_collection("news_articles").await.unwrap();
        let b = store.get_or_create_collection("news_articles").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "news_articles");
    }

    #[tokio::test]
    async fn test_invalid_collection_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();

        let result = store.get_or_create_collection("../outside").await;
        assert!(matches!(result, Err(StoreError::InvalidCollectionName(_))));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        collection
            .add(vec![record("a", axis_vector(0, 4, 0.0)), record("b", axis_vector(1, 4, 0.0))])
            .await
            .unwrap();
        let mut replacement = record("a", axis_vector(2, 4, 0.0));
        replacement.document = "replaced".to_string();
        collection.add(vec![replacement]).await.unwrap();

        assert_eq!(collection.count().await.unwrap(), 2);
        let stored = collection.get("a").await.unwrap().unwrap();
        assert_eq!(stored.document, "replaced");
        assert_eq!(stored.embedding, axis_vector(2, 4, 0.0));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        let result = collection
            .add(vec![record("a", axis_vector(0, 4, 0.0)), record("a", axis_vector(1, 4, 0.0))])
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == "a"));
        assert_eq!(collection.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dimension_fixed_by_first_add() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        collection.add(vec![record("a", axis_vector(0, 4, 0.0))]).await.unwrap();
        assert_eq!(collection.dimension().await.unwrap(), Some(4));

        let result = collection.add(vec![record("b", vec![1.0; 8])]).await;
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch { expected: 4, actual: 8, .. })
        ));

        let query = collection.query(&[1.0; 3], 1).await;
        assert!(query.is_err());
    }

    #[tokio::test]
    async fn test_non_finite_embedding_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        let result = collection
            .add(vec![record("nan", vec![f32::NAN, 0.0, 0.0, 1.0])])
            .await;
        assert!(matches!(result, Err(StoreError::NonFiniteEmbedding(_))));
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        collection
            .add(vec![
                record("near", axis_vector(0, 8, 0.1)),
                record("mid", axis_vector(0, 8, 1.0)),
                record("far", axis_vector(4, 8, 0.0)),
            ])
            .await
            .unwrap();

        let hits = collection.query(&axis_vector(0, 8, 0.0), 3).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!((hits[2].distance - 1.0).abs() < 1e-4);
        assert_eq!(hits[0].document, "document near");
        assert_eq!(hits[0].metadata["source"], "test");
    }

    #[tokio::test]
    async fn test_query_sees_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        collection.add(vec![record("a", axis_vector(0, 4, 0.0))]).await.unwrap();
        assert_eq!(collection.query(&axis_vector(1, 4, 0.0), 5).await.unwrap().len(), 1);

        collection.add(vec![record("b", axis_vector(1, 4, 0.0))]).await.unwrap();
        let hits = collection.query(&axis_vector(1, 4, 0.0), 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "b");

        collection.delete(&["b".to_string()]).await.unwrap();
        let hits = collection.query(&axis_vector(1, 4, 0.0), 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_delete_counts_removed_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        collection
            .add(vec![record("a", axis_vector(0, 4, 0.0)), record("b", axis_vector(1, 4, 0.0))])
            .await
            .unwrap();

        let removed = collection
            .delete(&["a".to_string(), "ghost".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(collection.count().await.unwrap(), 1);
        assert!(collection.get("a").await.unwrap().is_none());

        assert_eq!(collection.delete(&["ghost".to_string()]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reload_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = VectorStore::open(dir.path()).await.unwrap();
            let collection = store.get_or_create_collection("news_articles").await.unwrap();
            collection
                .add(vec![
                    record("a", axis_vector(0, 4, 0.0)),
                    record("b", axis_vector(1, 4, 0.0)),
                    record("c", axis_vector(2, 4, 0.0)),
                ])
                .await
                .unwrap();
            collection.delete(&["c".to_string()]).await.unwrap();
        }

        assert!(dir.path().join(DATABASE_FILE).exists());

        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("news_articles").await.unwrap();
        assert_eq!(collection.count().await.unwrap(), 2);
        assert_eq!(collection.dimension().await.unwrap(), Some(4));
        assert_eq!(collection.get("b").await.unwrap().unwrap().metadata["source"], "test");

        let hits = collection.query(&axis_vector(1, 4, 0.0), 1).await.unwrap();
        assert_eq!(hits[0].id, "b");
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let collection = collection.clone();
            handles.push(tokio::spawn(async move {
                collection
                    .add(vec![record(&format!("doc-{}", i), axis_vector(i, 16, 0.5))])
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(collection.count().await.unwrap(), 10);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_queries_leave_runtime_free() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path()).await.unwrap();
        let collection = store.get_or_create_collection("c").await.unwrap();

        let records = (0..2000)
            .map(|i| record(&format!("doc-{}", i), axis_vector(i, 64, 0.25)))
            .collect();
        collection.add(records).await.unwrap();

        // On a single-threaded runtime this task only runs if the query yields
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        tokio::spawn(async move {
            flag.store(true, Ordering::SeqCst);
        });

        let hits = collection.query(&axis_vector(3, 64, 0.0), 5).await.unwrap();
        assert_eq!(hits.len(), 5);
        assert!(ran.load(Ordering::SeqCst));
    }
}
