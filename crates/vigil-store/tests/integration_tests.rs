//! Integration tests for vigil-store
//!
//! Both stores are driven through the `VerdictStore` trait object so the
//! same expectations hold for each backend.

use std::sync::Arc;
use vigil_domain::traits::VerdictStore;
use vigil_domain::{Alternative, DomainName, TrustScore, Verdict, VerdictRecord};
use vigil_store::{MemoryStore, SqliteStore};

fn domain(s: &str) -> DomainName {
    DomainName::new(s).unwrap()
}

fn unsafe_record(name: &str, classified_at: u64) -> VerdictRecord {
    VerdictRecord::new(
        domain(name),
        Verdict::Unsafe,
        TrustScore::clamped(3),
        vec![
            Alternative {
                name: "duckduckgo.com".to_string(),
                url: "https://duckduckgo.com".to_string(),
                explanation: Some("Private search".to_string()),
                privacy_policy: Some("https://duckduckgo.com/privacy".to_string()),
                terms_and_conditions: None,
            },
            Alternative::new("startpage.com", "https://startpage.com"),
        ],
        r#"{"status":"success","is_safe":false}"#,
        classified_at,
    )
}

fn stores() -> Vec<(&'static str, Arc<dyn VerdictStore>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new())),
        ("sqlite", Arc::new(SqliteStore::in_memory().unwrap())),
    ]
}

#[tokio::test]
async fn test_put_then_get_returns_whole_record() {
    for (name, store) in stores() {
        let record = unsafe_record("tracker.example", 1_000);
        store.put(record.clone()).await.unwrap();

        let got = store.get(&domain("tracker.example")).await.unwrap();
        assert_eq!(got, Some(record), "{} store should return the stored record", name);
    }
}

#[tokio::test]
async fn test_absent_domain_is_none() {
    for (name, store) in stores() {
        let got = store.get(&domain("never-seen.example")).await.unwrap();
        assert!(got.is_none(), "{} store should miss", name);
    }
}

#[tokio::test]
async fn test_one_record_per_domain() {
    for (name, store) in stores() {
        store.put(unsafe_record("a.com", 1)).await.unwrap();
        store
            .put(VerdictRecord::new(
                domain("a.com"),
                Verdict::Safe,
                TrustScore::clamped(9),
                vec![],
                "{}",
                2,
            ))
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 1, "{} store should hold one row", name);
        let got = store.get(&domain("a.com")).await.unwrap().unwrap();
        assert_eq!(got.verdict, Verdict::Safe, "{} store should keep the last write", name);
        assert!(got.alternatives.is_empty());
    }
}

#[tokio::test]
async fn test_evict_clear_and_purge() {
    for (name, store) in stores() {
        store.put(unsafe_record("old.com", 100)).await.unwrap();
        store.put(unsafe_record("mid.com", 200)).await.unwrap();
        store.put(unsafe_record("new.com", 300)).await.unwrap();

        assert_eq!(store.purge_older_than(200).await.unwrap(), 1, "{}", name);
        assert!(store.get(&domain("old.com")).await.unwrap().is_none());

        assert!(store.evict(&domain("mid.com")).await.unwrap(), "{}", name);
        assert!(!store.evict(&domain("mid.com")).await.unwrap(), "{}", name);

        assert_eq!(store.clear().await.unwrap(), 1, "{}", name);
        assert!(store.is_empty().await.unwrap());
    }
}

#[tokio::test]
async fn test_sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdicts.db");

    {
        let store = SqliteStore::new(&path).unwrap();
        store.put(unsafe_record("persisted.example", 42)).await.unwrap();
    }

    let reopened = SqliteStore::new(&path).unwrap();
    let got = reopened.get(&domain("persisted.example")).await.unwrap().unwrap();
    assert_eq!(got.classified_at, 42);
    assert_eq!(got.alternatives.len(), 2);
    assert_eq!(got.alternatives[0].explanation.as_deref(), Some("Private search"));
}

#[tokio::test]
async fn test_concurrent_puts_same_domain_leave_one_record() {
    for (name, store) in stores() {
        let mut handles = Vec::new();
        for i in 0..8u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.put(unsafe_record("race.example", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 1, "{}", name);
        let got = store.get(&domain("race.example")).await.unwrap().unwrap();
        assert!(got.classified_at < 8);
    }
}
