//! End-to-end readiness scenario through the workspace.

use std::sync::Arc;

use charter_agent::MockBackend;
use competency::RagStatus;
use evidence::{CharterWorkspace, EvidenceError, EvidenceEvent, MemoryStore};

const GREEN: &str = r#"{"ragStatus":"Green","feedback":"Strong, specific evidence."}"#;
const RED: &str = r#"{"ragStatus":"Red","feedback":"Not related to this competency."}"#;

#[tokio::test]
async fn test_readiness_follows_coverage_and_red_items() {
    let backend = Arc::new(MockBackend::default().with_response(GREEN));
    let workspace = CharterWorkspace::open(Arc::new(MemoryStore::new()), backend.clone())
        .await
        .unwrap();
    workspace.login("alex@example.com").await.unwrap();

    let codes: Vec<String> = workspace
        .catalog()
        .sub_competencies()
        .iter()
        .map(|sub| sub.code.clone())
        .collect();
    assert_eq!(workspace.catalog().areas().len(), 5);

    for code in &codes {
        let submission = workspace
            .submit_text_evidence(code, &format!("Evidence for {}", code))
            .await
            .unwrap();
        assert_eq!(submission.item.rag_status, RagStatus::Green);
    }

    let readiness = workspace.readiness().await;
    assert!(readiness.is_ready_to_generate_full_application);
    assert_eq!(readiness.total_red_items, 0);

    let mut events = workspace.evidence().subscribe();
    backend.push_response(RED);
    let red = workspace
        .submit_text_evidence(&codes[3], "Organised the office party")
        .await
        .unwrap();
    assert_eq!(red.item.rag_status, RagStatus::Red);

    let readiness = workspace.readiness().await;
    assert!(!readiness.is_ready_to_generate_full_application);
    assert_eq!(readiness.total_red_items, 1);
    assert!(matches!(
        workspace.draft_full_application().await,
        Err(EvidenceError::NotReady { red_items: 1, .. })
    ));

    let removed = workspace
        .remove_evidence(&codes[3], &red.item.id)
        .await
        .unwrap();
    assert!(removed.is_some());
    assert!(workspace.readiness().await.is_ready_to_generate_full_application);

    let seen: Vec<EvidenceEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(matches!(seen.first(), Some(EvidenceEvent::Added { .. })));
    assert!(matches!(seen.last(), Some(EvidenceEvent::Removed { .. })));
    assert!(seen.windows(2).all(|w| w[0].version() < w[1].version()));
}

#[tokio::test]
async fn test_full_application_draft_once_ready() {
    let backend = Arc::new(MockBackend::default().with_response(GREEN));
    let workspace = CharterWorkspace::open(Arc::new(MemoryStore::new()), backend.clone())
        .await
        .unwrap();
    workspace.login("alex@example.com").await.unwrap();

    let codes: Vec<String> = workspace
        .catalog()
        .sub_competencies()
        .iter()
        .map(|sub| sub.code.clone())
        .collect();
    for code in &codes {
        workspace.submit_text_evidence(code, "Delivered the work").await.unwrap();
    }

    let calls_before = backend.call_count();
    let draft = workspace.draft_full_application().await.unwrap();

    assert_eq!(backend.call_count() - calls_before, 5);
    assert_eq!(draft.areas.len(), 5);
    assert_eq!(draft.failed_areas().count(), 0);
    assert!(draft.to_html().starts_with("<h1>Chartered Engineer Application Draft</h1>"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_on_one_code() {
    let backend = Arc::new(MockBackend::default().with_response(GREEN));
    let workspace = Arc::new(
        CharterWorkspace::open(Arc::new(MemoryStore::new()), backend.clone())
            .await
            .unwrap(),
    );
    workspace.login("alex@example.com").await.unwrap();
    let version_before = workspace.evidence().version();
    let submissions = 20;

    let handles: Vec<_> = (0..submissions)
        .map(|n| {
            let workspace = workspace.clone();
            tokio::spawn(async move {
                workspace
                    .submit_text_evidence("A1", &format!("Module {} of the MSc", n))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = workspace.evidence_for("A1").await;
    assert_eq!(items.len(), submissions as usize);
    let ids: std::collections::HashSet<_> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids.len(), items.len());
    assert!(items.iter().all(|item| item.rag_status == RagStatus::Green));

    // one store and one assessment per submission
    assert_eq!(workspace.evidence().version() - version_before, 2 * submissions);
    assert_eq!(u64::from(backend.call_count()), submissions);
}
