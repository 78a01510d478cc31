//! Lifecycle tests: create/update/pause/unpause/stop/cleanup transitions,
//! their workflow-engine calls, and the persist-first ordering guarantees.

mod common;

use common::{seed_configuration, TestHarness, WorkflowCall};
use webcrawler_connector::storage::ConnectorStore;
use webcrawler_connector::types::{ConnectorId, HEADER_REDACTED_VALUE, WEBCRAWLER_MAX_PAGES};
use webcrawler_connector::ConnectorError;

#[tokio::test]
async fn create_launches_workflow_and_starts_with_empty_hierarchy() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    assert_eq!(
        harness.workflow.calls(),
        vec![WorkflowCall::Launch(connector_id)]
    );

    // Nothing crawled yet: the root listing is empty, not an error.
    let nodes = harness
        .connector
        .retrieve_permissions(connector_id, None)
        .await
        .unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn create_rejects_invalid_depth_without_persisting() {
    let harness = TestHarness::new();
    let mut configuration = seed_configuration();
    configuration.depth = 7;

    let result = harness
        .connector
        .create(
            common::data_source(),
            "connection-1".to_string(),
            configuration,
        )
        .await;

    assert!(matches!(
        result,
        Err(ConnectorError::InvalidConfiguration(_))
    ));
    // Validation precedes persistence and the launch call.
    assert!(harness.workflow.calls().is_empty());
}

#[tokio::test]
async fn create_launch_failure_surfaces_but_keeps_rows() {
    let harness = TestHarness::new();
    harness.workflow.fail_launch(true);

    let result = harness
        .connector
        .create(
            common::data_source(),
            "connection-1".to_string(),
            seed_configuration(),
        )
        .await;
    assert!(matches!(result, Err(ConnectorError::Workflow(_))));

    // The connector and configuration were committed before the launch; the
    // recorded launch call tells us the id that was assigned.
    let calls = harness.workflow.calls();
    let Some(WorkflowCall::Launch(connector_id)) = calls.first().copied() else {
        panic!("expected a launch attempt, got {calls:?}");
    };
    assert!(harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .is_some());
    assert!(harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .is_some());

    // Recovery path: unpause re-issues the launch.
    harness.workflow.fail_launch(false);
    harness.connector.unpause(connector_id).await.unwrap();
    assert_eq!(
        harness.workflow.calls().last().copied(),
        Some(WorkflowCall::Launch(connector_id))
    );
}

#[tokio::test]
async fn set_configuration_restarts_workflow() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    let mut configuration = seed_configuration();
    configuration.max_page_to_crawl = 64;
    configuration.depth = 1;
    harness
        .connector
        .set_configuration(connector_id, configuration)
        .await
        .unwrap();

    let stored = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.max_page_to_crawl, 64);
    assert_eq!(stored.depth, 1);

    assert_eq!(
        harness.workflow.calls(),
        vec![
            WorkflowCall::Launch(connector_id),
            WorkflowCall::Stop(connector_id),
            WorkflowCall::Launch(connector_id),
        ]
    );
}

#[tokio::test]
async fn set_configuration_rejects_page_budget_over_maximum() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    let mut configuration = seed_configuration();
    configuration.max_page_to_crawl = WEBCRAWLER_MAX_PAGES + 1;
    let result = harness
        .connector
        .set_configuration(connector_id, configuration)
        .await;
    assert!(matches!(
        result,
        Err(ConnectorError::InvalidConfiguration(_))
    ));

    // Stored configuration is untouched and no restart happened.
    let stored = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.max_page_to_crawl, seed_configuration().max_page_to_crawl);
    assert_eq!(
        harness.workflow.calls(),
        vec![WorkflowCall::Launch(connector_id)]
    );
}

#[tokio::test]
async fn set_configuration_for_unknown_connector_is_not_found() {
    let harness = TestHarness::new();
    let result = harness
        .connector
        .set_configuration(ConnectorId::new(), seed_configuration())
        .await;
    assert!(matches!(result, Err(ConnectorError::ConnectorNotFound(_))));
}

#[tokio::test]
async fn header_redaction_round_trip_preserves_stored_values() {
    let harness = TestHarness::new();
    let mut configuration = seed_configuration();
    configuration
        .headers
        .insert("authorization".to_string(), "Bearer secret".to_string());
    let (connector_id, _) = harness.create_connector_with(configuration).await;

    // Echoed configuration carries the sentinel, never the real value.
    let echoed = harness.connector.configuration(connector_id).await.unwrap();
    assert_eq!(
        echoed.headers.get("authorization").map(String::as_str),
        Some(HEADER_REDACTED_VALUE)
    );

    // Feeding the sentinel back preserves the stored value.
    let mut update = seed_configuration();
    update.headers = echoed.headers.clone();
    update
        .headers
        .insert("x-new".to_string(), "fresh".to_string());
    harness
        .connector
        .set_configuration(connector_id, update)
        .await
        .unwrap();

    let stored = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.headers.get("authorization").map(String::as_str),
        Some("Bearer secret")
    );
    assert_eq!(stored.headers.get("x-new").map(String::as_str), Some("fresh"));

    // A header omitted from the update is dropped entirely.
    let update = seed_configuration();
    harness
        .connector
        .set_configuration(connector_id, update)
        .await
        .unwrap();
    let stored = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.headers.is_empty());
}

#[tokio::test]
async fn pause_persists_flag_then_stops_workflow() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    harness.connector.pause(connector_id).await.unwrap();

    let connector = harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(connector.paused);
    assert_eq!(
        harness.workflow.calls(),
        vec![
            WorkflowCall::Launch(connector_id),
            WorkflowCall::Stop(connector_id),
        ]
    );

    harness.connector.unpause(connector_id).await.unwrap();
    let connector = harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!connector.paused);
    assert_eq!(
        harness.workflow.calls().last().copied(),
        Some(WorkflowCall::Launch(connector_id))
    );
}

#[tokio::test]
async fn stop_does_not_touch_pause_state() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    harness.connector.stop(connector_id).await.unwrap();

    let connector = harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!connector.paused);
    assert_eq!(
        harness.workflow.calls().last().copied(),
        Some(WorkflowCall::Stop(connector_id))
    );
}

#[tokio::test]
async fn pause_surfaces_workflow_stop_failure() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;
    harness.workflow.fail_stop(true);

    let result = harness.connector.pause(connector_id).await;
    assert!(matches!(result, Err(ConnectorError::Workflow(_))));

    // Persisted state is authoritative even though the stop failed.
    let connector = harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(connector.paused);
}

#[tokio::test]
async fn mark_crawl_complete_stamps_the_configuration() {
    let harness = TestHarness::new();
    let (connector_id, _) = harness.create_connector().await;

    let before = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(before.last_crawled_at.is_none());

    webcrawler_connector::activities::mark_crawl_complete(harness.store.as_ref(), connector_id)
        .await
        .unwrap();

    let after = harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .unwrap();
    assert!(after.last_crawled_at.is_some());
}

#[tokio::test]
async fn cleanup_deletes_everything_even_when_stop_fails() {
    let harness = TestHarness::new();
    let (connector_id, configuration_id) = harness.create_connector().await;
    webcrawler_connector::activities::record_page(
        harness.store.as_ref(),
        connector_id,
        configuration_id,
        "https://example.com/docs/intro",
        Some("Intro"),
    )
    .await
    .unwrap();

    harness.workflow.fail_stop(true);
    harness.connector.cleanup(connector_id).await.unwrap();

    assert!(harness
        .store
        .fetch_connector(connector_id)
        .await
        .unwrap()
        .is_none());
    assert!(harness
        .store
        .fetch_configuration(connector_id)
        .await
        .unwrap()
        .is_none());

    // The connector is gone for every read-side operation.
    let result = harness
        .connector
        .retrieve_permissions(connector_id, None)
        .await;
    assert!(matches!(result, Err(ConnectorError::ConnectorNotFound(_))));
}
