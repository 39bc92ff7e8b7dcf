//! End-to-end coordinator tests: dispositions, dedup, replacement, and the
//! delivery resilience scenarios.

mod common;

use std::time::Duration;

use common::{book_bytes, Harness, LIBRARY_CHAT, MATH_THREAD, OPERATOR_CHAT, PHYSICS_THREAD};
use folio_ingest::{
    identify_bytes, CatalogRepository, Error, IngestOutcome, MessageId, RejectReason, ReplyContext,
    ThreadId,
};

// =============================================================================
// Dispositions
// =============================================================================

#[tokio::test]
async fn test_new_upload_publishes_then_inserts() {
    let h = Harness::new().await;
    let bytes = book_bytes("Knuth: The Art of Computer Programming", 650);
    let event = h.upload("taocp.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let uploader_message = event.message;

    let outcome = h.coordinator.ingest(event).await.unwrap();

    let expected_id = identify_bytes(&bytes);
    let IngestOutcome::Published {
        content_id,
        canonical_ref,
    } = outcome
    else {
        panic!("expected Published, got {outcome:?}");
    };
    assert_eq!(content_id, expected_id);

    // Exactly one row, addressed by the published message.
    assert_eq!(h.row_count().await, 1);
    let entry = h
        .catalog
        .find_by_canonical(canonical_ref)
        .await
        .unwrap()
        .expect("entry behind canonical message");
    assert_eq!(entry.content_id, expected_id);
    assert_eq!(entry.category, "Mathematics");
    assert_eq!(entry.page_count, 650);
    assert_eq!(entry.title, "The Art of Computer Programming");
    assert_eq!(entry.authors, "Knuth");

    let published = h.transport.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].chat, LIBRARY_CHAT);
    assert_eq!(published[0].thread, MATH_THREAD);
    assert_eq!(published[0].file_name, "The Art of Computer Programming.pdf");
    assert!(published[0].caption.contains("<code>650</code>"));
    drop(published);

    // The uploader's own message was cleaned up.
    assert!(h
        .transport
        .deleted
        .lock()
        .unwrap()
        .contains(&(LIBRARY_CHAT, uploader_message)));
}

#[tokio::test]
async fn test_byte_identical_reupload_is_silent_duplicate() {
    let h = Harness::new().await;
    let bytes = book_bytes("Knuth: TAOCP", 650);

    let first = h.upload("taocp.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    h.coordinator.ingest(first).await.unwrap();
    assert_eq!(h.parser.call_count(), 1);

    // Same bytes, different file reference, different thread, different
    // reply context: only the content identity matters.
    let again = h.upload(
        "taocp-copy.pdf",
        &bytes,
        PHYSICS_THREAD,
        ReplyContext::TopicCreated,
    );
    let outcome = h.coordinator.ingest(again).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::Duplicate {
            content_id: identify_bytes(&bytes)
        }
    );
    assert_eq!(h.row_count().await, 1);
    assert_eq!(h.transport.publish_count(), 1, "no second publication");
    assert_eq!(
        h.parser.call_count(),
        1,
        "duplicates never reach the metadata parser"
    );
}

#[tokio::test]
async fn test_unmapped_thread_rejected_before_any_work() {
    let h = Harness::new().await;
    let bytes = book_bytes("Someone: Something", 10);
    let event = h.upload("stray.pdf", &bytes, ThreadId(9999), ReplyContext::TopicCreated);

    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::Rejected(RejectReason::UnknownCategory {
            thread: ThreadId(9999)
        })
    );
    assert_eq!(h.row_count().await, 0);
    assert_eq!(h.transport.publish_count(), 0);
    assert_eq!(h.parser.call_count(), 0);
}

#[tokio::test]
async fn test_missing_separator_rejected_and_uploader_notified() {
    let h = Harness::new().await;
    let bytes = book_bytes("A Title Without Any Separator", 100);
    let event = h.upload("untitled.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);

    let outcome = h.coordinator.ingest(event).await.unwrap();

    match outcome {
        IngestOutcome::Rejected(RejectReason::MalformedMetadata { file_name, .. }) => {
            assert_eq!(file_name, "untitled.pdf");
        }
        other => panic!("expected MalformedMetadata rejection, got {other:?}"),
    }

    // Catalog unchanged, nothing published, but the uploader was told.
    assert_eq!(h.row_count().await, 0);
    assert_eq!(h.transport.publish_count(), 0);
    let notices = h.transport.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, LIBRARY_CHAT);
    assert!(notices[0].2.contains("untitled.pdf"));
}

#[tokio::test]
async fn test_upload_from_non_operator_is_ignored() {
    let h = Harness::new().await;
    let bytes = book_bytes("Author: Title", 10);
    let mut event = h.upload("book.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    event.issuer = 42;

    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert_eq!(outcome, IngestOutcome::Ignored);
    assert_eq!(h.row_count().await, 0);
    assert_eq!(h.transport.publish_count(), 0);
    assert_eq!(h.parser.call_count(), 0);
    // Nothing was fetched or cleaned up either: the event is dropped whole.
    assert!(h.transport.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unhandled_reply_context_ignored() {
    let h = Harness::new().await;
    let bytes = book_bytes("Author: Title", 10);
    let event = h.upload("book.pdf", &bytes, MATH_THREAD, ReplyContext::Other);

    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert_eq!(outcome, IngestOutcome::Ignored);
    assert_eq!(h.row_count().await, 0);
    assert_eq!(h.transport.publish_count(), 0);
}

// =============================================================================
// Replacement
// =============================================================================

#[tokio::test]
async fn test_replacement_preserves_canonical_and_archives_old_copy() {
    let h = Harness::new().await;

    // First edition.
    let first_bytes = book_bytes("Stewart: Calculus", 1200);
    let event = h.upload("calculus.pdf", &first_bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let IngestOutcome::Published { canonical_ref, .. } =
        h.coordinator.ingest(event).await.unwrap()
    else {
        panic!("first upload should publish");
    };
    let old_entry = h
        .catalog
        .find_by_canonical(canonical_ref)
        .await
        .unwrap()
        .unwrap();

    // Revised edition, replied to the canonical message.
    let revised_bytes = book_bytes("Stewart: Calculus", 1250);
    let event = h.upload(
        "calculus-2ed.pdf",
        &revised_bytes,
        MATH_THREAD,
        ReplyContext::CatalogMessage {
            message: canonical_ref,
        },
    );
    let outcome = h.coordinator.ingest(event).await.unwrap();

    let revised_id = identify_bytes(&revised_bytes);
    assert_eq!(
        outcome,
        IngestOutcome::Replaced {
            content_id: revised_id.clone(),
            canonical_ref,
        },
        "canonical reference is unchanged across a replacement"
    );

    // Still exactly one row, now with the new identity.
    assert_eq!(h.row_count().await, 1);
    let entry = h
        .catalog
        .find_by_canonical(canonical_ref)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.content_id, revised_id);
    assert_eq!(entry.page_count, 1250);
    assert!(!h.catalog.exists(&old_entry.content_id).await.unwrap());

    // The old copy went to the operator channel before destruction.
    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat, OPERATOR_CHAT);
    assert_eq!(sent[0].file, old_entry.content_ref);
    assert!(sent[0].caption.contains("Previously, it was:"));
    assert!(sent[0].caption.contains("<code>Calculus</code>"));
    drop(sent);

    // The canonical message was edited in place, never re-published.
    assert_eq!(h.transport.publish_count(), 1);
    let edited = h.transport.edited.lock().unwrap();
    assert_eq!(edited.len(), 1);
    assert_eq!(edited[0].message, canonical_ref);
}

#[tokio::test]
async fn test_replacement_without_backing_row_falls_back_to_new() {
    let h = Harness::new().await;
    let bytes = book_bytes("Spivak: Calculus on Manifolds", 160);

    // Reply to a message that looks like a catalog publication but has no
    // row behind it.
    let event = h.upload(
        "manifolds.pdf",
        &bytes,
        MATH_THREAD,
        ReplyContext::CatalogMessage {
            message: MessageId(424242),
        },
    );
    let outcome = h.coordinator.ingest(event).await.unwrap();

    let IngestOutcome::Published { canonical_ref, .. } = outcome else {
        panic!("expected fallback to Published, got {outcome:?}");
    };
    assert_ne!(canonical_ref, MessageId(424242), "fresh canonical message");
    assert_eq!(h.row_count().await, 1);
    assert_eq!(h.transport.archive_count(), 0, "nothing to archive");
    assert!(h.transport.edited.lock().unwrap().is_empty());
}

// =============================================================================
// Delivery resilience
// =============================================================================

#[tokio::test]
async fn test_rate_limited_publish_retries_once_then_commits() {
    let h = Harness::new().await;
    // Pause only after the pool is connected: under a paused clock the
    // runtime auto-advances past the pool's acquire timeout while the real
    // connect thread is still working.
    tokio::time::pause();
    h.transport
        .fail_next_publish(Error::RateLimited(Duration::from_secs(5)));

    let bytes = book_bytes("Rudin: Real and Complex Analysis", 416);
    let event = h.upload("rudin.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Published { .. }));
    assert_eq!(
        h.transport
            .publish_attempts
            .load(std::sync::atomic::Ordering::SeqCst),
        2,
        "one retry after the reported wait"
    );
    assert_eq!(h.row_count().await, 1);
}

#[tokio::test]
async fn test_rate_limited_publish_failing_twice_drops_event() {
    let h = Harness::new().await;
    tokio::time::pause();
    h.transport
        .fail_next_publish(Error::RateLimited(Duration::from_secs(5)));
    h.transport
        .fail_next_publish(Error::Network("still unreachable".to_string()));

    let bytes = book_bytes("Rudin: Principles of Mathematical Analysis", 342);
    let event = h.upload("rudin-pma.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Dropped { .. }));
    assert_eq!(
        h.transport
            .publish_attempts
            .load(std::sync::atomic::Ordering::SeqCst),
        2
    );
    assert_eq!(h.row_count().await, 0, "no orphaned catalog row");
}

#[tokio::test]
async fn test_network_failure_on_publish_leaves_catalog_unmodified() {
    let h = Harness::new().await;
    h.transport
        .fail_next_publish(Error::Network("connection reset".to_string()));

    let bytes = book_bytes("Axler: Linear Algebra Done Right", 340);
    let event = h.upload("axler.pdf", &bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Dropped { .. }));
    assert_eq!(h.row_count().await, 0);
}

#[tokio::test]
async fn test_abandoned_edit_keeps_previous_entry() {
    let h = Harness::new().await;

    let first_bytes = book_bytes("Halmos: Naive Set Theory", 104);
    let event = h.upload("halmos.pdf", &first_bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let IngestOutcome::Published { canonical_ref, content_id } =
        h.coordinator.ingest(event).await.unwrap()
    else {
        panic!("first upload should publish");
    };

    h.transport
        .fail_next_edit(Error::Network("timed out".to_string()));
    let revised_bytes = book_bytes("Halmos: Naive Set Theory", 110);
    let event = h.upload(
        "halmos-2ed.pdf",
        &revised_bytes,
        MATH_THREAD,
        ReplyContext::CatalogMessage {
            message: canonical_ref,
        },
    );
    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Dropped { .. }));
    // The archival copy went out, but the catalog still holds the old
    // edition under the same canonical message.
    assert_eq!(h.transport.archive_count(), 1);
    assert_eq!(h.row_count().await, 1);
    let entry = h
        .catalog
        .find_by_canonical(canonical_ref)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.content_id, content_id);
}

#[tokio::test]
async fn test_abandoned_archival_drops_replacement_untouched() {
    let h = Harness::new().await;

    let first_bytes = book_bytes("Feller: Probability Theory", 509);
    let event = h.upload("feller.pdf", &first_bytes, MATH_THREAD, ReplyContext::TopicCreated);
    let IngestOutcome::Published { canonical_ref, .. } =
        h.coordinator.ingest(event).await.unwrap()
    else {
        panic!("first upload should publish");
    };

    h.transport
        .fail_next_send(Error::Network("operator channel unreachable".to_string()));
    let revised_bytes = book_bytes("Feller: Probability Theory", 520);
    let event = h.upload(
        "feller-2ed.pdf",
        &revised_bytes,
        MATH_THREAD,
        ReplyContext::CatalogMessage {
            message: canonical_ref,
        },
    );
    let outcome = h.coordinator.ingest(event).await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Dropped { .. }));
    assert!(h.transport.edited.lock().unwrap().is_empty(), "no blind edit");
    assert_eq!(h.row_count().await, 1);
    assert_eq!(
        h.catalog
            .find_by_canonical(canonical_ref)
            .await
            .unwrap()
            .unwrap()
            .content_id,
        identify_bytes(&first_bytes)
    );
}
