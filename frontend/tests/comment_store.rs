//! Integration tests: comment store.

mod common;

use std::sync::Arc;

use common::{comment, new_comment, FakeComments};
use community_hub_frontend::{
    ClientError, CommentStore, CommentStoreOptions, FetchOutcome, ModerationFilter,
    ModerationView,
};
use community_hub_shared::{CommentQuery, ValidationErrors};

fn store_over(fake: &Arc<FakeComments>) -> CommentStore {
    CommentStore::new(fake.clone(), CommentStoreOptions::default())
}

fn seeded() -> Arc<FakeComments> {
    Arc::new(FakeComments::with(vec![
        comment("c1", true, None),
        comment("c2", false, None),
        comment("c3", false, None),
        comment("r1", true, Some("c1")),
    ]))
}

fn ids(store: &CommentStore) -> Vec<String> {
    store.comments().into_iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn top_level_fetch_never_holds_replies() {
    let fake = Arc::new(
        FakeComments::with(vec![
            comment("c1", true, None),
            comment("r1", true, Some("c1")),
            comment("r2", false, Some("c1")),
        ])
        .ignoring_parent_filter(),
    );
    let store = store_over(&fake);

    let outcome = store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");

    assert_eq!(outcome, FetchOutcome::Applied);
    assert_eq!(ids(&store), vec!["c1"]);
    assert!(store.comments().iter().all(|c| c.parent_id.is_none()));
}

#[tokio::test]
async fn approve_and_reject_round_trip() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");

    store.approve("c2").await.expect("approve");
    store.reject("c2").await.expect("reject");
    assert!(!store.snapshot().get("c2").expect("held").is_approved);

    store.reject("c1").await.expect("reject");
    store.approve("c1").await.expect("approve");
    assert!(store.snapshot().get("c1").expect("held").is_approved);

    store.approve("c1").await.expect("approving twice is harmless");
    assert!(store.snapshot().get("c1").expect("held").is_approved);
}

#[tokio::test]
async fn delete_removes_exactly_one_entry() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");
    let total_before = store.snapshot().pagination.total;

    store.delete_comment("c2").await.expect("delete");

    assert_eq!(ids(&store), vec!["c1", "c3"]);
    assert_eq!(store.snapshot().pagination.total, total_before - 1);
}

#[tokio::test]
async fn rejected_delete_leaves_listing_alone() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");
    let before = store.snapshot();

    let err = store
        .delete_comment("missing")
        .await
        .expect_err("server rejects unknown ids");

    assert_eq!(err.to_string(), "Comment not found");
    assert_eq!(store.snapshot(), before);
    assert!(store.error().is_none(), "mutation failures are not recorded in state");
}

#[tokio::test]
async fn failed_update_changes_nothing() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");
    fake.remove("c3");

    store.approve("c3").await.expect_err("record is gone on the server");
    assert!(!store.snapshot().get("c3").expect("still held").is_approved);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_listing_and_records_error() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");

    fake.fail_next_list(ClientError::Transport("connection reset".to_string()));
    let err = store
        .fetch_comments(CommentQuery::top_level().page(2))
        .await
        .expect_err("fetch fails");

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(ids(&store), vec!["c1", "c2", "c3"]);
    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Unable to reach the server. Check your connection.")
    );
    assert_eq!(state.query, CommentQuery::top_level(), "query of the held listing is kept");

    store.refresh().await.expect("next fetch succeeds");
    assert!(store.error().is_none());
}

#[tokio::test]
async fn approved_filter_is_applied_locally_by_default() {
    let fake = seeded();
    let store = store_over(&fake);

    store
        .fetch_comments(CommentQuery::top_level().approved(false))
        .await
        .expect("fetch should succeed");

    let sent = fake.last_query().expect("a request was made");
    assert_eq!(sent.approved, None, "approved is not sent to the server");
    assert_eq!(ids(&store), vec!["c2", "c3"]);
    assert_eq!(store.snapshot().query.approved, Some(false));
}

#[tokio::test]
async fn approved_filter_is_forwarded_when_enabled() {
    let fake = seeded();
    let store = CommentStore::new(fake.clone(), CommentStoreOptions {
        server_approved_filter: true,
        page_size: 10,
    });

    store
        .fetch_comments(CommentQuery::top_level().approved(true))
        .await
        .expect("fetch should succeed");

    assert_eq!(fake.last_query().and_then(|q| q.approved), Some(true));
    assert_eq!(ids(&store), vec!["c1"]);
}

#[tokio::test]
async fn superseded_fetch_is_discarded() {
    let fake = seeded();
    let store = store_over(&fake);
    let release = fake.hold_next_list();

    let (slow, fast) = tokio::join!(
        store.fetch_comments(CommentQuery::top_level().approved(true)),
        async {
            let outcome = store.fetch_comments(CommentQuery::top_level()).await;
            let _ = release.send(());
            outcome
        }
    );

    assert_eq!(fast.expect("newer fetch"), FetchOutcome::Applied);
    assert_eq!(slow.expect("older fetch"), FetchOutcome::Superseded);
    assert_eq!(ids(&store), vec!["c1", "c2", "c3"]);
    assert_eq!(store.snapshot().query, CommentQuery::top_level());
}

#[tokio::test]
async fn superseded_failure_is_not_recorded() {
    let fake = seeded();
    let store = store_over(&fake);
    let release = fake.hold_next_list();

    let (slow, fast) = tokio::join!(store.fetch_comments(CommentQuery::top_level()), async {
        let outcome = store.fetch_comments(CommentQuery::top_level()).await;
        fake.fail_next_list(ClientError::Http {
            status: 502,
        });
        let _ = release.send(());
        outcome
    });

    assert_eq!(fast.expect("newer fetch"), FetchOutcome::Applied);
    assert!(matches!(slow, Err(ClientError::Http { status: 502 })));
    assert!(store.error().is_none());
    assert_eq!(ids(&store), vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn create_validates_before_any_request() {
    let fake = seeded();
    let store = store_over(&fake);

    let mut invalid = new_comment("   ");
    invalid.author_email = "not-an-email".to_string();
    let err = store.create_comment(invalid).await.expect_err("invalid input");

    let errors = match err {
        ClientError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert!(errors.get("content").is_some());
    assert!(errors.get("authorEmail").is_some());
    assert_eq!(fake.creates(), 0);
}

#[tokio::test]
async fn created_comment_waits_for_approval() {
    let fake = seeded();
    let store = store_over(&fake);
    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");

    let created = store
        .create_comment(new_comment("Looking forward to it"))
        .await
        .expect("create");

    assert!(!created.is_approved);
    assert_eq!(fake.creates(), 1);
    assert!(store.snapshot().get(&created.id).is_none(), "nothing is inserted locally");
    assert_eq!(store.comments().len(), 3);
}

#[tokio::test]
async fn subscribers_observe_completed_mutations() {
    let fake = seeded();
    let store = store_over(&fake);
    let mut rx = store.subscribe();

    store
        .fetch_comments(CommentQuery::top_level())
        .await
        .expect("fetch should succeed");
    assert!(rx.has_changed().expect("store alive"));
    assert_eq!(rx.borrow_and_update().len(), 3);

    store.approve("c3").await.expect("approve");
    assert!(rx.has_changed().expect("store alive"));
    assert!(rx.borrow_and_update().get("c3").expect("held").is_approved);
}

#[tokio::test]
async fn reset_clears_state_and_fences_inflight_fetches() {
    let fake = seeded();
    let store = store_over(&fake);
    let release = fake.hold_next_list();

    let (outcome, ()) = tokio::join!(store.fetch_comments(CommentQuery::top_level()), async {
        store.reset();
        let _ = release.send(());
    });

    assert_eq!(outcome.expect("fetch"), FetchOutcome::Superseded);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn moderation_tabs_partition_the_held_page() {
    let fake = seeded();
    let store = Arc::new(store_over(&fake));
    let mut view = ModerationView::new(store.clone());
    view.refresh().await.expect("fetch should succeed");

    let held = store.comments();
    let pending = held.iter().filter(|c| !c.is_approved).count();
    let counts = view.counts();
    assert_eq!(counts.all, held.len());
    assert_eq!(counts.pending, pending);
    assert_eq!(counts.approved, held.len() - pending);

    view.select_filter(ModerationFilter::Pending)
        .await
        .expect("local filter");
    assert_eq!(view.visible().len(), pending);
    view.select_filter(ModerationFilter::Approved)
        .await
        .expect("local filter");
    assert_eq!(view.visible().len(), held.len() - pending);
    assert_eq!(fake.lists(), 1, "switching tabs filters locally");
}

#[tokio::test]
async fn moderation_delete_needs_confirmation() {
    let fake = Arc::new(FakeComments::with(vec![
        comment("c1", true, None),
        comment("c2", false, None),
    ]));
    let store = Arc::new(store_over(&fake));
    let mut view = ModerationView::new(store.clone());
    view.refresh().await.expect("fetch should succeed");

    view.request_delete("c2");
    assert_eq!(view.pending_delete(), Some("c2"));
    view.cancel_delete();
    assert_eq!(view.confirm_delete().await.expect("nothing pending"), None);
    assert_eq!(store.comments().len(), 2);

    view.request_delete("c2");
    let deleted = view.confirm_delete().await.expect("delete");
    assert_eq!(deleted.as_deref(), Some("c2"));
    assert_eq!(view.pending_delete(), None);
    assert_eq!(ids(&store), vec!["c1"]);
}

#[test]
fn validation_errors_render_every_field() {
    let mut errors = ValidationErrors::new();
    errors.add("content", "Comment cannot be empty");
    let err = ClientError::from(errors);
    assert!(err.to_string().contains("Comment cannot be empty"));
}
