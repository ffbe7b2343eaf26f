//! Concurrency Integration Tests
//!
//! Races many reactions and sends against the same pair or relationship on
//! the multi-threaded runtime and checks that the invariants still hold.
//!
//! Run with: cargo test -p integration-tests --test concurrency_tests

use std::time::Duration;

use integration_tests::{assert_error, fixtures::*, TestApp};
use match_core::{
    ConversationRepository, MessageBody, PairRepository, RelationshipStatus, Snowflake,
};
use match_service::{ConversationService, Delivery, ReactionService};
use tokio::task::JoinSet;

const RACERS: usize = 16;
const HISTORY_DELAY: Duration = Duration::from_millis(100);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_create_one_relationship() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    let mut tasks = JoinSet::new();
    for i in 0..RACERS {
        let ctx = app.ctx.clone();
        let (actor, target) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tasks.spawn(async move { ReactionService::new(&ctx).react(actor, like(target)).await });
    }

    let mut succeeded = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert_eq!(err.error_code(), "INVALID_TRANSITION", "{err}"),
        }
    }

    // One like creates the pair, one like from the other side matches it
    assert_eq!(succeeded, 2);
    assert_eq!(app.pairs.len(), 1);
    let rel = app.relationship_between(a, b).await.unwrap();
    assert_eq!(rel.status, RelationshipStatus::MutualMatch);
    assert_eq!(app.ctx.pair_locks().active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_photo_likes_deliver_one_icebreaker_each() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    let mut tasks = JoinSet::new();
    for i in 0..RACERS {
        let ctx = app.ctx.clone();
        let (actor, target) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tasks.spawn(async move {
            ReactionService::new(&ctx)
                .react(actor, like_with_photo(target, unique_photo_url()))
                .await
        });
    }

    let mut succeeded = 0;
    while let Some(joined) = tasks.join_next().await {
        if joined.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 2);
    assert_eq!(app.pairs.len(), 1);
    assert_eq!(app.messages.total_messages(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_respect_pending_cap() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let rel_id = app.react(a, like(b)).await.unwrap().relationship.unwrap().id;

    let mut tasks = JoinSet::new();
    for _ in 0..RACERS {
        let ctx = app.ctx.clone();
        let body = MessageBody::photo(unique_photo_url());
        tasks.spawn(async move {
            ConversationService::new(&ctx)
                .try_append(rel_id, a, body)
                .await
        });
    }

    let mut appended = 0;
    while let Some(joined) = tasks.join_next().await {
        if let Delivery::Appended(_) = joined.unwrap().unwrap() {
            appended += 1;
        }
    }

    assert_eq!(appended, 2);
    assert_eq!(app.messages.total_messages(), 2);
    assert_eq!(app.ctx.relationship_locks().active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_send_and_unblock() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let rel_id = app
        .react(a, like_with_photo(b, unique_photo_url()))
        .await
        .unwrap()
        .relationship
        .unwrap()
        .id;
    app.react(b, like_with_photo(a, unique_photo_url())).await.unwrap();
    app.react(a, block(b)).await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..RACERS {
        let ctx = app.ctx.clone();
        tasks.spawn(async move {
            if i == 0 {
                ReactionService::new(&ctx)
                    .react(a, unblock(b))
                    .await
                    .map(|_| ())
            } else {
                ConversationService::new(&ctx)
                    .send_message(rel_id, b, text("let me talk"))
                    .await
                    .map(|_| ())
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined.unwrap() {
            assert!(
                matches!(err.error_code(), "NOT_MESSAGEABLE" | "UNKNOWN_RELATIONSHIP"),
                "{err}"
            );
        }
    }

    assert!(app.pairs.is_empty());
    assert_eq!(app.messages.total_messages(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_pairs_proceed_in_parallel() {
    let app = TestApp::start();
    let hub = app.user();
    let others: Vec<Snowflake> = (0..RACERS).map(|_| app.user()).collect();

    let mut tasks = JoinSet::new();
    for other in others.iter().copied() {
        let ctx = app.ctx.clone();
        tasks.spawn(async move {
            let reactions = ReactionService::new(&ctx);
            reactions.react(other, like(hub)).await?;
            reactions.react(hub, like(other)).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap().unwrap();
        assert_eq!(
            outcome.relationship.unwrap().status,
            RelationshipStatus::MutualMatch
        );
    }

    assert_eq!(app.pairs.len(), RACERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_block_during_send_stores_nothing_after_block() {
    let app = TestApp::start_with_slow_history(HISTORY_DELAY);
    let (a, b) = (app.user(), app.user());
    let rel_id = app
        .react(a, like_with_photo(b, unique_photo_url()))
        .await
        .unwrap()
        .relationship
        .unwrap()
        .id;
    app.react(b, like_with_photo(a, unique_photo_url())).await.unwrap();

    let ctx = app.ctx.clone();
    let send = tokio::spawn(async move {
        ConversationService::new(&ctx)
            .send_message(rel_id, a, text("still there?"))
            .await
    });

    // Let the send pass its gate check before the block arrives
    tokio::time::sleep(Duration::from_millis(20)).await;
    app.react(b, block(a)).await.unwrap();

    let sent = send.await.unwrap();
    let blocked = app.relationship_between(a, b).await.unwrap();
    assert_eq!(blocked.status, RelationshipStatus::BlockedByResponder);

    let stored = app.messages.first_n(rel_id, 5).await.unwrap();
    match sent {
        Ok(_) => {
            assert_eq!(stored.len(), 3);
            assert!(stored.iter().all(|m| m.created_at <= blocked.updated_at));
        }
        Err(err) => {
            assert_eq!(err.error_code(), "NOT_MESSAGEABLE", "{err}");
            assert_eq!(stored.len(), 2);
        }
    }
    assert_eq!(app.ctx.relationship_locks().active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_change_after_gate_check_refuses_send() {
    let app = TestApp::start_with_slow_history(HISTORY_DELAY);
    let (a, b) = (app.user(), app.user());
    app.react(a, like_with_photo(b, unique_photo_url())).await.unwrap();
    app.react(b, like_with_photo(a, unique_photo_url())).await.unwrap();
    let rel = app.relationship_between(a, b).await.unwrap();

    let ctx = app.ctx.clone();
    let rel_id = rel.id;
    let send = tokio::spawn(async move {
        ConversationService::new(&ctx)
            .send_message(rel_id, a, text("hello?"))
            .await
    });

    // Another process blocks without going through this service's locks
    tokio::time::sleep(Duration::from_millis(20)).await;
    app.pairs
        .update_status(rel.id, rel.version, RelationshipStatus::BlockedByResponder)
        .await
        .unwrap()
        .unwrap();

    assert_error(send.await.unwrap(), "NOT_MESSAGEABLE").unwrap();
    assert_eq!(app.messages.total_messages(), 2);
}
