//! PostgreSQL Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL
//!
//! Run with: cargo test -p integration-tests --test postgres_tests

use integration_tests::{
    assert_error, check_test_env, delete_users, fixtures::*, insert_user, postgres_app,
};
use match_core::{PairKey, RelationshipStatus};
use match_service::dto::PaginationQuery;
use match_service::{ConversationService, ReactionService, RelationshipService};
use tokio::task::JoinSet;

#[tokio::test]
async fn test_icebreaker_exchange_on_postgres() {
    if !check_test_env() {
        return;
    }

    let (ctx, pool) = postgres_app().await.expect("Failed to build context");
    let a = insert_user(&ctx, &pool).await.unwrap();
    let b = insert_user(&ctx, &pool).await.unwrap();
    let reactions = ReactionService::new(&ctx);
    let conversations = ConversationService::new(&ctx);

    let rel = reactions
        .react(a, like_with_photo(b, unique_photo_url()))
        .await
        .unwrap()
        .relationship
        .unwrap();
    let outcome = reactions
        .react(b, like_with_photo(a, unique_photo_url()))
        .await
        .unwrap();
    assert_eq!(
        outcome.relationship.unwrap().status,
        RelationshipStatus::MutualMatch
    );

    conversations
        .send_message(rel.id, a, text("hey"))
        .await
        .unwrap();
    let page = conversations
        .list_messages(rel.id, b, PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.data[2].content, "hey");

    let matches = RelationshipService::new(&ctx)
        .list_by_status(a, RelationshipStatus::MutualMatch, PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(matches.total, 1);

    reactions.react(a, block(b)).await.unwrap();
    let outcome = reactions.react(a, unblock(b)).await.unwrap();
    assert_eq!(outcome.unblock.unwrap().purged_photo_urls.len(), 2);
    assert!(ctx
        .pair_repo()
        .find_by_pair(PairKey::new(a, b))
        .await
        .unwrap()
        .is_none());

    delete_users(&pool, &[a, b]).await.unwrap();
}

#[tokio::test]
async fn test_pending_cap_on_postgres() {
    if !check_test_env() {
        return;
    }

    let (ctx, pool) = postgres_app().await.expect("Failed to build context");
    let a = insert_user(&ctx, &pool).await.unwrap();
    let b = insert_user(&ctx, &pool).await.unwrap();

    let rel = ReactionService::new(&ctx)
        .react(a, like(b))
        .await
        .unwrap()
        .relationship
        .unwrap();
    let conversations = ConversationService::new(&ctx);

    let result = conversations.send_message(rel.id, a, text("hello")).await;
    assert_error(result, "ICEBREAKER_REQUIRED").unwrap();
    conversations
        .send_message(rel.id, a, photo(unique_photo_url()))
        .await
        .unwrap();
    conversations
        .send_message(rel.id, a, text("second"))
        .await
        .unwrap();
    let result = conversations.send_message(rel.id, a, text("third")).await;
    assert_error(result, "MESSAGE_CAP_EXCEEDED").unwrap();

    // Deleting the relationship cascades to its messages
    ctx.pair_repo().delete(rel.id).await.unwrap();
    assert!(!ctx.conversation_repo().exists(rel.id).await.unwrap());

    delete_users(&pool, &[a, b]).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_on_postgres() {
    if !check_test_env() {
        return;
    }

    let (ctx, pool) = postgres_app().await.expect("Failed to build context");
    let a = insert_user(&ctx, &pool).await.unwrap();
    let b = insert_user(&ctx, &pool).await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..8 {
        let ctx = ctx.clone();
        let (actor, target) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tasks.spawn(async move { ReactionService::new(&ctx).react(actor, like(target)).await });
    }

    let mut succeeded = 0;
    while let Some(joined) = tasks.join_next().await {
        if joined.unwrap().is_ok() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, 2);

    let rel = ctx
        .pair_repo()
        .find_by_pair(PairKey::new(a, b))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rel.status, RelationshipStatus::MutualMatch);

    ctx.pair_repo().delete(rel.id).await.unwrap();
    delete_users(&pool, &[a, b]).await.unwrap();
}
