//! Matching Integration Tests
//!
//! End-to-end scenarios over the service layer wired to the in-memory stores.
//!
//! Run with: cargo test -p integration-tests --test matching_tests

use integration_tests::{assert_domain, assert_error, fixtures::*, TestApp};
use match_core::{
    Compensation, DomainError, GateDenial, MessageKind, RelationshipStatus, Snowflake, Transition,
};
use match_service::dto::{MessageResponse, PaginationQuery, ReactRequest, ReactionResponse};
use match_service::{ConversationService, IcebreakerDelivery};

// ============================================================================
// End-to-end Scenario
// ============================================================================

#[tokio::test]
async fn test_icebreaker_exchange_unlocks_chat() {
    let app = TestApp::start();
    let a = app.register(Snowflake::new(1));
    let b = app.register(Snowflake::new(2));

    let outcome = app.react(a, like_with_photo(b, "p")).await.unwrap();
    let rel = outcome.relationship.clone().unwrap();
    assert_eq!(rel.status, RelationshipStatus::PendingInterest);
    assert!(matches!(
        outcome.icebreaker,
        IcebreakerDelivery::Delivered { .. }
    ));

    let outcome = app.react(b, like_with_photo(a, "q")).await.unwrap();
    let matched = outcome.relationship.clone().unwrap();
    assert_eq!(matched.id, rel.id);
    assert_eq!(matched.status, RelationshipStatus::MutualMatch);
    assert!(matches!(
        outcome.icebreaker,
        IcebreakerDelivery::Delivered { .. }
    ));

    let sent = app.send(rel.id, a, text("hey")).await.unwrap();
    assert_eq!(sent.kind, MessageKind::Text);
    assert_eq!(sent.to, b.to_string());

    let bodies: Vec<(String, MessageKind)> = list_messages(&app, rel.id, b)
        .await
        .into_iter()
        .map(|m| (m.content, m.kind))
        .collect();
    assert_eq!(
        bodies,
        vec![
            ("p".to_string(), MessageKind::PhotoReveal),
            ("q".to_string(), MessageKind::PhotoReveal),
            ("hey".to_string(), MessageKind::Text),
        ]
    );
}

async fn list_messages(
    app: &TestApp,
    relationship_id: Snowflake,
    viewer: Snowflake,
) -> Vec<MessageResponse> {
    ConversationService::new(&app.ctx)
        .list_messages(relationship_id, viewer, PaginationQuery::default())
        .await
        .unwrap()
        .data
}

#[tokio::test]
async fn test_reaction_response_shape() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    let outcome = app.react(a, like_with_photo(b, unique_photo_url())).await.unwrap();
    let json = serde_json::to_value(ReactionResponse::from(outcome)).unwrap();

    assert_eq!(json["transition"]["type"], "create");
    assert_eq!(json["transition"]["status"], "pending_interest");
    assert_eq!(json["relationship"]["initiator_id"], a.to_string());
    assert!(json["icebreaker_message_id"].is_string());
    assert!(json.get("purged_photo_urls").is_none());
}

// ============================================================================
// Reaction Properties
// ============================================================================

#[tokio::test]
async fn test_mutual_like_keeps_initiator_order() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    app.react(a, like(b)).await.unwrap();
    let outcome = app.react(b, like(a)).await.unwrap();

    let rel = outcome.relationship.unwrap();
    assert_eq!(rel.status, RelationshipStatus::MutualMatch);
    assert_eq!(rel.initiator, a);
    assert_eq!(rel.responder, b);
}

#[tokio::test]
async fn test_double_like_is_invalid() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    app.react(a, like(b)).await.unwrap();
    let err = assert_error(app.react(a, like(b)).await, "INVALID_TRANSITION").unwrap();
    assert_eq!(err.status_code(), 422);
    assert_eq!(app.pairs.len(), 1);
}

#[tokio::test]
async fn test_only_blocker_may_unblock() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    app.react(a, like(b)).await.unwrap();
    let outcome = app.react(a, block(b)).await.unwrap();
    assert_eq!(
        outcome.relationship.unwrap().status,
        RelationshipStatus::BlockedByInitiator
    );

    assert_error(app.react(b, unblock(a)).await, "INVALID_TRANSITION").unwrap();

    let outcome = app.react(a, unblock(b)).await.unwrap();
    assert_eq!(outcome.transition, Transition::Unblock);
    assert!(app.relationship_between(a, b).await.is_none());
}

#[tokio::test]
async fn test_block_without_relationship_is_invalid() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    assert_error(app.react(a, block(b)).await, "INVALID_TRANSITION").unwrap();
    assert_error(app.react(a, unblock(b)).await, "INVALID_TRANSITION").unwrap();
    assert!(app.pairs.is_empty());
}

#[tokio::test]
async fn test_dislike_first_records_decline() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());

    let outcome = app.react(a, dislike(b)).await.unwrap();
    let rel = outcome.relationship.unwrap();
    assert_eq!(rel.status, RelationshipStatus::Declined);
    assert_eq!(rel.initiator, a);

    // Declined is terminal for both sides
    assert_error(app.react(b, like(a)).await, "INVALID_TRANSITION").unwrap();
    assert_error(app.react(a, dislike(b)).await, "INVALID_TRANSITION").unwrap();
    assert_error(app.react(b, block(a)).await, "INVALID_TRANSITION").unwrap();
}

#[tokio::test]
async fn test_self_reaction_is_invalid() {
    let app = TestApp::start();
    let a = app.user();

    assert_error(app.react(a, like(a)).await, "INVALID_TRANSITION").unwrap();
    assert!(app.pairs.is_empty());
}

#[tokio::test]
async fn test_unknown_target_is_not_found() {
    let app = TestApp::start();
    let a = app.user();

    let result = app.react(a, like(Snowflake::new(77))).await;
    let err = assert_error(result, "UNKNOWN_USER").unwrap();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_photo_with_block_is_rejected_before_any_write() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let request = ReactRequest {
        photo_url: Some(unique_photo_url()),
        ..block(b)
    };

    assert_error(app.react(a, request).await, "VALIDATION_ERROR").unwrap();
    assert!(app.pairs.is_empty());
}

// ============================================================================
// Messaging Properties
// ============================================================================

#[tokio::test]
async fn test_pending_conversation_caps() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let rel = app.react(a, like(b)).await.unwrap().relationship.unwrap();

    assert_domain(app.send(rel.id, a, text("hello")).await, |e| {
        matches!(e, DomainError::IcebreakerRequired)
    })
    .unwrap();
    app.send(rel.id, a, photo(unique_photo_url())).await.unwrap();

    // Responder cannot talk before matching
    assert_domain(app.send(rel.id, b, photo(unique_photo_url())).await, |e| {
        matches!(e, DomainError::MessageCapExceeded)
    })
    .unwrap();

    app.send(rel.id, a, text("second")).await.unwrap();
    assert_domain(app.send(rel.id, a, text("third")).await, |e| {
        matches!(e, DomainError::MessageCapExceeded)
    })
    .unwrap();
    assert_eq!(app.messages.total_messages(), 2);
}

#[tokio::test]
async fn test_responder_reveals_after_match() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let rel = app
        .react(a, like_with_photo(b, unique_photo_url()))
        .await
        .unwrap()
        .relationship
        .unwrap();
    app.react(b, like(a)).await.unwrap();

    assert_domain(app.send(rel.id, b, text("hi")).await, |e| {
        matches!(e, DomainError::IcebreakerRequired)
    })
    .unwrap();
    app.send(rel.id, b, photo(unique_photo_url())).await.unwrap();

    for (sender, body) in [(b, "hi"), (a, "hello"), (b, "how are you"), (a, "great")] {
        app.send(rel.id, sender, text(body)).await.unwrap();
    }
    assert_eq!(app.messages.total_messages(), 6);
}

#[tokio::test]
async fn test_blocked_conversation_is_closed() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let rel = app
        .react(a, like_with_photo(b, unique_photo_url()))
        .await
        .unwrap()
        .relationship
        .unwrap();
    app.react(b, block(a)).await.unwrap();

    for sender in [a, b] {
        assert_error(app.send(rel.id, sender, text("x")).await, "NOT_MESSAGEABLE").unwrap();
    }
}

// ============================================================================
// Rollback
// ============================================================================

#[tokio::test]
async fn test_denied_icebreaker_removes_new_relationship() {
    let app = TestApp::start_with_gate(DenyAllGate(GateDenial::IcebreakerRequired));
    let (a, b) = (app.user(), app.user());

    assert_domain(app.react(a, like_with_photo(b, "x")).await, |e| {
        matches!(
            e,
            DomainError::IcebreakerRejected {
                compensation: Compensation::RelationshipDeleted,
                reason: GateDenial::IcebreakerRequired,
            }
        )
    })
    .unwrap();

    assert!(app.relationship_between(a, b).await.is_none());
    assert_eq!(app.messages.total_messages(), 0);
}

#[tokio::test]
async fn test_denied_icebreaker_reverts_match() {
    let app = TestApp::start_with_gate(DenySenderGate(Snowflake::new(2)));
    let a = app.register(Snowflake::new(1));
    let b = app.register(Snowflake::new(2));

    app.react(a, like_with_photo(b, "p")).await.unwrap();
    let result = app.react(b, like_with_photo(a, "q")).await;
    let err = assert_error(result, "ICEBREAKER_REJECTED").unwrap();
    assert!(err.as_domain().is_some_and(DomainError::is_retryable));

    let rel = app.relationship_between(a, b).await.unwrap();
    assert_eq!(rel.status, RelationshipStatus::PendingInterest);
    assert_eq!(rel.initiator, a);
    assert_eq!(app.messages.total_messages(), 1);
}

#[tokio::test]
async fn test_rejected_like_can_be_retried() {
    let app = TestApp::start_with_gate(DenySenderGate(Snowflake::new(1)));
    let a = app.register(Snowflake::new(1));
    let b = app.register(Snowflake::new(2));

    assert_error(app.react(a, like_with_photo(b, "p")).await, "ICEBREAKER_REJECTED").unwrap();

    // Same reaction without a photo goes through as a fresh like
    let outcome = app.react(a, like(b)).await.unwrap();
    assert!(matches!(outcome.transition, Transition::Create { .. }));
}

// ============================================================================
// Unblock Purge
// ============================================================================

#[tokio::test]
async fn test_unblock_purges_and_allows_fresh_start() {
    let app = TestApp::start();
    let (a, b) = (app.user(), app.user());
    let (pa, pb) = (unique_photo_url(), unique_photo_url());

    let rel = app
        .react(a, like_with_photo(b, pa.clone()))
        .await
        .unwrap()
        .relationship
        .unwrap();
    app.react(b, like_with_photo(a, pb.clone())).await.unwrap();
    app.send(rel.id, a, text("hello")).await.unwrap();
    app.react(b, block(a)).await.unwrap();

    let outcome = app.react(b, unblock(a)).await.unwrap();
    let report = outcome.unblock.unwrap();
    assert_eq!(report.purged_photo_urls, vec![pa, pb]);
    assert_eq!(report.deleted_messages, 3);
    assert!(report.relationship_removed);
    assert_eq!(app.messages.total_messages(), 0);
    assert!(app.pairs.is_empty());

    let result = app.send(rel.id, a, text("still there?")).await;
    assert_error(result, "UNKNOWN_RELATIONSHIP").unwrap();

    let fresh = app.react(b, like(a)).await.unwrap().relationship.unwrap();
    assert_ne!(fresh.id, rel.id);
    assert_eq!(fresh.initiator, b);
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_listings_follow_reactions() {
    let app = TestApp::start();
    let me = app.user();
    let (x, y, z) = (app.user(), app.user(), app.user());

    app.react(me, like(x)).await.unwrap();
    app.react(y, like(me)).await.unwrap();
    app.react(z, like(me)).await.unwrap();
    app.react(me, like(z)).await.unwrap();
    app.react(me, block(y)).await.unwrap();

    let query = PaginationQuery::default();
    let relationships = app.relationships();

    let sent = relationships.list_sent_likes(me, query).await.unwrap();
    assert_eq!(sent.total, 1);
    assert_eq!(sent.data[0].counterpart_id, x.to_string());

    let matches = relationships
        .list_by_status(me, RelationshipStatus::MutualMatch, query)
        .await
        .unwrap();
    assert_eq!(matches.total, 1);
    assert_eq!(matches.data[0].counterpart_id, z.to_string());
    assert!(!matches.data[0].is_initiator);

    let blocked = relationships.list_blocked(me, query).await.unwrap();
    assert_eq!(blocked.total, 1);
    assert_eq!(blocked.data[0].counterpart_id, y.to_string());

    let requests = relationships.list_like_requests(x, query).await.unwrap();
    assert_eq!(requests.total, 1);
    assert_eq!(requests.data[0].counterpart_id, me.to_string());
}
