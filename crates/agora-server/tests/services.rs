//! Service-layer tests against a real Postgres database.
//!
//! These run only when `AGORA_TEST_DATABASE_URL` points at a database;
//! otherwise every test skips itself. Each [`App`] gets its own
//! throwaway schema, so they are safe to run in parallel.

use agora_api_types::ListQuery;
use agora_error::ErrorCategory;
use agora_model::id::TopicId;
use agora_model::VoteIntent;
use agora_server::extract::SessionUser;
use agora_server::services;
use agora_server::App;

macro_rules! test_app {
    () => {
        match App::new_for_tests().await {
            Some(app) => app,
            None => return,
        }
    };
}

async fn register(app: &App, name: &str) -> SessionUser {
    let authenticated = services::users::Register {
        name,
        password: "correct-horse-battery",
    }
    .perform(app)
    .await
    .unwrap();

    SessionUser {
        user: authenticated.user,
    }
}

async fn publish_post(app: &App, session: &SessionUser, title: &str) -> services::posts::PostData {
    services::posts::PublishPost {
        title,
        content: "Hello, World!",
        topic_ids: Vec::new(),
    }
    .perform(app, session)
    .await
    .unwrap()
}

#[tokio::test]
async fn registers_then_logs_in() {
    let app = test_app!();
    register(&app, "alice").await;

    let authenticated = services::users::Login {
        name: "alice",
        password: "correct-horse-battery",
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(authenticated.user.name, "alice");
    assert!(!authenticated.token.is_empty());

    let error = services::users::Login {
        name: "alice",
        password: "not-her-password",
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::AccessDenied);

    let error = services::users::Register {
        name: "ALICE",
        password: "correct-horse-battery",
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::Conflict);
}

#[tokio::test]
async fn votes_move_the_score_and_stick_to_the_voter() {
    let app = test_app!();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let post = publish_post(&app, &alice, "First").await;
    assert_eq!(post.view.net_votes, 0);
    assert_eq!(post.view.user_vote, 0);

    let data = services::posts::VotePost {
        post_id: post.view.post.id,
        voter: bob.id,
        intent: VoteIntent::Upvote,
    }
    .perform(&app, &bob)
    .await
    .unwrap();
    assert_eq!(data.view.net_votes, 1);
    assert_eq!(data.view.user_vote, 1);

    // Alice sees the same score but her own (absent) vote.
    let data = services::posts::GetPost {
        id: post.view.post.id,
    }
    .perform(&app, Some(alice.id))
    .await
    .unwrap();
    assert_eq!(data.view.net_votes, 1);
    assert_eq!(data.view.user_vote, 0);

    // Clearing twice stays at the same place.
    for _ in 0..2 {
        let data = services::posts::VotePost {
            post_id: post.view.post.id,
            voter: bob.id,
            intent: VoteIntent::Clear,
        }
        .perform(&app, &bob)
        .await
        .unwrap();
        assert_eq!(data.view.net_votes, 0);
        assert_eq!(data.view.user_vote, 0);
    }
}

#[tokio::test]
async fn refuses_to_vote_on_someone_elses_behalf() {
    let app = test_app!();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let post = publish_post(&app, &alice, "First").await;
    let error = services::posts::VotePost {
        post_id: post.view.post.id,
        voter: alice.id,
        intent: VoteIntent::Upvote,
    }
    .perform(&app, &bob)
    .await
    .unwrap_err();

    assert_eq!(error.category, ErrorCategory::AccessDenied);
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = test_app!();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let post = publish_post(&app, &alice, "First").await;
    let error = services::posts::UpdatePost {
        id: post.view.post.id,
        title: "Hijacked",
        content: "by bob",
    }
    .perform(&app, &bob)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::AccessDenied);

    let error = services::posts::DeletePost {
        id: post.view.post.id,
    }
    .perform(&app, &bob)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::AccessDenied);

    let data = services::posts::UpdatePost {
        id: post.view.post.id,
        title: "First, revised",
        content: "still alice",
    }
    .perform(&app, &alice)
    .await
    .unwrap();
    assert_eq!(data.view.post.title, "First, revised");
    assert!(data.view.post.updated_at.is_some());
}

#[tokio::test]
async fn lists_posts_filtered_by_topic() {
    let app = test_app!();
    let alice = register(&app, "alice").await;

    let rust = services::topics::CreateTopic { name: "rust" }
        .perform(&app)
        .await
        .unwrap();
    services::topics::CreateTopic { name: "cooking" }
        .perform(&app)
        .await
        .unwrap();

    let tagged = services::posts::PublishPost {
        title: "Borrow checker",
        content: "Hello, World!",
        topic_ids: vec![rust.id],
    }
    .perform(&app, &alice)
    .await
    .unwrap();
    assert_eq!(tagged.topics.len(), 1);

    publish_post(&app, &alice, "Untagged").await;

    let query = ListQuery {
        topics: Some(rust.id.0.to_string()),
        ..ListQuery::default()
    };
    let listed = services::posts::ListPosts { query: &query }
        .perform(&app, None)
        .await
        .unwrap();

    assert_eq!(listed.total, 1);
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].view.post.title, "Borrow checker");

    let listed = services::posts::ListPosts {
        query: &ListQuery::default(),
    }
    .perform(&app, None)
    .await
    .unwrap();
    assert_eq!(listed.total, 2);
}

#[tokio::test]
async fn rejects_unknown_topics_and_sort_tokens() {
    let app = test_app!();
    let alice = register(&app, "alice").await;

    let error = services::posts::PublishPost {
        title: "Tagged into the void",
        content: "Hello, World!",
        topic_ids: vec![TopicId(999)],
    }
    .perform(&app, &alice)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::InvalidRequest);

    let query = ListQuery {
        sort: Some("top".to_string()),
        ..ListQuery::default()
    };
    let error = services::posts::ListPosts { query: &query }
        .perform(&app, None)
        .await
        .unwrap_err();
    assert_eq!(error.category, ErrorCategory::InvalidRequest);
}

#[tokio::test]
async fn comments_follow_the_same_rules() {
    let app = test_app!();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let post = publish_post(&app, &alice, "First").await;
    let comment = services::comments::PublishComment {
        post_id: post.view.post.id,
        content: "Nice post!",
    }
    .perform(&app, &bob)
    .await
    .unwrap();

    let view = services::comments::VoteComment {
        comment_id: comment.comment.id,
        voter: alice.id,
        intent: VoteIntent::Upvote,
    }
    .perform(&app, &alice)
    .await
    .unwrap();
    assert_eq!(view.net_votes, 1);
    assert_eq!(view.user_vote, 1);

    let error = services::comments::UpdateComment {
        id: comment.comment.id,
        content: "Hijacked",
    }
    .perform(&app, &alice)
    .await
    .unwrap_err();
    assert_eq!(error.category, ErrorCategory::AccessDenied);

    let listed = services::comments::ListComments {
        post_id: post.view.post.id,
        query: &ListQuery::default(),
    }
    .perform(&app, Some(alice.id))
    .await
    .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].user_vote, 1);
}

#[tokio::test]
async fn duplicate_topic_names_conflict() {
    let app = test_app!();

    services::topics::CreateTopic { name: "rust" }
        .perform(&app)
        .await
        .unwrap();

    let error = services::topics::CreateTopic { name: "Rust" }
        .perform(&app)
        .await
        .unwrap_err();
    assert_eq!(error.category, ErrorCategory::Conflict);
}
