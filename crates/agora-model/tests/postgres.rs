//! Query tests against a real Postgres database.
//!
//! These run only when `AGORA_TEST_DATABASE_URL` points at a database;
//! otherwise every test skips itself. Each test gets its own throwaway
//! schema, so they are safe to run in parallel.

use agora_model::comment::InsertComment;
use agora_model::id::PostId;
use agora_model::pagination::Pagination;
use agora_model::post::{EditPost, InsertPost};
use agora_model::sort::SortKey;
use agora_model::topic::InsertTopic;
use agora_model::user::InsertUser;
use agora_model::{Comment, CommentView, CommentVote, Post, PostView, PostVote, Topic, User};
use sqlx::PgConnection;

macro_rules! test_pool {
    () => {
        match agora_db::testing::build_test_pool(&agora_model::DB_MIGRATIONS).await {
            Some(pool) => pool,
            None => return,
        }
    };
}

async fn new_user(conn: &mut PgConnection, name: &str) -> User {
    InsertUser::builder()
        .name(name)
        .password_hash("unused-in-these-tests")
        .build()
        .insert(conn)
        .await
        .unwrap()
}

async fn new_post(conn: &mut PgConnection, author: &User, title: &str) -> Post {
    InsertPost::builder()
        .author_id(author.id)
        .title(title)
        .content("Hello, World!")
        .build()
        .insert(conn)
        .await
        .unwrap()
}

async fn new_topic(conn: &mut PgConnection, name: &str) -> Topic {
    InsertTopic::builder()
        .name(name)
        .build()
        .insert(conn)
        .await
        .unwrap()
}

async fn new_comment(conn: &mut PgConnection, post: &Post, author: &User) -> Comment {
    InsertComment::builder()
        .post_id(post.id)
        .author_id(author.id)
        .content("Nice post!")
        .build()
        .insert(conn)
        .await
        .unwrap()
}

#[tokio::test]
async fn keeps_one_vote_row_per_user_per_post() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;
    let post = new_post(&mut conn, &alice, "First").await;

    PostVote::upsert(&mut conn, post.id, bob.id, 1).await.unwrap();
    PostVote::upsert(&mut conn, post.id, bob.id, 1).await.unwrap();

    let view = PostView::find(&mut conn, post.id, Some(bob.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, 1);
    assert_eq!(view.user_vote, 1);

    // Switching the vote overwrites the row instead of stacking one.
    PostVote::upsert(&mut conn, post.id, bob.id, -1).await.unwrap();

    let vote = PostVote::find(&mut conn, post.id, bob.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vote.value, -1);

    let view = PostView::find(&mut conn, post.id, Some(bob.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, -1);
    assert_eq!(view.user_vote, -1);
}

#[tokio::test]
async fn clearing_a_vote_is_idempotent() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;
    let post = new_post(&mut conn, &alice, "First").await;

    PostVote::upsert(&mut conn, post.id, bob.id, 1).await.unwrap();
    PostVote::delete(&mut conn, post.id, bob.id).await.unwrap();
    PostVote::delete(&mut conn, post.id, bob.id).await.unwrap();

    assert_eq!(PostVote::find(&mut conn, post.id, bob.id).await.unwrap(), None);

    let view = PostView::find(&mut conn, post.id, Some(bob.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, 0);
    assert_eq!(view.user_vote, 0);
}

#[tokio::test]
async fn rejects_out_of_range_vote_values() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let post = new_post(&mut conn, &alice, "First").await;

    assert!(PostVote::upsert(&mut conn, post.id, alice.id, 5).await.is_err());
    assert!(PostVote::upsert(&mut conn, post.id, alice.id, 0).await.is_err());
}

#[tokio::test]
async fn score_sums_every_voter() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;
    let caryl = new_user(&mut conn, "caryl").await;
    let post = new_post(&mut conn, &alice, "First").await;

    PostVote::upsert(&mut conn, post.id, alice.id, 1).await.unwrap();
    PostVote::upsert(&mut conn, post.id, bob.id, 1).await.unwrap();
    PostVote::upsert(&mut conn, post.id, caryl.id, -1).await.unwrap();

    let view = PostView::find(&mut conn, post.id, Some(caryl.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, 1);
    assert_eq!(view.user_vote, -1);

    // Anonymous viewers see the same score and a zero user vote.
    let view = PostView::find(&mut conn, post.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, 1);
    assert_eq!(view.user_vote, 0);
}

#[tokio::test]
async fn sorts_by_votes_with_stable_ties() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;

    let first = new_post(&mut conn, &alice, "First").await;
    let second = new_post(&mut conn, &alice, "Second").await;
    let third = new_post(&mut conn, &alice, "Third").await;

    PostVote::upsert(&mut conn, second.id, alice.id, 1).await.unwrap();
    PostVote::upsert(&mut conn, second.id, bob.id, 1).await.unwrap();
    PostVote::upsert(&mut conn, third.id, alice.id, 1).await.unwrap();

    let feed: Vec<PostId> =
        PostView::list(&mut conn, None, SortKey::Votes, Pagination::default(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|view| view.post.id)
            .collect();

    assert_eq!(feed, vec![second.id, third.id, first.id]);

    // "first" has no votes at all but still shows up with a zero score.
    let feed = PostView::list(&mut conn, None, SortKey::Votes, Pagination::default(), None)
        .await
        .unwrap();
    assert_eq!(feed[2].net_votes, 0);
}

#[tokio::test]
async fn pages_never_overlap() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let mut ids = Vec::new();
    for n in 0..5 {
        ids.push(new_post(&mut conn, &alice, &format!("Post {n}")).await.id);
    }

    let page = |n| Pagination::new(Some(n), Some(2));

    let mut seen = Vec::new();
    for n in 1..=3 {
        let batch =
            PostView::list(&mut conn, None, SortKey::Old, page(n), None).await.unwrap();
        seen.extend(batch.into_iter().map(|view| view.post.id));
    }

    assert_eq!(seen, ids);
}

#[tokio::test]
async fn filters_posts_by_any_requested_topic() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let rust = new_topic(&mut conn, "rust").await;
    let go = new_topic(&mut conn, "go").await;

    let first = new_post(&mut conn, &alice, "First").await;
    let second = new_post(&mut conn, &alice, "Second").await;
    let third = new_post(&mut conn, &alice, "Third").await;

    Post::replace_topics(&mut conn, first.id, &[rust.id]).await.unwrap();
    Post::replace_topics(&mut conn, second.id, &[go.id]).await.unwrap();
    Post::replace_topics(&mut conn, third.id, &[rust.id, go.id]).await.unwrap();

    let feed: Vec<PostId> = PostView::list(
        &mut conn,
        Some(&[rust.id]),
        SortKey::Old,
        Pagination::default(),
        None,
    )
    .await
    .unwrap()
    .into_iter()
    .map(|view| view.post.id)
    .collect();
    assert_eq!(feed, vec![first.id, third.id]);
    assert_eq!(PostView::count(&mut conn, Some(&[rust.id])).await.unwrap(), 2);

    // A post carrying both topics is still listed and counted once.
    let both = [rust.id, go.id];
    let feed = PostView::list(&mut conn, Some(&both), SortKey::Old, Pagination::default(), None)
        .await
        .unwrap();
    assert_eq!(feed.len(), 3);
    assert_eq!(PostView::count(&mut conn, Some(&both)).await.unwrap(), 3);
    assert_eq!(PostView::count(&mut conn, None).await.unwrap(), 3);
}

#[tokio::test]
async fn replacing_topics_is_wholesale() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let rust = new_topic(&mut conn, "rust").await;
    let go = new_topic(&mut conn, "go").await;
    let post = new_post(&mut conn, &alice, "First").await;

    Post::replace_topics(&mut conn, post.id, &[rust.id, go.id]).await.unwrap();
    Post::replace_topics(&mut conn, post.id, &[go.id]).await.unwrap();

    let topics = Topic::list_for_posts(&mut conn, &[post.id]).await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].1.id, go.id);
}

#[tokio::test]
async fn editing_keeps_identity_and_touches_updated_at() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let post = new_post(&mut conn, &alice, "First").await;
    assert_eq!(post.updated_at, None);

    let edited = EditPost::builder()
        .id(post.id)
        .new_title("First, revised")
        .new_content("Updated body")
        .build()
        .edit(&mut conn)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(edited.id, post.id);
    assert_eq!(edited.title, "First, revised");
    assert!(edited.updated_at.is_some());
}

#[tokio::test]
async fn deleting_a_post_takes_its_votes_and_comments() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;
    let post = new_post(&mut conn, &alice, "First").await;
    let comment = new_comment(&mut conn, &post, &bob).await;

    PostVote::upsert(&mut conn, post.id, bob.id, 1).await.unwrap();

    assert!(Post::delete(&mut conn, post.id).await.unwrap());
    assert!(!Post::delete(&mut conn, post.id).await.unwrap());

    assert_eq!(Post::find(&mut conn, post.id).await.unwrap(), None);
    assert_eq!(Comment::find(&mut conn, comment.id).await.unwrap(), None);
    assert_eq!(PostVote::find(&mut conn, post.id, bob.id).await.unwrap(), None);
}

#[tokio::test]
async fn comment_votes_flow_like_post_votes() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    let alice = new_user(&mut conn, "alice").await;
    let bob = new_user(&mut conn, "bob").await;
    let post = new_post(&mut conn, &alice, "First").await;
    let comment = new_comment(&mut conn, &post, &bob).await;

    CommentVote::upsert(&mut conn, comment.id, alice.id, 1).await.unwrap();

    let list = CommentView::list(
        &mut conn,
        post.id,
        SortKey::Votes,
        Pagination::default(),
        Some(alice.id),
    )
    .await
    .unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].comment.id, comment.id);
    assert_eq!(list[0].net_votes, 1);
    assert_eq!(list[0].user_vote, 1);
    assert_eq!(list[0].author.as_ref().map(|user| user.id), Some(bob.id));

    assert_eq!(CommentView::count(&mut conn, post.id).await.unwrap(), 1);

    CommentVote::delete(&mut conn, comment.id, alice.id).await.unwrap();
    let view = CommentView::find(&mut conn, comment.id, Some(alice.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.net_votes, 0);
    assert_eq!(view.user_vote, 0);
}

#[tokio::test]
async fn user_names_are_unique_case_insensitively() {
    let pool = test_pool!();
    let mut conn = pool.acquire().await.unwrap();

    new_user(&mut conn, "alice").await;
    assert!(User::check_name_taken(&mut conn, "ALICE").await.unwrap());
    assert!(!User::check_name_taken(&mut conn, "bob").await.unwrap());

    let found = User::find_by_name(&mut conn, "Alice").await.unwrap();
    assert_eq!(found.map(|user| user.name), Some("alice".to_string()));
}
