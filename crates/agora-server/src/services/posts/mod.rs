use agora_api_types::ListQuery;
use agora_db::PgConnection;
use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::{PostId, TopicId, UserId};
use agora_model::pagination::Pagination;
use agora_model::post::{EditPost, InsertPost};
use agora_model::{Post, PostView, Topic};
use std::collections::{BTreeSet, HashMap};

use crate::extract::SessionUser;
use crate::services::util::{ensure_author, parse_sort, parse_topic_ids, CommitError};
use crate::App;

mod vote;
pub use self::vote::VotePost;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// A post view paired with its topics, ready to be serialized.
#[derive(Debug)]
pub struct PostData {
    pub view: PostView,
    pub topics: Vec<Topic>,
}

#[derive(Debug)]
pub struct ListedPosts {
    pub items: Vec<PostData>,
    /// Posts matching the filter, before pagination.
    pub total: i64,
}

#[derive(Debug)]
pub struct GetPost {
    pub id: PostId,
}

impl GetPost {
    #[tracing::instrument(skip(app), name = "services.posts.get")]
    pub async fn perform(self, app: &App, viewer: Option<UserId>) -> Result<PostData, ApiError> {
        let mut conn = app.db_read().await?;
        fetch_post_data(&mut conn, self.id, viewer)
            .await?
            .ok_or_else(not_found)
    }
}

#[derive(Debug)]
pub struct ListPosts<'a> {
    pub query: &'a ListQuery,
}

impl ListPosts<'_> {
    #[tracing::instrument(skip(app), name = "services.posts.list")]
    pub async fn perform(self, app: &App, viewer: Option<UserId>) -> Result<ListedPosts, ApiError> {
        let sort = parse_sort(self.query.sort.as_deref())?;
        let topics = parse_topic_ids(self.query.topics.as_deref())?;
        let pagination = Pagination::new(self.query.page, self.query.limit);

        let mut conn = app.db_read().await?;
        let views =
            PostView::list(&mut conn, topics.as_deref(), sort, pagination, viewer).await?;
        let total = PostView::count(&mut conn, topics.as_deref()).await?;

        let ids = views.iter().map(|view| view.post.id).collect::<Vec<_>>();
        let mut by_post: HashMap<PostId, Vec<Topic>> = HashMap::new();
        for (post_id, topic) in Topic::list_for_posts(&mut conn, &ids).await? {
            by_post.entry(post_id).or_default().push(topic);
        }

        let items = views
            .into_iter()
            .map(|view| {
                let topics = by_post.remove(&view.post.id).unwrap_or_default();
                PostData { view, topics }
            })
            .collect();

        Ok(ListedPosts { items, total })
    }
}

#[derive(Debug)]
pub struct PublishPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub topic_ids: Vec<TopicId>,
}

impl PublishPost<'_> {
    #[tracing::instrument(skip(app), name = "services.posts.publish")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<PostData, ApiError> {
        let (title, content) = validate_post_body(self.title, self.content)?;
        let topic_ids = check_topics_exist(app, self.topic_ids).await?;

        let mut tx = app.db_write().await?;
        let post = InsertPost::builder()
            .author_id(session.id)
            .title(title)
            .content(content)
            .build()
            .insert(&mut tx)
            .await?;

        Post::replace_topics(&mut tx, post.id, &topic_ids).await?;

        let data = fetch_post_data(&mut tx, post.id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(data)
    }
}

#[derive(Debug)]
pub struct UpdatePost<'a> {
    pub id: PostId,
    pub title: &'a str,
    pub content: &'a str,
}

impl UpdatePost<'_> {
    #[tracing::instrument(skip(app), name = "services.posts.update")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<PostData, ApiError> {
        let (title, content) = validate_post_body(self.title, self.content)?;

        let mut tx = app.db_write().await?;
        let post = Post::find(&mut tx, self.id).await?.ok_or_else(not_found)?;
        ensure_author(post.author_id, session.id)?;

        EditPost::builder()
            .id(self.id)
            .new_title(title)
            .new_content(content)
            .build()
            .edit(&mut tx)
            .await?
            .ok_or_else(not_found)?;

        let data = fetch_post_data(&mut tx, self.id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(data)
    }
}

#[derive(Debug)]
pub struct DeletePost {
    pub id: PostId,
}

impl DeletePost {
    #[tracing::instrument(skip(app), name = "services.posts.delete")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<(), ApiError> {
        let mut tx = app.db_write().await?;
        let post = Post::find(&mut tx, self.id).await?.ok_or_else(not_found)?;
        ensure_author(post.author_id, session.id)?;

        Post::delete(&mut tx, self.id).await?;
        tx.commit().await.change_context(CommitError)?;

        Ok(())
    }
}

#[derive(Debug)]
pub struct ReplacePostTags {
    pub id: PostId,
    pub topic_ids: Vec<TopicId>,
}

impl ReplacePostTags {
    #[tracing::instrument(skip(app), name = "services.posts.replace_tags")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<PostData, ApiError> {
        let topic_ids = check_topics_exist(app, self.topic_ids).await?;

        let mut tx = app.db_write().await?;
        let post = Post::find(&mut tx, self.id).await?.ok_or_else(not_found)?;
        ensure_author(post.author_id, session.id)?;

        Post::replace_topics(&mut tx, self.id, &topic_ids).await?;

        let data = fetch_post_data(&mut tx, self.id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(data)
    }
}

pub(super) fn not_found() -> ApiError {
    ApiError::new(ErrorCategory::NotFound).message("Could not find post")
}

pub(super) async fn fetch_post_data(
    conn: &mut PgConnection,
    id: PostId,
    viewer: Option<UserId>,
) -> Result<Option<PostData>, ApiError> {
    let Some(view) = PostView::find(conn, id, viewer).await? else {
        return Ok(None);
    };

    let topics = Topic::list_for_posts(conn, &[id])
        .await?
        .into_iter()
        .map(|(_, topic)| topic)
        .collect();

    Ok(Some(PostData { view, topics }))
}

fn validate_post_body<'a>(title: &'a str, content: &'a str) -> Result<(&'a str, &'a str), ApiError> {
    let title = title.trim();
    let content = content.trim();

    if title.is_empty() {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message(format!("Title must be at most {MAX_TITLE_LENGTH} characters long")));
    }
    if content.is_empty() {
        return Err(
            ApiError::new(ErrorCategory::InvalidRequest).message("Content must not be empty")
        );
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message(format!("Content must be at most {MAX_CONTENT_LENGTH} characters long")));
    }

    Ok((title, content))
}

/// Rejects requests naming topics that do not exist, so a typo in a tag
/// id fails loudly instead of silently dropping the tag.
async fn check_topics_exist(app: &App, topic_ids: Vec<TopicId>) -> Result<Vec<TopicId>, ApiError> {
    let requested = topic_ids.into_iter().collect::<BTreeSet<_>>();
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let requested = requested.into_iter().collect::<Vec<_>>();
    let mut conn = app.db_read().await?;
    let found = Topic::find_by_ids(&mut conn, &requested).await?;

    if found.len() != requested.len() {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message("One or more topics do not exist"));
    }

    Ok(requested)
}
