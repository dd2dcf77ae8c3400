use error_stack::{Result, ResultExt};
use sea_query::{Asterisk, Expr, Func, Order, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgConnection};

use crate::error::QueryError;
use crate::id::{PostId, TopicId};
use crate::topic::{InsertTopic, InsertTopicError, PostTopicIdent, Topic, TopicIdent};

impl Topic {
    #[tracing::instrument(skip_all, name = "db.topics.find")]
    pub async fn find(conn: &mut PgConnection, id: TopicId) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(TopicIdent::Topics)
            .and_where(Expr::col(TopicIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find topic by id")
    }

    #[tracing::instrument(skip_all, name = "db.topics.list")]
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(TopicIdent::Topics)
            .order_by(TopicIdent::Name, Order::Asc)
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not list topics")
    }

    /// Fetches the subset of `ids` that actually exist. Callers compare
    /// lengths to reject requests naming unknown topics.
    #[tracing::instrument(skip_all, name = "db.topics.find_by_ids")]
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        ids: &[TopicId],
    ) -> Result<Vec<Self>, QueryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(TopicIdent::Topics)
            .and_where(Expr::col(TopicIdent::Id).is_in(ids.iter().map(|id| id.0)))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not fetch topics by ids")
    }

    /// Fetches the topics of every listed post in one round trip.
    #[tracing::instrument(skip_all, name = "db.topics.list_for_posts")]
    pub async fn list_for_posts(
        conn: &mut PgConnection,
        post_ids: &[PostId],
    ) -> Result<Vec<(PostId, Topic)>, QueryError> {
        #[derive(FromRow)]
        struct Row {
            post_id: PostId,
            id: TopicId,
            name: String,
        }

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, values) = Query::select()
            .column(PostTopicIdent::PostId)
            .column((TopicIdent::Topics, TopicIdent::Id))
            .column((TopicIdent::Topics, TopicIdent::Name))
            .from(PostTopicIdent::PostTopics)
            .inner_join(
                TopicIdent::Topics,
                Expr::col((TopicIdent::Topics, TopicIdent::Id))
                    .eq(Expr::col((PostTopicIdent::PostTopics, PostTopicIdent::TopicId))),
            )
            .and_where(
                Expr::col(PostTopicIdent::PostId).is_in(post_ids.iter().map(|id| id.0)),
            )
            .order_by((TopicIdent::Topics, TopicIdent::Name), Order::Asc)
            .build_sqlx(PostgresQueryBuilder);

        let rows = sqlx::query_as_with::<_, Row, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not fetch topics for posts")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, Topic { id: row.id, name: row.name }))
            .collect())
    }

    #[tracing::instrument(skip_all, name = "db.topics.check_name_taken")]
    pub async fn check_name_taken(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<bool, QueryError> {
        let (sql, values) = Query::select()
            .expr(Expr::exists(
                Query::select()
                    .column(TopicIdent::Id)
                    .from(TopicIdent::Topics)
                    .and_where(
                        Expr::expr(Func::lower(Expr::col(TopicIdent::Name)))
                            .eq(Func::lower(Expr::val(name))),
                    )
                    .take(),
            ))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_scalar_with::<_, bool, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not check whether topic name is taken")
    }
}

impl InsertTopic<'_> {
    #[tracing::instrument(skip_all, name = "db.topics.insert")]
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<Topic, InsertTopicError> {
        let (sql, values) = Query::insert()
            .into_table(TopicIdent::Topics)
            .columns([TopicIdent::Name])
            .values_panic([self.name.into()])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Topic, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(InsertTopicError)
    }
}
