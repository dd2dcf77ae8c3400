use error_stack::{Result, ResultExt};
use sea_query::{Asterisk, Expr, OnConflict, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::error::QueryError;
use crate::id::{PostId, TopicId};
use crate::post::{
    DeletePostError, EditPost, EditPostError, InsertPost, InsertPostError, Post, PostIdent,
    ReplaceTopicsError,
};
use crate::topic::PostTopicIdent;

mod view;

impl Post {
    #[tracing::instrument(skip_all, name = "db.posts.find")]
    pub async fn find(conn: &mut PgConnection, id: PostId) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(PostIdent::Posts)
            .and_where(Expr::col(PostIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find post by id")
    }

    /// Deletes the post row. Votes, comments and topic links go with it
    /// through the cascading foreign keys.
    ///
    /// Returns whether a row was actually deleted.
    #[tracing::instrument(skip_all, name = "db.posts.delete")]
    pub async fn delete(conn: &mut PgConnection, id: PostId) -> Result<bool, DeletePostError> {
        let (sql, values) = Query::delete()
            .from_table(PostIdent::Posts)
            .and_where(Expr::col(PostIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(DeletePostError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the post's topic set wholesale. Callers run this inside
    /// a transaction together with the edit it belongs to.
    #[tracing::instrument(skip_all, name = "db.posts.replace_topics")]
    pub async fn replace_topics(
        conn: &mut PgConnection,
        id: PostId,
        topics: &[TopicId],
    ) -> Result<(), ReplaceTopicsError> {
        let (sql, values) = Query::delete()
            .from_table(PostTopicIdent::PostTopics)
            .and_where(Expr::col(PostTopicIdent::PostId).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(&mut *conn)
            .await
            .change_context(ReplaceTopicsError)?;

        if topics.is_empty() {
            return Ok(());
        }

        let mut stmt = Query::insert();
        stmt.into_table(PostTopicIdent::PostTopics)
            .columns([PostTopicIdent::PostId, PostTopicIdent::TopicId]);

        for topic in topics {
            stmt.values_panic([id.0.into(), topic.0.into()]);
        }

        // Tolerates duplicate topic ids in the request body.
        stmt.on_conflict(
            OnConflict::columns([PostTopicIdent::PostId, PostTopicIdent::TopicId])
                .do_nothing()
                .to_owned(),
        );

        let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(ReplaceTopicsError)?;

        Ok(())
    }
}

impl InsertPost<'_> {
    #[tracing::instrument(skip_all, name = "db.posts.insert")]
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<Post, InsertPostError> {
        let (sql, values) = Query::insert()
            .into_table(PostIdent::Posts)
            .columns([PostIdent::AuthorId, PostIdent::Title, PostIdent::Content])
            .values_panic([self.author_id.0.into(), self.title.into(), self.content.into()])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Post, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(InsertPostError)
    }
}

impl EditPost<'_> {
    /// Returns the updated row, or `None` when the post no longer
    /// exists.
    #[tracing::instrument(skip_all, name = "db.posts.edit")]
    pub async fn edit(&self, conn: &mut PgConnection) -> Result<Option<Post>, EditPostError> {
        let (sql, values) = Query::update()
            .table(PostIdent::Posts)
            .value(PostIdent::Title, self.new_title)
            .value(PostIdent::Content, self.new_content)
            .value(PostIdent::UpdatedAt, Expr::current_timestamp())
            .and_where(Expr::col(PostIdent::Id).eq(self.id.0))
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Post, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(EditPostError)
    }
}
