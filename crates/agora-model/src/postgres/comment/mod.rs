use error_stack::{Result, ResultExt};
use sea_query::{Asterisk, Expr, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::comment::{
    Comment, CommentIdent, DeleteCommentError, EditComment, EditCommentError, InsertComment,
    InsertCommentError,
};
use crate::error::QueryError;
use crate::id::CommentId;

mod view;

impl Comment {
    #[tracing::instrument(skip_all, name = "db.comments.find")]
    pub async fn find(conn: &mut PgConnection, id: CommentId) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(CommentIdent::Comments)
            .and_where(Expr::col(CommentIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find comment by id")
    }

    /// Returns whether a row was actually deleted.
    #[tracing::instrument(skip_all, name = "db.comments.delete")]
    pub async fn delete(
        conn: &mut PgConnection,
        id: CommentId,
    ) -> Result<bool, DeleteCommentError> {
        let (sql, values) = Query::delete()
            .from_table(CommentIdent::Comments)
            .and_where(Expr::col(CommentIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(DeleteCommentError)?;

        Ok(result.rows_affected() > 0)
    }
}

impl InsertComment<'_> {
    #[tracing::instrument(skip_all, name = "db.comments.insert")]
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<Comment, InsertCommentError> {
        let (sql, values) = Query::insert()
            .into_table(CommentIdent::Comments)
            .columns([
                CommentIdent::PostId,
                CommentIdent::AuthorId,
                CommentIdent::Content,
            ])
            .values_panic([
                self.post_id.0.into(),
                self.author_id.0.into(),
                self.content.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Comment, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(InsertCommentError)
    }
}

impl EditComment<'_> {
    /// Returns the updated row, or `None` when the comment no longer
    /// exists.
    #[tracing::instrument(skip_all, name = "db.comments.edit")]
    pub async fn edit(&self, conn: &mut PgConnection) -> Result<Option<Comment>, EditCommentError> {
        let (sql, values) = Query::update()
            .table(CommentIdent::Comments)
            .value(CommentIdent::Content, self.new_content)
            .value(CommentIdent::UpdatedAt, Expr::current_timestamp())
            .and_where(Expr::col(CommentIdent::Id).eq(self.id.0))
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Comment, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(EditCommentError)
    }
}
