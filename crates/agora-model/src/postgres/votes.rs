use error_stack::{Result, ResultExt};
use sea_query::{Asterisk, Expr, InsertStatement, OnConflict, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::error::QueryError;
use crate::id::{CommentId, PostId, UserId};
use crate::vote::{
    CommentVote, CommentVoteIdent, DeleteVoteError, PostVote, PostVoteIdent, UpsertVoteError,
};

impl PostVote {
    /// Writes the vote in a single statement. An existing row from the
    /// same user is overwritten in place, so two racing casts cannot
    /// produce a duplicate and the later one simply wins.
    #[tracing::instrument(skip_all, name = "db.post_votes.upsert")]
    pub async fn upsert(
        conn: &mut PgConnection,
        post_id: PostId,
        user_id: UserId,
        value: i16,
    ) -> Result<(), UpsertVoteError> {
        let (sql, values) =
            generate_upsert_stmt(post_id, user_id, value).build_sqlx(PostgresQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(UpsertVoteError)?;

        Ok(())
    }

    /// Withdraws the vote. Deleting an absent row is not an error, so
    /// clearing is idempotent.
    #[tracing::instrument(skip_all, name = "db.post_votes.delete")]
    pub async fn delete(
        conn: &mut PgConnection,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<(), DeleteVoteError> {
        let (sql, values) = Query::delete()
            .from_table(PostVoteIdent::PostVotes)
            .and_where(Expr::col(PostVoteIdent::PostId).eq(post_id.0))
            .and_where(Expr::col(PostVoteIdent::UserId).eq(user_id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(DeleteVoteError)?;

        Ok(())
    }

    #[tracing::instrument(skip_all, name = "db.post_votes.find")]
    pub async fn find(
        conn: &mut PgConnection,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(PostVoteIdent::PostVotes)
            .and_where(Expr::col(PostVoteIdent::PostId).eq(post_id.0))
            .and_where(Expr::col(PostVoteIdent::UserId).eq(user_id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find post vote")
    }
}

impl CommentVote {
    #[tracing::instrument(skip_all, name = "db.comment_votes.upsert")]
    pub async fn upsert(
        conn: &mut PgConnection,
        comment_id: CommentId,
        user_id: UserId,
        value: i16,
    ) -> Result<(), UpsertVoteError> {
        let (sql, values) = Query::insert()
            .into_table(CommentVoteIdent::CommentVotes)
            .columns([
                CommentVoteIdent::CommentId,
                CommentVoteIdent::UserId,
                CommentVoteIdent::Value,
            ])
            .values_panic([comment_id.0.into(), user_id.0.into(), value.into()])
            .on_conflict(
                OnConflict::columns([CommentVoteIdent::CommentId, CommentVoteIdent::UserId])
                    .update_column(CommentVoteIdent::Value)
                    .to_owned(),
            )
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(UpsertVoteError)?;

        Ok(())
    }

    #[tracing::instrument(skip_all, name = "db.comment_votes.delete")]
    pub async fn delete(
        conn: &mut PgConnection,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<(), DeleteVoteError> {
        let (sql, values) = Query::delete()
            .from_table(CommentVoteIdent::CommentVotes)
            .and_where(Expr::col(CommentVoteIdent::CommentId).eq(comment_id.0))
            .and_where(Expr::col(CommentVoteIdent::UserId).eq(user_id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(conn)
            .await
            .change_context(DeleteVoteError)?;

        Ok(())
    }

    #[tracing::instrument(skip_all, name = "db.comment_votes.find")]
    pub async fn find(
        conn: &mut PgConnection,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(CommentVoteIdent::CommentVotes)
            .and_where(Expr::col(CommentVoteIdent::CommentId).eq(comment_id.0))
            .and_where(Expr::col(CommentVoteIdent::UserId).eq(user_id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find comment vote")
    }
}

fn generate_upsert_stmt(post_id: PostId, user_id: UserId, value: i16) -> InsertStatement {
    Query::insert()
        .into_table(PostVoteIdent::PostVotes)
        .columns([
            PostVoteIdent::PostId,
            PostVoteIdent::UserId,
            PostVoteIdent::Value,
        ])
        .values_panic([post_id.0.into(), user_id.0.into(), value.into()])
        .on_conflict(
            OnConflict::columns([PostVoteIdent::PostId, PostVoteIdent::UserId])
                .update_column(PostVoteIdent::Value)
                .to_owned(),
        )
        .to_owned()
}
