use error_stack::{Result, ResultExt};
use sea_query::{
    Alias, Asterisk, Expr, Func, Iden, IntoColumnRef, IntoIden, Order, PostgresQueryBuilder,
    Query, SelectStatement, TableRef,
};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::comment::{Comment, CommentIdent, CommentView};
use crate::error::QueryError;
use crate::id::{CommentId, PostId, UserId};
use crate::pagination::Pagination;
use crate::postgres::into_view_aliases;
use crate::sort::SortKey;
use crate::user::{User, UserIdent};
use crate::vote::CommentVoteIdent;

#[derive(Debug, Clone, Iden)]
enum LocalIdent {
    /// Alias for `comments`
    C,
    /// Alias for `users`
    U,
    /// Alias for `comment_votes`, joined for every voter
    V,
    /// Alias for `comment_votes`, joined for the viewer's own row only
    Uv,
}

impl CommentView {
    #[tracing::instrument(skip_all, name = "db.comment_view.find")]
    pub async fn find(
        conn: &mut PgConnection,
        id: CommentId,
        viewer: Option<UserId>,
    ) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Self::generate_select_stmt(viewer)
            .and_where(Expr::col((LocalIdent::C, CommentIdent::Id)).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find comment view from comment id")
    }

    /// Lists one page of a post's comments.
    #[tracing::instrument(skip_all, name = "db.comment_view.list")]
    pub async fn list(
        conn: &mut PgConnection,
        post_id: PostId,
        sort: SortKey,
        pagination: Pagination,
        viewer: Option<UserId>,
    ) -> Result<Vec<Self>, QueryError> {
        let mut stmt = Self::generate_select_stmt(viewer);
        stmt.and_where(Expr::col((LocalIdent::C, CommentIdent::PostId)).eq(post_id.0));
        apply_sort(&mut stmt, sort);

        let (sql, values) = stmt
            .offset(pagination.offset())
            .limit(pagination.limit())
            .build_sqlx(PostgresQueryBuilder);

        let list = sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not fetch a page of a post's comments")?;

        Ok(list)
    }

    /// Counts every comment under the post, ignoring pagination.
    #[tracing::instrument(skip_all, name = "db.comment_view.count")]
    pub async fn count(conn: &mut PgConnection, post_id: PostId) -> Result<i64, QueryError> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(Asterisk)))
            .from(CommentIdent::Comments)
            .and_where(Expr::col(CommentIdent::PostId).eq(post_id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_scalar_with::<_, i64, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not count a post's comments")
    }

    fn generate_select_stmt(viewer: Option<UserId>) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.exprs(into_view_aliases(
            Comment::view_columns(LocalIdent::C).into_iter(),
        ))
        .exprs(into_view_aliases(
            User::view_columns(LocalIdent::U).into_iter(),
        ))
        .expr_as(
            Func::coalesce([
                Func::sum(Expr::col((LocalIdent::V, CommentVoteIdent::Value))).into(),
                Expr::val(0i64).into(),
            ]),
            Alias::new("net_votes"),
        )
        .from_as(CommentIdent::Comments, LocalIdent::C)
        .left_join(
            TableRef::Table(UserIdent::Users.into_iden()).alias(LocalIdent::U),
            Expr::col((LocalIdent::U, UserIdent::Id))
                .eq(Expr::col((LocalIdent::C, CommentIdent::AuthorId))),
        )
        .left_join(
            TableRef::Table(CommentVoteIdent::CommentVotes.into_iden()).alias(LocalIdent::V),
            Expr::col((LocalIdent::V, CommentVoteIdent::CommentId))
                .eq(Expr::col((LocalIdent::C, CommentIdent::Id))),
        )
        .group_by_columns([
            (LocalIdent::C, CommentIdent::Id).into_column_ref(),
            (LocalIdent::U, UserIdent::Id).into_column_ref(),
        ]);

        match viewer {
            Some(viewer) => {
                stmt.expr_as(
                    Func::coalesce([
                        Func::min(Expr::col((LocalIdent::Uv, CommentVoteIdent::Value))).into(),
                        Expr::val(0i16).into(),
                    ]),
                    Alias::new("user_vote"),
                )
                .left_join(
                    TableRef::Table(CommentVoteIdent::CommentVotes.into_iden())
                        .alias(LocalIdent::Uv),
                    Expr::col((LocalIdent::Uv, CommentVoteIdent::CommentId))
                        .eq(Expr::col((LocalIdent::C, CommentIdent::Id)))
                        .and(
                            Expr::col((LocalIdent::Uv, CommentVoteIdent::UserId)).eq(viewer.0),
                        ),
                );
            }
            None => {
                stmt.expr_as(Expr::val(0i16), Alias::new("user_vote"));
            }
        }

        stmt.take()
    }
}

fn apply_sort(stmt: &mut SelectStatement, sort: SortKey) {
    match sort {
        SortKey::New => stmt
            .order_by((LocalIdent::C, CommentIdent::CreatedAt), Order::Desc)
            .order_by((LocalIdent::C, CommentIdent::Id), Order::Desc),
        SortKey::Old => stmt
            .order_by((LocalIdent::C, CommentIdent::CreatedAt), Order::Asc)
            .order_by((LocalIdent::C, CommentIdent::Id), Order::Asc),
        SortKey::Votes => stmt
            .order_by(Alias::new("net_votes"), Order::Desc)
            .order_by((LocalIdent::C, CommentIdent::Id), Order::Asc),
    };
}

#[cfg(test)]
mod tests {
    use sea_query::PostgresQueryBuilder;

    use super::*;

    #[test]
    fn aggregates_come_from_the_comment_votes_table() {
        let sql = CommentView::generate_select_stmt(Some(UserId(7)))
            .to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"COALESCE(SUM("v"."value"), 0) AS "net_votes""#),
            "{sql}"
        );
        assert!(
            sql.contains(r#"LEFT JOIN "comment_votes" AS "uv" ON"#),
            "{sql}"
        );
        assert!(sql.contains(r#""uv"."user_id" = 7"#), "{sql}");
    }

    #[test]
    fn vote_sort_breaks_ties_on_the_comment_id() {
        let mut stmt = CommentView::generate_select_stmt(None);
        apply_sort(&mut stmt, SortKey::Votes);
        let sql = stmt.to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"ORDER BY "net_votes" DESC, "c"."id" ASC"#),
            "{sql}"
        );
    }
}
