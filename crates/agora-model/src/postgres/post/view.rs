use error_stack::{Result, ResultExt};
use sea_query::{
    Alias, Asterisk, Expr, Func, Iden, IntoColumnRef, IntoIden, Order, PostgresQueryBuilder,
    Query, SelectStatement, SimpleExpr, TableRef,
};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::error::QueryError;
use crate::id::{PostId, TopicId, UserId};
use crate::pagination::Pagination;
use crate::post::{Post, PostIdent, PostView};
use crate::postgres::into_view_aliases;
use crate::sort::SortKey;
use crate::topic::PostTopicIdent;
use crate::user::{User, UserIdent};
use crate::vote::PostVoteIdent;

#[derive(Debug, Clone, Iden)]
enum LocalIdent {
    /// Alias for `posts`
    P,
    /// Alias for `users`
    U,
    /// Alias for `post_votes`, joined for every voter
    V,
    /// Alias for `post_votes`, joined for the viewer's own row only
    Uv,
}

impl PostView {
    #[tracing::instrument(skip_all, name = "db.post_view.find")]
    pub async fn find(
        conn: &mut PgConnection,
        id: PostId,
        viewer: Option<UserId>,
    ) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Self::generate_select_stmt(viewer)
            .and_where(Expr::col((LocalIdent::P, PostIdent::Id)).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find post view from post id")
    }

    /// Lists one page of the feed. Aggregates come from the same
    /// statement as the rows, so a page is internally consistent even
    /// while votes are being cast concurrently.
    #[tracing::instrument(skip_all, name = "db.post_view.list")]
    pub async fn list(
        conn: &mut PgConnection,
        topics: Option<&[TopicId]>,
        sort: SortKey,
        pagination: Pagination,
        viewer: Option<UserId>,
    ) -> Result<Vec<Self>, QueryError> {
        let mut stmt = Self::generate_select_stmt(viewer);
        if let Some(topics) = topics {
            stmt.and_where(topic_filter(topics));
        }
        apply_sort(&mut stmt, sort);

        let (sql, values) = stmt
            .offset(pagination.offset())
            .limit(pagination.limit())
            .build_sqlx(PostgresQueryBuilder);

        let list = sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not fetch a page of the post feed")?;

        Ok(list)
    }

    /// Counts every post matching the same filter as [`PostView::list`],
    /// ignoring pagination.
    #[tracing::instrument(skip_all, name = "db.post_view.count")]
    pub async fn count(
        conn: &mut PgConnection,
        topics: Option<&[TopicId]>,
    ) -> Result<i64, QueryError> {
        let mut stmt = Query::select();
        stmt.expr(Func::count(Expr::col(Asterisk)))
            .from_as(PostIdent::Posts, LocalIdent::P);

        if let Some(topics) = topics {
            stmt.and_where(topic_filter(topics));
        }

        let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);
        sqlx::query_scalar_with::<_, i64, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not count posts")
    }

    fn generate_select_stmt(viewer: Option<UserId>) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.exprs(into_view_aliases(
            Post::view_columns(LocalIdent::P).into_iter(),
        ))
        .exprs(into_view_aliases(
            User::view_columns(LocalIdent::U).into_iter(),
        ))
        .expr_as(
            Func::coalesce([
                Func::sum(Expr::col((LocalIdent::V, PostVoteIdent::Value))).into(),
                Expr::val(0i64).into(),
            ]),
            Alias::new("net_votes"),
        )
        .from_as(PostIdent::Posts, LocalIdent::P)
        .left_join(
            TableRef::Table(UserIdent::Users.into_iden()).alias(LocalIdent::U),
            Expr::col((LocalIdent::U, UserIdent::Id))
                .eq(Expr::col((LocalIdent::P, PostIdent::AuthorId))),
        )
        .left_join(
            TableRef::Table(PostVoteIdent::PostVotes.into_iden()).alias(LocalIdent::V),
            Expr::col((LocalIdent::V, PostVoteIdent::PostId))
                .eq(Expr::col((LocalIdent::P, PostIdent::Id))),
        )
        .group_by_columns([
            (LocalIdent::P, PostIdent::Id).into_column_ref(),
            (LocalIdent::U, UserIdent::Id).into_column_ref(),
        ]);

        match viewer {
            Some(viewer) => {
                stmt.expr_as(
                    Func::coalesce([
                        Func::min(Expr::col((LocalIdent::Uv, PostVoteIdent::Value))).into(),
                        Expr::val(0i16).into(),
                    ]),
                    Alias::new("user_vote"),
                )
                .left_join(
                    TableRef::Table(PostVoteIdent::PostVotes.into_iden()).alias(LocalIdent::Uv),
                    Expr::col((LocalIdent::Uv, PostVoteIdent::PostId))
                        .eq(Expr::col((LocalIdent::P, PostIdent::Id)))
                        .and(
                            Expr::col((LocalIdent::Uv, PostVoteIdent::UserId)).eq(viewer.0),
                        ),
                );
            }
            // Anonymous viewers always see a zero; their votes table is
            // never even joined.
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
            .order_by((LocalIdent::P, PostIdent::CreatedAt), Order::Desc)
            .order_by((LocalIdent::P, PostIdent::Id), Order::Desc),
        SortKey::Old => stmt
            .order_by((LocalIdent::P, PostIdent::CreatedAt), Order::Asc)
            .order_by((LocalIdent::P, PostIdent::Id), Order::Asc),
        SortKey::Votes => stmt
            .order_by(Alias::new("net_votes"), Order::Desc)
            .order_by((LocalIdent::P, PostIdent::Id), Order::Asc),
    };
}

/// A post matches when it carries at least one of the requested topics.
fn topic_filter(topics: &[TopicId]) -> SimpleExpr {
    Expr::col((LocalIdent::P, PostIdent::Id)).in_subquery(
        Query::select()
            .column(PostTopicIdent::PostId)
            .from(PostTopicIdent::PostTopics)
            .and_where(
                Expr::col(PostTopicIdent::TopicId).is_in(topics.iter().map(|topic| topic.0)),
            )
            .take(),
    )
}

#[cfg(test)]
mod tests {
    use sea_query::PostgresQueryBuilder;

    use super::*;

    #[test]
    fn sums_every_voter_once() {
        let sql = PostView::generate_select_stmt(None).to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"COALESCE(SUM("v"."value"), 0) AS "net_votes""#), "{sql}");
        assert!(
            sql.contains(r#"LEFT JOIN "post_votes" AS "v" ON "v"."post_id" = "p"."id""#),
            "{sql}"
        );
        assert!(sql.contains("GROUP BY"), "{sql}");
    }

    #[test]
    fn anonymous_viewers_get_a_constant_zero() {
        let sql = PostView::generate_select_stmt(None).to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"0 AS "user_vote""#), "{sql}");
        assert!(!sql.contains(r#""uv""#), "{sql}");
    }

    #[test]
    fn viewers_get_their_own_vote_joined() {
        let sql =
            PostView::generate_select_stmt(Some(UserId(42))).to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"COALESCE(MIN("uv"."value"), 0) AS "user_vote""#),
            "{sql}"
        );
        assert!(sql.contains(r#""uv"."user_id" = 42"#), "{sql}");
    }

    #[test]
    fn every_sort_breaks_ties_on_the_post_id() {
        let mut stmt = PostView::generate_select_stmt(None);
        apply_sort(&mut stmt, SortKey::New);
        let sql = stmt.to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"ORDER BY "p"."created_at" DESC, "p"."id" DESC"#),
            "{sql}"
        );

        let mut stmt = PostView::generate_select_stmt(None);
        apply_sort(&mut stmt, SortKey::Old);
        let sql = stmt.to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"ORDER BY "p"."created_at" ASC, "p"."id" ASC"#),
            "{sql}"
        );

        let mut stmt = PostView::generate_select_stmt(None);
        apply_sort(&mut stmt, SortKey::Votes);
        let sql = stmt.to_string(PostgresQueryBuilder);
        assert!(
            sql.contains(r#"ORDER BY "net_votes" DESC, "p"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn topic_filter_matches_any_requested_topic() {
        let sql = Query::select()
            .column(Asterisk)
            .from_as(PostIdent::Posts, LocalIdent::P)
            .and_where(topic_filter(&[TopicId(1), TopicId(2)]))
            .to_string(PostgresQueryBuilder);

        assert!(
            sql.contains(
                r#""p"."id" IN (SELECT "post_id" FROM "post_topics" WHERE "topic_id" IN (1, 2))"#
            ),
            "{sql}"
        );
    }
}
