use error_stack::{Result, ResultExt};
use sea_query::{Asterisk, Expr, Func, Order, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;

use crate::error::QueryError;
use crate::id::UserId;
use crate::user::{InsertUser, InsertUserError, User, UserIdent};

impl User {
    #[tracing::instrument(skip_all, name = "db.users.find")]
    pub async fn find(conn: &mut PgConnection, id: UserId) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(UserIdent::Users)
            .and_where(Expr::col(UserIdent::Id).eq(id.0))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find user by id")
    }

    #[tracing::instrument(skip_all, name = "db.users.list")]
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(UserIdent::Users)
            .order_by(UserIdent::Id, Order::Asc)
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_all(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not list users")
    }

    /// Name lookup is case-insensitive, matching the unique index on
    /// `lower(name)`.
    #[tracing::instrument(skip_all, name = "db.users.find_by_name")]
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Self>, QueryError> {
        let (sql, values) = Query::select()
            .column(Asterisk)
            .from(UserIdent::Users)
            .and_where(
                Expr::expr(Func::lower(Expr::col(UserIdent::Name)))
                    .eq(Func::lower(Expr::val(name))),
            )
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, Self, _>(&sql, values)
            .fetch_optional(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not find user by name")
    }

    #[tracing::instrument(skip_all, name = "db.users.check_name_taken")]
    pub async fn check_name_taken(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<bool, QueryError> {
        let (sql, values) = Query::select()
            .expr(Expr::exists(
                Query::select()
                    .column(UserIdent::Id)
                    .from(UserIdent::Users)
                    .and_where(
                        Expr::expr(Func::lower(Expr::col(UserIdent::Name)))
                            .eq(Func::lower(Expr::val(name))),
                    )
                    .take(),
            ))
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_scalar_with::<_, bool, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(QueryError)
            .attach_printable("could not check whether user name is taken")
    }
}

impl InsertUser<'_> {
    #[tracing::instrument(skip_all, name = "db.users.insert")]
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<User, InsertUserError> {
        let (sql, values) = Query::insert()
            .into_table(UserIdent::Users)
            .columns([UserIdent::Name, UserIdent::PasswordHash])
            .values_panic([self.name.into(), self.password_hash.into()])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        sqlx::query_as_with::<_, User, _>(&sql, values)
            .fetch_one(conn)
            .await
            .change_context(InsertUserError)
    }
}
