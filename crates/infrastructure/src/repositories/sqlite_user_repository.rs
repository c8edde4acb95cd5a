use crate::database::{users, PooledSqlite, SqlitePool};
use async_trait::async_trait;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::Sqlite;
use domain::{DomainError, PageRequest, PagedResult, User, UserRepository, UserSearch};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

// Database model - separate from domain entity
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserModel {
    id: i32,
    name: String,
    level: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
struct NewUserModel {
    name: String,
    level: i32,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User::with_id(model.id, model.name, model.level)
    }
}

impl From<&User> for NewUserModel {
    fn from(user: &User) -> Self {
        NewUserModel {
            name: user.name().to_string(),
            level: user.level(),
        }
    }
}

fn storage_error(err: DieselError) -> DomainError {
    match err {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation,
            info,
        ) => DomainError::ConstraintViolation(info.message().to_string()),
        other => DomainError::RepositoryError(other.to_string()),
    }
}

fn join_error(err: tokio::task::JoinError) -> DomainError {
    DomainError::repository(err.to_string())
}

fn checkout(pool: &SqlitePool) -> Result<PooledSqlite, DomainError> {
    pool.get().map_err(|e| DomainError::repository(e.to_string()))
}

fn begin(pool: &SqlitePool) -> Result<PooledSqlite, DomainError> {
    let mut conn = checkout(pool)?;
    <AnsiTransactionManager as TransactionManager<SqliteConnection>>::begin_transaction(&mut *conn)
        .map_err(storage_error)?;
    Ok(conn)
}

fn filtered(criteria: &UserSearch) -> users::BoxedQuery<'static, Sqlite> {
    let mut query = users::table.into_boxed();

    // Keywords are letters only, so no LIKE wildcards can sneak in.
    // SQLite's LIKE folds ASCII case.
    if let Some(keyword) = &criteria.keyword {
        query = query.filter(users::name.like(format!("%{keyword}%")));
    }
    if let Some(min_level) = criteria.min_level {
        query = query.filter(users::level.ge(min_level));
    }
    if let Some(max_level) = criteria.max_level {
        query = query.filter(users::level.le(max_level));
    }

    query
}

fn insert_user(conn: &mut SqliteConnection, new_user: &NewUserModel) -> QueryResult<UserModel> {
    diesel::insert_into(users::table)
        .values(new_user)
        .execute(conn)?;

    // The pending transaction owns this connection, so the newest row is ours
    users::table
        .order(users::id.desc())
        .select(UserModel::as_select())
        .first::<UserModel>(conn)
}

type UnitOfWork = Arc<Mutex<Option<PooledSqlite>>>;

fn lock(pending: &UnitOfWork) -> Result<MutexGuard<'_, Option<PooledSqlite>>, DomainError> {
    pending
        .lock()
        .map_err(|_| DomainError::repository("pending user writes are unavailable after a panic"))
}

/// Diesel-backed user store.
///
/// Writes go through a unit of work: the first `add` checks a connection out
/// of the pool and opens a transaction on it, later adds join that
/// transaction, and `commit` makes the batch durable before handing the
/// connection back. Every insert runs in its own savepoint, so a failed add
/// only undoes its own row. The open connection is only touched from
/// blocking tasks while the lock is held; dropping an `add` or `commit`
/// future never drops it. Reads use their own pooled connections and only
/// see committed rows.
pub struct SqliteUserRepository {
    pool: SqlitePool,
    pending: UnitOfWork,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    async fn read<T, F>(&self, query: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = checkout(&pool)?;
            query(&mut conn).map_err(storage_error)
        })
        .await
        .map_err(join_error)?
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let result = self
            .read(move |conn| {
                users::table
                    .filter(users::id.eq(id))
                    .select(UserModel::as_select())
                    .first::<UserModel>(conn)
                    .optional()
            })
            .await?;

        Ok(result.map(|model| model.into()))
    }

    async fn get_all(&self) -> Result<Vec<User>, DomainError> {
        let result = self
            .read(|conn| {
                users::table
                    .order(users::id.asc())
                    .select(UserModel::as_select())
                    .load::<UserModel>(conn)
            })
            .await?;

        Ok(result.into_iter().map(|model| model.into()).collect())
    }

    async fn add(&self, user: User) -> Result<User, DomainError> {
        let new_user = NewUserModel::from(&user);
        let pool = self.pool.clone();
        let pending = Arc::clone(&self.pending);

        let (model, joined) = tokio::task::spawn_blocking(move || -> Result<(UserModel, bool), DomainError> {
            let mut pending = lock(&pending)?;
            let joined = pending.is_some();
            let conn = match pending.take() {
                Some(conn) => conn,
                None => begin(&pool)?,
            };
            let conn: &mut SqliteConnection = pending.insert(conn);

            // Nested inside the open transaction this is a savepoint; a
            // failure rolls back to it and leaves earlier adds pending.
            let model = conn
                .transaction::<_, DieselError, _>(|conn| insert_user(conn, &new_user))
                .map_err(storage_error)?;
            Ok((model, joined))
        })
        .await
        .map_err(join_error)??;

        debug!(id = model.id, joined, "Queued user insert");
        Ok(model.into())
    }

    async fn commit(&self) -> Result<(), DomainError> {
        let pending = Arc::clone(&self.pending);

        let committed = tokio::task::spawn_blocking(move || -> Result<bool, DomainError> {
            let mut pending = lock(&pending)?;
            let Some(mut conn) = pending.take() else {
                return Ok(false);
            };

            <AnsiTransactionManager as TransactionManager<SqliteConnection>>::commit_transaction(&mut *conn)
                .map_err(|e| {
                    error!(error = %e, "Failed to commit pending user writes");
                    storage_error(e)
                })?;
            Ok(true)
        })
        .await
        .map_err(join_error)??;

        if committed {
            debug!("Committed pending user writes");
        }
        Ok(())
    }

    async fn search(&self, criteria: &UserSearch) -> Result<Vec<User>, DomainError> {
        let criteria = criteria.clone();
        let result = self
            .read(move |conn| {
                filtered(&criteria)
                    .order((users::level.desc(), users::id.asc()))
                    .load::<UserModel>(conn)
            })
            .await?;

        Ok(result.into_iter().map(|model| model.into()).collect())
    }

    async fn search_page(
        &self,
        criteria: &UserSearch,
        page: PageRequest,
    ) -> Result<PagedResult<User>, DomainError> {
        let criteria = criteria.clone();
        let limit = i64::from(page.page_size);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let (total, rows) = self
            .read(move |conn| {
                let total = filtered(&criteria).count().get_result::<i64>(conn)?;
                let rows = filtered(&criteria)
                    .order((users::level.desc(), users::id.asc()))
                    .limit(limit)
                    .offset(offset)
                    .load::<UserModel>(conn)?;
                Ok((total, rows))
            })
            .await?;

        let items = rows.into_iter().map(|model| model.into()).collect();
        Ok(PagedResult::new(items, u64::try_from(total).unwrap_or(0), page))
    }
}
