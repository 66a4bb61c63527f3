use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Builds a connection pool for `database_url`.
///
/// Every connection to `:memory:` opens a separate database, so an in-memory
/// pool is pinned to a single connection that is never recycled.
pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let mut builder = Pool::builder();
    if database_url == ":memory:" {
        builder = builder.max_size(1).max_lifetime(None).idle_timeout(None);
    }
    builder.build(manager)
}
