//! Connection pool.

use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncPgConnection>;

/// Build the pool. No connection is opened until the first checkout.
pub fn build_pool(database_url: &str, max_size: usize) -> anyhow::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))?;
    Ok(pool)
}

/// Live-database fixtures. Tests that need PostgreSQL call [`connect`] and
/// return early when `TEST_DATABASE_URL` is unset. The database is migrated
/// and may be wiped by restore tests, so point it at a scratch database.
#[cfg(test)]
pub(crate) mod test_db {
    use diesel_async::{AsyncConnection, AsyncPgConnection};
    use serde_json::json;
    use tokio::sync::{Mutex, MutexGuard};

    use crate::models::blog::{Blog, BlogInput};
    use crate::services::blog_service;

    static LOCK: Mutex<()> = Mutex::const_new(());

    pub struct TestDb {
        pub conn: AsyncPgConnection,
        _guard: MutexGuard<'static, ()>,
    }

    /// One test at a time holds the database.
    pub async fn connect() -> Option<TestDb> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };
        let guard = LOCK.lock().await;
        let mut conn = AsyncPgConnection::establish(&url)
            .await
            .expect("connect to TEST_DATABASE_URL");
        crate::migration::run_migration(&mut conn)
            .await
            .expect("run migration");
        Some(TestDb {
            conn,
            _guard: guard,
        })
    }

    /// A published post with a unique slug.
    pub async fn published_blog(conn: &mut AsyncPgConnection, title: &str) -> Blog {
        let slug = format!("{}-{}", crate::format::slugify(title), uuid::Uuid::new_v4().simple());
        let mut input: BlogInput = serde_json::from_value(json!({
            "slug": slug,
            "title": title,
            "content_markdown": "Some words to read.",
            "is_published": true,
        }))
        .unwrap();
        blog_service::prepare_input(&mut input);
        blog_service::create(conn, &input).await.unwrap()
    }

    pub fn fingerprint() -> String {
        format!("fp_{}", uuid::Uuid::new_v4().simple())
    }
}
