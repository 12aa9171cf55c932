use dotenv::dotenv;
use lazy_static::lazy_static;
use publists::db;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use tokio::runtime::Runtime;

/// URL for accessing the PostgreSQL server during integration tests (should not contain a database name in the path)
const TEST_DB_URL: &str = "TEST_DB_URL";

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let mut rng = thread_rng();
        let schema_id: u32 = rng.gen_range(10_000..99_999);
        let db_name = format!("publists_test_{}", schema_id);

        let mut conn = PgConnection::connect(base_url).await?;
        sqlx::query(format!("CREATE DATABASE {}", db_name).as_str())
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let db_to_drop = self.db_name.clone();
        let conn_str = self.base_url.clone();

        TOKIO_RT.block_on(async move {
            let mut conn = match PgConnection::connect(conn_str.as_str()).await {
                Ok(cxn) => cxn,
                Err(conn_err) => {
                    println!("Failed to reconnect to drop test database {}, please remove it manually. Error: {}", db_to_drop, conn_err);
                    return;
                }
            };

            let drop_result = sqlx::query(format!("DROP DATABASE {} WITH (FORCE)", db_to_drop).as_str())
                .execute(&mut conn)
                .await;
            if let Err(db_err) = drop_result {
                println!("Failed to drop test database {}, please remove it manually. Error: {}", db_to_drop, db_err);
            }
        });
    }
}

/// Creates a fresh, migrated database for one test and drops it afterwards.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    F: FnOnce(PgPool) -> R,
    R: Future<Output = ()>,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    let base_url = env::var(TEST_DB_URL)
        .expect("You must provide the TEST_DB_URL environment variable as the base postgres connection string");
    let test_db = TOKIO_RT
        .block_on(TestDatabase::create(&base_url))
        .unwrap_or_else(|db_err| panic!("Failed to start test database: {}", db_err));

    // test_db is dropped out here, where it's allowed to block on the runtime again
    TOKIO_RT.block_on(async {
        let pool = db::connect_sqlx(&test_db.url())
            .await
            .expect("Could not connect to the test database");
        test_fn(pool.clone()).await;
        pool.close().await;
    });
}
