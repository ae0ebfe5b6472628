use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use flexi_logger::{Age, Cleanup, Criterion, FileSpec, Logger, Naming};
use std::env;

use crate::models::Server;
use crate::schema::servers;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Initialize logger
pub fn init_logger() {
    Logger::try_with_str("info")
        .unwrap()
        .log_to_file(FileSpec::default().directory("logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Numbers,
            Cleanup::KeepLogFiles(7),
        )
        .start()
        .unwrap();
}

/// Initialize DB connection pool
pub fn init_pool() -> DbPool {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "patchcal.db".to_string());
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to create DB pool")
}

/// Run embedded migrations against a pooled connection
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    Ok(())
}

/// Initialize logger, pool and schema
pub fn initialize() -> anyhow::Result<DbPool> {
    init_logger();
    let pool = init_pool();
    run_migrations(&pool)?;
    Ok(pool)
}

/// The one implementation of the event -> affected servers join. An event
/// never stores its servers; they are matched on (customer, group, OS) at the
/// time of the call.
pub fn servers_for_event(
    conn: &mut SqliteConnection,
    customer_name: &str,
    server_group: &str,
    os_type: &str,
) -> QueryResult<Vec<Server>> {
    servers::table
        .filter(servers::customer_name.eq(customer_name))
        .filter(servers::server_group.eq(server_group))
        .filter(servers::os_type.eq(os_type))
        .order(servers::created_at.desc())
        .select(Server::as_select())
        .load::<Server>(conn)
}
