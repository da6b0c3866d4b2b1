pub mod entities;
pub mod enums;
pub mod models;
pub mod services;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::{error, info};

use crate::config::AppConfig;

const POSTGRES_MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial",
    include_str!("../../migrations/postgres/0001_initial.sql"),
)];

const SQLITE_MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial",
    include_str!("../../migrations/sqlite/0001_initial.sql"),
)];

/// Opens the connection pool described by the config.
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(
        backend = ?db.get_database_backend(),
        max_connections = config.max_connections,
        "Database pool ready."
    );
    Ok(db)
}

/// Applies the bundled schema for the connected backend. Every statement is
/// idempotent, so this is safe to run on each start.
pub async fn run_migrations<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let migrations = match db.get_database_backend() {
        DbBackend::Postgres => POSTGRES_MIGRATIONS,
        DbBackend::Sqlite => SQLITE_MIGRATIONS,
        other => {
            return Err(DbErr::Custom(format!(
                "no migrations available for backend {other:?}"
            )))
        }
    };

    info!("Running database migrations...");
    for (name, sql) in migrations {
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            db.execute_unprepared(statement).await.map_err(|e| {
                error!(migration = name, error = %e, "Failed to execute migration statement.");
                e
            })?;
        }
        info!(migration = name, "Migration applied.");
    }
    Ok(())
}
