use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gamelists::db::{self, services};
use gamelists::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update the database schema
    Migrate,
    /// Copy the custom columns of one list into another
    ImportColumns {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
    },
    /// Move an item to another list, importing columns as needed
    MoveItem {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        item: i64,
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
        /// Keep the original item in its list
        #[arg(long)]
        copy: bool,
    },
    /// Delete a list with its items, values and columns
    DeleteList {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        list: i64,
    },
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "gamelists.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    init_logging(&config.log_dir);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting gamelists.");

    let db_pool = db::connect(&config).await?;
    let limits = config.quota_limits();

    match args.command {
        Command::Migrate => {
            db::run_migrations(&db_pool).await?;
        }
        Command::ImportColumns { user, from, to } => {
            let remap = match services::import_columns(&db_pool, to, from, user, &limits).await {
                Ok(remap) => remap,
                Err(e) => {
                    error!(
                        resolved = %serde_json::to_string(&e.resolved)?,
                        "Import rolled back."
                    );
                    return Err(e.into());
                }
            };
            println!("{}", serde_json::to_string_pretty(&remap)?);
        }
        Command::MoveItem {
            user,
            item,
            from,
            to,
            copy,
        } => {
            let moved =
                services::transfer_item(&db_pool, user, item, from, to, copy, &limits).await?;
            println!("{}", serde_json::to_string_pretty(&moved)?);
        }
        Command::DeleteList { user, list } => {
            services::list_service::find_owned_list(&db_pool, list, user).await?;
            services::delete_list(&db_pool, list).await?;
        }
    }

    Ok(())
}
