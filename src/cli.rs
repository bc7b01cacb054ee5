use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use crate::config::{initialize_app_state, ServeConfig};
use crate::db;
use crate::router::create_router;

#[derive(Parser)]
#[command(name = "maori-dictionary")]
#[command(about = "Community Maori dictionary website")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// SQLite database URL, e.g. sqlite://maori_dictionary.db
        #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite://maori_dictionary.db")]
        database_url: String,

        /// Format: IP:PORT (e.g. 127.0.0.1:3000)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "127.0.0.1:3000")]
        bind_address: String,

        /// Directory served under /static (word images live in <dir>/images)
        #[arg(short, long, env = "STATIC_DIR", default_value = "static")]
        static_dir: String,

        /// Secret used to sign the session cookie, at least 64 bytes
        #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
        session_secret: Option<String>,
    },
    /// Create the database file if needed and apply migrations
    InitDb {
        #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite://maori_dictionary.db")]
        database_url: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                database_url,
                bind_address,
                static_dir,
                session_secret,
            } => {
                serve(ServeConfig {
                    database_url,
                    bind_address,
                    static_dir,
                    session_secret,
                })
                .await?;
            }
            Commands::InitDb { database_url } => {
                init_database(&database_url).await?;
            }
        }
        Ok(())
    }
}

pub async fn serve(config: ServeConfig) -> Result<()> {
    tracing::debug!("Bind address: {}", config.bind_address);
    let state = initialize_app_state(&config.database_url, config.session_secret.as_deref()).await?;
    let app = create_router(state, &config.static_dir);

    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!("🚀 Server started at http://{}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn init_database(database_url: &str) -> Result<()> {
    tracing::info!(">>> Initializing database: {}", database_url);
    let pool = db::connect(database_url).await?;
    db::migrate(&pool).await?;
    pool.close().await;
    tracing::info!("<<< Database initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "maori-dictionary",
            "serve",
            "--database-url",
            "sqlite://test.db",
            "--bind-address",
            "0.0.0.0:8080",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                database_url,
                bind_address,
                ..
            } => {
                assert_eq!(database_url, "sqlite://test.db");
                assert_eq!(bind_address, "0.0.0.0:8080");
            }
            Commands::InitDb { .. } => panic!("expected serve"),
        }
    }
}
