//! Administrative CLI: create a superuser account directly in the
//! database.
//!
//! ```text
//! create-admin --email admin@example.com --password s3cret \
//!     --database-url postgres://localhost/larder
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use larder::domain::ports::Argon2PasswordHasher;
use larder::domain::AccountService;
use larder::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

#[derive(Parser, Debug)]
#[command(name = "create-admin", about = "Create a superuser account")]
struct Args {
    /// Email address for the new account.
    #[arg(long)]
    email: String,

    /// Plaintext password; hashed before storage.
    #[arg(long)]
    password: String,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        tracing::warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let pool = DbPool::connect(PoolConfig::new(args.database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
    let accounts = AccountService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(Argon2PasswordHasher),
    );

    let user = accounts
        .create_superuser(&args.email, &args.password)
        .await
        .map_err(|e| std::io::Error::other(format!("create superuser: {e}")))?;
    info!(id = %user.id, email = %user.email, "superuser created");
    Ok(())
}
