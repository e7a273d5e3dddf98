//! dojang-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the club-management API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash` in
//! config.toml:
//!
//! ```
//! cargo run -p dojang-api --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use dojang_api::{AppState, ServerConfig};
use dojang_core::{
  belt::NewBelt,
  role::{NewIdentity, Role},
  store::ClubStore,
};
use dojang_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The default ladder seeded into an empty store.
const DEFAULT_LADDER: [(&str, u32, &str); 8] = [
  ("White Belt", 1, "#FFFFFF"),
  ("Yellow Belt", 2, "#FFD700"),
  ("Orange Belt", 3, "#FFA500"),
  ("Green Belt", 4, "#00FF00"),
  ("Blue Belt", 5, "#0000FF"),
  ("Purple Belt", 6, "#800080"),
  ("Brown Belt", 7, "#8B4513"),
  ("Black Belt", 8, "#000000"),
];

#[derive(Parser)]
#[command(author, version, about = "Dojang club-management server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DOJANG"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  bootstrap(&store, &server_cfg)
    .await
    .context("failed to bootstrap the store")?;

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
  };

  let app = dojang_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Seed the belt ladder and the bootstrap administrator when absent.
async fn bootstrap(store: &SqliteStore, cfg: &ServerConfig) -> anyhow::Result<()> {
  if store.list_belts().await?.is_empty() {
    for (name, order, color) in DEFAULT_LADDER {
      store
        .add_belt(NewBelt {
          name:  name.to_owned(),
          color: color.to_owned(),
          order,
        })
        .await?;
    }
    tracing::info!("seeded the default belt ladder");
  }

  if store
    .identity_by_username(&cfg.admin_username)
    .await?
    .is_none()
  {
    store
      .add_identity(NewIdentity {
        username:      cfg.admin_username.clone(),
        email:         cfg.admin_email.clone(),
        password_hash: cfg.admin_password_hash.clone(),
        first_name:    "Admin".to_owned(),
        last_name:     "User".to_owned(),
        role:          Role::Admin,
      })
      .await?;
    tracing::info!(username = %cfg.admin_username, "created bootstrap admin");
  }

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
