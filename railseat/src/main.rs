//! railseat command-line client
//!
//! ```text
//! railseat signup --first-name Ada --last-name Lovelace --email ada@example.com --password ...
//! railseat signin --email ada@example.com --password ...
//! railseat seats
//! railseat book 3
//! railseat reset
//! railseat watch
//! railseat logout
//! ```

use clap::Parser;
use railseat::auth::Authenticator;
use railseat::cli::{App, Cli, CliError};
use railseat::session::FileCredentialStore;
use railseat::sync::SyncOptions;
use railseat::Config;
use railseat_client::BookingClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "railseat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(error) = run(Cli::parse()).await {
        tracing::debug!(?error, "Command failed");
        if !error.is_rendered() {
            eprintln!("{error}");
        }
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(?config, "Loaded configuration");

    let client = Arc::new(BookingClient::with_timeout(
        config.api_url.clone(),
        config.request_timeout,
    )?);
    let credentials = Arc::new(FileCredentialStore::new(config.token_path.clone()));
    let options = SyncOptions {
        poll_interval: config.poll_interval,
        wait_timeout: config.wait_timeout(),
        ..SyncOptions::default()
    };
    let app = App::new(Authenticator::new(client.clone(), credentials), client, options);

    app.run(cli.command, &mut std::io::stdout()).await
}
