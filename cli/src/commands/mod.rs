//! Command implementations. Each prints its result as JSON on stdout.

pub mod comments;
pub mod contact;
pub mod resources;

use anyhow::{Context, Result};
use community_hub_frontend::{ClientConfig, HubContext};
use serde::Serialize;

use crate::cli::{Cli, Commands, ConnectionArgs};

/// Environment config with command-line overrides applied.
pub fn client_config(connection: &ConnectionArgs) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(api_base) = connection.api_base.as_deref() {
        config = config.with_api_base(api_base);
    }
    if let Some(token) = connection.token.clone() {
        config = config.with_api_token(Some(token));
    }
    config
}

/// Build the hub context and dispatch one command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = client_config(&cli.connection);
    let hub = HubContext::new(config).context("failed to build API client")?;

    match cli.command {
        Commands::Comments {
            command,
        } => comments::run(&hub, command).await,
        Commands::Events {
            page,
            limit,
            window,
        } => resources::events(&hub, page, limit, window).await,
        Commands::Gallery {
            category,
            page,
        } => resources::gallery(&hub, category.as_deref(), page).await,
        Commands::Organizers => resources::organizers(&hub).await,
        Commands::Registrations {
            event_id,
            status,
        } => resources::registrations(&hub, event_id.as_deref(), status.map(Into::into)).await,
        Commands::Contact {
            command,
        } => contact::run(&hub, command).await,
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
