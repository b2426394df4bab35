pub mod overview;
pub mod resource;

use std::time::Duration;

use anyhow::Result;
use edu_admin_cli::{ClientConfig, FileSessionStore, HttpBackend};
use edu_admin_shared::{Course, Nft, Quest, User};
use serde::Serialize;

use crate::cli::{Cli, Commands, ConnectionArgs};

pub async fn run(cli: Cli) -> Result<()> {
    let backend = connect(&cli.connection)?;
    match cli.command {
        Commands::Users {
            action,
        } => resource::run::<User>(&backend, action).await,
        Commands::Courses {
            action,
        } => resource::run::<Course>(&backend, action).await,
        Commands::Nfts {
            action,
        } => resource::run::<Nft>(&backend, action).await,
        Commands::Quests {
            action,
        } => resource::run::<Quest>(&backend, action).await,
        Commands::Overview => overview::run(&backend).await,
    }
}

fn connect(args: &ConnectionArgs) -> Result<HttpBackend> {
    let store = FileSessionStore::new(args.session_file.clone());
    let config = ClientConfig::new(args.api_base.clone())
        .with_session(args.token.as_deref(), &store)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    if config.session.is_none() {
        tracing::warn!("no token or session file given; admin routes will likely reject requests");
    }
    tracing::debug!("admin api base: {}", config.admin_base());
    HttpBackend::new(&config)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
