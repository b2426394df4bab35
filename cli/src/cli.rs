use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use edu_admin_cli::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "edu-admin", version, about = "Education platform admin CLI")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// API root; admin routes live under `{api_base}/admin`.
    #[arg(long, global = true, env = "EDU_ADMIN_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    /// Bearer token for the admin routes.
    #[arg(long, global = true, env = "EDU_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// JSON session file exported from the web login, used when no token is
    /// given.
    #[arg(long, global = true, env = "EDU_ADMIN_SESSION_FILE")]
    pub session_file: Option<PathBuf>,
    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage platform users.
    Users {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage courses.
    Courses {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage NFTs.
    Nfts {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage quests.
    Quests {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Print totals and per-category counts for every resource.
    Overview,
}

#[derive(Debug, Subcommand)]
pub enum ResourceAction {
    /// List one page of the collection.
    List {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page.
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        /// Free-text search.
        #[arg(long)]
        search: Option<String>,
        /// Categorical filter as `name=value`; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Print collection stats instead of rows.
        #[arg(long)]
        stats: bool,
    },
    /// Fetch one entity.
    Show {
        #[arg(long)]
        id: String,
    },
    /// Create an entity from a JSON object.
    Create {
        /// Inline JSON payload.
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,
        /// Path to a JSON payload.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Replace an entity's fields from a JSON object.
    Update {
        #[arg(long)]
        id: String,
        /// Inline JSON payload.
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,
        /// Path to a JSON payload.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Flip an entity between active and inactive.
    Toggle {
        #[arg(long)]
        id: String,
    },
    /// Delete an entity. Entities with dependents are deactivated instead.
    Delete {
        #[arg(long)]
        id: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("filter name is empty in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
