pub mod client;
pub mod commands;
pub mod upload;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::cli::client::ApiClient;

#[derive(Parser)]
#[command(name = "glossary")]
#[command(about = "Glossary CLI - manage personal glossaries from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "GLOSSARY_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the Glossary API"
    )]
    pub url: String,

    #[arg(long, global = true, env = "GLOSSARY_TOKEN", hide_env_values = true, help = "Session token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the signed-in user")]
    Whoami,

    #[command(about = "List, create and inspect glossaries")]
    Glossaries {
        #[command(subcommand)]
        cmd: commands::glossaries::GlossaryCommands,
    },

    #[command(about = "Browse and edit the entries of a glossary")]
    Entries {
        #[command(subcommand)]
        cmd: commands::entries::EntryCommands,
    },

    #[command(about = "Upload images for entries")]
    Images {
        #[command(subcommand)]
        cmd: commands::images::ImageCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token)?;

    match cli.command {
        Commands::Whoami => commands::auth::whoami(&client, output_format).await,
        Commands::Glossaries { cmd } => commands::glossaries::handle(cmd, &client, output_format).await,
        Commands::Entries { cmd } => commands::entries::handle(cmd, &client, output_format).await,
        Commands::Images { cmd } => commands::images::handle(cmd, &client, output_format).await,
    }
}
