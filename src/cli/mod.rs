pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "crud-api")]
#[command(about = "Soft-delete-aware CRUD API over the scaffolded entities")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "List the registered entity bindings")]
    Entities,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Entities => commands::entities::handle(output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["crud-api"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["crud-api", "serve", "--port", "8080"]);
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::parse_from(["crud-api", "entities", "--json"]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
    }
}
