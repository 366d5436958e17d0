//! CUSF CLI - Command-line client for the launcher daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tabled::{Table, Tabled};

const DEFAULT_URL: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "cusf")]
#[command(about = "CUSF launcher CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Launcher daemon URL
    #[arg(long, env = "CUSF_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every artifact of a family (l1 or thunder)
    Download { family: String },

    /// Extract the downloaded archives of a family
    Extract { family: String },

    /// Delete a family's downloaded files
    Delete { family: String },

    /// Start a component (bitcoind, enforcer, bitwindow, thunder)
    Start { component: String },

    /// Stop a running component
    Stop { component: String },

    /// Check whether a component's executable is installed
    Check { component: String },

    /// List running components
    Processes,

    /// Stop everything and remove all launcher data
    Reset {
        /// Required, the data cannot be recovered
        #[arg(long)]
        yes: bool,
    },

    /// Create a wallet through the enforcer
    CreateWallet,

    /// Show daemon status
    Status,
}

#[derive(Deserialize)]
struct ProcessInfo {
    component: String,
    pid: Option<u32>,
    started_at: String,
}

#[derive(Tabled)]
struct ProcessRow {
    component: String,
    pid: String,
    started_at: String,
}

impl From<ProcessInfo> for ProcessRow {
    fn from(info: ProcessInfo) -> Self {
        Self {
            component: info.component,
            pid: info
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            started_at: info.started_at,
        }
    }
}

struct Client {
    base: String,
    http: reqwest::Client,
}

impl Client {
    fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn call(&self, method: Method, path: &str) -> Result<Value> {
        let response = self
            .http
            .request(method, format!("{}{}", self.base, path))
            .send()
            .await
            .context("Failed to connect to daemon")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = body["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            anyhow::bail!("{}", reason);
        }

        Ok(body)
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.call(Method::GET, path).await
    }
}

fn print_success(body: &Value) {
    let message = body["message"].as_str().unwrap_or("Done");
    println!("{}", format!("✓ {}", message).green().bold());
    if let Some(path) = body["path"].as_str() {
        println!("  {} {}", "Path:".bold(), path);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = Client::new(&cli.url);

    match cli.command {
        Commands::Download { family } => {
            println!("{}", format!("Downloading {}...", family).cyan().bold());
            print_success(&client.get(&format!("/download-{}", family)).await?);
        }

        Commands::Extract { family } => {
            print_success(&client.get(&format!("/extract-{}", family)).await?);
        }

        Commands::Delete { family } => {
            let body = client
                .call(Method::DELETE, &format!("/delete-{}", family))
                .await?;
            print_success(&body);
        }

        Commands::Start { component } => {
            let body = client.get(&format!("/start-{}", component)).await?;
            print_success(&body);
            println!("  {} {}", "PID:".bold(), body["pid"]);
        }

        Commands::Stop { component } => {
            let body = client
                .call(Method::POST, &format!("/stop-{}", component))
                .await?;
            print_success(&body);
        }

        Commands::Check { component } => {
            let body = client.get(&format!("/check-{}", component)).await?;
            let path = body["path"].as_str().unwrap_or_default();
            if body["exists"].as_bool().unwrap_or(false) {
                println!("{} {}", "✓ Installed:".green().bold(), path);
            } else {
                println!("{} {}", "○ Not installed:".yellow().bold(), path);
            }
        }

        Commands::Processes => {
            let body = client.get("/processes").await?;
            let processes: Vec<ProcessInfo> =
                serde_json::from_value(body["processes"].clone()).context("Bad process list")?;

            if processes.is_empty() {
                println!("{}", "No components running".yellow());
            } else {
                let rows: Vec<ProcessRow> = processes.into_iter().map(Into::into).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("refusing to reset without --yes");
            }
            let body = client.call(Method::POST, "/reset-folders").await?;
            print_success(&body);
            if let Some(removed) = body["removed"].as_array() {
                for path in removed.iter().filter_map(Value::as_str) {
                    println!("  {} {}", "•".bold(), path);
                }
            }
        }

        Commands::CreateWallet => {
            let body = client.get("/create-wallet").await?;
            print_success(&body);
            if let Some(output) = body["output"].as_str() {
                println!("{}", output);
            }
        }

        Commands::Status => {
            println!("{}", "Launcher Status".cyan().bold());
            println!();
            println!("  {} {}", "URL:".bold(), cli.url);

            match client.get("/health").await {
                Ok(health) => {
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Version:".bold(), health["version"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "OFFLINE".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_family_help_names_families_only() {
        let cmd = Cli::command();
        let about = cmd
            .find_subcommand("download")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string())
            .unwrap_or_default();

        assert!(about.contains("l1"));
        assert!(about.contains("thunder"));
        assert!(!about.contains("enforcer"));
    }

    #[test]
    fn test_reset_defaults_to_unconfirmed() {
        let cli = Cli::try_parse_from(["cusf", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }
}
