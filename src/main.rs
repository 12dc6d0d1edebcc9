mod auth0;
mod config;
mod terraform;

use anyhow::Result;
use auth0::client::Auth0Client;
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const QUICKSTART_URL: &str =
    "https://registry.terraform.io/providers/auth0/auth0/latest/docs/guides/quickstart";

/// Manage an Auth0 tenant's configuration as code
#[derive(Parser, Debug)]
#[command(name = "auth0-tfgen", version, about, long_about = None)]
struct Args {
    /// Auth0 tenant domain, e.g. example.eu.auth0.com
    #[arg(long, env = "AUTH0_DOMAIN", global = true)]
    domain: Option<String>,

    /// Management API access token
    #[arg(long, env = "AUTH0_ACCESS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage terraform configuration for your Auth0 Tenant
    ///
    /// Facilitates the integration of Auth0 with Terraform, an Infrastructure as Code tool.
    #[command(subcommand, visible_alias = "tf")]
    Terraform(TerraformCommand),
}

#[derive(Subcommand, Debug)]
enum TerraformCommand {
    /// Generate terraform configuration for your Auth0 Tenant
    ///
    /// Scans the tenant and writes Terraform import blocks, in HashiCorp
    /// Configuration Language, for the existing resources.
    #[command(visible_aliases = ["gen", "export"])]
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Output directory for the generated Terraform config files
    #[arg(short, long, default_value = "./")]
    output_dir: PathBuf,

    /// Resource kinds to export, comma separated
    #[arg(short, long, value_delimiter = ',', default_values_t = default_resource_kinds())]
    resources: Vec<String>,
}

fn default_resource_kinds() -> Vec<String> {
    terraform::DEFAULT_RESOURCE_KINDS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("auth0-tfgen started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("auth0-tfgen").join("auth0-tfgen.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".auth0-tfgen").join("auth0-tfgen.log");
    }
    PathBuf::from("auth0-tfgen.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        domain,
        token,
        log_level,
        command,
    } = Args::parse();

    let _log_guard = setup_logging(log_level);

    let mut config = Config::load();

    let run = async {
        match command {
            Command::Terraform(TerraformCommand::Generate(args)) => {
                generate_terraform(&mut config, domain.as_deref(), token.as_deref(), args).await
            }
        }
    };

    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, aborting");
            Err(anyhow::anyhow!("operation cancelled"))
        }
    }
}

async fn generate_terraform(
    config: &mut Config,
    domain: Option<&str>,
    token: Option<&str>,
    args: GenerateArgs,
) -> Result<()> {
    let tenant = config.resolve(domain, token)?;
    tracing::info!(
        "Generating terraform config for {} into {:?} (resources: {})",
        tenant.domain,
        args.output_dir,
        args.resources.join(",")
    );

    let client = Auth0Client::new(&tenant.domain, &tenant.access_token)?;
    let fetchers = terraform::fetchers_for(&client, &args.resources)?;

    let data = terraform::fetch_import_data(&fetchers).await?;
    terraform::generate_config_files(&args.output_dir, &data)?;

    if let Err(e) = config.set_domain(&tenant.domain) {
        tracing::warn!("Failed to save config: {}", e);
    }

    println!("Terraform config files generated successfully.");
    println!(
        "Follow this quickstart ({}) to go through setting up an Auth0 application for the \
         provider to authenticate against and manage resources.",
        QUICKSTART_URL
    );

    Ok(())
}
