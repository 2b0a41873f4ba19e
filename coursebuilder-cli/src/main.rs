//! CourseBuilder CLI
//!
//! Command-line front end for the CourseBuilder client. Each invocation runs
//! one operation and prints its result envelope as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Get a URL where a new course can be created
//! coursebuilder create-url course https://lms.example.com/saved
//!
//! # Player URL without the surrounding chrome
//! coursebuilder preview-url 42 --param autoplay=1 --no-wrapper
//!
//! # Account metadata from the license server
//! coursebuilder account
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursebuilder_core::{
    Failure, ResourceAttributes, ResourceGateway, ResourceType, to_envelope,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[derive(Parser)]
#[command(name = "coursebuilder")]
#[command(about = "Client for the CourseBuilder licensing and builder services")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new resource
    Create {
        /// Resource type (course, template, certificate)
        resource_type: ResourceType,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        keywords: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show the details of a resource
    Details {
        /// Resource id
        id: String,
    },

    /// Get a URL where a new resource can be created
    CreateUrl {
        /// Resource type (course, template, certificate)
        resource_type: ResourceType,

        /// URL the builder notifies when the resource is saved
        callback_url: String,
    },

    /// Get a URL where a resource can be viewed and edited
    Url {
        /// Resource id
        id: String,

        /// URL the builder notifies when the resource is saved
        callback_url: String,
    },

    /// Fetch the rendered player document of a resource
    Preview {
        /// Resource id
        id: String,
    },

    /// Get the player URL of a resource
    PreviewUrl {
        /// Resource id
        id: String,

        /// Player parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Render only the course container
        #[arg(long)]
        no_wrapper: bool,
    },

    /// Show account details from the license server
    Account,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref())?;
    init_logging(&settings.log_level, cli.verbose);
    debug!("Loaded settings from {:?}", settings.config_path);

    let gateway = ResourceGateway::new(settings.to_store());

    let ok = match cli.command {
        Commands::Create {
            resource_type,
            title,
            description,
            keywords,
            notes,
        } => {
            let attributes = ResourceAttributes::new(title)
                .with_description(description)
                .with_keywords(keywords)
                .with_notes(notes);
            print_envelope(&gateway.create_resource(resource_type, &attributes).await)?
        }
        Commands::Details { id } => print_envelope(&gateway.get_resource_details(id).await)?,
        Commands::CreateUrl {
            resource_type,
            callback_url,
        } => print_envelope(&gateway.get_create_url(resource_type, &callback_url).await)?,
        Commands::Url { id, callback_url } => {
            print_envelope(&gateway.get_resource_url(id, &callback_url).await)?
        }
        Commands::Preview { id } => print_envelope(&gateway.get_preview(id).await)?,
        Commands::PreviewUrl {
            id,
            params,
            no_wrapper,
        } => print_envelope(&gateway.get_preview_url(id, params, !no_wrapper).await)?,
        Commands::Account => print_envelope(&gateway.get_account_details().await)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Print the JSON envelope of a result; returns whether it was a success.
fn print_envelope<T: Serialize>(result: &Result<T, Failure>) -> Result<bool> {
    let rendered = serde_json::to_string_pretty(&to_envelope(result))
        .context("Failed to render result")?;
    println!("{}", rendered);
    Ok(result.is_ok())
}

fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
