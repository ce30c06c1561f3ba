mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use sg_core::config::Config;
use sg_core::{ClientIdentity, ResourceId};
use sg_token::{SigningKey, TokenCodec};

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(path).context("failed to load configuration")?;
    config.apply_env();
    Ok(config)
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting streamgate");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    sg_server::start(config).await.context("server failed")
}

fn issue_url(
    config_path: Option<&Path>,
    resource_id: &str,
    identity: &str,
    ttl: Option<u64>,
    base_url: &str,
) -> Result<()> {
    let config = load_config(config_path)?;
    let key = SigningKey::new(config.signing_secret()?)?;
    let codec = TokenCodec::new(key, config.signing.ttl_secs);

    let resource = ResourceId::parse(resource_id)?;
    let identity = ClientIdentity::new(identity.trim());
    let ttl = ttl.unwrap_or(codec.default_ttl_secs());
    let grant = codec.issue_at(&resource, &identity, ttl, sg_core::unix_now());

    let base = format!("{}{}", base_url.trim_end_matches('/'), sg_server::STREAM_BASE);
    println!("{}", grant.access_url(&base));
    Ok(())
}

fn probe_file(file: &Path) -> Result<()> {
    anyhow::ensure!(file.is_file(), "not a file: {}", file.display());
    let metadata = sg_probe::metadata_or_default(&sg_probe::default_prober(), file);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let warnings = config.validate();

    if warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        println!("Configuration loaded with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise choose defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "streamgate=trace,sg_server=trace,sg_token=debug,sg_media=debug,sg_probe=debug,sg_core=debug,tower_http=debug".to_string()
        } else {
            "streamgate=info,sg_server=info,sg_core=info,sg_probe=warn,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Issue {
            resource_id,
            identity,
            ttl,
            base_url,
        } => issue_url(cli.config.as_deref(), &resource_id, &identity, ttl, &base_url),
        Commands::Probe { file } => probe_file(&file),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::GenerateSecret => {
            println!("{}", sg_token::generate_secret());
            Ok(())
        }
        Commands::Version => {
            println!("streamgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
