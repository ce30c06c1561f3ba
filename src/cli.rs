use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "streamgate")]
#[command(author, version, about = "Signed-URL media delivery with HTTP range streaming")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "STREAMGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a signed access URL for a resource
    Issue {
        /// Resource id (file stem in the media store)
        resource_id: String,

        /// Client identity the URL is bound to, usually an IP address
        #[arg(short, long)]
        identity: String,

        /// Lifetime in seconds (defaults to signing.ttl_secs)
        #[arg(long)]
        ttl: Option<u64>,

        /// Prefix for the printed URL, e.g. https://media.example.com
        #[arg(long, default_value = "")]
        base_url: String,
    },

    /// Probe a media file and print its listing metadata as JSON
    Probe {
        /// File to probe
        file: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Generate a random signing secret
    GenerateSecret,

    /// Display version information
    Version,
}
