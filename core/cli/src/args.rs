use std::net::SocketAddr;

use clap::{ArgAction, Parser, Subcommand};
use leafscan_utils::config::LEAFSCAN_HOME_DIR;

#[derive(Parser)]
#[command(about, name = "leafscan", version)]
pub struct Args {
    /// Path to the toml configuration file
    #[arg(short, long, global = true, default_value_t = String::from(LEAFSCAN_HOME_DIR.join("config.toml").to_string_lossy().as_ref()))]
    pub config: String,
    /// Enable code locations when printing logs.
    #[arg(long, global = true, default_value_t = false)]
    pub with_log_locations: bool,
    /// Increases the level of verbosity (the max level is -vv).
    #[arg(short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the model and the training reports, then serve the HTTP API.
    Run,
    /// Write a configuration file with the default values.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(short, long)]
        force: bool,
        /// Set the HTTP listen address in the generated configuration file.
        #[arg(long)]
        http_address: Option<SocketAddr>,
    },
    /// Print the loaded configuration.
    PrintConfig {
        /// Print the default configuration instead of loading the current one.
        #[arg(short, long)]
        default: bool,
    },
    /// Classify a single image without starting the server.
    Predict {
        /// Path or URL of the image, optionally percent-encoded.
        image: String,
    },
}
