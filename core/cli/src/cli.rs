use anyhow::{Context, Result};
use leafscan_utils::config::resolve_path;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::commands::{init, predict, print_config, run};

pub struct Cli {
    args: Args,
}

impl Cli {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    pub async fn exec(self) -> Result<()> {
        self.setup();
        let input_path = self.args.config.as_str();
        let config_path = resolve_path(input_path)
            .with_context(|| format!("Failed to resolve config path: {input_path}"))?;

        match self.args.cmd {
            Command::Run => run::exec(&config_path).await,
            Command::Init {
                force,
                http_address,
            } => init::exec(&config_path, force, http_address),
            Command::PrintConfig { default } => print_config::exec(&config_path, default),
            Command::Predict { image } => predict::exec(&config_path, &image).await,
        }
    }

    fn setup(&self) {
        // Build the filter from cli args, or environment variable
        let env_filter = EnvFilter::builder()
            .with_default_directive(
                match self.args.verbose {
                    0 => LevelFilter::INFO,
                    1 => LevelFilter::DEBUG,
                    _2_or_more => LevelFilter::TRACE,
                }
                .into(),
            )
            .from_env_lossy();

        // Logs go to stderr so that command output on stdout stays parseable.
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(self.args.with_log_locations)
                    .with_line_number(self.args.with_log_locations),
            )
            .with(env_filter)
            .init();
    }
}
