//! `weld serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use weld_config::{CliSettings, Config};
use weld_server::{run_server, server_config_from_weld_config};

use crate::commands::build_resolver;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover weld.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "WELD_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "WELD_PORT")]
    port: Option<u16>,

    /// Template directory (overrides config).
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,

    /// Do not register the built-in widgets.
    #[arg(long)]
    no_builtin: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, output: &Output, verbose: bool) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            templates_dir: self.templates_dir,
            builtin_widgets: self.no_builtin.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let resolver = build_resolver(&config)?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "HTML endpoint: POST {}",
            config.server.html_endpoint
        ));
        output.info(&format!(
            "Payload endpoint: POST {}",
            config.server.payload_endpoint
        ));
        match &config.resolver_resolved.templates_dir {
            Some(dir) => output.info(&format!("Template directory: {}", dir.display())),
            None => output.info("Template directory: none"),
        }
        if !config.resolver_resolved.builtin_widgets {
            output.info("Built-in widgets: disabled");
        }

        run_server(server_config_from_weld_config(&config, verbose), resolver).await?;

        Ok(())
    }
}
