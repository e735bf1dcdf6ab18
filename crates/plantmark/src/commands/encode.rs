//! `plantmark encode` command implementation.

use std::path::PathBuf;

use clap::Args;
use plantmark_config::{CliSettings, Config};
use plantmark_diagrams::{diagram_url, encode};

use super::{read_input, write_output};
use crate::error::CliError;

/// Arguments for the encode command.
#[derive(Args)]
pub(crate) struct EncodeArgs {
    /// Diagram source file (default: stdin).
    input: Option<PathBuf>,

    /// Print the full diagram URL instead of the bare token.
    #[arg(long)]
    url: bool,

    /// Path to configuration file (default: auto-discover plantmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram server URL (overrides config).
    #[arg(long, env = "PLANTMARK_SERVER_URL")]
    server_url: Option<String>,

    /// Request dark-mode diagram URL.
    #[arg(long)]
    dark: bool,
}

impl EncodeArgs {
    /// Execute the encode command.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails, or if `--url` is given
    /// without a configured server URL.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let source = read_input(self.input.as_deref())?;
        // Editors leave a final newline that is not part of the diagram
        let source = source.strip_suffix('\n').unwrap_or(&source);

        let line = if self.url {
            let cli_settings = CliSettings {
                server_url: self.server_url.clone(),
                dark: self.dark.then_some(true),
                ..Default::default()
            };
            let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
            let render = config.render_config();
            let server_url = render.server_url.as_deref().ok_or_else(|| {
                CliError::Validation(
                    "--url requires plantuml.server_url in config or --server-url".to_owned(),
                )
            })?;
            diagram_url(server_url, &render.image_format, render.dark, source)
        } else {
            encode(source)
        };

        write_output(None, &format!("{line}\n"))?;
        Ok(())
    }
}
