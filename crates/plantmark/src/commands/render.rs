//! `plantmark render` command implementation.

use std::path::PathBuf;

use clap::Args;
use plantmark_config::{CliSettings, Config};
use plantmark_diagrams::{DiagramPipeline, RenderResult, Transport};
use pulldown_cmark::{Options, Parser, html};

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover plantmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram server URL (overrides config).
    #[arg(long, env = "PLANTMARK_SERVER_URL")]
    server_url: Option<String>,

    /// Image format to request: svg, png or txt (overrides config).
    #[arg(long)]
    image_format: Option<String>,

    /// Request dark-mode diagrams.
    #[arg(long)]
    dark: bool,

    /// Leave diagram sources as escaped text instead of rendering them.
    #[arg(long)]
    disable: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if config loading fails or input/output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let markdown = read_input(self.input.as_deref())?;

        let pipeline = DiagramPipeline::new(config.render_config());
        let result = render_markdown(&pipeline, &markdown);

        output.warnings(&result.warnings);

        write_output(self.output.as_deref(), &result.html)?;

        if let Some(path) = &self.output {
            output.written(path);
        }

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            enable: self.disable.then_some(false),
            server_url: self.server_url.clone(),
            image_format: self.image_format.clone(),
            dark: self.dark.then_some(true),
        }
    }
}

/// Render markdown to HTML with diagrams restored.
pub(crate) fn render_markdown<T: Transport>(
    pipeline: &DiagramPipeline<T>,
    markdown: &str,
) -> RenderResult {
    pipeline.render(markdown, |markdown| {
        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, Parser::new_ext(markdown, markdown_options()));
        html_output
    })
}

/// GitHub-flavored extensions enabled for conversion.
fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}
