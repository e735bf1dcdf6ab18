//! Diagram fetching from the rendering server.
//!
//! [`DiagramFetcher`] turns one block of diagram source into embeddable markup:
//! - disabled or unconfigured: the source itself, as an escaped paragraph
//! - enabled: the body of `GET {server}/{d?}{format}/{token}`
//!
//! Failures never escape. They become an error paragraph in the output so one
//! bad diagram cannot fail a whole document.

use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_IMAGE_FORMAT, DEFAULT_TIMEOUT};
use crate::encode::diagram_url;
use crate::html::paragraph;

/// Read-only settings consumed by the fetcher.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Whether diagrams are rendered by the server at all.
    pub enabled: bool,
    /// Diagram server base URL.
    pub server_url: Option<String>,
    /// Image format path segment (`svg`, `png`, `txt`).
    pub image_format: String,
    /// Request dark-mode renderings.
    pub dark: bool,
    /// Timeout for a single request.
    pub timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: None,
            image_format: DEFAULT_IMAGE_FORMAT.to_owned(),
            dark: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RenderConfig {
    /// Settings for rendering through `server_url`.
    #[must_use]
    pub fn with_server(server_url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            server_url: Some(server_url.into()),
            ..Self::default()
        }
    }

    /// Server URL to fetch from, or `None` when rendering is off.
    #[must_use]
    pub fn active_server_url(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.server_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Failure of a single diagram request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, or timeout failure.
    #[error("{0}")]
    Request(String),
    /// The response arrived but its body could not be read.
    #[error("{0}")]
    Body(String),
}

impl FetchError {
    /// Human-readable message embedded in the page.
    fn message(&self) -> String {
        match self {
            Self::Request(e) => format!("Error fetching PlantUML diagram: {e}"),
            Self::Body(e) => format!("Error reading PlantUML diagram: {e}"),
        }
    }
}

/// Performs the GET for a diagram URL.
///
/// Implemented by [`UreqTransport`] for real requests and by any
/// `Fn(&str) -> Result<String, FetchError>` closure, which is how tests inject
/// canned responses and failures.
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the response body as text.
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
{
    fn get(&self, url: &str) -> Result<String, FetchError> {
        self(url)
    }
}

/// Create HTTP agent with the specified timeout.
///
/// Error statuses are returned as responses: diagram servers answer syntax
/// errors with a rendered error image, which is worth showing.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Transport`] backed by a pooled `ureq` agent.
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::from_agent(create_agent(timeout))
    }

    /// Use an existing agent (custom proxy or TLS settings).
    #[must_use]
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            tracing::warn!(url, status, "Diagram server returned an error status");
        }

        let mut body = response.into_body();
        body.read_to_string()
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Fetches rendered diagrams, absorbing every failure into markup.
pub struct DiagramFetcher<T = UreqTransport> {
    config: RenderConfig,
    transport: T,
}

impl DiagramFetcher<UreqTransport> {
    /// Create a fetcher using a `ureq` transport with the configured timeout.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }
}

impl<T: Transport> DiagramFetcher<T> {
    /// Create a fetcher with a custom transport.
    #[must_use]
    pub fn with_transport(config: RenderConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Settings this fetcher renders with.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one diagram source to embeddable markup.
    ///
    /// Returns the server's response body unchanged on success, the escaped
    /// source in a paragraph when rendering is off, or an error paragraph.
    #[must_use]
    pub fn fetch(&self, source: &str, dark: bool) -> String {
        let Some(server_url) = self.config.active_server_url() else {
            return paragraph(source);
        };

        let url = diagram_url(server_url, &self.config.image_format, dark, source);
        tracing::debug!(url = %url, "Fetching diagram");

        match self.transport.get(&url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Diagram fetch failed");
                paragraph(&e.message())
            }
        }
    }
}

/// Render one diagram with a one-off fetcher built from `config`.
///
/// Prefer a long-lived [`DiagramFetcher`] when rendering many diagrams so the
/// HTTP connection pool is reused.
#[must_use]
pub fn fetch_diagram(source: &str, config: &RenderConfig, dark: bool) -> String {
    DiagramFetcher::new(config.clone()).fetch(source, dark)
}
