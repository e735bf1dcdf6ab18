//! Internal constants for diagram extraction and rendering.

use std::time::Duration;

/// Fence language tag recognized by default.
pub const DEFAULT_LANGUAGE: &str = "plantuml";

/// Default requested image format.
pub const DEFAULT_IMAGE_FORMAT: &str = "svg";

/// Prefix of placeholder tokens (`PLANTUML_BLOCK_0`, `PLANTUML_BLOCK_1`, ...).
pub const PLACEHOLDER_PREFIX: &str = "PLANTUML_BLOCK";

/// Default HTTP timeout for diagram server requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
