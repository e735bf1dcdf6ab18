//! CLI command implementations.

pub(crate) mod encode;
pub(crate) mod render;

pub(crate) use encode::EncodeArgs;
pub(crate) use render::RenderArgs;

use std::io::{Read, Write};
use std::path::Path;

/// Read the whole input file, or stdin when no path is given.
pub(crate) fn read_input(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

/// Write `content` to the output file, or stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, content),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()
        }
    }
}
