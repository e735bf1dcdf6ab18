//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// `field` names the config key for error messages. Only braced references
/// are expanded: a bare `$name` is kept literally even when the value also
/// holds a braced reference, so URL paths containing `$` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut result = String::with_capacity(value.len());
    let mut remaining = value;

    while let Some(start) = remaining.find("${") {
        result.push_str(&remaining[..start]);
        let Some(len) = remaining[start..].find('}') else {
            // Unclosed reference, keep the rest as-is
            remaining = &remaining[start..];
            break;
        };
        let reference = &remaining[start..=start + len];
        result.push_str(&expand_reference(reference, field)?);
        remaining = &remaining[start + len + 1..];
    }

    result.push_str(remaining);
    Ok(result)
}

/// Expand a single `${...}` reference through shellexpand.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a referenced variable that has no value.
struct UnsetVar(String);
