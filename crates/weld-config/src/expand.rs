//! Environment variable expansion for string config values.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the config key in error messages. Values without `$` are
/// returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains('$') {
        return Ok(value.to_owned());
    }
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("{}: {}", err.var_name, err.cause),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_literal() {
        assert_eq!(expand_env("plain", "f").unwrap(), "plain");
    }

    #[test]
    fn test_expand_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WELD_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${WELD_EXPAND_UNSET:-fallback}", "f").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_expand_missing_names_variable_and_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WELD_EXPAND_MISSING");
        }
        let err = expand_env("${WELD_EXPAND_MISSING}", "server.host").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WELD_EXPAND_MISSING"));
        assert!(msg.contains("server.host"));
    }
}
