//! Argument validation.
//!
//! Runs before any file or remote access so a bad invocation never leaves
//! partial state behind.

use crate::error::{Result, StackError};
use crate::types::OperationOptions;

const MAX_STACK_NAME_LEN: usize = 128;

/// Stack names start with a letter and contain only letters, digits and `-`.
pub fn validate_stack_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StackError::validation("stack name is required"));
    }
    if name.len() > MAX_STACK_NAME_LEN {
        return Err(StackError::validation(format!(
            "stack name '{}' is longer than {} characters",
            name, MAX_STACK_NAME_LEN
        )));
    }

    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(StackError::validation(format!(
            "stack name '{}' must start with a letter and contain only letters, digits and hyphens",
            name
        )));
    }

    Ok(())
}

pub fn validate_version(version: &str) -> Result<()> {
    if version.trim().is_empty() {
        return Err(StackError::validation("version is required"));
    }
    Ok(())
}

/// Scale must be a non-negative integer.
pub fn validate_scale(scale: &str) -> Result<()> {
    scale.parse::<u32>().map(|_| ()).map_err(|_| {
        StackError::validation(format!("scale '{}' must be a non-negative integer", scale))
    })
}

pub fn validate_options(options: &OperationOptions) -> Result<()> {
    if let Some(scale) = &options.scale {
        validate_scale(scale)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_stack_names() {
        assert!(validate_stack_name("svc").is_ok());
        assert!(validate_stack_name("payments-api-prod").is_ok());
        assert!(validate_stack_name("A1").is_ok());
    }

    #[test]
    fn test_invalid_stack_names() {
        assert!(validate_stack_name("").is_err());
        assert!(validate_stack_name("1svc").is_err());
        assert!(validate_stack_name("svc_prod").is_err());
        assert!(validate_stack_name("svc prod").is_err());
        assert!(validate_stack_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_version() {
        assert!(validate_version("1.4.0").is_ok());
        assert!(validate_version("  ").is_err());
    }

    #[test]
    fn test_scale() {
        assert!(validate_scale("0").is_ok());
        assert!(validate_scale("12").is_ok());
        assert!(validate_scale("-1").is_err());
        assert!(validate_scale("two").is_err());
        assert!(validate_scale("").is_err());
    }

    #[test]
    fn test_options() {
        assert!(validate_options(&OperationOptions::default()).is_ok());
        assert!(validate_options(&OperationOptions::with_scale("3")).is_ok());
        assert!(matches!(
            validate_options(&OperationOptions::with_scale("x")),
            Err(StackError::Validation { .. })
        ));
    }
}
