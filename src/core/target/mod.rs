#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::TargetKind;
use crate::tools::ToolId;
use serde::Serialize;

/// Longest identifier accepted from callers.
pub const MAX_IDENTIFIER_LEN: usize = 254;

/// A validated scan input and the identifier derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub kind: TargetKind,
    pub identifier: String,
    pub companion: String,
}

impl Target {
    /// Detect email vs username by the presence of `@`.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        if input.contains('@') {
            Self::email(input)
        } else {
            Self::username(input)
        }
    }

    pub fn email(input: &str) -> Result<Self, AppError> {
        let identifier = check_identifier(input)?;
        let Some((local, domain)) = identifier.split_once('@') else {
            return Err(AppError::invalid_input(format!(
                "'{}' is not an email address: missing '@'",
                identifier
            )));
        };
        if local.is_empty() {
            return Err(AppError::invalid_input(
                "email address has an empty local part",
            ));
        }
        if domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(AppError::invalid_input(format!(
                "'{}' is not an email address: invalid domain",
                identifier
            )));
        }

        Ok(Target {
            kind: TargetKind::Email,
            companion: derive_companion(identifier).to_string(),
            identifier: identifier.to_string(),
        })
    }

    pub fn username(input: &str) -> Result<Self, AppError> {
        let identifier = check_identifier(input)?;
        if identifier.contains('@') {
            return Err(AppError::invalid_input(
                "usernames cannot contain '@'; scan it as an email instead",
            ));
        }
        Ok(Target {
            kind: TargetKind::Username,
            identifier: identifier.to_string(),
            companion: identifier.to_string(),
        })
    }

    /// Value passed to a tool: email-keyed tools get the identifier,
    /// username-keyed tools get the companion.
    pub fn argument_for(&self, tool: ToolId) -> &str {
        if tool.keyed_by_email() {
            &self.identifier
        } else {
            &self.companion
        }
    }
}

/// Substring before the first `@`, or the whole input when there is none.
pub fn derive_companion(input: &str) -> &str {
    match input.split_once('@') {
        Some((local, _)) => local,
        None => input,
    }
}

fn check_identifier(input: &str) -> Result<&str, AppError> {
    let identifier = input.trim();
    if identifier.is_empty() {
        return Err(AppError::invalid_input("target identifier is required"));
    }
    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::invalid_input(format!(
            "target identifier exceeds {} characters",
            MAX_IDENTIFIER_LEN
        )));
    }
    // Identifiers become tool arguments; a leading dash would be read as a flag.
    if identifier.starts_with('-') {
        return Err(AppError::invalid_input(
            "target identifier cannot start with '-'",
        ));
    }
    if identifier
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AppError::invalid_input(
            "target identifier cannot contain whitespace or control characters",
        ));
    }
    Ok(identifier)
}
