//! API token lookup.

use std::fmt;

use crate::error::{Result, SweepError};

/// Bearer token for the hosting API. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    /// Read the token from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_lookup(var, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(var).ok_or_else(|| SweepError::MissingToken(var.to_string()))?;
        Self::new(var, value)
    }

    fn new(var: &str, value: String) -> Result<Self> {
        let value = value.trim().to_string();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(SweepError::InvalidToken(var.to_string()));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}
