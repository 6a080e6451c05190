//! Registry credential handling
//!
//! The publish token comes from the environment, never from argv, so it
//! cannot leak into process listings or shell history. It is held in a
//! `secrecy::SecretString` to keep it out of accidental Debug output, and
//! only masked forms are ever printed.

use crate::core::error::ForkError;
use secrecy::SecretString;
use std::env;

/// Environment variable holding the crates.io publish token
pub const TOKEN_ENV_VAR: &str = "CARGO_REGISTRY_TOKEN";

/// Provides the registry token from the environment
#[derive(Debug, Clone)]
pub struct TokenProvider {
    env_var: String,
}

impl TokenProvider {
    pub fn new() -> Self {
        Self {
            env_var: TOKEN_ENV_VAR.to_string(),
        }
    }

    /// Use a different environment variable (alternate registries, tests)
    pub fn from_env_var(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
        }
    }

    /// Read the token, failing with a preflight error when it is unset or
    /// empty.
    pub fn require_token(&self) -> Result<SecretString, ForkError> {
        match env::var(&self.env_var) {
            Ok(value) if !value.is_empty() => Ok(SecretString::new(value.into())),
            _ => Err(ForkError::TokenMissing {
                env_var: self.env_var.clone(),
            }),
        }
    }

    /// Whether a token is configured
    pub fn has_token(&self) -> bool {
        self.require_token().is_ok()
    }

    /// Mask a token for log output: first and last 3 characters for
    /// identification, everything else hidden. Short tokens are fully
    /// masked.
    pub fn mask_token(token: &str) -> String {
        if token.len() < 10 {
            return "****".to_string();
        }
        format!("{}...{}", &token[..3], &token[token.len() - 3..])
    }
}

impl Default for TokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    // Env-var tests use unique variable names; the test harness runs tests
    // in parallel within one process.

    #[test]
    fn test_require_token_present() {
        unsafe { env::set_var("FORK_PUBLISHER_TEST_TOKEN_A", "secret-token-value") };
        let provider = TokenProvider::from_env_var("FORK_PUBLISHER_TEST_TOKEN_A");

        let token = provider.require_token().unwrap();
        assert_eq!(token.expose_secret(), "secret-token-value");
        assert!(provider.has_token());
    }

    #[test]
    fn test_require_token_missing() {
        let provider = TokenProvider::from_env_var("FORK_PUBLISHER_TEST_TOKEN_UNSET");

        let err = provider.require_token().unwrap_err();
        assert_eq!(err.code(), "TOKEN_MISSING");
        assert!(err.to_string().contains("FORK_PUBLISHER_TEST_TOKEN_UNSET"));
    }

    #[test]
    fn test_require_token_empty_is_missing() {
        unsafe { env::set_var("FORK_PUBLISHER_TEST_TOKEN_B", "") };
        let provider = TokenProvider::from_env_var("FORK_PUBLISHER_TEST_TOKEN_B");

        assert!(provider.require_token().is_err());
    }

    #[test]
    fn test_mask_token_long() {
        assert_eq!(TokenProvider::mask_token("abcdef123456"), "abc...456");
    }

    #[test]
    fn test_mask_token_short() {
        assert_eq!(TokenProvider::mask_token("short"), "****");
    }

    #[test]
    fn test_default_env_var() {
        let provider = TokenProvider::new();
        assert_eq!(provider.env_var, TOKEN_ENV_VAR);
    }
}
