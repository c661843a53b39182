use crate::constants::TOKEN_ENV_VAR;
use crate::error::{Result, ShrinkError};
use async_trait::async_trait;
use tracing::debug;

/// Supplies bearer tokens for the compression service.
///
/// A token is requested fresh for every compression call and never cached.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch a token scoped to `domain`.
    async fn fetch_token(&self, domain: &str) -> Result<String>;
}

/// Hands out one fixed token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn fetch_token(&self, domain: &str) -> Result<String> {
        debug!(domain, "using static token");
        non_empty(self.token.clone(), "static token is empty")
    }
}

/// Reads the token from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn fetch_token(&self, domain: &str) -> Result<String> {
        debug!(domain, var = %self.var, "reading token from environment");
        let token = std::env::var(&self.var)
            .map_err(|_| ShrinkError::Auth(format!("{} is not set", self.var)))?;
        non_empty(token, &format!("{} is empty", self.var))
    }
}

fn non_empty(token: String, reason: &str) -> Result<String> {
    if token.trim().is_empty() {
        Err(ShrinkError::Auth(reason.to_string()))
    } else {
        Ok(token)
    }
}
