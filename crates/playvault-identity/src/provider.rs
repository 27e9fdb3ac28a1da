//! The uniform shape every external identity provider is adapted to.
//!
//! Playvault doesn't authenticate players itself. A mini-program client
//! obtains a one-time code from its platform (WeChat, TikTok, ...) and
//! sends it to us; we exchange it with the platform for a stable subject
//! identifier (an "openid"). Each platform does that exchange differently,
//! so each gets its own [`IdentityProvider`] implementation, but the rest of
//! the system only ever sees `code in → external id out`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::IdentityError;

/// Default deadline for a provider code exchange.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// The stable, provider-scoped identifier of a player (e.g. an OpenID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl ExternalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a client presents to authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCode {
    /// The provider-issued one-time code.
    pub code: String,
    /// Auxiliary anonymous-session code, for providers that use one.
    pub anonymous_code: Option<String>,
}

impl ProviderCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            anonymous_code: None,
        }
    }

    pub fn with_anonymous_code(mut self, anonymous_code: impl Into<String>) -> Self {
        self.anonymous_code = Some(anonymous_code.into());
        self
    }
}

/// App credentials and endpoint of one provider.
///
/// All fields default, so a config file only needs the ones it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub app_id: String,
    pub app_secret: String,
    /// Code-exchange URL. `None` uses the provider's public endpoint.
    pub endpoint: Option<String>,
    /// Request deadline in milliseconds. `0` uses [`DEFAULT_PROVIDER_TIMEOUT_SECS`].
    pub timeout_ms: u64,
}

impl ProviderConfig {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ..Self::default()
        }
    }

    /// Points the provider at a different exchange URL (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the request deadline. Anything below one millisecond rounds up
    /// to one; only `Duration::ZERO` falls back to the default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = match u64::try_from(timeout.as_millis()) {
            Ok(0) if !timeout.is_zero() => 1,
            Ok(ms) => ms,
            Err(_) => u64::MAX,
        };
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        match self.timeout_ms {
            0 => Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            ms => Duration::from_millis(ms),
        }
    }

    pub(crate) fn endpoint_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.endpoint.as_deref().unwrap_or(default)
    }
}

/// Exchanges a provider-issued one-time code for an [`ExternalId`].
///
/// # Contract
///
/// - One network call per `resolve`, bounded by the configured timeout.
/// - No internal retries; retry policy belongs to the caller.
/// - Failures are normalized to exactly two kinds:
///   [`IdentityError::Provider`] (the provider said no) and
///   [`IdentityError::Network`] (we couldn't get a usable answer).
///
/// # Example
///
/// ```rust
/// use playvault_identity::{ExternalId, IdentityError, IdentityProvider, ProviderCode};
///
/// /// Treats the code itself as the subject. Development only!
/// struct EchoProvider;
///
/// impl IdentityProvider for EchoProvider {
///     fn name(&self) -> &'static str {
///         "echo"
///     }
///
///     async fn resolve(&self, code: &ProviderCode) -> Result<ExternalId, IdentityError> {
///         Ok(ExternalId(code.code.clone()))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Short provider name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Performs the code exchange.
    fn resolve(
        &self,
        code: &ProviderCode,
    ) -> impl Future<Output = Result<ExternalId, IdentityError>> + Send;
}

/// Turns a transport-level failure into [`IdentityError::Network`].
pub(crate) fn network_error(provider: &'static str, err: reqwest::Error) -> IdentityError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    tracing::warn!(provider, %reason, "provider request failed");
    IdentityError::Network { provider, reason }
}

/// Reads a provider response body, rejecting non-2xx statuses.
pub(crate) async fn read_body(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<String, IdentityError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(provider, status = status.as_u16(), "provider returned non-success status");
        return Err(IdentityError::Network {
            provider,
            reason: format!("unexpected status code: {}", status.as_u16()),
        });
    }
    response.text().await.map_err(|e| network_error(provider, e))
}

/// Parses a provider response body as JSON.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, IdentityError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(provider, error = %e, "provider response is not valid json");
        IdentityError::Network {
            provider,
            reason: format!("malformed response: {e}"),
        }
    })
}
