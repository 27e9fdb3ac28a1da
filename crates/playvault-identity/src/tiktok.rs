//! TikTok (Douyin) mini-game login (`apps/v2/jscode2session`).
//!
//! Unlike WeChat, this endpoint is a JSON `POST` and can take an
//! `anonymous_code` alongside the login code. Business errors come back
//! with HTTP 200 and a non-zero `err_no`.

use serde::{Deserialize, Serialize};

use crate::provider::{network_error, parse_body, read_body};
use crate::{ExternalId, IdentityError, IdentityProvider, ProviderCode, ProviderConfig};

/// Public TikTok code-exchange endpoint.
pub const TIKTOK_ENDPOINT: &str = "https://developer.toutiao.com/api/apps/v2/jscode2session";

const PROVIDER: &str = "tiktok";

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    appid: &'a str,
    secret: &'a str,
    code: &'a str,
    anonymous_code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    err_no: i64,
    #[serde(default)]
    err_tips: String,
    #[serde(default)]
    data: Option<SessionData>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionData {
    #[serde(default)]
    openid: String,
}

/// Resolves TikTok mini-game login codes.
pub struct TikTokProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl TikTokProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

impl IdentityProvider for TikTokProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn resolve(&self, code: &ProviderCode) -> Result<ExternalId, IdentityError> {
        let request = SessionRequest {
            appid: &self.config.app_id,
            secret: &self.config.app_secret,
            code: &code.code,
            anonymous_code: code.anonymous_code.as_deref().unwrap_or(""),
        };

        let response = self
            .http
            .post(self.config.endpoint_or(TIKTOK_ENDPOINT))
            .json(&request)
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        let body = read_body(PROVIDER, response).await?;
        let session: SessionResponse = parse_body(PROVIDER, &body)?;

        if session.err_no != 0 {
            tracing::warn!(
                err_no = session.err_no,
                err_tips = %session.err_tips,
                "tiktok rejected login code"
            );
            return Err(IdentityError::Provider {
                provider: PROVIDER,
                code: session.err_no,
                message: session.err_tips,
            });
        }

        match session.data {
            Some(data) if !data.openid.is_empty() => Ok(ExternalId(data.openid)),
            _ => Err(IdentityError::Provider {
                provider: PROVIDER,
                code: 0,
                message: "response carried no openid".into(),
            }),
        }
    }
}
