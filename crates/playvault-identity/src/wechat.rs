//! WeChat mini-program login (`jscode2session`).

use serde::Deserialize;

use crate::provider::{network_error, parse_body, read_body};
use crate::{ExternalId, IdentityError, IdentityProvider, ProviderCode, ProviderConfig};

/// Public WeChat code-exchange endpoint.
pub const WECHAT_ENDPOINT: &str = "https://api.weixin.qq.com/sns/jscode2session";

const PROVIDER: &str = "wechat";

/// Response of `jscode2session`. On failure only `errcode`/`errmsg` are set.
#[derive(Debug, Default, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    openid: String,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Resolves WeChat mini-program login codes.
pub struct WeChatProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl WeChatProvider {
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

impl IdentityProvider for WeChatProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn resolve(&self, code: &ProviderCode) -> Result<ExternalId, IdentityError> {
        let params = [
            ("appid", self.config.app_id.as_str()),
            ("secret", self.config.app_secret.as_str()),
            ("js_code", code.code.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .get(self.config.endpoint_or(WECHAT_ENDPOINT))
            .query(&params)
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        let body = read_body(PROVIDER, response).await?;
        let session: SessionResponse = parse_body(PROVIDER, &body)?;

        if session.errcode != 0 {
            tracing::warn!(
                err_code = session.errcode,
                err_msg = %session.errmsg,
                "wechat rejected login code"
            );
            return Err(IdentityError::Provider {
                provider: PROVIDER,
                code: session.errcode,
                message: session.errmsg,
            });
        }
        if session.openid.is_empty() {
            return Err(IdentityError::Provider {
                provider: PROVIDER,
                code: 0,
                message: "response carried no openid".into(),
            });
        }

        Ok(ExternalId(session.openid))
    }
}
