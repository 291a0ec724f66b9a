//! Refresh-token exchange

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use skysync_core::{TokenRefresher, TokenStore};
use skysync_domain::constants::TOKEN_PATH;
use skysync_domain::{AuthResponse, Result, SkyApiConfig};
use tracing::{debug, instrument, warn};
use url::{form_urlencoded, Url};

use super::resolve;
use crate::http::HttpClient;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for the OAuth token endpoint.
///
/// A successful exchange is written straight into the token store; the raw
/// reply is handed back either way so callers can inspect the status.
pub struct SkyAuthClient {
    http: HttpClient,
    token_url: Url,
    client_id: String,
    client_secret: String,
    store: Arc<dyn TokenStore>,
}

impl SkyAuthClient {
    /// Client posting to `<auth_base_uri>/token` with the app credentials.
    ///
    /// # Errors
    /// Returns `SkySyncError::Config` when `auth_base_uri` is not a URL.
    pub fn new(http: HttpClient, config: &SkyApiConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            http,
            token_url: resolve(&config.auth_base_uri, TOKEN_PATH)?,
            client_id: config.auth_client_id.clone(),
            client_secret: config.auth_client_secret.clone(),
            store,
        })
    }

    /// Resolved token endpoint.
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn basic_credentials(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(pair))
    }

    fn refresh_form(refresh_token: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .finish()
    }
}

#[async_trait]
impl TokenRefresher for SkyAuthClient {
    #[instrument(skip(self), fields(url = %self.token_url))]
    async fn refresh_access_token(&self) -> Result<AuthResponse> {
        let refresh_token = self.store.refresh_token().unwrap_or_default();
        if refresh_token.is_empty() {
            debug!("No stored refresh token; requesting anyway");
        }

        let request = self
            .http
            .request(Method::POST, self.token_url.clone())
            .header(AUTHORIZATION, self.basic_credentials())
            .header(ACCEPT, FORM_CONTENT_TYPE)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Self::refresh_form(&refresh_token));

        let reply = self.http.send(request).await?;
        let response = AuthResponse::new(reply.status, reply.body);

        if response.is_success() {
            debug!("Token refresh succeeded");
        } else {
            warn!(status = response.status, "Token endpoint rejected the refresh");
        }
        self.store.set_tokens_from_auth_response(&response);

        Ok(response)
    }
}
