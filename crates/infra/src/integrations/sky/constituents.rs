//! Constituent list client

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use skysync_core::{build_query_string, ConstituentSource, TokenRefresher, TokenStore};
use skysync_domain::constants::{
    BAD_REQUEST_ERROR_MESSAGE, CONSTITUENTS_BASE_PATH, CONSTITUENTS_RESOURCE,
    NOT_FOUND_ERROR_MESSAGE, SUBSCRIPTION_KEY_HEADER,
};
use skysync_domain::{ApiResponse, PaginationCursor, Result, SkyApiConfig, SkySyncError};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::resolve;
use crate::http::{HttpClient, HttpReply};

/// Client for `GET {base}/constituent/v1/constituents`.
///
/// An expired access token is handled here: a 401 triggers one token
/// refresh and, if that succeeds, exactly one repeat of the request.
pub struct ConstituentsClient {
    http: HttpClient,
    endpoint: Url,
    subscription_key: String,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl ConstituentsClient {
    /// Client for the constituents resource under `sky_api_base_uri`.
    ///
    /// # Errors
    /// Returns `SkySyncError::Config` when `sky_api_base_uri` is not a URL.
    pub fn new(
        http: HttpClient,
        config: &SkyApiConfig,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self> {
        let endpoint = resolve(&config.sky_api_base_uri, CONSTITUENTS_BASE_PATH)?
            .join(CONSTITUENTS_RESOURCE)
            .map_err(|e| SkySyncError::Config(format!("Invalid constituents endpoint: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            subscription_key: config.sky_api_subscription_key.clone(),
            store,
            refresher,
        })
    }

    /// Resolved constituents endpoint, without a query.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint URL carrying the cursor as its query.
    #[must_use]
    pub fn page_url(&self, cursor: &PaginationCursor) -> Url {
        let mut url = self.endpoint.clone();
        let query = build_query_string(cursor);
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        url
    }

    async fn get(&self, url: &Url) -> Result<HttpReply> {
        let access_token = self.store.access_token().unwrap_or_default();
        let request = self
            .http
            .request(Method::GET, url.clone())
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"));

        self.http.send(request).await
    }
}

#[async_trait]
impl ConstituentSource for ConstituentsClient {
    #[instrument(skip_all)]
    async fn fetch_page(&self, cursor: &PaginationCursor) -> Result<ApiResponse> {
        let url = self.page_url(cursor);
        let reply = self.get(&url).await?;

        match reply.status {
            400 => Ok(ApiResponse::with_error(400, BAD_REQUEST_ERROR_MESSAGE)),
            404 => Ok(ApiResponse::with_error(404, NOT_FOUND_ERROR_MESSAGE)),
            401 => {
                info!("Access token rejected; refreshing");
                let refreshed = self.refresher.refresh_access_token().await?;
                if !refreshed.is_success() {
                    warn!(status = refreshed.status, "Token refresh failed");
                    return Ok(ApiResponse::new(reply.status, reply.body));
                }

                debug!("Repeating constituent request with refreshed token");
                let retry = self.get(&url).await?;
                Ok(ApiResponse::new(retry.status, retry.body))
            }
            status => Ok(ApiResponse::new(status, reply.body)),
        }
    }
}
