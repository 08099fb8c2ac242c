//! reqwest client for the preferences / recommendations backend.
//!
//! Every response body is wrapped as `{"data": ...}`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{PreferencesApi, RecommendationApi, endpoints};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::onboarding::model::{
    Gender, OnboardingData, PreferencesOptions, RecommendationRequest, RecommendedOutfit,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct RecommendationsData {
    #[serde(default)]
    outfits: Vec<RecommendedOutfit>,
}

/// HTTP implementation of [`PreferencesApi`] and [`RecommendationApi`].
pub struct HttpApiClient {
    client: Client,
    config: ApiConfig,
}

impl HttpApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: config.base_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout: self.config.timeout,
                }
            } else {
                ApiError::RequestFailed {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "API response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_data<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        response
            .json::<Envelope<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PreferencesApi for HttpApiClient {
    async fn get_preferences_options(
        &self,
        gender: Gender,
    ) -> Result<PreferencesOptions, ApiError> {
        let endpoint = endpoints::PREFERENCES_OPTIONS;
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&[("gender", gender.as_str())]);
        let response = self.send(endpoint, request).await?;
        Self::parse_data(endpoint, response).await
    }

    async fn submit_preferences(&self, data: &OnboardingData) -> Result<(), ApiError> {
        let endpoint = endpoints::SUBMIT_PREFERENCES;
        let request = self.client.post(self.url(endpoint)).json(data);
        self.send(endpoint, request).await?;
        Ok(())
    }
}

#[async_trait]
impl RecommendationApi for HttpApiClient {
    async fn load_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendedOutfit>, ApiError> {
        let endpoint = endpoints::RECOMMENDATIONS;
        let builder = self.client.post(self.url(endpoint)).json(request);
        let response = self.send(endpoint, builder).await?;
        let data: RecommendationsData = Self::parse_data(endpoint, response).await?;
        Ok(data.outfits)
    }
}
