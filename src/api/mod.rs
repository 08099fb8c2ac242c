//! Remote preferences and recommendations API.
//!
//! The wizard only depends on the [`PreferencesApi`] and [`RecommendationApi`]
//! traits; [`HttpApiClient`] is the reqwest-backed implementation.

pub mod http;

pub use http::HttpApiClient;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::onboarding::model::{
    Gender, OnboardingData, PreferencesOptions, RecommendationRequest, RecommendedOutfit,
};

/// Endpoint paths, relative to the API base URL.
pub mod endpoints {
    pub const PREFERENCES_OPTIONS: &str = "/api/users/preferences/options";
    pub const SUBMIT_PREFERENCES: &str = "/api/users/preferences";
    pub const RECOMMENDATIONS: &str = "/api/recommendations";
}

/// Tag/outfit options and preference submission.
#[async_trait]
pub trait PreferencesApi: Send + Sync {
    /// Fetch the selectable tags and sample outfits for a gender.
    async fn get_preferences_options(&self, gender: Gender)
    -> Result<PreferencesOptions, ApiError>;

    /// Store the user's onboarding selections.
    async fn submit_preferences(&self, data: &OnboardingData) -> Result<(), ApiError>;
}

/// Cold-start recommendations.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn load_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendedOutfit>, ApiError>;
}
