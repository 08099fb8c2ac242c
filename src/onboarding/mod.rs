//! Onboarding wizard: gender, style tags, and sample outfits, followed by
//! cold-start recommendations.
//!
//! `state` holds the pure step state machine; `manager` wraps it with the
//! timed transitions, remote calls, and event fan-out; `routes` exposes the
//! manager over REST.

pub mod manager;
pub mod model;
pub mod recommendations;
pub mod routes;
pub mod state;
pub mod step;
pub mod validation;

pub use manager::{CompletionHandle, OnboardingEvent, OnboardingManager, OnboardingSnapshot};
pub use model::{
    Gender, OnboardingData, OutfitId, PreferencesOptions, RecommendationRequest,
    RecommendedOutfit, SelectionWarning, TagId, ToggleOutcome,
};
pub use recommendations::{Direction, RecommendationFeed};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{OnboardingSession, Redirect, SessionFlags};
pub use step::OnboardingStep;
pub use validation::{ValidationResult, validate_outfits, validate_tags};
