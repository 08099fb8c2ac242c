//! style-onboard: onboarding wizard core for cold-start outfit recommendations.

pub mod api;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod storage;
