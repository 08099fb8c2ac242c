//! OnboardingManager: coordinates the session state machine, timed
//! transitions, remote collaborators, and event fan-out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{
    Gender, OnboardingData, OutfitCard, OutfitId, PreferencesOptions, RecommendationRequest,
    RecommendedOutfit, SelectionWarning, TagId, ToggleOutcome,
};
use super::recommendations::{Direction, RecommendationFeed};
use super::state::{OnboardingSession, Redirect, SessionFlags};
use super::step::OnboardingStep;
use super::validation::ValidationResult;
use crate::api::{PreferencesApi, RecommendationApi};
use crate::config::OnboardingConfig;
use crate::error::OnboardingError;
use crate::storage::GenderStore;

/// Default broadcast channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Events delivered to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnboardingEvent {
    StepChanged { step: OnboardingStep, path: String },
    Redirected { from: OnboardingStep, to: OnboardingStep },
    SelectionRejected { warning: SelectionWarning },
    OptionsLoaded { hashtags: usize, sample_outfits: usize },
    Completing,
    RecommendationsLoaded { count: usize },
    RecommendationsFailed { reason: String },
    PreferencesSubmitted,
    SubmissionFailed { reason: String },
}

/// Serializable view of the whole wizard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSnapshot {
    pub session_id: Uuid,
    pub step: OnboardingStep,
    pub step_index: u8,
    pub path: String,
    pub gender: Option<Gender>,
    pub selected_tags: Vec<TagId>,
    pub selected_outfits: Vec<OutfitId>,
    pub outfit_page: u8,
    pub tag_validation: ValidationResult,
    pub outfit_validation: ValidationResult,
    pub is_tag_step_complete: bool,
    pub is_outfit_step_complete: bool,
    pub is_completing: bool,
    pub progress: u8,
    pub has_visited_intro: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Handles for the two requests issued on completion.
///
/// They run independently; dropping the handle detaches them.
pub struct CompletionHandle {
    pub recommendations: JoinHandle<()>,
    pub submission: JoinHandle<()>,
}

impl CompletionHandle {
    /// Wait for both requests, in whatever order they finish.
    pub async fn join(self) {
        let (recommendations, submission) = tokio::join!(self.recommendations, self.submission);
        if let Err(e) = recommendations {
            warn!("Recommendation task panicked: {}", e);
        }
        if let Err(e) = submission {
            warn!("Submission task panicked: {}", e);
        }
    }
}

#[derive(Debug, Default)]
struct CompletionStatus {
    completing: bool,
    completed_at: Option<DateTime<Utc>>,
}

/// Coordinates one onboarding session.
pub struct OnboardingManager {
    session_id: Uuid,
    config: OnboardingConfig,
    session: RwLock<OnboardingSession>,
    status: RwLock<CompletionStatus>,
    options: RwLock<PreferencesOptions>,
    feed: Arc<RwLock<RecommendationFeed>>,
    preferences: Arc<dyn PreferencesApi>,
    recommendations: Arc<dyn RecommendationApi>,
    store: Arc<dyn GenderStore>,
    tx: broadcast::Sender<OnboardingEvent>,
}

impl OnboardingManager {
    pub fn new(
        config: OnboardingConfig,
        flags: Arc<SessionFlags>,
        preferences: Arc<dyn PreferencesApi>,
        recommendations: Arc<dyn RecommendationApi>,
        store: Arc<dyn GenderStore>,
    ) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let session = OnboardingSession::new(config.limits, flags);
        Arc::new(Self {
            session_id: Uuid::new_v4(),
            config,
            session: RwLock::new(session),
            status: RwLock::new(CompletionStatus::default()),
            options: RwLock::new(PreferencesOptions::default()),
            feed: Arc::new(RwLock::new(RecommendationFeed::default())),
            preferences,
            recommendations,
            store,
            tx,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Subscribe to wizard events. Each presentation client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<OnboardingEvent> {
        self.tx.subscribe()
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn current_step(&self) -> OnboardingStep {
        self.session.read().await.step()
    }

    pub async fn snapshot(&self) -> OnboardingSnapshot {
        let session = self.session.read().await;
        let status = self.status.read().await;
        let tag_validation = session.tag_validation();
        let outfit_validation = session.outfit_validation();
        OnboardingSnapshot {
            session_id: self.session_id,
            step: session.step(),
            step_index: session.step().index(),
            path: session.path().to_string(),
            gender: session.gender(),
            selected_tags: session.selected_tags().to_vec(),
            selected_outfits: session.selected_outfits().to_vec(),
            outfit_page: session.outfit_page(),
            is_tag_step_complete: tag_validation.is_valid,
            is_outfit_step_complete: outfit_validation.is_valid,
            tag_validation,
            outfit_validation,
            is_completing: status.completing,
            progress: session.progress_percent(status.completing),
            has_visited_intro: session.flags().has_visited_intro(),
            completed_at: status.completed_at,
        }
    }

    pub async fn onboarding_data(&self) -> OnboardingData {
        self.session.read().await.onboarding_data()
    }

    pub async fn options(&self) -> PreferencesOptions {
        self.options.read().await.clone()
    }

    /// Sample outfit cards on the current outfit page.
    pub async fn visible_outfits(&self) -> Vec<OutfitCard> {
        let cards = self.options.read().await.outfit_cards();
        self.session.read().await.visible_outfits(&cards).to_vec()
    }

    pub async fn feed(&self) -> RecommendationFeed {
        self.feed.read().await.clone()
    }

    pub async fn change_recommendation(&self, direction: Direction) -> Option<RecommendedOutfit> {
        self.feed.write().await.change(direction).cloned()
    }

    // ── Navigation ──────────────────────────────────────────────────

    pub async fn navigate(&self, path: &str) -> OnboardingStep {
        self.mutate(|s| s.navigate(path)).await
    }

    pub async fn go_to_step(&self, index: u8) -> Result<OnboardingStep, OnboardingError> {
        self.try_mutate(|s| s.go_to_step(index)).await
    }

    /// Move forward one step. Refused while the current step is incomplete;
    /// the outfit step is left through [`complete_onboarding`](Self::complete_onboarding).
    pub async fn go_to_next_step(&self) -> Result<OnboardingStep, OnboardingError> {
        self.try_mutate(|s| s.go_to_next_step()).await
    }

    pub async fn go_to_previous_step(&self) -> OnboardingStep {
        self.mutate(|s| s.go_to_previous_step()).await
    }

    /// Clear the session, loaded options and the recommendation feed, and
    /// return to Intro. In-flight requests keep running.
    pub async fn reset(&self) {
        self.mutate(|s| {
            s.reset();
            None
        })
        .await;
        *self.status.write().await = CompletionStatus::default();
        *self.options.write().await = PreferencesOptions::default();
        self.feed.write().await.clear();
        info!(session_id = %self.session_id, "Onboarding reset");
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Set the gender, persist it, then move to the tag step after
    /// `gender_advance_delay`. Options for the gender are loaded on arrival.
    ///
    /// Only accepted on the gender step. The returned handle resolves once
    /// the delayed advance has run.
    pub async fn select_gender(
        self: &Arc<Self>,
        gender: Gender,
    ) -> Result<JoinHandle<()>, OnboardingError> {
        self.try_mutate(|s| {
            let step = s.step();
            if step != OnboardingStep::GenderSelect {
                return Err(OnboardingError::WrongStep {
                    expected: OnboardingStep::GenderSelect.to_string(),
                    actual: step.to_string(),
                });
            }
            Ok(s.set_gender(gender))
        })
        .await?;
        info!(session_id = %self.session_id, %gender, "Gender selected");

        if let Err(e) = self.store.save_gender(gender).await {
            warn!("Failed to persist gender: {}", e);
        }

        let manager = Arc::clone(self);
        Ok(tokio::spawn(async move {
            tokio::time::sleep(manager.config.gender_advance_delay).await;
            let step = manager.navigate(OnboardingStep::TagSelect.path()).await;
            if step == OnboardingStep::TagSelect {
                manager.load_preferences_options().await;
            }
        }))
    }

    pub async fn toggle_tag(&self, id: TagId) -> ToggleOutcome {
        let outcome = self.mutate_with(|s| s.toggle_tag(id)).await;
        self.report_rejection(&outcome);
        outcome
    }

    pub async fn toggle_outfit(&self, id: OutfitId) -> ToggleOutcome {
        let outcome = self.mutate_with(|s| s.toggle_outfit(id)).await;
        self.report_rejection(&outcome);
        outcome
    }

    pub async fn set_outfit_page(&self, page: u8) -> Result<(), OnboardingError> {
        self.session.write().await.set_outfit_page(page)
    }

    /// Fetch tag and outfit options for the selected gender.
    ///
    /// Falls back to empty options when no gender is set or the request
    /// fails.
    pub async fn load_preferences_options(&self) -> PreferencesOptions {
        let gender = self.session.read().await.gender();
        let Some(gender) = gender else {
            return PreferencesOptions::default();
        };

        // Clear first so a stale gender's options are never shown.
        *self.options.write().await = PreferencesOptions::default();

        let options = match self.preferences.get_preferences_options(gender).await {
            Ok(options) => options,
            Err(e) => {
                warn!(%gender, "Failed to load preferences options: {}", e);
                PreferencesOptions::default()
            }
        };

        debug!(
            hashtags = options.hashtags.len(),
            sample_outfits = options.sample_outfits.len(),
            "Preferences options loaded"
        );
        let _ = self.tx.send(OnboardingEvent::OptionsLoaded {
            hashtags: options.hashtags.len(),
            sample_outfits: options.sample_outfits.len(),
        });
        *self.options.write().await = options.clone();
        options
    }

    // ── Completion ──────────────────────────────────────────────────

    /// Finish the outfit step.
    ///
    /// Shows the completing state for `completion_delay`, enters Result, then
    /// issues the recommendation load and the preference submission without
    /// awaiting either. A failed submission is logged and reported as an
    /// event; it never affects the recommendation feed. A second call while
    /// one is in progress is refused.
    pub async fn complete_onboarding(
        self: &Arc<Self>,
    ) -> Result<CompletionHandle, OnboardingError> {
        {
            let session = self.session.read().await;
            let step = session.step();
            if step != OnboardingStep::OutfitSelect {
                return Err(OnboardingError::WrongStep {
                    expected: OnboardingStep::OutfitSelect.to_string(),
                    actual: step.to_string(),
                });
            }
            let validation = session.outfit_validation();
            if !validation.is_valid {
                return Err(OnboardingError::IncompleteSelection(validation.message));
            }

            // Checked and set under one lock so concurrent calls cannot both pass.
            let mut status = self.status.write().await;
            if status.completing {
                return Err(OnboardingError::AlreadyCompleting);
            }
            status.completing = true;
        }

        let _ = self.tx.send(OnboardingEvent::Completing);

        tokio::time::sleep(self.config.completion_delay).await;

        let step = self.navigate(OnboardingStep::Result.path()).await;
        let (gender, data) = {
            let session = self.session.read().await;
            (session.gender(), session.onboarding_data())
        };
        {
            let mut status = self.status.write().await;
            status.completing = false;
            if step == OnboardingStep::Result {
                status.completed_at = Some(Utc::now());
            }
        }

        let Some(gender) = gender else {
            warn!(session_id = %self.session_id, "Session was reset before completion finished");
            return Err(OnboardingError::GenderUnset);
        };

        info!(
            session_id = %self.session_id,
            %gender,
            tags = data.hashtag_ids.len(),
            outfits = data.sample_outfit_ids.len(),
            "Onboarding complete, requesting recommendations"
        );

        let request = RecommendationRequest::new(gender, data.clone());
        let recommendations = self.spawn_recommendation_load(request).await;
        let submission = self.spawn_submission(data);

        Ok(CompletionHandle {
            recommendations,
            submission,
        })
    }

    async fn spawn_recommendation_load(&self, request: RecommendationRequest) -> JoinHandle<()> {
        let generation = self.feed.write().await.begin_load();
        let api = Arc::clone(&self.recommendations);
        let feed = Arc::clone(&self.feed);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = api.load_recommendations(&request).await;
            let event = match &result {
                Ok(outfits) => OnboardingEvent::RecommendationsLoaded {
                    count: outfits.len(),
                },
                Err(e) => {
                    warn!("Failed to load recommendations: {}", e);
                    OnboardingEvent::RecommendationsFailed {
                        reason: e.to_string(),
                    }
                }
            };
            let applied = feed
                .write()
                .await
                .finish_load(generation, result.map_err(|e| e.to_string()));
            if applied {
                let _ = tx.send(event);
            } else {
                debug!(generation, "Dropped stale recommendation result");
            }
        })
    }

    fn spawn_submission(&self, data: OnboardingData) -> JoinHandle<()> {
        let api = Arc::clone(&self.preferences);
        let tx = self.tx.clone();
        let session_id = self.session_id;

        tokio::spawn(async move {
            match api.submit_preferences(&data).await {
                Ok(()) => {
                    info!(%session_id, "Preferences submitted");
                    let _ = tx.send(OnboardingEvent::PreferencesSubmitted);
                }
                Err(e) => {
                    warn!(%session_id, "Failed to submit preferences: {}", e);
                    let _ = tx.send(OnboardingEvent::SubmissionFailed {
                        reason: e.to_string(),
                    });
                }
            }
        })
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Apply a navigation change and broadcast the step change / redirect.
    async fn mutate<F>(&self, f: F) -> OnboardingStep
    where
        F: FnOnce(&mut OnboardingSession) -> Option<Redirect>,
    {
        let mut session = self.session.write().await;
        let before = session.step();
        let redirect = f(&mut session);
        self.broadcast_change(before, &session, redirect);
        session.step()
    }

    /// Like [`mutate`](Self::mutate) for operations that can be refused.
    /// Nothing is broadcast on refusal.
    async fn try_mutate<F>(&self, f: F) -> Result<OnboardingStep, OnboardingError>
    where
        F: FnOnce(&mut OnboardingSession) -> Result<Option<Redirect>, OnboardingError>,
    {
        let mut session = self.session.write().await;
        let before = session.step();
        let redirect = f(&mut session)?;
        self.broadcast_change(before, &session, redirect);
        Ok(session.step())
    }

    /// Like [`mutate`](Self::mutate) for operations with their own result;
    /// any redirect is picked up from the step change.
    async fn mutate_with<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut OnboardingSession) -> T,
    {
        let mut session = self.session.write().await;
        let before = session.step();
        let value = f(&mut session);
        let after = session.step();
        let redirect = (after < before).then_some(Redirect {
            from: before,
            to: after,
        });
        self.broadcast_change(before, &session, redirect);
        value
    }

    fn broadcast_change(
        &self,
        before: OnboardingStep,
        session: &OnboardingSession,
        redirect: Option<Redirect>,
    ) {
        if let Some(redirect) = redirect {
            let _ = self.tx.send(OnboardingEvent::Redirected {
                from: redirect.from,
                to: redirect.to,
            });
        }
        let after = session.step();
        if after != before {
            debug!(session_id = %self.session_id, from = %before, to = %after, "Step changed");
            let _ = self.tx.send(OnboardingEvent::StepChanged {
                step: after,
                path: session.path().to_string(),
            });
        }
    }

    fn report_rejection(&self, outcome: &ToggleOutcome) {
        if let ToggleOutcome::Rejected(warning) = outcome {
            warn!(
                session_id = %self.session_id,
                kind = %warning.kind,
                id = warning.id,
                limit = warning.limit,
                "Selection rejected"
            );
            let _ = self.tx.send(OnboardingEvent::SelectionRejected {
                warning: warning.clone(),
            });
        }
    }
}
