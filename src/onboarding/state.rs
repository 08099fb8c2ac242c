//! Onboarding session state machine.
//!
//! The current path is the only navigation state kept; the step is derived
//! from it on every read. After every mutation the prerequisite guards run
//! and may replace the path with an earlier step's.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use super::model::{
    Gender, OnboardingData, OutfitCard, OutfitId, Selection, SelectionWarning, TagId,
    ToggleOutcome, Toggled,
};
use super::step::OnboardingStep;
use super::validation::{ValidationResult, validate_outfits, validate_tags};
use crate::config::OnboardingLimits;
use crate::error::OnboardingError;

/// Number of pages on the outfit step.
pub const OUTFIT_PAGES: u8 = 2;

/// Flags that outlive any single session (process lifetime).
///
/// Shared between sessions so a reset does not forget that the intro was
/// already seen; only a process restart clears it.
#[derive(Debug, Default)]
pub struct SessionFlags {
    has_visited_intro: AtomicBool,
}

impl SessionFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn has_visited_intro(&self) -> bool {
        self.has_visited_intro.load(Ordering::SeqCst)
    }

    pub fn mark_intro_visited(&self) {
        self.has_visited_intro.store(true, Ordering::SeqCst);
    }
}

/// A guard redirect that fired after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub from: OnboardingStep,
    pub to: OnboardingStep,
}

/// How a path change is recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavMode {
    Push,
    Replace,
}

/// In-memory onboarding session.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    path: String,
    history: Vec<String>,
    gender: Option<Gender>,
    selected_tags: Selection<TagId>,
    selected_outfits: Selection<OutfitId>,
    outfit_page: u8,
    limits: OnboardingLimits,
    flags: Arc<SessionFlags>,
}

impl OnboardingSession {
    /// Create a session at Intro with empty selections.
    pub fn new(limits: OnboardingLimits, flags: Arc<SessionFlags>) -> Self {
        Self {
            path: OnboardingStep::Intro.path().to_string(),
            history: Vec::new(),
            gender: None,
            selected_tags: Selection::with_capacity(limits.max_tags),
            selected_outfits: Selection::with_capacity(limits.required_outfits),
            outfit_page: 0,
            limits,
            flags,
        }
    }

    // ── Read accessors ──────────────────────────────────────────────

    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::from_path(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Paths visited before the current one, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn selected_tags(&self) -> &[TagId] {
        self.selected_tags.as_slice()
    }

    pub fn selected_outfits(&self) -> &[OutfitId] {
        self.selected_outfits.as_slice()
    }

    pub fn outfit_page(&self) -> u8 {
        self.outfit_page
    }

    pub fn flags(&self) -> &Arc<SessionFlags> {
        &self.flags
    }

    pub fn tag_validation(&self) -> ValidationResult {
        validate_tags(
            self.selected_tags.len(),
            self.limits.min_tags,
            self.limits.max_tags,
        )
    }

    pub fn outfit_validation(&self) -> ValidationResult {
        validate_outfits(self.selected_outfits.len(), self.limits.required_outfits)
    }

    pub fn is_tag_step_complete(&self) -> bool {
        self.tag_validation().is_valid
    }

    pub fn is_outfit_step_complete(&self) -> bool {
        self.outfit_validation().is_valid
    }

    /// Current selections as the submission payload.
    pub fn onboarding_data(&self) -> OnboardingData {
        OnboardingData {
            hashtag_ids: self.selected_tags.to_vec(),
            sample_outfit_ids: self.selected_outfits.to_vec(),
        }
    }

    /// Progress bar fill, 0-100. Intro and gender both read 0.
    pub fn progress_percent(&self, completing: bool) -> u8 {
        if completing {
            return 100;
        }
        let step = i32::from(self.step().index());
        let pct = (step - 1) * 100 / 3;
        pct.clamp(0, 100) as u8
    }

    /// Sample outfits shown on the current outfit page.
    pub fn visible_outfits<'a>(&self, outfits: &'a [OutfitCard]) -> &'a [OutfitCard] {
        let per_page = self.limits.outfits_per_page;
        let start = (self.outfit_page as usize * per_page).min(outfits.len());
        let end = (start + per_page).min(outfits.len());
        &outfits[start..end]
    }

    // ── Selection ───────────────────────────────────────────────────

    pub fn set_gender(&mut self, gender: Gender) -> Option<Redirect> {
        self.gender = Some(gender);
        self.enforce_guards()
    }

    /// Toggle a style tag; rejected without mutation at `max_tags`.
    pub fn toggle_tag(&mut self, id: TagId) -> ToggleOutcome {
        let outcome = match self.selected_tags.toggle(id) {
            Toggled::Added => ToggleOutcome::Added,
            Toggled::Removed => ToggleOutcome::Removed,
            Toggled::AtCapacity => {
                return ToggleOutcome::Rejected(SelectionWarning::tag_limit(
                    id,
                    self.limits.max_tags,
                ));
            }
        };
        self.enforce_guards();
        outcome
    }

    /// Toggle a sample outfit; rejected without mutation at `required_outfits`.
    pub fn toggle_outfit(&mut self, id: OutfitId) -> ToggleOutcome {
        let outcome = match self.selected_outfits.toggle(id) {
            Toggled::Added => ToggleOutcome::Added,
            Toggled::Removed => ToggleOutcome::Removed,
            Toggled::AtCapacity => {
                return ToggleOutcome::Rejected(SelectionWarning::outfit_limit(
                    id,
                    self.limits.required_outfits,
                ));
            }
        };
        self.enforce_guards();
        outcome
    }

    pub fn set_outfit_page(&mut self, page: u8) -> Result<(), OnboardingError> {
        if page >= OUTFIT_PAGES {
            return Err(OnboardingError::InvalidOutfitPage(page));
        }
        self.outfit_page = page;
        Ok(())
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate directly to a path (deep link, back button), then guard.
    pub fn navigate(&mut self, path: &str) -> Option<Redirect> {
        self.set_path(path, NavMode::Push);
        self.enforce_guards()
    }

    pub fn go_to_step(&mut self, index: u8) -> Result<Option<Redirect>, OnboardingError> {
        let step = OnboardingStep::from_index(index)?;
        Ok(self.navigate(step.path()))
    }

    /// Move forward one step, validating the step being left.
    ///
    /// Leaving Intro marks it visited. The outfit step is only left through
    /// the completion protocol, and next at Result is a no-op.
    pub fn go_to_next_step(&mut self) -> Result<Option<Redirect>, OnboardingError> {
        let current = self.step();
        let Some(next) = current.next() else {
            return Ok(None);
        };
        match current {
            OnboardingStep::Intro => self.flags.mark_intro_visited(),
            OnboardingStep::GenderSelect if self.gender.is_none() => {
                return Err(OnboardingError::GenderUnset);
            }
            OnboardingStep::TagSelect => {
                let validation = self.tag_validation();
                if !validation.is_valid {
                    return Err(OnboardingError::IncompleteSelection(validation.message));
                }
            }
            OnboardingStep::OutfitSelect => return Err(OnboardingError::CompletionRequired),
            _ => {}
        }
        Ok(self.navigate(next.path()))
    }

    pub fn go_to_previous_step(&mut self) -> Option<Redirect> {
        let previous = self.step().previous()?;
        self.navigate(previous.path())
    }

    /// Back to Intro with every selection cleared. The intro flag is kept.
    pub fn reset(&mut self) {
        self.set_path(OnboardingStep::Intro.path(), NavMode::Push);
        self.gender = None;
        self.selected_tags.clear();
        self.selected_outfits.clear();
        self.outfit_page = 0;
    }

    /// Redirect to the earliest step whose prerequisites are unmet.
    ///
    /// Only non-emptiness is checked here; minimum counts are enforced when
    /// leaving a step.
    pub fn enforce_guards(&mut self) -> Option<Redirect> {
        let from = self.step();
        let index = from.index();

        let to = if from == OnboardingStep::GenderSelect && !self.flags.has_visited_intro() {
            OnboardingStep::Intro
        } else if index > 1 && self.gender.is_none() {
            OnboardingStep::Intro
        } else if index > 2 && self.selected_tags.is_empty() {
            OnboardingStep::TagSelect
        } else if index > 3 && self.selected_outfits.is_empty() {
            OnboardingStep::OutfitSelect
        } else {
            return None;
        };

        tracing::debug!(%from, %to, "Onboarding guard redirect");
        self.set_path(to.path(), NavMode::Replace);
        Some(Redirect { from, to })
    }

    fn set_path(&mut self, path: &str, mode: NavMode) {
        let resolved = OnboardingStep::from_path(path).path();
        if mode == NavMode::Push && resolved != self.path {
            let previous = std::mem::replace(&mut self.path, resolved.to_string());
            self.history.push(previous);
        } else {
            self.path = resolved.to_string();
        }
    }
}
