//! Wizard steps and the fixed paths they map to.

use serde::{Deserialize, Serialize};

use crate::error::OnboardingError;

/// The five steps of the onboarding wizard.
///
/// Progresses linearly: Intro → GenderSelect → TagSelect → OutfitSelect →
/// Result. Result is terminal until the session is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Intro,
    GenderSelect,
    TagSelect,
    OutfitSelect,
    Result,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 5] = [
        Self::Intro,
        Self::GenderSelect,
        Self::TagSelect,
        Self::OutfitSelect,
        Self::Result,
    ];

    /// Numeric index, 0 through 4.
    pub fn index(&self) -> u8 {
        match self {
            Self::Intro => 0,
            Self::GenderSelect => 1,
            Self::TagSelect => 2,
            Self::OutfitSelect => 3,
            Self::Result => 4,
        }
    }

    pub fn from_index(index: u8) -> Result<Self, OnboardingError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(OnboardingError::UnknownStep(index))
    }

    /// Navigation path for this step.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Intro => "/",
            Self::GenderSelect => "/step1",
            Self::TagSelect => "/step2",
            Self::OutfitSelect => "/step3",
            Self::Result => "/result",
        }
    }

    /// Resolve a path to its step. Unknown paths resolve to Intro.
    pub fn from_path(path: &str) -> Self {
        match path {
            "/step1" => Self::GenderSelect,
            "/step2" => Self::TagSelect,
            "/step3" => Self::OutfitSelect,
            "/result" => Self::Result,
            _ => Self::Intro,
        }
    }

    /// Whether this step is terminal (recommendations are shown).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result)
    }

    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Intro => Some(GenderSelect),
            GenderSelect => Some(TagSelect),
            TagSelect => Some(OutfitSelect),
            OutfitSelect => Some(Result),
            Result => None,
        }
    }

    pub fn previous(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Intro => None,
            GenderSelect => Some(Intro),
            TagSelect => Some(GenderSelect),
            OutfitSelect => Some(TagSelect),
            Result => Some(OutfitSelect),
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::GenderSelect => "gender_select",
            Self::TagSelect => "tag_select",
            Self::OutfitSelect => "outfit_select",
            Self::Result => "result",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_roundtrip_for_every_step() {
        for step in OnboardingStep::ALL {
            assert_eq!(OnboardingStep::from_path(step.path()), step);
        }
    }

    #[test]
    fn unknown_paths_resolve_to_intro() {
        assert_eq!(OnboardingStep::from_path("/nope"), OnboardingStep::Intro);
        assert_eq!(OnboardingStep::from_path(""), OnboardingStep::Intro);
        assert_eq!(OnboardingStep::from_path("/step4"), OnboardingStep::Intro);
    }

    #[test]
    fn index_matches_position() {
        for (i, step) in OnboardingStep::ALL.iter().enumerate() {
            assert_eq!(step.index() as usize, i);
            assert_eq!(OnboardingStep::from_index(i as u8).unwrap(), *step);
        }
        assert_eq!(
            OnboardingStep::from_index(5),
            Err(OnboardingError::UnknownStep(5))
        );
    }

    #[test]
    fn next_walks_all_steps() {
        let mut current = OnboardingStep::Intro;
        let mut visited = vec![current];
        while let Some(next) = current.next() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited, OnboardingStep::ALL.to_vec());
        assert!(current.is_terminal());
    }

    #[test]
    fn previous_is_inverse_of_next() {
        for step in OnboardingStep::ALL {
            if let Some(next) = step.next() {
                assert_eq!(next.previous(), Some(step));
            }
        }
        assert!(OnboardingStep::Intro.previous().is_none());
    }

    #[test]
    fn display_matches_serde() {
        for step in OnboardingStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }
}
