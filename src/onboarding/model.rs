//! Onboarding data models: selections, payloads, and API option shapes.

use serde::{Deserialize, Serialize};

/// Identifier of a style tag (hashtag).
pub type TagId = i64;
/// Identifier of a sample outfit.
pub type OutfitId = i64;

/// Gender used to filter tags, sample outfits, and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Query-string value sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Which selection set a toggle targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Tag,
    Outfit,
}

impl std::fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Outfit => write!(f, "outfit"),
        }
    }
}

/// User-facing notice for a rejected selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionWarning {
    pub kind: SelectionKind,
    pub id: i64,
    pub limit: usize,
    pub message: String,
}

impl SelectionWarning {
    pub fn tag_limit(id: TagId, limit: usize) -> Self {
        Self {
            kind: SelectionKind::Tag,
            id,
            limit,
            message: format!("You can select up to {limit} tags."),
        }
    }

    pub fn outfit_limit(id: OutfitId, limit: usize) -> Self {
        Self {
            kind: SelectionKind::Outfit,
            id,
            limit,
            message: format!("Please select exactly {limit} outfits."),
        }
    }
}

/// Result of toggling an id in a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The set was at capacity; nothing changed.
    Rejected(SelectionWarning),
}

impl ToggleOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Insertion-ordered set with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection<T> {
    #[serde(skip)]
    capacity: usize,
    items: Vec<T>,
}

/// What [`Selection::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
    AtCapacity,
}

impl<T: PartialEq + Clone> Selection<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Remove `item` if present, otherwise add it when below capacity.
    pub fn toggle(&mut self, item: T) -> Toggled {
        if let Some(pos) = self.items.iter().position(|i| *i == item) {
            self.items.remove(pos);
            Toggled::Removed
        } else if self.items.len() >= self.capacity {
            Toggled::AtCapacity
        } else {
            self.items.push(item);
            Toggled::Added
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Aggregated onboarding payload, submitted as-is to the preferences API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    pub hashtag_ids: Vec<TagId>,
    pub sample_outfit_ids: Vec<OutfitId>,
}

/// Cold-start recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub gender: Gender,
    pub hashtag_ids: Vec<TagId>,
    pub sample_outfit_ids: Vec<OutfitId>,
}

impl RecommendationRequest {
    pub fn new(gender: Gender, data: OnboardingData) -> Self {
        Self {
            gender,
            hashtag_ids: data.hashtag_ids,
            sample_outfit_ids: data.sample_outfit_ids,
        }
    }
}

/// A selectable style tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagOption {
    pub id: TagId,
    pub name: String,
}

/// A selectable sample outfit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleOutfitOption {
    pub id: OutfitId,
    #[serde(default, rename = "imageUrl", alias = "image_url")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// Tag and sample-outfit options for a gender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesOptions {
    #[serde(default)]
    pub hashtags: Vec<HashtagOption>,
    #[serde(default, rename = "sampleOutfits", alias = "sample_outfits")]
    pub sample_outfits: Vec<SampleOutfitOption>,
}

impl PreferencesOptions {
    /// Display cards for the sample outfits, numbered from 1.
    pub fn outfit_cards(&self) -> Vec<OutfitCard> {
        self.sample_outfits
            .iter()
            .enumerate()
            .map(|(idx, outfit)| OutfitCard {
                id: outfit.id,
                url: outfit.image_url.clone(),
                alt: format!("Outfit {}", idx + 1),
            })
            .collect()
    }
}

/// Display projection of a sample outfit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutfitCard {
    pub id: OutfitId,
    pub url: String,
    pub alt: String,
}

/// A recommended outfit returned by the recommendation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedOutfit {
    pub id: OutfitId,
    #[serde(default, alias = "image_url")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_toggle_adds_then_removes() {
        let mut sel = Selection::with_capacity(2);
        assert_eq!(sel.toggle(1), Toggled::Added);
        assert_eq!(sel.toggle(2), Toggled::Added);
        assert_eq!(sel.toggle(1), Toggled::Removed);
        assert_eq!(sel.as_slice(), &[2]);
    }

    #[test]
    fn selection_rejects_at_capacity() {
        let mut sel = Selection::with_capacity(2);
        sel.toggle(1);
        sel.toggle(2);
        assert_eq!(sel.toggle(3), Toggled::AtCapacity);
        assert_eq!(sel.len(), 2);
        assert!(!sel.contains(&3));
        // Removal still works at capacity.
        assert_eq!(sel.toggle(2), Toggled::Removed);
    }

    #[test]
    fn selection_keeps_insertion_order() {
        let mut sel = Selection::with_capacity(5);
        for id in [5, 1, 3] {
            sel.toggle(id);
        }
        assert_eq!(sel.to_vec(), vec![5, 1, 3]);
    }

    #[test]
    fn onboarding_data_uses_camel_case() {
        let data = OnboardingData {
            hashtag_ids: vec![1, 2, 3],
            sample_outfit_ids: vec![10],
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["hashtagIds"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["sampleOutfitIds"], serde_json::json!([10]));
    }

    #[test]
    fn options_accept_both_image_url_spellings() {
        let json = r#"{
            "hashtags": [{"id": 1, "name": "minimal"}],
            "sampleOutfits": [
                {"id": 7, "imageUrl": "https://cdn/a.jpg"},
                {"id": 8, "image_url": "https://cdn/b.jpg"},
                {"id": 9}
            ]
        }"#;
        let options: PreferencesOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.hashtags[0].name, "minimal");
        assert_eq!(options.sample_outfits[0].image_url, "https://cdn/a.jpg");
        assert_eq!(options.sample_outfits[1].image_url, "https://cdn/b.jpg");
        assert_eq!(options.sample_outfits[2].image_url, "");
    }

    #[test]
    fn outfit_cards_are_numbered_from_one() {
        let options = PreferencesOptions {
            hashtags: vec![],
            sample_outfits: vec![
                SampleOutfitOption {
                    id: 4,
                    image_url: "u4".into(),
                    style: None,
                    season: None,
                },
                SampleOutfitOption {
                    id: 9,
                    image_url: "u9".into(),
                    style: None,
                    season: None,
                },
            ],
        };
        let cards = options.outfit_cards();
        assert_eq!(cards[0].alt, "Outfit 1");
        assert_eq!(cards[1].id, 9);
        assert_eq!(cards[1].url, "u9");
    }

    #[test]
    fn gender_parses_and_serializes_lowercase() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" male ".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
    }

    #[test]
    fn recommendation_request_serializes_payload() {
        let req = RecommendationRequest::new(
            Gender::Female,
            OnboardingData {
                hashtag_ids: vec![1],
                sample_outfit_ids: vec![2, 3],
            },
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["sampleOutfitIds"], serde_json::json!([2, 3]));
    }

    #[test]
    fn toggle_outcome_serializes_with_tag() {
        let rejected = ToggleOutcome::Rejected(SelectionWarning::tag_limit(11, 10));
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["kind"], "tag");
        assert_eq!(json["limit"], 10);
        assert_eq!(
            serde_json::to_value(ToggleOutcome::Added).unwrap()["outcome"],
            "added"
        );
    }
}
