//! Recommendation feed shown on the result step.

use serde::Serialize;

use super::model::RecommendedOutfit;

/// Browsing direction through the recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Previous),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Loading state and cursor over fetched recommendations.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFeed {
    pub is_loading: bool,
    pub recommendations: Vec<RecommendedOutfit>,
    pub current_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of loads started; stale results from older loads are dropped.
    #[serde(skip)]
    generation: u64,
}

impl RecommendationFeed {
    /// Mark a new load as in flight and return its generation.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.error = None;
        self.generation
    }

    /// Store the result of load `generation`. Returns false if a newer load
    /// has started since.
    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<RecommendedOutfit>, String>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.is_loading = false;
        self.current_index = 0;
        match result {
            Ok(outfits) => {
                self.recommendations = outfits;
                self.error = None;
            }
            Err(e) => {
                self.recommendations.clear();
                self.error = Some(e);
            }
        }
        true
    }

    pub fn current(&self) -> Option<&RecommendedOutfit> {
        self.recommendations.get(self.current_index)
    }

    /// Move the cursor, wrapping around at either end.
    pub fn change(&mut self, direction: Direction) -> Option<&RecommendedOutfit> {
        let len = self.recommendations.len();
        if len == 0 {
            return None;
        }
        self.current_index = match direction {
            Direction::Next => (self.current_index + 1) % len,
            Direction::Previous => (self.current_index + len - 1) % len,
        };
        self.current()
    }

    /// Empty the feed. Results of loads started before the clear are dropped.
    pub fn clear(&mut self) {
        let generation = self.generation + 1;
        *self = Self::default();
        self.generation = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outfit(id: i64) -> RecommendedOutfit {
        RecommendedOutfit {
            id,
            image_url: format!("https://cdn/{id}.jpg"),
            style: None,
            season: None,
            description: String::new(),
            is_favorited: false,
            llm_message: None,
        }
    }

    #[test]
    fn load_lifecycle() {
        let mut feed = RecommendationFeed::default();
        let generation = feed.begin_load();
        assert!(feed.is_loading);
        assert!(feed.finish_load(generation, Ok(vec![outfit(1), outfit(2)])));
        assert!(!feed.is_loading);
        assert_eq!(feed.current().unwrap().id, 1);
    }

    #[test]
    fn change_wraps_both_ways() {
        let mut feed = RecommendationFeed::default();
        let generation = feed.begin_load();
        feed.finish_load(generation, Ok(vec![outfit(1), outfit(2), outfit(3)]));

        assert_eq!(feed.change(Direction::Previous).unwrap().id, 3);
        assert_eq!(feed.change(Direction::Next).unwrap().id, 1);
        assert_eq!(feed.change(Direction::Next).unwrap().id, 2);
    }

    #[test]
    fn change_on_empty_feed_is_none() {
        let mut feed = RecommendationFeed::default();
        assert!(feed.change(Direction::Next).is_none());
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut feed = RecommendationFeed::default();
        let old = feed.begin_load();
        let new = feed.begin_load();
        assert!(!feed.finish_load(old, Ok(vec![outfit(9)])));
        assert!(feed.is_loading);
        assert!(feed.finish_load(new, Ok(vec![outfit(1)])));
        assert_eq!(feed.recommendations.len(), 1);
        assert_eq!(feed.recommendations[0].id, 1);
    }

    #[test]
    fn failed_load_records_error() {
        let mut feed = RecommendationFeed::default();
        let generation = feed.begin_load();
        feed.finish_load(generation, Err("HTTP 500".to_string()));
        assert!(!feed.is_loading);
        assert!(feed.recommendations.is_empty());
        assert_eq!(feed.error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn direction_parses() {
        assert_eq!("next".parse::<Direction>().unwrap(), Direction::Next);
        assert_eq!("prev".parse::<Direction>().unwrap(), Direction::Previous);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn clear_drops_in_flight_load() {
        let mut feed = RecommendationFeed::default();
        let first = feed.begin_load();
        assert!(feed.finish_load(first, Ok(vec![outfit(1)])));

        let in_flight = feed.begin_load();
        feed.clear();
        assert!(!feed.is_loading);
        assert!(feed.recommendations.is_empty());

        assert!(!feed.finish_load(in_flight, Ok(vec![outfit(2)])));
        assert!(feed.recommendations.is_empty());

        // Loads started after the clear still land.
        let next = feed.begin_load();
        assert!(feed.finish_load(next, Ok(vec![outfit(3)])));
        assert_eq!(feed.current().unwrap().id, 3);
    }
}
