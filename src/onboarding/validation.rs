//! Selection-count validation for the tag and outfit steps.

use serde::Serialize;

/// Outcome of validating a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    fn valid(message: String) -> Self {
        Self {
            is_valid: true,
            message,
        }
    }

    fn invalid(message: String) -> Self {
        Self {
            is_valid: false,
            message,
        }
    }
}

/// Valid iff `min <= selected <= max`.
pub fn validate_tags(selected: usize, min: usize, max: usize) -> ValidationResult {
    if selected < min {
        let remaining = min - selected;
        ValidationResult::invalid(format!(
            "Select {remaining} more {} (at least {min})",
            plural(remaining, "tag", "tags")
        ))
    } else if selected > max {
        let excess = selected - max;
        ValidationResult::invalid(format!(
            "Remove {excess} {} (at most {max})",
            plural(excess, "tag", "tags")
        ))
    } else {
        ValidationResult::valid(format!(
            "{selected} {} selected",
            plural(selected, "tag", "tags")
        ))
    }
}

/// Valid iff exactly `required` outfits are selected.
pub fn validate_outfits(selected: usize, required: usize) -> ValidationResult {
    if selected < required {
        let remaining = required - selected;
        ValidationResult::invalid(format!(
            "Select {remaining} more {} ({selected}/{required})",
            plural(remaining, "outfit", "outfits")
        ))
    } else if selected > required {
        let excess = selected - required;
        ValidationResult::invalid(format!(
            "Deselect {excess} {} ({selected}/{required})",
            plural(excess, "outfit", "outfits")
        ))
    } else {
        ValidationResult::valid(format!("All {required} outfits selected"))
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_in_range_are_valid() {
        for n in 3..=10 {
            let result = validate_tags(n, 3, 10);
            assert!(result.is_valid, "{n} tags should be valid");
            assert!(!result.message.is_empty());
        }
    }

    #[test]
    fn tags_below_min_report_remaining() {
        let result = validate_tags(2, 3, 10);
        assert!(!result.is_valid);
        assert!(result.message.contains("1 more tag"), "{}", result.message);

        let empty = validate_tags(0, 3, 10);
        assert!(empty.message.contains("3 more tags"));
    }

    #[test]
    fn tags_above_max_are_invalid() {
        let result = validate_tags(11, 3, 10);
        assert!(!result.is_valid);
        assert!(result.message.contains("Remove 1"));
    }

    #[test]
    fn valid_and_invalid_tag_messages_differ() {
        let invalid = validate_tags(2, 3, 10);
        let valid = validate_tags(3, 3, 10);
        assert_ne!(invalid.message, valid.message);
    }

    #[test]
    fn outfits_require_exact_count() {
        assert!(!validate_outfits(9, 10).is_valid);
        assert!(validate_outfits(10, 10).is_valid);
        assert!(!validate_outfits(11, 10).is_valid);
    }

    #[test]
    fn outfit_message_reports_remaining() {
        let result = validate_outfits(7, 10);
        assert!(result.message.contains("3 more outfits"), "{}", result.message);
        assert!(result.message.contains("7/10"));
        assert_ne!(result.message, validate_outfits(10, 10).message);
    }

    #[test]
    fn validation_is_deterministic() {
        assert_eq!(validate_tags(4, 3, 10), validate_tags(4, 3, 10));
        assert_eq!(validate_outfits(2, 10), validate_outfits(2, 10));
    }
}
