//! Subtopic normalizer
//!
//! Turns the model's free-text list into clean subtopic strings:
//!
//! ```text
//! "1. Convolutional layers\n2. Pooling\n- Batch normalization techniques"
//!   -> ["Convolutional layers", "Batch normalization techniques"]
//! ```
//!
//! The minimum length filter is a heuristic against numbering debris and
//! fragments, not a business rule. It is configurable via `[normalizer]`.

use serde::{Deserialize, Serialize};

/// Characters stripped from the start of each line
const LIST_MARKERS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '-', '*', '•', ' ',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    /// A cleaned line is kept only if it is longer than this (in chars)
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Lines returned at most
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_items: default_max_items(),
        }
    }
}

fn default_min_chars() -> usize {
    10
}

fn default_max_items() -> usize {
    3
}

impl Normalizer {
    /// Clean `raw` into at most `max_items` subtopics, in original order.
    /// Never fails; unusable input gives an empty list.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        raw.split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.trim_start_matches(LIST_MARKERS))
            .filter(|line| line.chars().count() > self.min_chars)
            .take(self.max_items)
            .map(str::to_string)
            .collect()
    }
}

/// [`Normalizer::normalize`] with default settings
pub fn normalize(raw: &str) -> Vec<String> {
    Normalizer::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_short_lines() {
        let raw = "1. Convolutional layers\n2. Pooling\n- Batch normalization techniques";
        assert_eq!(
            normalize(raw),
            vec!["Convolutional layers", "Batch normalization techniques"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("\n  \n\t\n").is_empty());
    }

    #[test]
    fn test_strips_leading_markers_only() {
        let raw = "* • 12. Gradient descent - variants 2.0\n\r\n  - Attention is all you need.  ";
        assert_eq!(
            normalize(raw),
            vec![
                "Gradient descent - variants 2.0",
                "Attention is all you need.",
            ]
        );
    }

    #[test]
    fn test_keeps_first_three() {
        let raw = "1. Policy gradient methods\n2. Temporal difference learning\n\
                   3. Exploration strategies\n4. Multi-agent reinforcement learning";
        let subtopics = normalize(raw);
        assert_eq!(subtopics.len(), 3);
        assert_eq!(subtopics[2], "Exploration strategies");
    }

    #[test]
    fn test_length_boundary_is_exclusive() {
        // exactly 10 chars is dropped, 11 is kept
        assert!(normalize("1. abcdefghij").is_empty());
        assert_eq!(normalize("1. abcdefghijk"), vec!["abcdefghijk"]);
        // counted in chars, not bytes
        assert_eq!(normalize("- çãõéíóúâêôû"), vec!["çãõéíóúâêôû"]);
        assert!(normalize("- çãõéíóúâêô").is_empty());
    }

    #[test]
    fn test_custom_settings() {
        let loose = Normalizer {
            min_chars: 0,
            max_items: 5,
        };
        assert_eq!(
            loose.normalize("1. Pooling\n2. CNN\n3. RNN\n4. GAN"),
            vec!["Pooling", "CNN", "RNN", "GAN"]
        );
    }
}
