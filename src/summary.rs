//! Summary levels and the deterministic fallback summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Requested verbosity. Closed set; anything else is an invalid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLevel {
    #[default]
    Quick,
    Detailed,
    Academic,
}

impl SummaryLevel {
    pub const ALL: [SummaryLevel; 3] = [Self::Quick, Self::Detailed, Self::Academic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Detailed => "detailed",
            Self::Academic => "academic",
        }
    }

    /// Output token budget requested from the generator.
    pub fn max_output_tokens(self) -> u32 {
        match self {
            Self::Quick => 500,
            Self::Detailed => 1200,
            Self::Academic => 2000,
        }
    }
}

impl std::fmt::Display for SummaryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SummaryLevel {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(Self::Quick),
            "detailed" => Ok(Self::Detailed),
            "academic" => Ok(Self::Academic),
            other => Err(ServiceError::InvalidLevel {
                level: other.to_string(),
            }),
        }
    }
}

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "among", "because", "been", "before", "being", "between",
    "could", "does", "during", "each", "every", "from", "have", "into", "more", "most", "other",
    "over", "such", "than", "that", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "under", "very", "were", "what", "when", "where", "which", "while",
    "with", "within", "would", "your",
];

/// Most frequent content words (longer than four characters, not stop
/// words), ties broken by first appearance.
pub fn keywords(text: &str, n: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in text
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| w.chars().count() > 4 && !STOP_WORDS.contains(&w.as_str()))
        .enumerate()
    {
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked.into_iter().take(n).map(|(w, _)| w).collect()
}

/// Sentences split on `.`, `!` and `?`, trimmed, empties dropped.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn main_topic(text: &str) -> String {
    sentences(text)
        .first()
        .map(|s| s.chars().take(120).collect())
        .unwrap_or_else(|| "the selected topic".to_string())
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// A template summary built from the source text alone, used when the
/// generator is unavailable.
pub fn fallback_summary(text: &str, level: SummaryLevel) -> String {
    let word_count = text.split_whitespace().count();
    match level {
        SummaryLevel::Quick => format!(
            "Quick summary ({word_count} words): This text discusses {}.",
            join_or(&keywords(text, 3), "the selected topic")
        ),
        SummaryLevel::Detailed => {
            let phrases: Vec<String> = sentences(text)
                .into_iter()
                .take(3)
                .map(str::to_string)
                .collect();
            format!(
                "Detailed summary ({word_count} words): The selected text covers {}. \
                 Key points include {}. This represents an important discussion in the field.",
                main_topic(text),
                if phrases.is_empty() {
                    "its central argument".to_string()
                } else {
                    phrases.join("; ")
                }
            )
        }
        SummaryLevel::Academic => format!(
            "Academic analysis ({word_count} words):\n\
             - Topic: {}\n\
             - Key concepts: {}\n\
             - Methodology: Analytical review\n\
             - Implications: Theoretical significance",
            main_topic(text),
            join_or(&keywords(text, 4), "not identified")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_is_closed() {
        assert_eq!("detailed".parse::<SummaryLevel>().unwrap(), SummaryLevel::Detailed);
        let err = "verbose".parse::<SummaryLevel>().unwrap_err();
        assert!(matches!(err, ServiceError::InvalidLevel { level } if level == "verbose"));
        assert!("Quick".parse::<SummaryLevel>().is_err());
    }

    #[test]
    fn token_budgets() {
        assert_eq!(SummaryLevel::Quick.max_output_tokens(), 500);
        assert_eq!(SummaryLevel::Detailed.max_output_tokens(), 1200);
        assert_eq!(SummaryLevel::Academic.max_output_tokens(), 2000);
    }

    #[test]
    fn keywords_rank_by_frequency_then_position() {
        let text = "Neural networks learn. Networks generalize; neural models, networks again.";
        assert_eq!(keywords(text, 2), ["networks", "neural"]);
    }

    #[test]
    fn keywords_skip_stop_words_and_short_words() {
        assert_eq!(keywords("which would their big cat sat", 5), Vec::<String>::new());
    }

    #[test]
    fn quick_fallback_mentions_keywords() {
        let summary = fallback_summary("Photosynthesis converts sunlight. Photosynthesis feeds plants.", SummaryLevel::Quick);
        assert!(summary.starts_with("Quick summary (6 words)"));
        assert!(summary.contains("photosynthesis"));
    }

    #[test]
    fn academic_fallback_is_outline() {
        let summary = fallback_summary("Gravity shapes orbits.", SummaryLevel::Academic);
        assert_eq!(summary.lines().count(), 5);
        assert!(summary.contains("- Topic: Gravity shapes orbits"));
    }

    #[test]
    fn empty_text_fallbacks_do_not_panic() {
        for level in SummaryLevel::ALL {
            assert!(!fallback_summary("", level).is_empty());
        }
    }
}
