//! Deterministic generator for running without an AI backend.
//!
//! Responses are derived from the words of the source text and use the
//! same formats a real model is asked for, so the mock path goes through
//! the same parsers.

use super::{GenerationOptions, Generator, LlmResult};
use crate::prompts::{Prompt, Task};
use crate::summary::{keywords, sentences, SummaryLevel};

const FILLER_WORDS: [&str; 5] = ["Main", "Topic", "Analysis", "Results", "Conclusion"];

#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Words longer than three characters, punctuation stripped.
    fn meaningful_words(text: &str) -> Vec<String> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|w| w.chars().count() > 3)
            .take(15)
            .collect();
        if words.is_empty() {
            FILLER_WORDS.iter().map(|w| w.to_string()).collect()
        } else {
            words
        }
    }

    fn summary(text: &str, level: SummaryLevel) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        let lead = words.first().copied().unwrap_or("the topic");
        match level {
            SummaryLevel::Quick => format!(
                "This text discusses {lead} and covers key aspects in about {} words.",
                words.len()
            ),
            SummaryLevel::Detailed => {
                let opening = words.iter().take(50).copied().collect::<Vec<_>>().join(" ");
                format!(
                    "Detailed analysis: {opening}... The text explores multiple dimensions across {} words.",
                    words.len()
                )
            }
            SummaryLevel::Academic => {
                let concepts = keywords(text, 3);
                let first = sentences(text).first().copied().unwrap_or("Main Idea").to_string();
                format!(
                    "• Key Concept: {first}\n\
                     • Core Principles: {}\n\
                     • Applications: Practical implications\n\
                     • Conclusion: Summary of findings",
                    if concepts.is_empty() {
                        "Fundamental aspects".to_string()
                    } else {
                        concepts.join(", ")
                    }
                )
            }
        }
    }

    /// A structured outline: the first three words form the topic, the
    /// next words become branches, and every other branch gets an example.
    fn mind_map(text: &str) -> String {
        let words = Self::meaningful_words(text);
        let central = words.iter().take(3).cloned().collect::<Vec<_>>().join(" ");

        let mut out = format!("CENTRAL_TOPIC: {central}\n\nBRANCHES:\n");
        let branch_words: Vec<&String> = words.iter().skip(3).take(4).collect();
        for (i, branch) in branch_words.iter().enumerate() {
            out.push_str(&format!("{}. {branch}\n", i + 1));
            if let Some(example) = words.get(i + 7) {
                out.push_str(&format!("• Example: {example}\n"));
            }
            out.push('\n');
        }

        if let [first, second, ..] = branch_words.as_slice() {
            out.push_str(&format!(
                "RELATIONSHIPS:\n- {first} is related to {second} because they appear together\n"
            ));
        }
        out
    }

    fn concepts(text: &str) -> String {
        let words = Self::meaningful_words(text);
        let concepts: Vec<&String> = words.iter().take(5).collect();
        serde_json::to_string(&concepts).unwrap_or_else(|_| "[]".into())
    }
}

impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "smart-mock"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn generate(&self, prompt: &Prompt, _options: &GenerationOptions) -> LlmResult<String> {
        let text = &prompt.text;
        Ok(match prompt.task {
            Task::Summary(level) => Self::summary(text, level),
            Task::MindMap => Self::mind_map(text),
            Task::Concepts => Self::concepts(text),
            Task::Probe => "ok".to_string(),
        })
    }
}
