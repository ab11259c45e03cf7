//! Prompt text for each generation task.

use crate::summary::SummaryLevel;

/// What the generator is being asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Summary(SummaryLevel),
    /// CENTRAL_TOPIC / BRANCHES / RELATIONSHIPS outline.
    MindMap,
    /// JSON array of key concepts.
    Concepts,
    /// Minimal request used to check connectivity.
    Probe,
}

impl Task {
    pub fn name(self) -> &'static str {
        match self {
            Self::Summary(_) => "summary",
            Self::MindMap => "mindmap",
            Self::Concepts => "concepts",
            Self::Probe => "probe",
        }
    }
}

/// A task together with the (already normalized) source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub task: Task,
    pub text: String,
}

impl Prompt {
    pub fn new(task: Task, text: impl Into<String>) -> Self {
        Self {
            task,
            text: text.into(),
        }
    }

    pub fn probe() -> Self {
        Self::new(Task::Probe, "Hello")
    }

    /// The full prompt string sent to a model.
    pub fn render(&self) -> String {
        let text = &self.text;
        match self.task {
            Task::Summary(SummaryLevel::Quick) => format!(
                "Provide a concise 5-6 sentence summary capturing the essence of this text.\n\n\
                 Text:\n{text}\n\n\
                 Focus on:\n\
                 • The main subject or topic\n\
                 • The core finding or argument\n\
                 • Keep it under 600 words"
            ),
            Task::Summary(SummaryLevel::Detailed) => format!(
                "Provide a comprehensive yet concise paragraph summary of this text.\n\n\
                 Text:\n{text}\n\n\
                 Your summary should:\n\
                 1. State the main topic and purpose\n\
                 2. Outline the key points or arguments\n\
                 3. Mention important evidence or examples used\n\
                 4. Note any conclusions or recommendations\n\
                 5. Maintain a smooth, paragraph-style flow\n\n\
                 Avoid bullet points - write in complete, connected sentences."
            ),
            Task::Summary(SummaryLevel::Academic) => format!(
                "Create a structured academic summary of the following text. Include:\n\
                 1. Main topic and scope\n\
                 2. Key concepts/categories discussed\n\
                 3. Theoretical or practical implications\n\
                 4. Critical analysis or limitations noted\n\n\
                 Text to summarize:\n{text}\n\n\
                 Ensure the summary is complete, coherent, and ends with a concluding statement."
            ),
            Task::MindMap => format!(
                "Analyze this text and extract key concepts to create a hierarchical mind map.\n\n\
                 TEXT:\n{text}\n\n\
                 Extract the central theme, 3-5 main categories, 2-3 key points for each \
                 category, and connections between related concepts.\n\n\
                 Format your response exactly as:\n\
                 CENTRAL_TOPIC: [topic name]\n\n\
                 BRANCHES:\n\
                 1. [Branch 1 Name]\n\
                 • [Subpoint 1]\n\
                 • [Subpoint 2]\n\n\
                 2. [Branch 2 Name]\n\
                 • [Subpoint 1]\n\
                 • [Subpoint 2]\n\n\
                 RELATIONSHIPS:\n\
                 - [Concept A] is related to [Concept B] because...\n\n\
                 Keep it structured but concise."
            ),
            Task::Concepts => format!(
                "Extract the 5 most important concepts from this text.\n\n\
                 TEXT:\n{text}\n\n\
                 Return only a JSON array of short strings (at most 4 words each), \
                 most central concept first. Example: [\"Concept A\", \"Concept B\"]"
            ),
            Task::Probe => text.clone(),
        }
    }
}
