//! Line-oriented parser for structured mind-map responses.
//!
//! The generator is asked to answer in this shape:
//!
//! ```text
//! CENTRAL_TOPIC: <topic>
//!
//! BRANCHES:
//! 1. <branch>
//! • <point>
//! • <point>
//!
//! RELATIONSHIPS:
//! - <A> is related to <B> because ...
//! ```
//!
//! Model output rarely follows it exactly, so the grammar is best effort:
//! sections may be missing or out of order, and any line that does not fit
//! the current section is ignored. Parsing never fails.

use serde::{Deserialize, Serialize};

const CENTRAL_MARKER: &str = "CENTRAL_TOPIC:";
const BRANCHES_MARKER: &str = "BRANCHES:";
const RELATIONSHIPS_MARKER: &str = "RELATIONSHIPS:";

/// A first-level category and its ordered points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub points: Vec<String>,
}

/// Intermediate representation between the raw response and the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Possibly empty.
    pub central_topic: String,
    pub branches: Vec<Branch>,
    /// Free-text statements, e.g. "A is related to B because ...".
    pub relationships: Vec<String>,
}

impl Outline {
    /// True when there is neither a central topic nor any branch.
    pub fn is_empty(&self) -> bool {
        self.central_topic.is_empty() && self.branches.is_empty()
    }

    /// Whether a graph built from this outline satisfies the single-root
    /// contract. Outlines with branches but no topic would produce a
    /// rootless graph and go to the fallback path instead.
    pub fn is_usable(&self) -> bool {
        !self.central_topic.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.branches.iter().map(|b| b.points.len()).sum()
    }
}

/// Which section the scan is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Central,
    Branches,
    Relationships,
}

/// Fold state: the outline under construction plus the open section.
///
/// The open branch is always the last element of `outline.branches` when
/// `branch_open` is set.
#[derive(Debug)]
struct ParseState {
    outline: Outline,
    section: Section,
    branch_open: bool,
}

impl ParseState {
    fn new() -> Self {
        Self {
            outline: Outline::default(),
            section: Section::None,
            branch_open: false,
        }
    }
}

/// Parse a raw generator response into an [`Outline`].
pub fn parse_structured(response: &str) -> Outline {
    let state = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(ParseState::new(), step);

    let outline = state.outline;
    tracing::debug!(
        central = !outline.central_topic.is_empty(),
        branches = outline.branches.len(),
        points = outline.point_count(),
        relationships = outline.relationships.len(),
        "parsed structured response"
    );
    outline
}

/// One transition of the section state machine.
fn step(mut state: ParseState, line: &str) -> ParseState {
    if let Some(rest) = line.strip_prefix(CENTRAL_MARKER) {
        state.outline.central_topic = rest.trim().to_string();
        state.section = Section::Central;
        return state;
    }
    if line.starts_with(BRANCHES_MARKER) {
        state.section = Section::Branches;
        return state;
    }
    if line.starts_with(RELATIONSHIPS_MARKER) {
        state.section = Section::Relationships;
        return state;
    }

    match state.section {
        Section::Branches => {
            if let Some(name) = branch_heading(line) {
                state.outline.branches.push(Branch {
                    name: name.to_string(),
                    points: Vec::new(),
                });
                state.branch_open = true;
            } else if let Some(point) = bullet(line) {
                if state.branch_open && !point.is_empty() {
                    if let Some(branch) = state.outline.branches.last_mut() {
                        branch.points.push(point.to_string());
                    }
                }
            }
        }
        Section::Relationships => {
            if let Some(statement) = line.strip_prefix('-').map(str::trim) {
                if !statement.is_empty() {
                    state.outline.relationships.push(statement.to_string());
                }
            }
        }
        Section::None | Section::Central => {}
    }
    state
}

/// A one-digit enumerator such as `"2. Applications"`, returning the name.
///
/// The text before the first `.` must be exactly one digit once trimmed, so
/// `"10. x"` and `"v1. x"` are not headings.
fn branch_heading(line: &str) -> Option<&str> {
    if !line.starts_with(char::is_numeric) {
        return None;
    }
    let (enumerator, name) = line.split_once('.')?;
    if enumerator.trim().chars().count() != 1 {
        return None;
    }
    Some(name.trim())
}

/// A `•` or `-` bullet, returning the text after the marker.
fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix('•')
        .or_else(|| line.strip_prefix('-'))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "CENTRAL_TOPIC: Photosynthesis\n\
        \n\
        BRANCHES:\n\
        1. Inputs\n\
        • Sunlight\n\
        • Water\n\
        \n\
        2. Outputs\n\
        - Glucose\n\
        - Oxygen\n\
        \n\
        RELATIONSHIPS:\n\
        - Sunlight is related to Glucose because energy is stored\n";

    #[test]
    fn parses_all_sections() {
        let outline = parse_structured(WELL_FORMED);
        assert_eq!(outline.central_topic, "Photosynthesis");
        assert_eq!(outline.branches.len(), 2);
        assert_eq!(outline.branches[0].name, "Inputs");
        assert_eq!(outline.branches[0].points, vec!["Sunlight", "Water"]);
        assert_eq!(outline.branches[1].points, vec!["Glucose", "Oxygen"]);
        assert_eq!(
            outline.relationships,
            vec!["Sunlight is related to Glucose because energy is stored"]
        );
    }

    #[test]
    fn points_before_any_branch_are_dropped() {
        let outline = parse_structured("BRANCHES:\n• orphan\n1. First\n• kept");
        assert_eq!(outline.branches.len(), 1);
        assert_eq!(outline.branches[0].points, vec!["kept"]);
    }

    #[test]
    fn non_ascii_digits_open_branches() {
        let outline = parse_structured("CENTRAL_TOPIC: T\nBRANCHES:\n٣. Arabic-Indic\n३. Devanagari\n• point");
        let names: Vec<_> = outline.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Arabic-Indic", "Devanagari"]);
    }

    #[test]
    fn multi_digit_enumerators_are_not_headings() {
        let outline = parse_structured("BRANCHES:\n10. Tenth\n1 . Spaced\nv1. Versioned");
        assert_eq!(outline.branches.len(), 1);
        assert_eq!(outline.branches[0].name, "Spaced");
    }

    #[test]
    fn content_outside_sections_is_ignored() {
        let outline = parse_structured("Sure! Here is your mind map.\n1. Not a branch\n- nor a point");
        assert!(outline.is_empty());
        assert!(outline.relationships.is_empty());
    }

    #[test]
    fn sections_out_of_order() {
        let outline = parse_structured(
            "RELATIONSHIPS:\n- X is related to Y\nBRANCHES:\n1. Y\nCENTRAL_TOPIC: X",
        );
        assert_eq!(outline.central_topic, "X");
        assert_eq!(outline.branches.len(), 1);
        assert_eq!(outline.relationships.len(), 1);
    }

    #[test]
    fn later_central_topic_wins() {
        let outline = parse_structured("CENTRAL_TOPIC: First\nCENTRAL_TOPIC: Second");
        assert_eq!(outline.central_topic, "Second");
    }

    #[test]
    fn bullets_in_relationships_require_dash() {
        let outline = parse_structured("RELATIONSHIPS:\n• A is related to B\n- C is related to D");
        assert_eq!(outline.relationships, vec!["C is related to D"]);
    }

    #[test]
    fn usable_requires_central_topic() {
        let outline = parse_structured("BRANCHES:\n1. Lonely");
        assert!(!outline.is_empty());
        assert!(!outline.is_usable());
    }

    #[test]
    fn crlf_and_indentation_tolerated() {
        let outline = parse_structured("  CENTRAL_TOPIC: AI\r\n  BRANCHES:\r\n   1. Uses\r\n   • Health\r\n");
        assert_eq!(outline.central_topic, "AI");
        assert_eq!(outline.branches[0].points, vec!["Health"]);
    }
}
