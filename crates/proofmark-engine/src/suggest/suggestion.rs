use serde::{Deserialize, Serialize};

/// Closed set of suggestion categories.
///
/// Behavior keyed on the category (labels, styling hooks) matches
/// exhaustively, so adding a category is a compile-enforced change rather
/// than a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Grammar,
    Tone,
    /// Wire name is `persuasive`, kept from the analysis contract.
    Persuasive,
    Conciseness,
    Headline,
    Readability,
    Vocabulary,
    AbTest,
}

impl SuggestionKind {
    pub const ALL: [SuggestionKind; 8] = [
        SuggestionKind::Grammar,
        SuggestionKind::Tone,
        SuggestionKind::Persuasive,
        SuggestionKind::Conciseness,
        SuggestionKind::Headline,
        SuggestionKind::Readability,
        SuggestionKind::Vocabulary,
        SuggestionKind::AbTest,
    ];

    /// Human-readable label for UI surfaces.
    pub fn label(self) -> &'static str {
        match self {
            SuggestionKind::Grammar => "Grammar",
            SuggestionKind::Tone => "Tone",
            SuggestionKind::Persuasive => "Persuasiveness",
            SuggestionKind::Conciseness => "Conciseness",
            SuggestionKind::Headline => "Headline",
            SuggestionKind::Readability => "Readability",
            SuggestionKind::Vocabulary => "Vocabulary",
            SuggestionKind::AbTest => "A/B test",
        }
    }
}

/// Disposition of a suggestion. Transitions are one-way: once accepted or
/// rejected a suggestion never returns to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// An AI-reported suggestion, immutable once created. Disposition lives in
/// the [`SuggestionStore`](crate::suggest::SuggestionStore) status map, not
/// on the record.
///
/// `start_index..end_index` is a half-open character range into the
/// document's plain-text projection. `original_text` is the literal text
/// expected at that range and doubles as the integrity check before a mark
/// is applied.
///
/// The serde shape is the analysis wire contract: camelCase fields, the
/// category under `type`, and an id generated when the collaborator omits
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default = "generate_id")]
    pub id: String,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub original_text: String,
    pub suggestion_text: String,
    #[serde(default)]
    pub explanation: String,
    /// 0.0–1.0, descriptive metadata only; never drives control flow.
    #[serde(default)]
    pub confidence: f64,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Suggestion {
    /// Construct a suggestion with a generated id.
    pub fn new(
        kind: SuggestionKind,
        start_index: usize,
        end_index: usize,
        original_text: impl Into<String>,
        suggestion_text: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            start_index,
            end_index,
            kind,
            original_text: original_text.into(),
            suggestion_text: suggestion_text.into(),
            explanation: String::new(),
            confidence: 0.0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>, confidence: f64) -> Self {
        self.explanation = explanation.into();
        self.confidence = confidence;
        self
    }
}

/// Parse the analysis response payload: a JSON array of suggestion objects.
pub fn parse_suggestions(json: &str) -> serde_json::Result<Vec<Suggestion>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_format_round_trips() {
        let s = Suggestion::new(SuggestionKind::Grammar, 0, 8, "This are", "These are")
            .with_id("s1")
            .with_explanation("Subject-verb agreement", 0.95);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"startIndex\":0"));
        assert!(json.contains("\"type\":\"grammar\""));
        assert!(json.contains("\"originalText\":\"This are\""));

        let back: Suggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn kind_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&SuggestionKind::AbTest).unwrap(),
            "\"ab_test\""
        );
        assert_eq!(
            serde_json::to_string(&SuggestionKind::Persuasive).unwrap(),
            "\"persuasive\""
        );
    }

    #[test]
    fn missing_id_is_generated() {
        let json = r#"[{
            "startIndex": 4,
            "endIndex": 8,
            "type": "tone",
            "originalText": "good",
            "suggestionText": "exceptional",
            "explanation": "Stronger language",
            "confidence": 0.75
        }]"#;
        let parsed = parse_suggestions(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(!parsed[0].id.is_empty());
        assert_eq!(parsed[0].kind, SuggestionKind::Tone);
    }

    #[test]
    fn labels_cover_every_kind() {
        for kind in SuggestionKind::ALL {
            assert!(!kind.label().is_empty());
        }
    }
}
