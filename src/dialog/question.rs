//! Question catalog loaded from configuration.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// How a question is presented to the user. Presentation only; answer
/// handling is identical for both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    Button,
    QuickReply,
}

/// One questionnaire entry. A question's position in the catalog is its
/// stable identifier and is what postback payloads carry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer display strings; the position is the answer code.
    pub answers: Vec<String>,
    /// Search parameters contributed by each answer, keyed by answer code.
    #[serde(default)]
    pub search_params: BTreeMap<usize, BTreeMap<String, Value>>,
    /// Persistent answers survive a dialog restart.
    #[serde(default)]
    pub persistent: bool,
}

/// Ordered, read-only question list.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct QuestionCatalog(Vec<Question>);

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self(questions)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Question)> {
        self.0.iter().enumerate()
    }

    /// Whether an answer to this question survives a restart.
    /// Unknown indexes are treated as non-persistent.
    pub fn is_persistent(&self, index: usize) -> bool {
        self.get(index).is_some_and(|q| q.persistent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_catalog() -> QuestionCatalog {
        serde_json::from_value(json!([
            {
                "type": "button",
                "question": "Which region?",
                "answers": ["North", "South"],
                "searchParams": {"0": {"region": "north"}, "1": {"region": "south"}},
                "persistent": true
            },
            {
                "type": "quickReply",
                "question": "Which craft?",
                "answers": ["Design", "Engineering"]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn deserializes_catalog_shape() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.kind, QuestionKind::Button);
        assert_eq!(first.prompt, "Which region?");
        assert_eq!(first.answers, vec!["North", "South"]);
        assert_eq!(first.search_params[&1]["region"], json!("south"));
        assert!(first.persistent);

        let second = catalog.get(1).unwrap();
        assert_eq!(second.kind, QuestionKind::QuickReply);
        assert!(second.search_params.is_empty());
        assert!(!second.persistent);
    }

    #[test]
    fn get_out_of_bounds_is_none() {
        let catalog = sample_catalog();
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn iter_yields_indexes_in_order() {
        let catalog = sample_catalog();
        let indexes: Vec<usize> = catalog.iter().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn persistence_lookup() {
        let catalog = sample_catalog();
        assert!(catalog.is_persistent(0));
        assert!(!catalog.is_persistent(1));
        assert!(!catalog.is_persistent(99));
    }
}
