//! Collections and equality/membership filters.

use std::fmt;

use mongodb::bson::{doc, Bson, Document};

/// The two logical collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Nodes,
    Edges,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes => f.write_str("nodes"),
            Self::Edges => f.write_str("edges"),
        }
    }
}

/// A condition on one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(String),
    In(Vec<String>),
}

impl Condition {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Eq(expected) => expected == value,
            Self::In(options) => options.iter().any(|o| o == value),
        }
    }
}

/// Conjunction of field conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field == value`
    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.clauses
            .push((field.to_string(), Condition::Eq(value.into())));
        self
    }

    /// `field ∈ values`
    pub fn any_of<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses.push((
            field.to_string(),
            Condition::In(values.into_iter().map(Into::into).collect()),
        ));
        self
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    /// Render as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut out = Document::new();
        for (field, condition) in &self.clauses {
            let value = match condition {
                Condition::Eq(v) => Bson::String(v.clone()),
                Condition::In(options) => Bson::Document(doc! { "$in": options.clone() }),
            };
            out.insert(field.clone(), value);
        }
        out
    }

    /// Evaluate against a document. Missing or non-string fields never match.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|(field, condition)| {
            document
                .get_str(field)
                .map(|value| condition.accepts(value))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_document() {
        let filter = Filter::new()
            .eq("source", "Disease::DOID:1")
            .any_of("metaedge", ["DdG", "DuG"]);
        assert_eq!(
            filter.to_document(),
            doc! {
                "source": "Disease::DOID:1",
                "metaedge": { "$in": ["DdG", "DuG"] },
            }
        );
    }

    #[test]
    fn test_matches() {
        let edge = doc! { "source": "D1", "metaedge": "DuG", "target": "G1" };
        assert!(Filter::new().eq("source", "D1").matches(&edge));
        assert!(Filter::new().any_of("metaedge", ["DdG", "DuG"]).matches(&edge));
        assert!(!Filter::new().eq("source", "D1").eq("target", "G2").matches(&edge));
        assert!(!Filter::new().eq("missing", "x").matches(&edge));
        assert!(Filter::new().matches(&edge));
    }

    #[test]
    fn test_empty_membership_matches_nothing() {
        let edge = doc! { "target": "G1" };
        let none: [&str; 0] = [];
        assert!(!Filter::new().any_of("target", none).matches(&edge));
    }

    #[test]
    fn test_non_string_field_does_not_match() {
        let doc = doc! { "id": 42 };
        assert!(!Filter::new().eq("id", "42").matches(&doc));
    }
}
