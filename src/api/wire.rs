use serde::Deserialize;
use serde_json::{Map, Value};

use crate::graph::NodeKind;

pub const NOT_SPECIFIED: &str = "not specified";

/// One relationship row as the API reports it. Every field is optional on
/// the wire; accessors fall back rather than fail.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EdgeRecord {
    #[serde(default)]
    pub node: WireNode,
    #[serde(default)]
    pub relationship: WireRelationship,
    #[serde(default)]
    pub target_node: WireNode,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WireNode {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub label: Vec<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WireRelationship {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Entry of the `/nodes` census; unlike edge records it carries a single
/// label string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeSummary {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub label: Option<String>,
}

/// Ids arrive as integers from the census and as element-id strings from the
/// relationship queries; both normalize to a string key.
fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn attribute_text(attributes: &Map<String, Value>, key: &str) -> Option<String> {
    match attributes.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl WireNode {
    pub fn id(&self) -> Option<String> {
        normalize_id(&self.id)
    }

    pub fn display_name(&self) -> String {
        attribute_text(&self.attributes, "name").unwrap_or_else(|| NOT_SPECIFIED.to_string())
    }

    /// First label wins; unlabeled nodes are classified from the attribute
    /// shape the user records carry.
    pub fn kind(&self) -> NodeKind {
        if let Some(label) = self.label.first() {
            return NodeKind::from_label(label);
        }

        let user_shaped = ["sex", "city", "followers", "subscriptions"]
            .iter()
            .any(|key| self.attributes.contains_key(*key));
        if user_shaped {
            NodeKind::User
        } else {
            NodeKind::Group
        }
    }
}

impl WireRelationship {
    pub fn label(&self) -> String {
        self.kind
            .as_deref()
            .filter(|kind| !kind.is_empty())
            .unwrap_or(NOT_SPECIFIED)
            .to_string()
    }
}

impl NodeSummary {
    pub fn id(&self) -> Option<String> {
        normalize_id(&self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.label
            .as_deref()
            .map(NodeKind::from_label)
            .unwrap_or(NodeKind::Group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_from_json(raw: &str) -> EdgeRecord {
        serde_json::from_str(raw).expect("edge record parses")
    }

    #[test]
    fn parses_full_edge_record() {
        let record = record_from_json(
            r#"{
                "node": {"id": 1, "label": ["User"], "attributes": {"name": "A"}},
                "relationship": {"type": "follows"},
                "target_node": {"id": 2, "label": ["Group"], "attributes": {"name": "B"}}
            }"#,
        );

        assert_eq!(record.node.id().as_deref(), Some("1"));
        assert_eq!(record.node.display_name(), "A");
        assert_eq!(record.node.kind(), NodeKind::User);
        assert_eq!(record.relationship.label(), "follows");
        assert_eq!(record.target_node.id().as_deref(), Some("2"));
        assert_eq!(record.target_node.kind(), NodeKind::Group);
    }

    #[test]
    fn normalizes_string_and_numeric_ids() {
        let record = record_from_json(
            r#"{
                "node": {"id": "4:abc-def:17"},
                "relationship": {},
                "target_node": {"id": 42}
            }"#,
        );

        assert_eq!(record.node.id().as_deref(), Some("4:abc-def:17"));
        assert_eq!(record.target_node.id().as_deref(), Some("42"));
    }

    #[test]
    fn missing_fields_fall_back_to_not_specified() {
        let record = record_from_json(r#"{"node": {"id": 7}}"#);

        assert_eq!(record.node.display_name(), NOT_SPECIFIED);
        assert_eq!(record.relationship.label(), NOT_SPECIFIED);
        assert!(record.target_node.id().is_none());
    }

    #[test]
    fn infers_kind_from_attribute_shape() {
        let user = record_from_json(
            r#"{"node": {"id": 1, "attributes": {"followers": 120}}}"#,
        );
        let group = record_from_json(r#"{"node": {"id": 2, "attributes": {"name": "club"}}}"#);

        assert_eq!(user.node.kind(), NodeKind::User);
        assert_eq!(group.node.kind(), NodeKind::Group);
    }

    #[test]
    fn census_entry_uses_single_label() {
        let summary: NodeSummary =
            serde_json::from_str(r#"{"id": 5, "label": "User"}"#).expect("summary parses");

        assert_eq!(summary.id().as_deref(), Some("5"));
        assert_eq!(summary.kind(), NodeKind::User);
    }
}
