//! Web Template wire model.
//!
//! Typed representation of the Web Template JSON document: the template
//! header (`defaultLanguage`, `languages`, version fields) and the recursive
//! `tree` of [`TemplateNode`]s with their input definitions.
//!
//! All structs default every field, so a sparse node (common in real
//! templates) deserialises cleanly; unknown keys are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A Web Template document as served by an openEHR template server.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WebTemplate {
    pub template_id: Option<String>,
    pub version: Option<String>,
    pub sem_ver: Option<String>,
    pub default_language: Option<String>,
    pub languages: Vec<String>,
    pub tree: Option<TemplateNode>,
}

/// One node of the template tree: a composition, section, entry, cluster,
/// element, or data value constraint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateNode {
    pub id: Option<String>,
    pub node_id: Option<String>,
    pub rm_type: String,
    pub name: Option<String>,
    pub localized_name: Option<String>,
    pub localized_names: BTreeMap<String, String>,
    pub label: Option<String>,
    pub aql_path: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub in_context: Option<bool>,
    pub children: Vec<TemplateNode>,
    pub inputs: Vec<InputDefinition>,
}

impl TemplateNode {
    /// The node's `rmType` uppercased, the form all classification works on.
    pub fn rm_type_upper(&self) -> String {
        self.rm_type.to_uppercase()
    }

    /// The first input definition, when any exist.
    pub fn first_input(&self) -> Option<&InputDefinition> {
        self.inputs.first()
    }

    /// The input definition carrying the given suffix (`lower`/`upper` for
    /// interval bounds).
    pub fn input_for_suffix(&self, suffix: &str) -> Option<&InputDefinition> {
        self.inputs
            .iter()
            .find(|input| input.suffix.as_deref() == Some(suffix))
    }
}

/// An input definition attached to an element node, describing how one value
/// (or one bound of an interval value) is captured.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InputDefinition {
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub suffix: Option<String>,
    pub terminology: Option<String>,
    pub units: Option<String>,
    pub list: Vec<ListItem>,
    pub validation: Option<Validation>,
    pub lower_included: Option<bool>,
    pub upper_included: Option<bool>,
}

/// A coded option inside an input definition's `list`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItem {
    pub value: Option<String>,
    pub label: Option<String>,
    pub localized_labels: BTreeMap<String, String>,
}

/// Validation constraints on an input definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Validation {
    pub range: Ranges,
}

/// `validation.range` may be absent, a single object, or a list.
///
/// Both forms appear in the wild; the model supports both to stay compatible
/// with existing template documents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranges(pub Vec<RangeBounds>);

impl Ranges {
    pub fn first(&self) -> Option<&RangeBounds> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
enum OneOrManyRange {
    One(RangeBounds),
    Many(Vec<RangeBounds>),
}

impl<'de> Deserialize<'de> for Ranges {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<OneOrManyRange>::deserialize(deserializer)?;
        let ranges = match value {
            None => Vec::new(),
            Some(OneOrManyRange::One(r)) => vec![r],
            Some(OneOrManyRange::Many(rs)) => rs,
        };
        Ok(Self(ranges))
    }
}

impl Serialize for Ranges {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.len() {
            0 => serializer.serialize_none(),
            1 => OneOrManyRange::One(self.0[0].clone()).serialize(serializer),
            _ => OneOrManyRange::Many(self.0.clone()).serialize(serializer),
        }
    }
}

/// One numeric range constraint, possibly unit-qualified.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_from_json(json: serde_json::Value) -> TemplateNode {
        serde_json::from_value(json).expect("node should deserialise")
    }

    #[test]
    fn parses_minimal_template_document() {
        let template: WebTemplate = serde_json::from_value(serde_json::json!({
            "templateId": "acp.review",
            "defaultLanguage": "nl",
            "languages": ["nl", "en"],
            "semVer": "1.2.0",
            "tree": {
                "id": "acp_plan",
                "rmType": "COMPOSITION",
                "aqlPath": "",
                "children": [
                    {"id": "body", "rmType": "SECTION", "aqlPath": "/content[at0001]"}
                ]
            }
        }))
        .expect("document should deserialise");

        assert_eq!(template.default_language.as_deref(), Some("nl"));
        assert_eq!(template.sem_ver.as_deref(), Some("1.2.0"));
        let tree = template.tree.expect("tree present");
        assert_eq!(tree.rm_type_upper(), "COMPOSITION");
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn ignores_unknown_node_fields() {
        let node = node_from_json(serde_json::json!({
            "id": "blood_pressure",
            "rmType": "ELEMENT",
            "annotations": {"comment": "ignored"},
            "cardinalities": [1, 2, 3]
        }));
        assert_eq!(node.id.as_deref(), Some("blood_pressure"));
    }

    #[test]
    fn range_accepts_single_object_or_list() {
        let single: Validation = serde_json::from_value(serde_json::json!({
            "range": {"min": 0.0, "max": 300.0, "units": "mm[Hg]"}
        }))
        .expect("single range");
        assert_eq!(single.range.0.len(), 1);
        assert_eq!(single.range.first().and_then(|r| r.units.as_deref()), Some("mm[Hg]"));

        let many: Validation = serde_json::from_value(serde_json::json!({
            "range": [{"min": 0.0, "units": "kg"}, {"min": 0.0, "units": "lb"}]
        }))
        .expect("range list");
        assert_eq!(many.range.0.len(), 2);
    }

    #[test]
    fn input_suffix_lookup_matches_interval_bounds() {
        let node = node_from_json(serde_json::json!({
            "rmType": "DV_INTERVAL<DV_COUNT>",
            "inputs": [
                {"suffix": "lower", "type": "INTEGER"},
                {"suffix": "upper", "type": "INTEGER"}
            ]
        }));
        assert!(node.input_for_suffix("lower").is_some());
        assert!(node.input_for_suffix("upper").is_some());
        assert!(node.input_for_suffix("middle").is_none());
    }
}
