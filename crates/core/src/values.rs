//! Placeholder value-structure synthesis.
//!
//! Every terminal question carries a canonical empty value-structure telling
//! the form renderer what kind of answer the element takes. This module maps
//! a node's declared type information onto that structure, including the
//! recursive cases: intervals (a value-structure per bound) and polymorphic
//! ELEMENT choices (one fully-synthesised option per child, in source order).
//!
//! Synthesis is total. An unmatched type degrades to a diagnostic text
//! placeholder and a warning; it never fails the surrounding compile.

use serde::Serialize;
use webtemplate::{InputDefinition, TemplateNode};

use crate::constants::MAX_TREE_DEPTH;
use crate::naming;

/// One coded option of a `CODED_TEXT` value.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeOption {
    pub label: String,
    pub code: Option<String>,
}

/// One option of a polymorphic `CHOICE` value: a fully recursive leaf
/// descriptor with its own display name, identity, and value-structure.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub rm_type: String,
    pub display_name: String,
    pub archetype_node_id: Option<String>,
    pub path: String,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub value: Box<ValueStructure>,
}

/// The canonical empty value-structure for a question, tagged by data type.
///
/// Unset answers are `None`; string-valued answers start empty. The wire tag
/// uses the openEHR `DV_` names so the serialized tree reads like an openEHR
/// composition skeleton.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "_type")]
pub enum ValueStructure {
    #[serde(rename = "DV_TEXT")]
    Text { value: String },
    #[serde(rename = "DV_CODED_TEXT")]
    CodedText {
        value: String,
        terminology: String,
        options: Vec<CodeOption>,
    },
    #[serde(rename = "DV_BOOLEAN")]
    Boolean { value: Option<bool> },
    #[serde(rename = "DV_COUNT")]
    Count { magnitude: Option<i64> },
    #[serde(rename = "DV_QUANTITY")]
    Quantity {
        magnitude: Option<f64>,
        units: String,
    },
    #[serde(rename = "DV_DATE")]
    Date { value: Option<String> },
    #[serde(rename = "DV_TIME")]
    Time { value: Option<String> },
    #[serde(rename = "DV_DATE_TIME")]
    DateTime { value: Option<String> },
    #[serde(rename = "DV_IDENTIFIER")]
    Identifier {
        id_value: String,
        #[serde(rename = "type")]
        id_type: String,
        issuer: String,
        assigner: String,
    },
    #[serde(rename = "DV_URI")]
    Uri { value: String },
    #[serde(rename = "DV_INTERVAL")]
    Interval {
        lower: Box<ValueStructure>,
        upper: Box<ValueStructure>,
        lower_included: bool,
        upper_included: bool,
    },
    #[serde(rename = "DV_DURATION")]
    Duration {
        months: Option<i64>,
        weeks: Option<i64>,
        days: Option<i64>,
        hours: Option<i64>,
        minutes: Option<i64>,
        seconds: Option<i64>,
    },
    #[serde(rename = "DV_PROPORTION")]
    Proportion {
        numerator: Option<f64>,
        denominator: Option<f64>,
        #[serde(rename = "type")]
        kind: i32,
    },
    #[serde(rename = "CHOICE")]
    Choice { options: Vec<ChoiceOption> },
}

impl ValueStructure {
    /// The wire tag of this structure, as used in serialized output.
    pub fn type_tag(&self) -> &'static str {
        match self {
            ValueStructure::Text { .. } => "DV_TEXT",
            ValueStructure::CodedText { .. } => "DV_CODED_TEXT",
            ValueStructure::Boolean { .. } => "DV_BOOLEAN",
            ValueStructure::Count { .. } => "DV_COUNT",
            ValueStructure::Quantity { .. } => "DV_QUANTITY",
            ValueStructure::Date { .. } => "DV_DATE",
            ValueStructure::Time { .. } => "DV_TIME",
            ValueStructure::DateTime { .. } => "DV_DATE_TIME",
            ValueStructure::Identifier { .. } => "DV_IDENTIFIER",
            ValueStructure::Uri { .. } => "DV_URI",
            ValueStructure::Interval { .. } => "DV_INTERVAL",
            ValueStructure::Duration { .. } => "DV_DURATION",
            ValueStructure::Proportion { .. } => "DV_PROPORTION",
            ValueStructure::Choice { .. } => "CHOICE",
        }
    }
}

/// Synthesize the canonical empty value-structure for a node.
///
/// `path_context` is the owning question's path; option and bound paths are
/// derived from it deterministically.
pub fn synthesize(node: &TemplateNode, langs: &[String], path_context: &str) -> ValueStructure {
    synthesize_at(node, langs, path_context, 0)
}

fn synthesize_at(
    node: &TemplateNode,
    langs: &[String],
    path_context: &str,
    depth: usize,
) -> ValueStructure {
    if depth > MAX_TREE_DEPTH {
        tracing::warn!(
            node_id = ?node.id,
            "value synthesis exceeded the depth bound, emitting diagnostic placeholder"
        );
        return diagnostic_text("NESTING");
    }

    let rm_type = node.rm_type_upper();
    let effective = effective_type(node, &rm_type);

    // Polymorphic ELEMENT: each child is one option of a CHOICE. A childless
    // ELEMENT with a declared input type resolves through the mapping table;
    // one with no type information at all is a plain text question.
    if rm_type == "ELEMENT" && !effective.starts_with("DV_") {
        if !node.children.is_empty() {
            return synthesize_choice(node, langs, path_context, depth);
        }
        if effective.is_empty() {
            return ValueStructure::Text {
                value: String::new(),
            };
        }
    }

    structure_for(&effective, node, langs, path_context, depth)
}

/// The effective data type: the node's own `rmType` when it is already a
/// `DV_` type, otherwise the first input definition's declared type.
fn effective_type(node: &TemplateNode, rm_type_upper: &str) -> String {
    if rm_type_upper.starts_with("DV_") {
        return rm_type_upper.to_string();
    }
    node.first_input()
        .and_then(|input| input.input_type.as_deref())
        .unwrap_or("")
        .to_uppercase()
}

fn structure_for(
    effective: &str,
    node: &TemplateNode,
    langs: &[String],
    path_context: &str,
    depth: usize,
) -> ValueStructure {
    match effective {
        "TEXT" | "STRING" | "DV_TEXT" => ValueStructure::Text {
            value: String::new(),
        },
        "CODED_TEXT" | "DV_CODED_TEXT" => synthesize_coded_text(node.first_input(), langs),
        "BOOLEAN" | "DV_BOOLEAN" => ValueStructure::Boolean { value: None },
        "INTEGER" | "COUNT" | "DV_COUNT" => ValueStructure::Count { magnitude: None },
        "DECIMAL" | "REAL" | "DOUBLE" | "QUANTITY" | "DV_QUANTITY" => ValueStructure::Quantity {
            magnitude: None,
            units: quantity_units(node.first_input()),
        },
        "DATETIME" | "DV_DATE_TIME" => ValueStructure::DateTime { value: None },
        "DATE" | "DV_DATE" => ValueStructure::Date { value: None },
        "TIME" | "DV_TIME" => ValueStructure::Time { value: None },
        "IDENTIFIER" | "DV_IDENTIFIER" => ValueStructure::Identifier {
            id_value: String::new(),
            id_type: String::new(),
            issuer: String::new(),
            assigner: String::new(),
        },
        "URI" | "DV_URI" | "DV_EHR_URI" => ValueStructure::Uri {
            value: String::new(),
        },
        "DURATION" | "DV_DURATION" => ValueStructure::Duration {
            months: None,
            weeks: None,
            days: None,
            hours: None,
            minutes: None,
            seconds: None,
        },
        "PROPORTION" | "DV_PROPORTION" => ValueStructure::Proportion {
            numerator: None,
            denominator: None,
            kind: proportion_kind(node.first_input()),
        },
        other if is_interval_type(other) => {
            synthesize_interval(other, node, langs, path_context, depth)
        }
        other => {
            tracing::warn!(
                effective_type = %other,
                node_id = ?node.id,
                rm_type = %node.rm_type,
                "unmapped value type, emitting diagnostic text placeholder"
            );
            diagnostic_text(if other.is_empty() { "NONE" } else { other })
        }
    }
}

fn diagnostic_text(type_name: &str) -> ValueStructure {
    ValueStructure::Text {
        value: format!("[unmapped type: {type_name}]"),
    }
}

fn synthesize_coded_text(input: Option<&InputDefinition>, langs: &[String]) -> ValueStructure {
    let options = input
        .map(|input| {
            input
                .list
                .iter()
                .map(|item| CodeOption {
                    label: naming::resolve_list_label(item, langs),
                    code: item.value.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    ValueStructure::CodedText {
        value: String::new(),
        terminology: input
            .and_then(|input| input.terminology.clone())
            .unwrap_or_default(),
        options,
    }
}

/// Units come from the input definition itself, or from its first validation
/// range when the input carries none.
fn quantity_units(input: Option<&InputDefinition>) -> String {
    let Some(input) = input else {
        return String::new();
    };
    if let Some(units) = input.units.as_deref().filter(|u| !u.trim().is_empty()) {
        return units.to_string();
    }
    input
        .validation
        .as_ref()
        .and_then(|validation| validation.range.first())
        .and_then(|range| range.units.clone())
        .unwrap_or_default()
}

/// The proportion kind is declared as the first list entry of the input
/// definition; unparsable or absent values fall back to 0.
fn proportion_kind(input: Option<&InputDefinition>) -> i32 {
    input
        .and_then(|input| input.list.first())
        .and_then(|item| item.value.as_deref())
        .and_then(|value| value.trim().parse::<i32>().ok())
        .unwrap_or(0)
}

fn is_interval_type(effective: &str) -> bool {
    effective.starts_with("DV_INTERVAL") || effective.starts_with("INTERVAL")
}

/// `DV_INTERVAL<DV_QUANTITY>` → `DV_QUANTITY`; a bare interval defaults its
/// bounds to text.
fn interval_inner_type(effective: &str) -> String {
    effective
        .split_once('<')
        .and_then(|(_, rest)| rest.strip_suffix('>'))
        .map(|inner| {
            let inner = inner.trim().to_uppercase();
            if inner.starts_with("DV_") {
                inner
            } else {
                format!("DV_{inner}")
            }
        })
        .unwrap_or_else(|| "DV_TEXT".to_string())
}

fn synthesize_interval(
    effective: &str,
    node: &TemplateNode,
    langs: &[String],
    path_context: &str,
    depth: usize,
) -> ValueStructure {
    let inner = interval_inner_type(effective);
    let lower_input = node.input_for_suffix("lower").or_else(|| node.first_input());
    let upper_input = node.input_for_suffix("upper").or_else(|| node.first_input());

    let lower_node = bound_node(&inner, lower_input);
    let upper_node = bound_node(&inner, upper_input);

    ValueStructure::Interval {
        lower: Box::new(synthesize_at(
            &lower_node,
            langs,
            &format!("{path_context}/lower"),
            depth + 1,
        )),
        upper: Box::new(synthesize_at(
            &upper_node,
            langs,
            &format!("{path_context}/upper"),
            depth + 1,
        )),
        lower_included: lower_input
            .and_then(|input| input.lower_included)
            .unwrap_or(true),
        upper_included: upper_input
            .and_then(|input| input.upper_included)
            .unwrap_or(true),
    }
}

/// A synthetic node representing one interval bound, typed as the interval's
/// inner type and carrying only the matched input definition.
fn bound_node(inner: &str, input: Option<&InputDefinition>) -> TemplateNode {
    TemplateNode {
        rm_type: inner.to_string(),
        inputs: input.cloned().into_iter().collect(),
        ..TemplateNode::default()
    }
}

fn synthesize_choice(
    node: &TemplateNode,
    langs: &[String],
    path_context: &str,
    depth: usize,
) -> ValueStructure {
    let options = node
        .children
        .iter()
        .map(|child| {
            let path = option_path(child, path_context);
            let value = synthesize_at(child, langs, &path, depth + 1);
            ChoiceOption {
                rm_type: child.rm_type_upper(),
                display_name: naming::resolve_node_name(child, langs),
                archetype_node_id: child.node_id.clone().or_else(|| child.id.clone()),
                min: child.min,
                max: child.max,
                path,
                value: Box::new(value),
            }
        })
        .collect();

    ValueStructure::Choice { options }
}

/// An option's path: its own `aqlPath`, else the parent path extended with
/// the option's id, else the parent path itself.
fn option_path(child: &TemplateNode, parent_path: &str) -> String {
    if let Some(aql) = child.aql_path.as_deref().filter(|p| !p.is_empty()) {
        return aql.to_string();
    }
    if let Some(id) = child.id.as_deref().filter(|id| !id.trim().is_empty()) {
        if parent_path.is_empty() {
            return id.to_string();
        }
        return format!("{parent_path}/{id}");
    }
    parent_path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: serde_json::Value) -> TemplateNode {
        serde_json::from_value(json).expect("node should deserialise")
    }

    fn en() -> Vec<String> {
        vec!["en".to_string()]
    }

    #[test]
    fn maps_text_variants() {
        for declared in ["TEXT", "STRING"] {
            let n = node(serde_json::json!({"rmType": "ELEMENT", "inputs": [{"type": declared}]}));
            assert_eq!(
                synthesize(&n, &en(), "p"),
                ValueStructure::Text {
                    value: String::new()
                }
            );
        }
        let n = node(serde_json::json!({"rmType": "DV_TEXT"}));
        assert_eq!(synthesize(&n, &en(), "p").type_tag(), "DV_TEXT");
    }

    #[test]
    fn maps_coded_text_with_options_in_source_order() {
        let n = node(serde_json::json!({
            "rmType": "DV_CODED_TEXT",
            "inputs": [{
                "type": "CODED_TEXT",
                "terminology": "local",
                "list": [
                    {"value": "at0003", "label": "Yes"},
                    {"value": "at0004", "label": "No"},
                    {"value": "at0005", "localizedLabels": {"en": "Unknown"}}
                ]
            }]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::CodedText {
                terminology,
                options,
                ..
            } => {
                assert_eq!(terminology, "local");
                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                assert_eq!(labels, ["Yes", "No", "Unknown"]);
                assert_eq!(options[0].code.as_deref(), Some("at0003"));
            }
            other => panic!("expected coded text, got {other:?}"),
        }
    }

    #[test]
    fn maps_boolean_count_and_dates_unset() {
        let cases = [
            ("BOOLEAN", "DV_BOOLEAN"),
            ("INTEGER", "DV_COUNT"),
            ("COUNT", "DV_COUNT"),
            ("DATETIME", "DV_DATE_TIME"),
            ("DATE", "DV_DATE"),
            ("TIME", "DV_TIME"),
        ];
        for (declared, expected_tag) in cases {
            let n = node(serde_json::json!({"rmType": "ELEMENT", "inputs": [{"type": declared}]}));
            assert_eq!(synthesize(&n, &en(), "p").type_tag(), expected_tag);
        }
    }

    #[test]
    fn quantity_takes_units_from_input_or_validation_range() {
        let n = node(serde_json::json!({
            "rmType": "DV_QUANTITY",
            "inputs": [{"type": "DECIMAL", "units": "mm[Hg]"}]
        }));
        assert_eq!(
            synthesize(&n, &en(), "p"),
            ValueStructure::Quantity {
                magnitude: None,
                units: "mm[Hg]".to_string()
            }
        );

        let n = node(serde_json::json!({
            "rmType": "DV_QUANTITY",
            "inputs": [{"type": "DECIMAL", "validation": {"range": {"min": 0.0, "units": "kg"}}}]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Quantity { units, .. } => assert_eq!(units, "kg"),
            other => panic!("expected quantity, got {other:?}"),
        }
    }

    #[test]
    fn maps_identifier_and_uri() {
        let n = node(serde_json::json!({"rmType": "DV_IDENTIFIER"}));
        assert_eq!(synthesize(&n, &en(), "p").type_tag(), "DV_IDENTIFIER");

        let n = node(serde_json::json!({"rmType": "DV_URI"}));
        assert_eq!(
            synthesize(&n, &en(), "p"),
            ValueStructure::Uri {
                value: String::new()
            }
        );

        // DV_EHR_URI is a URI subtype; it shares the URI structure.
        let n = node(serde_json::json!({"rmType": "DV_EHR_URI"}));
        assert_eq!(synthesize(&n, &en(), "p").type_tag(), "DV_URI");
    }

    #[test]
    fn duration_has_six_unset_components() {
        let n = node(serde_json::json!({"rmType": "DV_DURATION"}));
        assert_eq!(
            synthesize(&n, &en(), "p"),
            ValueStructure::Duration {
                months: None,
                weeks: None,
                days: None,
                hours: None,
                minutes: None,
                seconds: None,
            }
        );
    }

    #[test]
    fn proportion_kind_parses_first_list_entry() {
        let n = node(serde_json::json!({
            "rmType": "DV_PROPORTION",
            "inputs": [{"type": "PROPORTION", "list": [{"value": "2"}]}]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Proportion { kind, .. } => assert_eq!(kind, 2),
            other => panic!("expected proportion, got {other:?}"),
        }

        // Unparsable kind degrades to 0.
        let n = node(serde_json::json!({
            "rmType": "DV_PROPORTION",
            "inputs": [{"type": "PROPORTION", "list": [{"value": "percent"}]}]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Proportion { kind, .. } => assert_eq!(kind, 0),
            other => panic!("expected proportion, got {other:?}"),
        }
    }

    #[test]
    fn interval_synthesizes_suffixed_bounds_recursively() {
        let n = node(serde_json::json!({
            "rmType": "DV_INTERVAL<DV_QUANTITY>",
            "inputs": [
                {"suffix": "lower", "type": "DECIMAL", "units": "cm"},
                {"suffix": "upper", "type": "DECIMAL", "units": "cm", "upperIncluded": false}
            ]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Interval {
                lower,
                upper,
                lower_included,
                upper_included,
            } => {
                assert_eq!(lower.type_tag(), "DV_QUANTITY");
                assert_eq!(upper.type_tag(), "DV_QUANTITY");
                assert!(lower_included);
                assert!(!upper_included);
                match *lower {
                    ValueStructure::Quantity { ref units, .. } => assert_eq!(units, "cm"),
                    ref other => panic!("expected quantity bound, got {other:?}"),
                }
            }
            other => panic!("expected interval, got {other:?}"),
        }
    }

    #[test]
    fn interval_without_suffixes_reuses_sole_input() {
        let n = node(serde_json::json!({
            "rmType": "DV_INTERVAL<DV_COUNT>",
            "inputs": [{"type": "INTEGER"}]
        }));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Interval { lower, upper, .. } => {
                assert_eq!(lower.type_tag(), "DV_COUNT");
                assert_eq!(upper.type_tag(), "DV_COUNT");
            }
            other => panic!("expected interval, got {other:?}"),
        }
    }

    #[test]
    fn polymorphic_element_becomes_choice_in_source_order() {
        let n = node(serde_json::json!({
            "rmType": "ELEMENT",
            "id": "answer",
            "children": [
                {"rmType": "DV_CODED_TEXT", "id": "coded_text_value", "inputs": [{"type": "CODED_TEXT", "list": []}]},
                {"rmType": "DV_TEXT", "id": "text_value"}
            ]
        }));
        match synthesize(&n, &en(), "root/answer") {
            ValueStructure::Choice { options } => {
                assert_eq!(options.len(), 2);
                assert_eq!(options[0].rm_type, "DV_CODED_TEXT");
                assert_eq!(options[1].rm_type, "DV_TEXT");
                assert_eq!(options[0].path, "root/answer/coded_text_value");
                assert_eq!(options[1].value.type_tag(), "DV_TEXT");
            }
            other => panic!("expected choice, got {other:?}"),
        }
    }

    #[test]
    fn element_without_children_or_dv_input_is_empty_text() {
        let n = node(serde_json::json!({"rmType": "ELEMENT", "id": "bare"}));
        assert_eq!(
            synthesize(&n, &en(), "p"),
            ValueStructure::Text {
                value: String::new()
            }
        );
    }

    #[test]
    fn unmatched_type_degrades_to_diagnostic_text() {
        let n = node(serde_json::json!({"rmType": "DV_MULTIMEDIA"}));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Text { value } => {
                assert!(value.contains("DV_MULTIMEDIA"), "value was {value}");
            }
            other => panic!("expected diagnostic text, got {other:?}"),
        }

        // A declared but unknown input type on a childless ELEMENT is also
        // diagnosed rather than silently treated as plain text.
        let n = node(serde_json::json!({"rmType": "ELEMENT", "inputs": [{"type": "MULTIMEDIA"}]}));
        match synthesize(&n, &en(), "p") {
            ValueStructure::Text { value } => {
                assert!(value.contains("MULTIMEDIA"), "value was {value}");
            }
            other => panic!("expected diagnostic text, got {other:?}"),
        }
    }
}
