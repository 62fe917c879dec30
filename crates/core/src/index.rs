//! Flat question index.
//!
//! The export and listing surfaces want a flat, stable enumeration of every
//! answerable question, with polymorphic choices expanded one row per
//! option. Every expanded option keeps its parent element's comment path,
//! so comments land on the element regardless of which alternative the
//! reviewer picked.

use serde::Serialize;
use utoipa::ToSchema;

use crate::classify::QuestionNode;
use crate::compile::Composition;
use crate::values::{ChoiceOption, ValueStructure};

/// One row of the flat question index.
#[derive(Clone, Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlatQuestion {
    /// Unique key for this row.
    pub path: String,
    pub display_name: String,
    pub archetype_node_id: Option<String>,
    /// The path comments attach to; shared by all options of one element.
    pub comment_path: String,
}

/// Flatten the compiled tree into rows, depth-first in tree order.
pub fn flatten(composition: &Composition) -> Vec<FlatQuestion> {
    let mut rows = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for node in &composition.content {
        flatten_node(node, &mut rows, &mut seen);
    }
    rows
}

fn flatten_node(
    node: &QuestionNode,
    rows: &mut Vec<FlatQuestion>,
    seen: &mut std::collections::HashSet<String>,
) {
    match node {
        QuestionNode::Container(container) => {
            for child in &container.children {
                flatten_node(child, rows, seen);
            }
        }
        QuestionNode::Leaf(leaf) => match &leaf.value {
            ValueStructure::Choice { options } if !options.is_empty() => {
                for (index, option) in options.iter().enumerate() {
                    rows.push(FlatQuestion {
                        path: option_key(option, &leaf.path, index, seen),
                        display_name: option_display_name(leaf.display_name.as_str(), option, index),
                        archetype_node_id: leaf.archetype_node_id.clone(),
                        comment_path: leaf.path.clone(),
                    });
                }
            }
            _ => {
                rows.push(FlatQuestion {
                    path: unique_key(leaf.path.clone(), seen),
                    display_name: leaf.display_name.clone(),
                    archetype_node_id: leaf.archetype_node_id.clone(),
                    comment_path: leaf.path.clone(),
                });
            }
        },
    }
}

/// The first option keeps the element's own name; later options are
/// disambiguated with the option's node id, or its value type when the id
/// is absent or just the generic "value".
fn option_display_name(element_name: &str, option: &ChoiceOption, index: usize) -> String {
    if index == 0 {
        return element_name.to_string();
    }
    match option
        .archetype_node_id
        .as_deref()
        .filter(|id| !id.trim().is_empty() && id.to_lowercase() != "value")
    {
        Some(id) => format!("{element_name} ({id})"),
        None => format!("{element_name} (as {})", option.value.type_tag()),
    }
}

fn option_key(
    option: &ChoiceOption,
    parent_path: &str,
    index: usize,
    seen: &mut std::collections::HashSet<String>,
) -> String {
    let candidate = if option.path == parent_path {
        format!("{parent_path}#option-{index}")
    } else {
        option.path.clone()
    };
    unique_key(candidate, seen)
}

/// Row keys are unique; a colliding key is suffixed with its row's position
/// among the collisions.
fn unique_key(candidate: String, seen: &mut std::collections::HashSet<String>) -> String {
    if seen.insert(candidate.clone()) {
        return candidate;
    }
    let mut index = 1usize;
    loop {
        let suffixed = format!("{candidate}#option-{index}");
        if seen.insert(suffixed.clone()) {
            return suffixed;
        }
        index += 1;
    }
}
