//! Node classification: turning one template node into zero, one, or many
//! question nodes.
//!
//! Each node is handled in exactly one of four ways. Contextual metadata
//! fields are pruned. Data-carrying nodes become leaf questions. Structural
//! nodes with an identity become numbered containers. Everything else passes
//! its children through transparently to the nearest real ancestor.

use serde::Serialize;
use webtemplate::TemplateNode;

use crate::constants::{is_container_type, is_context_skip_id, MAX_TREE_DEPTH};
use crate::error::{ReviewError, ReviewResult};
use crate::naming;
use crate::values::{self, ValueStructure};

/// A terminal question: one answerable element of the form.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeafQuestion {
    pub rm_type: String,
    pub display_name: String,
    pub archetype_node_id: Option<String>,
    pub path: String,
    pub level: u32,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub value: ValueStructure,
}

/// A structural grouping: a numbered section of the form.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerQuestion {
    pub rm_type: String,
    pub display_name: String,
    pub archetype_node_id: Option<String>,
    pub path: String,
    pub level: u32,
    pub min: Option<i64>,
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    pub children: Vec<QuestionNode>,
}

/// One node of the compiled question tree.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind")]
pub enum QuestionNode {
    #[serde(rename = "LEAF")]
    Leaf(LeafQuestion),
    #[serde(rename = "CONTAINER")]
    Container(ContainerQuestion),
}

impl QuestionNode {
    pub fn path(&self) -> &str {
        match self {
            QuestionNode::Leaf(leaf) => &leaf.path,
            QuestionNode::Container(container) => &container.path,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            QuestionNode::Leaf(leaf) => &leaf.display_name,
            QuestionNode::Container(container) => &container.display_name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, QuestionNode::Leaf(_))
    }

    pub fn children(&self) -> &[QuestionNode] {
        match self {
            QuestionNode::Leaf(_) => &[],
            QuestionNode::Container(container) => &container.children,
        }
    }
}

/// The outcome of classifying one template node.
pub enum Classified {
    /// The node and its subtree contribute nothing to the form.
    Pruned,
    /// The node became exactly one question node.
    One(QuestionNode),
    /// The node was transparent; these are its surviving children, to be
    /// spliced into the parent in order.
    Many(Vec<QuestionNode>),
}

/// Classify a template node into question nodes.
///
/// `number` is the node's hierarchical section number ("" when the parent is
/// unnumbered). `level` is the container nesting depth; leaves sit at their
/// parent's level + 1. `depth` tracks raw template recursion for the nesting
/// bound.
pub fn classify(
    node: &TemplateNode,
    langs: &[String],
    parent_aql_path: &str,
    parent_id_path: &str,
    number: &str,
    level: u32,
    depth: usize,
) -> ReviewResult<Classified> {
    if depth > MAX_TREE_DEPTH {
        return Err(ReviewError::DepthExceeded);
    }

    if is_pruned_context_node(node, parent_aql_path) {
        return Ok(Classified::Pruned);
    }

    let id_path = extend_id_path(parent_id_path, node.id.as_deref());
    let path = node_path(node, &id_path);
    let rm_type = node.rm_type_upper();

    if is_leaf_node(node, &rm_type) {
        let Some(path) = path else {
            tracing::warn!(
                id = ?node.id,
                rm_type = %rm_type,
                "dropping answerable node without a resolvable path"
            );
            return Ok(Classified::Pruned);
        };
        let value = values::synthesize(node, langs, &path);
        return Ok(Classified::One(QuestionNode::Leaf(LeafQuestion {
            display_name: naming::resolve_node_name(node, langs),
            archetype_node_id: display_id(node),
            path,
            level,
            min: node.min,
            max: node.max,
            value,
            rm_type: node.rm_type.clone(),
        })));
    }

    let child_parent_aql = node.aql_path.as_deref().unwrap_or(parent_aql_path);

    if is_container_type(&rm_type) {
        let children = classify_children(node, langs, child_parent_aql, &id_path, number, level, depth)?;
        let Some(path) = path else {
            // A container with no identity cannot anchor comments; its
            // surviving children are hoisted to the parent.
            return Ok(if children.is_empty() {
                Classified::Pruned
            } else {
                Classified::Many(children)
            });
        };
        return Ok(Classified::One(QuestionNode::Container(ContainerQuestion {
            display_name: naming::resolve_node_name(node, langs),
            archetype_node_id: display_id(node),
            path,
            level,
            min: node.min,
            max: node.max,
            section_number: if number.is_empty() {
                None
            } else {
                Some(number.to_string())
            },
            children,
            rm_type: node.rm_type.clone(),
        })));
    }

    // Pass-through: the node is transparent, its children keep this node's
    // numbering context and level.
    let mut spliced = Vec::new();
    for child in &node.children {
        match classify(child, langs, child_parent_aql, &id_path, number, level, depth + 1)? {
            Classified::Pruned => {}
            Classified::One(question) => spliced.push(question),
            Classified::Many(mut questions) => spliced.append(&mut questions),
        }
    }
    Ok(if spliced.is_empty() {
        Classified::Pruned
    } else {
        Classified::Many(spliced)
    })
}

/// Classify a container's children, numbering the structural ones.
///
/// Ordinals count only children that are themselves containers, starting at
/// 1. A child of an unnumbered container gets the bare ordinal; otherwise
/// the parent number is extended with a dot.
fn classify_children(
    node: &TemplateNode,
    langs: &[String],
    parent_aql: &str,
    parent_id_path: &str,
    number: &str,
    level: u32,
    depth: usize,
) -> ReviewResult<Vec<QuestionNode>> {
    let mut children = Vec::new();
    let mut ordinal = 0u32;
    for child in &node.children {
        let child_number = if is_container_type(&child.rm_type_upper()) {
            ordinal += 1;
            compose_number(number, ordinal)
        } else {
            String::new()
        };
        match classify(
            child,
            langs,
            parent_aql,
            parent_id_path,
            &child_number,
            level + 1,
            depth + 1,
        )? {
            Classified::Pruned => {}
            Classified::One(question) => children.push(question),
            Classified::Many(mut questions) => children.append(&mut questions),
        }
    }
    Ok(children)
}

pub(crate) fn compose_number(parent: &str, ordinal: u32) -> String {
    if parent.is_empty() {
        ordinal.to_string()
    } else {
        format!("{parent}.{ordinal}")
    }
}

/// Contextual metadata is pruned only when it sits directly under its parent
/// in the archetype path and matches the well-known skip ids.
fn is_pruned_context_node(node: &TemplateNode, parent_aql_path: &str) -> bool {
    if node.in_context != Some(true) {
        return false;
    }
    let Some(id) = node.id.as_deref() else {
        return false;
    };
    if !is_context_skip_id(id) {
        return false;
    }
    let Some(aql) = node.aql_path.as_deref() else {
        return false;
    };
    let relative = aql
        .strip_prefix(parent_aql_path)
        .unwrap_or(aql)
        .trim_start_matches('/');
    !relative.is_empty() && !relative.contains('/')
}

/// A node is answerable when its type is a concrete data value, or when it
/// is an ELEMENT whose direct children are all value alternatives rather
/// than structure.
fn is_leaf_node(node: &TemplateNode, rm_type_upper: &str) -> bool {
    // A bare DV_INTERVAL (no inner type parameter) is structural, not
    // answerable; parameterised intervals are leaves.
    if rm_type_upper.starts_with("DV_") && rm_type_upper != "DV_INTERVAL" {
        return true;
    }
    rm_type_upper == "ELEMENT"
        && !node
            .children
            .iter()
            .any(|child| is_container_type(&child.rm_type_upper()))
}

fn extend_id_path(parent: &str, id: Option<&str>) -> String {
    match id.filter(|id| !id.trim().is_empty()) {
        Some(id) if parent.is_empty() => id.to_string(),
        Some(id) => format!("{parent}/{id}"),
        None => parent.to_string(),
    }
}

/// A node's comment path: its `aqlPath` when present, else the accumulated
/// id chain. `None` when neither exists.
fn node_path(node: &TemplateNode, id_path: &str) -> Option<String> {
    if let Some(aql) = node.aql_path.as_deref().filter(|p| !p.is_empty()) {
        return Some(aql.to_string());
    }
    if id_path.is_empty() {
        None
    } else {
        Some(id_path.to_string())
    }
}

fn display_id(node: &TemplateNode) -> Option<String> {
    node.node_id.clone().or_else(|| node.id.clone())
}
