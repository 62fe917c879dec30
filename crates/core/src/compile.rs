//! Whole-template compilation.
//!
//! `compile` turns a parsed web template into the question tree the review
//! form is rendered from. It is total: a template without a usable tree, or
//! one nested beyond the depth bound, yields a clearly named empty sentinel
//! composition instead of an error, so callers always have something to
//! serve.

use serde::Serialize;
use webtemplate::WebTemplate;

use crate::classify::{self, Classified, QuestionNode};
use crate::constants::{
    is_container_type, DEFAULT_LANGUAGE, DEPTH_EXCEEDED_COMPOSITION_NAME,
    MISSING_TREE_COMPOSITION_NAME,
};
use crate::naming;

/// The compiled question tree for one template.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub name: String,
    pub version: String,
    pub archetype_node_id: Option<String>,
    pub path: String,
    pub content: Vec<QuestionNode>,
}

/// Compile a web template into its question tree.
pub fn compile(template: &WebTemplate) -> Composition {
    let Some(tree) = template.tree.as_ref() else {
        tracing::warn!(
            template_id = ?template.template_id,
            "template carries no tree, serving sentinel composition"
        );
        return error_composition(MISSING_TREE_COMPOSITION_NAME);
    };

    let langs = preferred_languages(template);
    let root_aql = tree.aql_path.clone().unwrap_or_default();
    let root_id_path = tree.id.clone().unwrap_or_default();

    let mut content = Vec::new();
    let mut ordinal = 0u32;
    for child in &tree.children {
        let number = if is_container_type(&child.rm_type_upper()) {
            ordinal += 1;
            ordinal.to_string()
        } else {
            String::new()
        };
        match classify::classify(child, &langs, &root_aql, &root_id_path, &number, 0, 0) {
            Ok(Classified::Pruned) => {}
            Ok(Classified::One(question)) => content.push(question),
            Ok(Classified::Many(mut questions)) => content.append(&mut questions),
            Err(err) => {
                tracing::error!(
                    template_id = ?template.template_id,
                    error = %err,
                    "template rejected during classification, serving sentinel composition"
                );
                return error_composition(DEPTH_EXCEEDED_COMPOSITION_NAME);
            }
        }
    }

    Composition {
        name: naming::resolve_node_name(tree, &langs),
        version: template
            .version
            .clone()
            .or_else(|| template.sem_ver.clone())
            .unwrap_or_default(),
        archetype_node_id: tree.node_id.clone().or_else(|| tree.id.clone()),
        path: if root_id_path.is_empty() {
            root_aql
        } else {
            root_id_path
        },
        content,
    }
}

/// Name resolution order: the declared default language first, then the
/// template's remaining languages, with a plain-English fallback when the
/// template declares none.
fn preferred_languages(template: &WebTemplate) -> Vec<String> {
    let mut langs: Vec<String> = Vec::new();
    if let Some(default) = template
        .default_language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    {
        langs.push(default.to_string());
    }
    for lang in &template.languages {
        if !lang.trim().is_empty() && !langs.iter().any(|seen| seen == lang) {
            langs.push(lang.clone());
        }
    }
    if langs.is_empty() {
        langs.push(DEFAULT_LANGUAGE.to_string());
    }
    langs
}

/// An empty composition whose name states what went wrong.
pub fn error_composition(name: &str) -> Composition {
    Composition {
        name: name.to_string(),
        version: String::new(),
        archetype_node_id: None,
        path: String::new(),
        content: Vec::new(),
    }
}
