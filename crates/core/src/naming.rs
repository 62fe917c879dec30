//! Display-name resolution for template nodes and coded options.
//!
//! Every node gets exactly one human-readable label, chosen from the naming
//! sources a Web Template may carry, in priority order, against an ordered
//! language-preference list. Resolution is total: it never fails and never
//! returns a blank string.

use webtemplate::{ListItem, TemplateNode};
use wtr_types::NonEmptyText;

use crate::constants::UNNAMED_LABEL;

/// Resolve the display name for a template node.
///
/// Tries, in order: the single-language `localizedName`; `localizedNames`
/// for each preferred language; `name`; `label`; `id`; and finally the fixed
/// fallback label. The first non-blank source wins.
pub fn resolve_node_name(node: &TemplateNode, langs: &[String]) -> String {
    if let Some(name) = non_blank(node.localized_name.as_deref()) {
        return name;
    }
    for lang in langs {
        if let Some(name) = non_blank(node.localized_names.get(lang).map(String::as_str)) {
            return name;
        }
    }
    if let Some(name) = non_blank(node.name.as_deref()) {
        return name;
    }
    if let Some(name) = non_blank(node.label.as_deref()) {
        return name;
    }
    if let Some(name) = non_blank(node.id.as_deref()) {
        return name;
    }
    UNNAMED_LABEL.to_string()
}

/// Resolve the display label for a coded list option.
///
/// Tries `localizedLabels` for each preferred language, then `label`, then
/// the raw code `value`.
pub fn resolve_list_label(item: &ListItem, langs: &[String]) -> String {
    for lang in langs {
        if let Some(label) = non_blank(item.localized_labels.get(lang).map(String::as_str)) {
            return label;
        }
    }
    if let Some(label) = non_blank(item.label.as_deref()) {
        return label;
    }
    if let Some(label) = non_blank(item.value.as_deref()) {
        return label;
    }
    UNNAMED_LABEL.to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .map(String::from)
}
