//! Identifier rewriting: snake_case to camelCase and plural attribute names
//! to their singular display form.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Suffix of reference-relation labels, e.g. `submodel:ref`.
pub const REF_RELATION_SUFFIX: &str = ":ref";

static LOWER_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])_([a-z])").expect("valid regex"));
static LOWER_UPPER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])_([A-Z])([A-Z]+)").expect("valid regex"));
static UPPER_RUN_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)_([a-z])").expect("valid regex"));

/// Words ending in `s` that are already singular.
const SINGULAR_WORDS: &[&str] = &[
    "semantics", "series", "species", "news", "alias", "bias", "has", "was", "yes", "its",
];

/// Rewrite snake_case segments of `text` to camelCase.
///
/// Pass order matters: `x_y` boundaries first, then `x_ABC` (only the first
/// letter of the run stays upper), then `ABC_x` (the run is lowercased).
pub fn snake_to_camel(text: &str) -> String {
    let pass1 = LOWER_LOWER.replace_all(text, |c: &Captures| {
        format!("{}{}", &c[1], c[2].to_uppercase())
    });
    let pass2 = LOWER_UPPER_RUN.replace_all(&pass1, |c: &Captures| {
        format!("{}{}{}", &c[1], &c[2], c[3].to_lowercase())
    });
    let pass3 = UPPER_RUN_LOWER.replace_all(&pass2, |c: &Captures| {
        format!("{}{}", c[1].to_lowercase(), c[2].to_uppercase())
    });
    pass3.into_owned()
}

/// `IdShort` -> `idShort`; attribute names must start lowercase.
pub fn lower_leading_id(name: &str) -> String {
    match name.strip_prefix("Id") {
        Some(rest) => format!("id{}", rest),
        None => name.to_string(),
    }
}

/// Last camelCase word of `name`.
fn last_word(name: &str) -> &str {
    match name.rfind(|c: char| c.is_ascii_uppercase()) {
        Some(idx) => &name[idx..],
        None => name,
    }
}

/// Singular display form of a plural attribute name.
pub fn singularize(name: &str) -> String {
    let word = last_word(name).to_ascii_lowercase();
    if !word.ends_with('s')
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
        || SINGULAR_WORDS.contains(&word.as_str())
    {
        return name.to_string();
    }

    let singular = if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &name[..name.len() - 3])
    } else if ["sses", "shes", "ches", "xes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        name[..name.len() - 2].to_string()
    } else {
        name[..name.len() - 1].to_string()
    };

    if singular.len() < 2 {
        name.to_string()
    } else {
        singular
    }
}

/// Singularize the attribute part of a `<attr>:ref` label.
pub fn singularize_label(label: &str) -> String {
    match label.strip_suffix(REF_RELATION_SUFFIX) {
        Some(attribute) => format!("{}{}", singularize(attribute), REF_RELATION_SUFFIX),
        None => label.to_string(),
    }
}

/// Whether a type expression holds many values.
pub fn is_collection_type(type_expr: &str) -> bool {
    type_expr.contains("List[") || type_expr.ends_with("..*]")
}
