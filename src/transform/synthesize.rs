//! Reference relations inferred from invariant decorators.
//!
//! Model references are plain `Reference` attributes in the package, so the
//! type alone does not say what they point at. The invariants do:
//! `is_model_reference_to(self.derived_from, Key_types.Asset_administration_shell)`
//! pins `derived_from` to the shell class.

use crate::model::{Domain, RelType, UmlRelation};
use crate::parser::{AnnotationSource, last_segment};
use crate::transform::TransformError;
use crate::transform::naming::REF_RELATION_SUFFIX;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

const PATH: &str = r"[A-Za-z_][\w.]*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Target of `is_model_reference_to_referable`.
    pub referable_class: String,
    /// Enum whose enumerants name the targets of `is_model_reference_to`.
    pub key_types_enum: String,
    pub invariant_decorator: String,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            referable_class: "Referable".to_string(),
            key_types_enum: "Key_types".to_string(),
            invariant_decorator: "invariant".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Referable,
    Keyed,
}

struct CallPatterns {
    kind: CallKind,
    call: Regex,
    /// The call as the element of `( <call> for <var> in <collection> )`.
    comprehension: Regex,
}

impl CallPatterns {
    fn new(kind: CallKind, call: &str) -> Self {
        let comprehension = format!(
            r"\(\s*{}\s+for\s+(?P<var>[A-Za-z_]\w*)\s+in\s+(?P<collection>{})\s*\)",
            call, PATH
        );
        Self {
            kind,
            call: Regex::new(call).expect("valid regex"),
            comprehension: Regex::new(&comprehension).expect("valid regex"),
        }
    }
}

static CALLS: LazyLock<[CallPatterns; 2]> = LazyLock::new(|| {
    [
        CallPatterns::new(
            CallKind::Referable,
            &format!(r"\bis_model_reference_to_referable\(\s*(?P<path>{})\s*\)", PATH),
        ),
        CallPatterns::new(
            CallKind::Keyed,
            &format!(
                r"\bis_model_reference_to\(\s*(?P<path>{p})\s*,\s*(?P<key>{p})\s*\)",
                p = PATH
            ),
        ),
    ]
});

/// Any model-reference call, whatever its arguments look like.
static ANY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bis_model_reference_to(?:_referable)?\(").expect("valid regex")
});

/// Append a `-->` relation labeled `<attr>:ref` for every model reference
/// constrained by an invariant. Returns the number of relations added.
pub fn add_reference_relations(
    domain: &mut Domain,
    annotations: &dyn AnnotationSource,
    settings: &ReferenceSettings,
) -> Result<usize, TransformError> {
    let owners: Vec<(String, String)> = domain
        .classes()
        .filter(|c| annotations.has_decorator(c.origin_key(), &settings.invariant_decorator))
        .map(|c| (c.fqn.clone(), c.origin_key().to_string()))
        .collect();

    let mut added = 0;
    for (owner, origin) in owners {
        for invariant in annotations.decorators_named(&origin, &settings.invariant_decorator) {
            let recognized: usize = CALLS
                .iter()
                .map(|patterns| patterns.call.find_iter(invariant).count())
                .sum();
            if ANY_CALL.find_iter(invariant).count() > recognized {
                return Err(unsupported(&owner, invariant));
            }

            for patterns in CALLS.iter() {
                for caps in patterns.call.captures_iter(invariant) {
                    let attribute = referenced_attribute(&owner, invariant, patterns, &caps)?;
                    let target = match patterns.kind {
                        CallKind::Referable => referable_target(domain, &owner, settings)?,
                        CallKind::Keyed => {
                            keyed_target(domain, &owner, invariant, &caps["key"], settings)?
                        }
                    };

                    let relation = UmlRelation::new(owner.clone(), target, RelType::Reference)
                        .with_label(format!("{}{}", attribute, REF_RELATION_SUFFIX));
                    if !domain.relations.contains(&relation) {
                        domain.relations.push(relation);
                        added += 1;
                    }
                }
            }
        }
    }

    debug!(added, "synthesized reference relations");
    Ok(added)
}

/// Attribute constrained by one call: the `self.` path itself, or the
/// collection a comprehension variable iterates over.
fn referenced_attribute(
    owner: &str,
    invariant: &str,
    patterns: &CallPatterns,
    caps: &Captures,
) -> Result<String, TransformError> {
    let path = &caps["path"];
    if let Some(attribute) = path.strip_prefix("self.") {
        return Ok(attribute.to_string());
    }

    let call = caps.get(0).map_or(0..0, |m| m.range());
    patterns
        .comprehension
        .captures_iter(invariant)
        .filter(|c| {
            c.get(0)
                .is_some_and(|m| m.start() <= call.start && call.end <= m.end())
        })
        .find(|c| &c["var"] == path)
        .and_then(|c| {
            c["collection"]
                .strip_prefix("self.")
                .map(str::to_string)
        })
        .ok_or_else(|| unsupported(owner, invariant))
}

fn unsupported(owner: &str, invariant: &str) -> TransformError {
    TransformError::UnsupportedInvariant {
        class: owner.to_string(),
        text: invariant.to_string(),
    }
}

fn referable_target(
    domain: &Domain,
    owner: &str,
    settings: &ReferenceSettings,
) -> Result<String, TransformError> {
    find_by_name(domain, &settings.referable_class, owner).ok_or_else(|| {
        TransformError::UnknownItem {
            fqn: settings.referable_class.clone(),
            context: format!("invariant of {}", owner),
        }
    })
}

/// `Key_types.Submodel` names the class `Submodel` declared next to the
/// key-types enum. A key of any other enum is unsupported.
fn keyed_target(
    domain: &Domain,
    owner: &str,
    invariant: &str,
    key: &str,
    settings: &ReferenceSettings,
) -> Result<String, TransformError> {
    let enumerant = match key.rsplit_once('.') {
        Some((enum_path, enumerant)) if last_segment(enum_path) == settings.key_types_enum => {
            enumerant
        }
        _ => return Err(unsupported(owner, invariant)),
    };

    let key_types = find_by_name(domain, &settings.key_types_enum, owner).ok_or_else(|| {
        TransformError::UnknownItem {
            fqn: settings.key_types_enum.clone(),
            context: format!("invariant of {}", owner),
        }
    })?;

    let target = format!("{}.{}", parent_module(&key_types), enumerant);
    if domain.contains(&target) {
        Ok(target)
    } else {
        Err(TransformError::UnknownItem {
            fqn: target,
            context: format!("invariant of {}", owner),
        })
    }
}

/// First item called `name`, preferring one declared in the module of `near`.
fn find_by_name(domain: &Domain, name: &str, near: &str) -> Option<String> {
    let module = parent_module(near);
    let candidates: Vec<&str> = domain
        .items
        .values()
        .filter(|item| item.name() == name)
        .map(|item| item.fqn())
        .collect();

    candidates
        .iter()
        .find(|fqn| parent_module(fqn) == module)
        .or_else(|| candidates.first())
        .map(|fqn| fqn.to_string())
}

fn parent_module(fqn: &str) -> &str {
    fqn.rsplit_once('.').map_or("", |(module, _)| module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, UmlClass, UmlEnum, UmlItem};
    use crate::parser::AnnotationIndex;

    fn domain() -> Domain {
        let mut domain = Domain::new();
        domain.insert(UmlItem::Enum(UmlEnum::new(
            "Key_types",
            "pkg.Key_types",
            vec![Member::new("Submodel", "Submodel")],
        )));
        for name in ["Referable", "Submodel", "Asset_administration_shell", "Reference_element"] {
            domain.insert(UmlItem::Class(UmlClass::new(name, format!("pkg.{}", name))));
        }
        domain
    }

    fn annotate(owner: &str, invariant: &str) -> AnnotationIndex {
        let mut index = AnnotationIndex::new();
        index.insert(owner, vec!["abstract".to_string(), invariant.to_string()]);
        index
    }

    fn references(domain: &Domain) -> Vec<(String, String, String)> {
        domain
            .relations
            .iter()
            .filter(|r| r.rel_type == RelType::Reference)
            .map(|r| (r.source_fqn.clone(), r.target_fqn.clone(), r.label.clone()))
            .collect()
    }

    #[test]
    fn test_keyed_reference_on_self_attribute() {
        let mut d = domain();
        let index = annotate(
            "pkg.Asset_administration_shell",
            "invariant(\n    lambda self:\n    not (self.derived_from is not None)\n    or is_model_reference_to(self.derived_from, Key_types.Asset_administration_shell),\n    \"Derived-from must be a model reference to an asset administration shell.\"\n)",
        );

        let added =
            add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();

        assert_eq!(added, 1);
        assert_eq!(
            references(&d),
            vec![(
                "pkg.Asset_administration_shell".to_string(),
                "pkg.Asset_administration_shell".to_string(),
                "derived_from:ref".to_string()
            )]
        );
    }

    #[test]
    fn test_reference_inside_comprehension() {
        let mut d = domain();
        let index = annotate(
            "pkg.Asset_administration_shell",
            "invariant(\n    lambda self:\n    not (self.submodels is not None)\n    or (\n        all(\n            is_model_reference_to(reference, Key_types.Submodel)\n            for reference in self.submodels\n        )\n    ),\n    \"All submodels must be model references to a submodel.\"\n)",
        );

        add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();

        assert_eq!(
            references(&d),
            vec![(
                "pkg.Asset_administration_shell".to_string(),
                "pkg.Submodel".to_string(),
                "submodels:ref".to_string()
            )]
        );
    }

    #[test]
    fn test_referable_reference() {
        let mut d = domain();
        let index = annotate(
            "pkg.Reference_element",
            "invariant(\n    lambda self:\n    not (self.value is not None)\n    or is_model_reference_to_referable(self.value),\n    \"Value must be a model reference to a referable.\"\n)",
        );

        add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();

        assert_eq!(
            references(&d),
            vec![(
                "pkg.Reference_element".to_string(),
                "pkg.Referable".to_string(),
                "value:ref".to_string()
            )]
        );
    }

    #[test]
    fn test_repeated_invariants_add_one_relation() {
        let mut d = domain();
        let invariant = "invariant(lambda self: is_model_reference_to_referable(self.value))";
        let mut index = AnnotationIndex::new();
        index.insert(
            "pkg.Reference_element",
            vec![invariant.to_string(), invariant.to_string()],
        );

        let added =
            add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();
        assert_eq!(added, 1);
    }

    #[test]
    fn test_bare_variable_is_unsupported() {
        let mut d = domain();
        let index = annotate(
            "pkg.Reference_element",
            "invariant(lambda self: is_model_reference_to_referable(value))",
        );

        let result = add_reference_relations(&mut d, &index, &ReferenceSettings::default());
        assert!(matches!(
            result,
            Err(TransformError::UnsupportedInvariant { ref class, .. }) if class == "pkg.Reference_element"
        ));
    }

    #[test]
    fn test_unrecognized_call_shape_is_unsupported() {
        for invariant in [
            "invariant(lambda self: is_model_reference_to(self.refs[0], Key_types.Submodel))",
            "invariant(lambda self: is_model_reference_to_referable(self.value or other))",
        ] {
            let mut d = domain();
            let index = annotate("pkg.Reference_element", invariant);

            let result = add_reference_relations(&mut d, &index, &ReferenceSettings::default());
            assert!(
                matches!(result, Err(TransformError::UnsupportedInvariant { .. })),
                "{invariant}"
            );
            assert!(references(&d).is_empty());
        }
    }

    #[test]
    fn test_key_of_other_enum_is_unsupported() {
        let mut d = domain();
        let index = annotate(
            "pkg.Reference_element",
            "invariant(lambda self: is_model_reference_to(self.x, Other_enum.Submodel))",
        );

        let result = add_reference_relations(&mut d, &index, &ReferenceSettings::default());
        assert!(matches!(
            result,
            Err(TransformError::UnsupportedInvariant { ref class, .. }) if class == "pkg.Reference_element"
        ));
        assert!(references(&d).is_empty());
    }

    #[test]
    fn test_qualified_key_types_enum_accepted() {
        let mut d = domain();
        let index = annotate(
            "pkg.Reference_element",
            "invariant(lambda self: is_model_reference_to(self.x, pkg.Key_types.Submodel))",
        );

        add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();
        assert_eq!(
            references(&d),
            vec![(
                "pkg.Reference_element".to_string(),
                "pkg.Submodel".to_string(),
                "x:ref".to_string()
            )]
        );
    }

    #[test]
    fn test_unknown_enumerant_is_fatal() {
        let mut d = domain();
        let index = annotate(
            "pkg.Submodel",
            "invariant(lambda self: is_model_reference_to(self.semantic_id, Key_types.Concept_description))",
        );

        let result = add_reference_relations(&mut d, &index, &ReferenceSettings::default());
        assert!(matches!(
            result,
            Err(TransformError::UnknownItem { ref fqn, .. }) if fqn == "pkg.Concept_description"
        ));
    }

    #[test]
    fn test_classes_without_invariants_untouched() {
        let mut d = domain();
        let mut index = AnnotationIndex::new();
        index.insert("pkg.Submodel", vec!["abstract".to_string()]);

        let added =
            add_reference_relations(&mut d, &index, &ReferenceSettings::default()).unwrap();
        assert_eq!(added, 0);
        assert!(d.relations.is_empty());
    }
}
