use crate::model::{Domain, UmlAttribute, UmlClass, UmlEnum, UmlItem, UmlRelation, RelType};
use crate::parser::common::last_segment;
use crate::parser::python::{ParsedClass, ParsedModule};
use crate::parser::{AnnotationIndex, Collected};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*").expect("valid regex")
});

/// Resolves names used in one module against every class declared in the
/// package.
struct NameResolver<'a> {
    declared: &'a HashSet<String>,
}

impl<'a> NameResolver<'a> {
    fn resolve(&self, module: &ParsedModule, name: &str) -> Option<String> {
        if name.contains('.') && self.declared.contains(name) {
            return Some(name.to_string());
        }

        let local = format!("{}.{}", module.fqn, name);
        if self.declared.contains(&local) {
            return Some(local);
        }

        // `alias.Rest` where `alias` was imported
        let (head, tail) = match name.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (name, None),
        };
        if let Some(target) = module.imports.get(head) {
            let candidate = match tail {
                Some(tail) => format!("{}.{}", target, tail),
                None => target.clone(),
            };
            if self.declared.contains(&candidate) {
                return Some(candidate);
            }
        }

        module
            .wildcard_imports
            .iter()
            .map(|from| format!("{}.{}", from, name))
            .find(|candidate| self.declared.contains(candidate))
    }

    /// Replace every resolvable identifier in `type_text` by its fqn and
    /// return the referenced fqns in order of first appearance.
    fn qualify(&self, module: &ParsedModule, type_text: &str) -> (String, Vec<String>) {
        let mut referenced: Vec<String> = Vec::new();
        let qualified = IDENTIFIER.replace_all(type_text, |caps: &Captures| {
            let token = &caps[0];
            match self.resolve(module, token) {
                Some(fqn) => {
                    if !referenced.contains(&fqn) {
                        referenced.push(fqn.clone());
                    }
                    fqn
                }
                None => token.to_string(),
            }
        });
        (qualified.into_owned(), referenced)
    }
}

/// Turn parsed modules into the raw domain: items in declaration order,
/// inheritance relations for resolved bases and composition relations for
/// domain types used by attributes.
pub(crate) fn build_domain(modules: &[ParsedModule]) -> Collected {
    let declared: HashSet<String> = modules
        .iter()
        .flat_map(|m| m.classes.iter().map(move |c| format!("{}.{}", m.fqn, c.name)))
        .collect();
    let resolver = NameResolver {
        declared: &declared,
    };

    let mut domain = Domain::new();
    let mut annotations = AnnotationIndex::new();

    for module in modules {
        for class in &module.classes {
            let fqn = format!("{}.{}", module.fqn, class.name);
            annotations.insert(fqn.clone(), class.decorators.clone());

            for base in &class.bases {
                if let Some(parent) = resolver.resolve(module, base) {
                    domain
                        .relations
                        .push(UmlRelation::inheritance(parent, fqn.clone()));
                }
            }

            if class.is_enum {
                let mut item = UmlEnum::new(class.name.clone(), fqn.clone(), class.members.clone());
                item.generics = class.type_params.join(", ");
                domain.insert(UmlItem::Enum(item));
                continue;
            }

            let mut item = UmlClass::new(class.name.clone(), fqn.clone());
            item.is_abstract = is_abc(class);
            item.generics = class.type_params.join(", ");

            for attribute in &class.attributes {
                let (type_expr, referenced) = resolver.qualify(module, &attribute.type_text);
                for target in referenced {
                    domain
                        .relations
                        .push(UmlRelation::new(fqn.clone(), target, RelType::Composition));
                }
                item.attributes.push(UmlAttribute::new(
                    attribute.name.clone(),
                    type_expr,
                    attribute.is_static,
                ));
            }

            domain.insert(UmlItem::Class(item));
        }
    }

    Collected {
        domain,
        annotations,
    }
}

fn is_abc(class: &ParsedClass) -> bool {
    class.bases.iter().any(|b| last_segment(b) == "ABC")
        || class
            .metaclass
            .as_deref()
            .is_some_and(|m| last_segment(m) == "ABCMeta")
}
