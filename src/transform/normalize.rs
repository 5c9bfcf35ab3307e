//! Construction-time passes that bring a freshly collected domain into
//! display shape.

use crate::model::{Domain, RelType, UmlItem};
use crate::parser::AnnotationSource;
use crate::transform::naming::{
    is_collection_type, lower_leading_id, singularize, singularize_label, snake_to_camel,
};
use crate::transform::substitute::annotate_cardinality;
use indexmap::IndexMap;
use std::mem;
use tracing::warn;

/// Drop repeated relations, keeping the first occurrence.
pub fn dedupe_relations(domain: &mut Domain) {
    let mut unique = Vec::with_capacity(domain.relations.len());
    for relation in domain.relations.drain(..) {
        if !unique.contains(&relation) {
            unique.push(relation);
        }
    }
    domain.relations = unique;
}

/// Attribute types are drawn as dependencies rather than ownership.
pub fn demote_compositions(domain: &mut Domain) {
    for relation in &mut domain.relations {
        if relation.rel_type == RelType::Composition {
            relation.rel_type = RelType::Dependency;
        }
    }
}

/// Flag classes carrying the `decorator` annotation as abstract.
pub fn mark_abstract_classes(
    domain: &mut Domain,
    annotations: &dyn AnnotationSource,
    decorator: &str,
) -> usize {
    let mut marked = 0;
    for class in domain.classes_mut() {
        if annotations.has_decorator(class.origin_key(), decorator) {
            class.is_abstract = true;
            marked += 1;
        }
    }
    marked
}

/// Display enum members by their value.
pub fn enum_values_as_names(domain: &mut Domain) {
    for item in domain.items.values_mut() {
        if let UmlItem::Enum(item) = item {
            for member in &mut item.members {
                member.name = mem::take(&mut member.value);
            }
        }
    }
}

/// camelCase every identifier: item names and keys, attribute names and
/// types, enum members, relation endpoints and labels.
pub fn rename_to_camel_case(domain: &mut Domain) {
    let items = mem::take(&mut domain.items);
    let mut renamed = IndexMap::with_capacity(items.len());

    for (_, mut item) in items {
        let name = snake_to_camel(item.name());
        let fqn = snake_to_camel(item.fqn());
        item.set_names(name, fqn.clone());

        match &mut item {
            UmlItem::Class(class) => {
                for attribute in &mut class.attributes {
                    attribute.name = lower_leading_id(&snake_to_camel(&attribute.name));
                    attribute.type_expr = snake_to_camel(&attribute.type_expr);
                }
            }
            UmlItem::Enum(item) => {
                for member in &mut item.members {
                    member.name = snake_to_camel(&member.name);
                }
            }
        }

        if let Some(previous) = renamed.insert(fqn.clone(), item) {
            warn!(
                fqn = %fqn,
                replaced = previous.name(),
                "items collide after camelCase renaming"
            );
        }
    }
    domain.items = renamed;

    for relation in &mut domain.relations {
        relation.source_fqn = snake_to_camel(&relation.source_fqn);
        relation.target_fqn = snake_to_camel(&relation.target_fqn);
        relation.label = snake_to_camel(&relation.label);
    }
}

/// Singular names for collection attributes and reference labels.
pub fn singularize_plural_attributes(domain: &mut Domain) {
    for class in domain.classes_mut() {
        for attribute in &mut class.attributes {
            if is_collection_type(&attribute.type_expr) {
                attribute.name = singularize(&attribute.name);
            }
        }
    }
    for relation in &mut domain.relations {
        relation.label = singularize_label(&relation.label);
    }
}

/// Rewrite every attribute type into its multiplicity form.
pub fn annotate_cardinalities(domain: &mut Domain) {
    for class in domain.classes_mut() {
        for attribute in &mut class.attributes {
            attribute.type_expr = annotate_cardinality(&attribute.type_expr);
        }
    }
}
